//! The synchronous grammar machine.
//!
//! [`ValueMachine`] parses exactly one JSON value starting at the current
//! checkpoint and returns the finished value plus the offset just past it.
//! It is written as a flat state loop over an explicit frame stack rather
//! than as recursive functions: suspension must be able to unwind out of the
//! middle of a value, and a Rust call stack cannot be kept alive across a
//! return to the caller.
//!
//! The machine mutates the driver's [`Checkpoint`] in place. Every committed
//! transition (state + offset + stack) is therefore a recoverable position:
//! when a buffer read returns [`Suspend`], the early-return leaves the
//! checkpoint exactly where parsing must resume once more bytes arrive.
//! Recoverable positions sit at value boundaries only; a token interrupted
//! mid-way is re-lexed from its first byte on resume, so no token-internal
//! state ever needs to survive a suspension.

use std::borrow::Cow;
use std::str;

use crate::buffer::{ChunkBuffer, Suspend};
use crate::config::ParseConfig;
use crate::error::ParseError;
use crate::position::LineTracker;
use crate::traits::Build;

/// Why the machine stopped before producing a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Interrupt {
    /// Out of buffered input; resume from the checkpoint when more arrives.
    Suspend,
    /// Grammar violation; the parse is over.
    Fail(ParseError),
}

impl From<Suspend> for Interrupt {
    #[inline]
    fn from(_: Suspend) -> Self {
        Interrupt::Suspend
    }
}

pub(crate) type Step<T> = Result<T, Interrupt>;

/// What the machine expects next, committed at every recoverable position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GrammarState {
    /// Expect a value (fresh parse, or the driver re-entering the grammar).
    Value,
    /// After `[`: expect a first element or `]`.
    ElementFirst,
    /// After `,` in an array: an element must follow.
    Element,
    /// After an array element: expect `,` or `]`.
    ElementTail,
    /// After `{`: expect a first key or `}`.
    KeyFirst,
    /// After `,` in an object: a key must follow.
    Key,
    /// After an object key: expect `:`.
    Colon,
    /// After `:`: a member value must follow.
    MemberValue,
    /// After an object member: expect `,` or `}`.
    MemberTail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    Array,
    Object,
}

/// One open container: the builder's frame plus which close it expects.
pub(crate) struct OpenFrame<B: Build> {
    pub(crate) kind: FrameKind,
    pub(crate) frame: B::Frame,
}

impl<B: Build> Clone for OpenFrame<B>
where
    B::Frame: Clone,
{
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            frame: self.frame.clone(),
        }
    }
}

/// The resumable parse position: grammar state, next-byte offset, and the
/// stack of open frames (innermost last).
///
/// Invariant: the stack holds exactly the containers enclosing `curr`. It is
/// empty iff no value is partially constructed.
pub(crate) struct Checkpoint<B: Build> {
    pub(crate) state: GrammarState,
    pub(crate) curr: usize,
    pub(crate) stack: Vec<OpenFrame<B>>,
}

impl<B: Build> Checkpoint<B> {
    pub(crate) fn fresh(at: usize) -> Self {
        Self {
            state: GrammarState::Value,
            curr: at,
            stack: Vec::new(),
        }
    }

    /// Rewind to a fresh value parse starting at `at`.
    pub(crate) fn reset(&mut self, at: usize) {
        self.state = GrammarState::Value;
        self.curr = at;
        self.stack.clear();
    }
}

impl<B: Build> Clone for Checkpoint<B>
where
    B::Frame: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state,
            curr: self.curr,
            stack: self.stack.clone(),
        }
    }
}

/// Parses one value against the buffer, feeding the builder and committing
/// progress into the checkpoint as it goes.
pub(crate) struct ValueMachine<'a, B: Build> {
    pub(crate) buf: &'a ChunkBuffer,
    pub(crate) lines: &'a mut LineTracker,
    pub(crate) builder: &'a B,
    pub(crate) config: &'a ParseConfig,
    pub(crate) save: &'a mut Checkpoint<B>,
}

impl<'a, B: Build> ValueMachine<'a, B> {
    /// Run until one complete value is produced.
    ///
    /// Returns the value and the offset immediately after it. On
    /// [`Interrupt::Suspend`] the checkpoint holds the resume position; on
    /// [`Interrupt::Fail`] the parse is abandoned.
    pub(crate) fn run(&mut self) -> Step<(B::Value, usize)> {
        loop {
            self.skip_ws()?;
            let i = self.save.curr;
            match self.save.state {
                GrammarState::Value | GrammarState::Element | GrammarState::MemberValue => {
                    if let Some(done) = self.parse_value(i)? {
                        return Ok(done);
                    }
                }
                GrammarState::ElementFirst => {
                    if self.buf.get(i)? == b']' {
                        if let Some(done) = self.close_frame(i)? {
                            return Ok(done);
                        }
                    } else if let Some(done) = self.parse_value(i)? {
                        return Ok(done);
                    }
                }
                GrammarState::ElementTail => match self.buf.get(i)? {
                    b',' => self.shift(GrammarState::Element, i + 1),
                    b']' => {
                        if let Some(done) = self.close_frame(i)? {
                            return Ok(done);
                        }
                    }
                    _ => return Err(self.fail(i, "expected ] or ,")),
                },
                GrammarState::KeyFirst => match self.buf.get(i)? {
                    b'}' => {
                        if let Some(done) = self.close_frame(i)? {
                            return Ok(done);
                        }
                    }
                    b'"' => self.parse_key(i)?,
                    _ => return Err(self.fail(i, "expected object key")),
                },
                GrammarState::Key => match self.buf.get(i)? {
                    b'"' => self.parse_key(i)?,
                    _ => return Err(self.fail(i, "expected object key")),
                },
                GrammarState::Colon => match self.buf.get(i)? {
                    b':' => self.shift(GrammarState::MemberValue, i + 1),
                    _ => return Err(self.fail(i, "expected ':'")),
                },
                GrammarState::MemberTail => match self.buf.get(i)? {
                    b',' => self.shift(GrammarState::Key, i + 1),
                    b'}' => {
                        if let Some(done) = self.close_frame(i)? {
                            return Ok(done);
                        }
                    }
                    _ => return Err(self.fail(i, "expected } or ,")),
                },
            }
        }
    }

    /// Commit a state transition. Everything before `curr` is now consumed.
    #[inline]
    fn shift(&mut self, state: GrammarState, curr: usize) {
        self.save.state = state;
        self.save.curr = curr;
    }

    /// Consume inter-token whitespace, committing progress byte-by-byte so a
    /// resumed parse never recounts a newline.
    fn skip_ws(&mut self) -> Step<()> {
        loop {
            match self.buf.get(self.save.curr)? {
                b' ' | b'\t' | b'\r' => self.save.curr += 1,
                b'\n' => {
                    self.lines.newline(self.save.curr);
                    self.save.curr += 1;
                }
                _ => return Ok(()),
            }
        }
    }

    /// Dispatch on the first byte of a value.
    ///
    /// Containers push a frame and return `None`; the loop keeps going inside
    /// them. Primitives complete immediately and either close out the whole
    /// parse (empty stack) or feed the innermost frame.
    fn parse_value(&mut self, i: usize) -> Step<Option<(B::Value, usize)>> {
        match self.buf.get(i)? {
            b'{' => {
                self.open_frame(FrameKind::Object, i)?;
                Ok(None)
            }
            b'[' => {
                self.open_frame(FrameKind::Array, i)?;
                Ok(None)
            }
            b'"' => {
                let (text, end) = self.lex_string(i)?;
                let value = self.builder.string(&text);
                Ok(self.complete(value, end))
            }
            b't' => {
                self.lex_literal(i, b"true")?;
                Ok(self.complete(self.builder.boolean(true), i + 4))
            }
            b'f' => {
                self.lex_literal(i, b"false")?;
                Ok(self.complete(self.builder.boolean(false), i + 5))
            }
            b'n' => {
                self.lex_literal(i, b"null")?;
                Ok(self.complete(self.builder.null(), i + 4))
            }
            b'-' | b'0'..=b'9' => {
                let (end, float) = self.lex_number(i)?;
                let literal = self.text(i, end)?;
                let value = self.builder.number(literal, float);
                Ok(self.complete(value, end))
            }
            _ => Err(self.fail(i, "expected json value")),
        }
    }

    /// Finish a value: hand it to the enclosing frame, or surface it if no
    /// container is open.
    fn complete(&mut self, value: B::Value, end: usize) -> Option<(B::Value, usize)> {
        self.save.curr = end;
        match self.save.stack.last_mut() {
            None => Some((value, end)),
            Some(open) => {
                let kind = open.kind;
                self.builder.add_value(&mut open.frame, value);
                self.save.state = match kind {
                    FrameKind::Array => GrammarState::ElementTail,
                    FrameKind::Object => GrammarState::MemberTail,
                };
                None
            }
        }
    }

    fn open_frame(&mut self, kind: FrameKind, open: usize) -> Step<()> {
        if self.save.stack.len() >= self.config.max_depth {
            return Err(self.fail(open, "nesting depth limit exceeded"));
        }
        let frame = match kind {
            FrameKind::Array => self.builder.begin_array(),
            FrameKind::Object => self.builder.begin_object(),
        };
        self.save.stack.push(OpenFrame { kind, frame });
        let next = match kind {
            FrameKind::Array => GrammarState::ElementFirst,
            FrameKind::Object => GrammarState::KeyFirst,
        };
        self.shift(next, open + 1);
        Ok(())
    }

    fn close_frame(&mut self, close: usize) -> Step<Option<(B::Value, usize)>> {
        let Some(open) = self.save.stack.pop() else {
            // Close states only exist under an open frame.
            return Err(self.fail(close, "expected json value"));
        };
        let value = self.builder.finish(open.frame);
        Ok(self.complete(value, close + 1))
    }

    /// Lex the object key at `open` and stage it on the innermost frame.
    fn parse_key(&mut self, open: usize) -> Step<()> {
        let (key, end) = self.lex_string(open)?;
        let Some(top) = self.save.stack.last_mut() else {
            // Key states only exist under an open object frame.
            return Err(self.fail(open, "expected json value"));
        };
        self.builder.add_key(&mut top.frame, &key);
        self.save.state = GrammarState::Colon;
        self.save.curr = end;
        Ok(())
    }

    /// Borrow `[start, end)` as UTF-8 text.
    fn text(&self, start: usize, end: usize) -> Step<&'a str> {
        let bytes = self.buf.slice(start, end)?;
        match str::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => Err(self.fail(start + err.valid_up_to(), "invalid utf-8")),
        }
    }

    /// Lex the string starting at the `"` at `open`. Returns the decoded
    /// contents and the offset just past the closing quote.
    ///
    /// Escape-free strings borrow straight from the buffer; the first `\`
    /// switches to an owned accumulator.
    fn lex_string(&self, open: usize) -> Step<(Cow<'a, str>, usize)> {
        let mut i = open + 1;
        loop {
            match self.buf.get(i)? {
                b'"' => return Ok((Cow::Borrowed(self.text(open + 1, i)?), i + 1)),
                b'\\' => break,
                b if b < 0x20 => return Err(self.fail(i, "control character in string")),
                _ => i += 1,
            }
        }

        let mut out = String::with_capacity(i - open + 16);
        out.push_str(self.text(open + 1, i)?);
        loop {
            match self.buf.get(i)? {
                b'"' => return Ok((Cow::Owned(out), i + 1)),
                b'\\' => i = self.lex_escape(i, &mut out)?,
                b if b < 0x20 => return Err(self.fail(i, "control character in string")),
                _ => {
                    let run = i;
                    i += 1;
                    loop {
                        match self.buf.get(i)? {
                            b'"' | b'\\' => break,
                            b if b < 0x20 => {
                                return Err(self.fail(i, "control character in string"));
                            }
                            _ => i += 1,
                        }
                    }
                    out.push_str(self.text(run, i)?);
                }
            }
        }
    }

    /// Decode the escape whose `\` sits at `backslash`; returns the offset
    /// after the escape.
    fn lex_escape(&self, backslash: usize, out: &mut String) -> Step<usize> {
        let escaped = match self.buf.get(backslash + 1)? {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{0008}',
            b'f' => '\u{000C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.lex_unicode_escape(backslash, out),
            _ => return Err(self.fail(backslash, "invalid escape sequence")),
        };
        out.push(escaped);
        Ok(backslash + 2)
    }

    /// Decode `\uXXXX`, combining surrogate pairs into one code point.
    fn lex_unicode_escape(&self, backslash: usize, out: &mut String) -> Step<usize> {
        let unit = self.lex_hex4(backslash + 2)?;
        if (0xDC00..=0xDFFF).contains(&unit) {
            return Err(self.fail(backslash, "unpaired surrogate"));
        }
        if !(0xD800..=0xDBFF).contains(&unit) {
            let Some(c) = char::from_u32(u32::from(unit)) else {
                return Err(self.fail(backslash, "invalid escape sequence"));
            };
            out.push(c);
            return Ok(backslash + 6);
        }

        // High surrogate: the low half must follow immediately.
        if self.buf.get(backslash + 6)? != b'\\' || self.buf.get(backslash + 7)? != b'u' {
            return Err(self.fail(backslash, "unpaired surrogate"));
        }
        let low = self.lex_hex4(backslash + 8)?;
        if !(0xDC00..=0xDFFF).contains(&low) {
            return Err(self.fail(backslash, "unpaired surrogate"));
        }
        let combined = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
        let Some(c) = char::from_u32(combined) else {
            return Err(self.fail(backslash, "invalid escape sequence"));
        };
        out.push(c);
        Ok(backslash + 12)
    }

    fn lex_hex4(&self, start: usize) -> Step<u16> {
        let mut unit: u16 = 0;
        for k in 0..4 {
            let digit = match self.buf.get(start + k)? {
                b @ b'0'..=b'9' => b - b'0',
                b @ b'a'..=b'f' => b - b'a' + 10,
                b @ b'A'..=b'F' => b - b'A' + 10,
                _ => return Err(self.fail(start + k, "invalid escape sequence")),
            };
            unit = (unit << 4) | u16::from(digit);
        }
        Ok(unit)
    }

    /// Lex an RFC 8259 number starting at `start`. Returns the end offset
    /// and whether a fraction or exponent appeared. The literal itself is
    /// not interpreted.
    fn lex_number(&self, start: usize) -> Step<(usize, bool)> {
        let mut i = start;
        let mut float = false;
        if self.lookahead(i)? == Some(b'-') {
            i += 1;
        }
        match self.lookahead(i)? {
            Some(b'0') => i += 1,
            Some(b'1'..=b'9') => {
                i += 1;
                while matches!(self.lookahead(i)?, Some(b'0'..=b'9')) {
                    i += 1;
                }
            }
            _ => return Err(self.fail(i, "expected digit")),
        }
        if self.lookahead(i)? == Some(b'.') {
            float = true;
            i += 1;
            if !matches!(self.lookahead(i)?, Some(b'0'..=b'9')) {
                return Err(self.fail(i, "expected digit"));
            }
            while matches!(self.lookahead(i)?, Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        if matches!(self.lookahead(i)?, Some(b'e' | b'E')) {
            float = true;
            i += 1;
            if matches!(self.lookahead(i)?, Some(b'+' | b'-')) {
                i += 1;
            }
            if !matches!(self.lookahead(i)?, Some(b'0'..=b'9')) {
                return Err(self.fail(i, "expected digit"));
            }
            while matches!(self.lookahead(i)?, Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        Ok((i, float))
    }

    /// Exact byte match for `true` / `false` / `null`.
    fn lex_literal(&self, start: usize, expect: &'static [u8]) -> Step<()> {
        for (k, byte) in expect.iter().enumerate() {
            if self.buf.get(start + k)? != *byte {
                return Err(self.fail(start + k, "invalid literal"));
            }
        }
        Ok(())
    }

    /// Byte at `i`, or `None` at finished end-of-input.
    ///
    /// Token lexers terminate on `None`; an unfinished end still suspends
    /// via [`ChunkBuffer::get`].
    #[inline]
    fn lookahead(&self, i: usize) -> Step<Option<u8>> {
        if self.buf.at_eof(i) {
            return Ok(None);
        }
        Ok(Some(self.buf.get(i)?))
    }

    fn fail(&self, i: usize, message: &'static str) -> Interrupt {
        let (line, column) = self.lines.locate(i);
        Interrupt::Fail(ParseError::new(
            message,
            self.buf.discarded() + i,
            line,
            column,
        ))
    }
}
