//! The chunk-absorbing driver.
//!
//! [`StreamParser`] wraps the grammar machine with the outer state machine
//! that governs what may appear *between* top-level values, the
//! checkpoint/resume protocol, and the absorb/finish API. Feed it byte
//! chunks of any size; each call returns every value whose bytes have now
//! been fully seen.
//!
//! # Example
//!
//! ```ignore
//! let mut parser = StreamParser::new(ParseMode::ValueStream, TreeBuilder);
//! let mut values = parser.absorb_str("1 2 ")?;
//! values.extend(parser.absorb_str("3")?);
//! values.extend(parser.finish()?);
//! assert_eq!(values.len(), 3);
//! ```

use crate::buffer::ChunkBuffer;
use crate::config::ParseConfig;
use crate::error::ParseError;
use crate::parser::{Checkpoint, Interrupt, Step, ValueMachine};
use crate::position::LineTracker;
use crate::traits::Build;

/// How multiple top-level values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub enum ParseMode {
    /// The input is one outer array; its elements are emitted one by one.
    ///
    /// If the first non-whitespace byte is not `[`, the parser downgrades
    /// itself to [`SingleValue`](Self::SingleValue) and emits the input as
    /// one value.
    UnwrapArray,
    /// The input is zero or more whitespace-separated values.
    ValueStream,
    /// The input is exactly one value followed by optional whitespace.
    SingleValue,
}

/// Driver state between top-level values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OuterState {
    /// UnwrapArray only: no non-whitespace seen, the outer `[` is pending.
    Prestart,
    /// Inside the outer array, right after `[`.
    Start,
    /// A value may begin here (after `,` in the outer array, or between
    /// stream values, or before the single value).
    Preval,
    /// Inside the outer array, right after an element.
    Postval,
    /// Only trailing whitespace is legal.
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverState {
    /// Scanning between top-level values.
    Outer(OuterState),
    /// Inside the grammar machine; resume position in the checkpoint.
    Grammar,
}

/// An incremental, resumable JSON parser.
///
/// Not thread-safe: all operations take `&mut self` and the instance is a
/// pure state machine over caller-supplied bytes. Values are emitted in
/// input order; concatenating the lists returned by successive calls yields
/// exactly what a single-call parse would produce.
///
/// After a returned [`ParseError`] the instance should be discarded.
pub struct StreamParser<B: Build> {
    builder: B,
    config: ParseConfig,
    buf: ChunkBuffer,
    lines: LineTracker,
    mode: ParseMode,
    state: DriverState,
    /// Scan offset of the outer state machine; start offset of the value
    /// being parsed while in grammar mode.
    offset: usize,
    save: Checkpoint<B>,
    finished: bool,
}

impl<B: Build> StreamParser<B> {
    /// Create a parser with the default [`ParseConfig`].
    pub fn new(mode: ParseMode, builder: B) -> Self {
        Self::with_config(mode, builder, ParseConfig::default())
    }

    /// Create a parser with explicit limits.
    pub fn with_config(mode: ParseMode, builder: B, config: ParseConfig) -> Self {
        let state = DriverState::Outer(match mode {
            ParseMode::UnwrapArray => OuterState::Prestart,
            ParseMode::ValueStream | ParseMode::SingleValue => OuterState::Preval,
        });
        Self {
            builder,
            config,
            buf: ChunkBuffer::new(),
            lines: LineTracker::new(),
            mode,
            state,
            offset: 0,
            save: Checkpoint::fresh(0),
            finished: false,
        }
    }

    /// The current mode. `UnwrapArray` may have downgraded to `SingleValue`
    /// after the first non-whitespace byte.
    #[inline]
    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    /// True once [`finish`](Self::finish) has been called.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Absorb one chunk and return the values completed by it.
    ///
    /// Values returned by earlier calls are not re-emitted. On error the
    /// call returns only the error; values completed earlier in the same
    /// call are dropped.
    pub fn absorb(&mut self, chunk: &[u8]) -> Result<Vec<B::Value>, ParseError> {
        if self.finished {
            return Err(self.error_here("absorb after finish"));
        }
        if self
            .buf
            .len()
            .checked_add(chunk.len())
            .is_none_or(|total| total > self.config.max_buffer_bytes)
        {
            return Err(self.error_here("input buffer limit exceeded"));
        }
        self.buf.append(chunk);
        self.drive()
    }

    /// UTF-8 convenience for [`absorb`](Self::absorb).
    #[inline]
    pub fn absorb_str(&mut self, chunk: &str) -> Result<Vec<B::Value>, ParseError> {
        self.absorb(chunk.as_bytes())
    }

    /// Declare the input complete and return the remaining values.
    ///
    /// A value suspended mid-parse becomes an "exhausted input" error;
    /// trailing whitespace after a complete input is fine.
    pub fn finish(&mut self) -> Result<Vec<B::Value>, ParseError> {
        self.finished = true;
        self.buf.set_done();
        self.drive()
    }

    /// Run the drive loop until it suspends, errors, or completes.
    fn drive(&mut self) -> Result<Vec<B::Value>, ParseError> {
        let mut produced = Vec::new();
        loop {
            let step = match self.state {
                DriverState::Outer(outer) => self.scan_outer(outer),
                DriverState::Grammar => match self.parse_value() {
                    Ok(value) => {
                        produced.push(value);
                        Ok(())
                    }
                    Err(interrupt) => Err(interrupt),
                },
            };
            match step {
                Ok(()) => {}
                Err(Interrupt::Suspend) => return self.suspend(produced),
                Err(Interrupt::Fail(err)) => return Err(err),
            }
        }
    }

    /// One outer-state step: skip whitespace, then classify the next byte.
    fn scan_outer(&mut self, outer: OuterState) -> Step<()> {
        loop {
            match self.buf.get(self.offset)? {
                b' ' | b'\t' | b'\r' => self.offset += 1,
                b'\n' => {
                    self.lines.newline(self.offset);
                    self.offset += 1;
                }
                _ => break,
            }
        }
        match self.buf.get(self.offset)? {
            b'[' => match outer {
                OuterState::Prestart => {
                    self.offset += 1;
                    self.state = DriverState::Outer(OuterState::Start);
                    Ok(())
                }
                OuterState::End => Err(self.fail_here("expected eof")),
                OuterState::Postval => Err(self.fail_here("expected , or ]")),
                // The `[` opens a nested value, not the outer array.
                OuterState::Start | OuterState::Preval => {
                    self.enter_grammar();
                    Ok(())
                }
            },
            b',' => match outer {
                OuterState::Postval => {
                    self.offset += 1;
                    self.state = DriverState::Outer(OuterState::Preval);
                    Ok(())
                }
                OuterState::End => Err(self.fail_here("expected eof")),
                _ => Err(self.fail_here("expected json value")),
            },
            b']' => match outer {
                OuterState::Postval | OuterState::Start if self.mode == ParseMode::UnwrapArray => {
                    self.offset += 1;
                    self.state = DriverState::Outer(OuterState::End);
                    Ok(())
                }
                OuterState::End => Err(self.fail_here("expected eof")),
                _ => Err(self.fail_here("expected json value")),
            },
            _ => match outer {
                OuterState::End => Err(self.fail_here("expected eof")),
                OuterState::Postval => Err(self.fail_here("expected ] or ,")),
                OuterState::Prestart => {
                    // First non-whitespace is not `[`: the outer value is
                    // not an array, so unwrapping degenerates to a single
                    // value.
                    self.mode = ParseMode::SingleValue;
                    self.enter_grammar();
                    Ok(())
                }
                OuterState::Start | OuterState::Preval => {
                    self.enter_grammar();
                    Ok(())
                }
            },
        }
    }

    /// Switch to grammar mode at the current offset without consuming: the
    /// byte under the cursor belongs to the value.
    fn enter_grammar(&mut self) {
        self.save.reset(self.offset);
        self.state = DriverState::Grammar;
    }

    /// Compact, then run the grammar machine from the checkpoint.
    fn parse_value(&mut self) -> Step<B::Value> {
        self.compact();
        let mut machine = ValueMachine {
            buf: &self.buf,
            lines: &mut self.lines,
            builder: &self.builder,
            config: &self.config,
            save: &mut self.save,
        };
        let (value, end) = machine.run()?;
        self.offset = end;
        self.save.reset(end);
        self.state = DriverState::Outer(match self.mode {
            ParseMode::UnwrapArray => OuterState::Postval,
            ParseMode::ValueStream => OuterState::Preval,
            ParseMode::SingleValue => OuterState::End,
        });
        Ok(value)
    }

    /// Discard the consumed window, rebasing every live offset together.
    fn compact(&mut self) {
        let rebased = self.buf.compact(self.offset);
        if rebased != self.offset {
            let delta = self.offset - rebased;
            self.offset = rebased;
            self.save.curr -= delta;
            self.lines.rebase(delta);
        }
    }

    /// The buffer ran dry. Decide between "come back with more bytes" and
    /// "the input ended in a legal place".
    fn suspend(&mut self, produced: Vec<B::Value>) -> Result<Vec<B::Value>, ParseError> {
        if !self.buf.is_done() {
            return Ok(produced);
        }
        match self.state {
            DriverState::Outer(OuterState::Preval | OuterState::End) => Ok(produced),
            _ => Err(self.error_at(self.buf.len(), "exhausted input")),
        }
    }

    fn fail_here(&self, message: &'static str) -> Interrupt {
        Interrupt::Fail(self.error_at(self.offset, message))
    }

    fn error_here(&self, message: &'static str) -> ParseError {
        self.error_at(self.offset, message)
    }

    fn error_at(&self, i: usize, message: &'static str) -> ParseError {
        let (line, column) = self.lines.locate(i);
        ParseError::new(message, self.buf.discarded() + i, line, column)
    }
}

impl<B> StreamParser<B>
where
    B: Build + Clone,
    B::Frame: Clone,
{
    /// Deep copy, including the buffer and every open frame, so an in-flight
    /// parse can be forked. Further input to either copy does not affect the
    /// other.
    pub fn snapshot(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            config: self.config,
            buf: self.buf.clone(),
            lines: self.lines,
            mode: self.mode,
            state: self.state,
            offset: self.offset,
            save: self.save.clone(),
            finished: self.finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::TextBuild;
    use test_case::test_case;

    fn collect(
        mode: ParseMode,
        chunks: &[&str],
    ) -> Result<Vec<String>, ParseError> {
        let mut parser = StreamParser::new(mode, TextBuild);
        let mut values = Vec::new();
        for chunk in chunks {
            values.extend(parser.absorb_str(chunk)?);
        }
        values.extend(parser.finish()?);
        Ok(values)
    }

    #[test]
    fn single_value_across_chunks() {
        let values = collect(ParseMode::SingleValue, &["[\"a\",", "1,true]"]).unwrap();
        assert_eq!(values, vec!["[\"a\",1,true]"]);
    }

    #[test]
    fn single_value_number() {
        let values = collect(ParseMode::SingleValue, &["42"]).unwrap();
        assert_eq!(values, vec!["42"]);
    }

    #[test]
    fn single_value_truncated_object() {
        let err = collect(ParseMode::SingleValue, &["{\"a\""]).unwrap_err();
        assert_eq!(err.message, "exhausted input");
    }

    #[test]
    fn value_stream_three_numbers() {
        let values = collect(ParseMode::ValueStream, &["1 2", " 3"]).unwrap();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn unwrap_array_elements() {
        let values = collect(ParseMode::UnwrapArray, &["[1,", "2, 3]"]).unwrap();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn unwrap_array_downgrades_on_object() {
        let mut parser = StreamParser::new(ParseMode::UnwrapArray, TextBuild);
        let mut values = parser.absorb_str("{\"k\":1}").unwrap();
        values.extend(parser.finish().unwrap());
        assert_eq!(values, vec!["{\"k\":1}"]);
        assert_eq!(parser.mode(), ParseMode::SingleValue);
    }

    #[test]
    fn trailing_comma_reports_expected_value() {
        let err = collect(ParseMode::SingleValue, &["[1,2,]"]).unwrap_err();
        assert_eq!(err.message, "expected json value");
        assert_eq!(err.offset, 5);
    }

    #[test_case(&["[1,2]"]; "one chunk")]
    #[test_case(&["[", "1", ",", "2", "]"]; "single byte chunks")]
    #[test_case(&["[1", ",2]"]; "split at comma")]
    fn chunking_is_transparent(chunks: &[&str]) {
        let values = collect(ParseMode::SingleValue, chunks).unwrap();
        assert_eq!(values, vec!["[1,2]"]);
    }

    #[test]
    fn values_are_not_reemitted_across_calls() {
        let mut parser = StreamParser::new(ParseMode::ValueStream, TextBuild);
        assert_eq!(parser.absorb_str("1 ").unwrap(), vec!["1"]);
        assert_eq!(parser.absorb_str("2 ").unwrap(), vec!["2"]);
        assert_eq!(parser.finish().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn trailing_garbage_after_single_value() {
        let err = collect(ParseMode::SingleValue, &["1 x"]).unwrap_err();
        assert_eq!(err.message, "expected eof");
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn comma_between_stream_values_rejected() {
        let err = collect(ParseMode::ValueStream, &["1, 2"]).unwrap_err();
        assert_eq!(err.message, "expected json value");
    }

    #[test]
    fn unwrap_array_missing_close() {
        let err = collect(ParseMode::UnwrapArray, &["[1, 2"]).unwrap_err();
        assert_eq!(err.message, "exhausted input");
    }

    #[test]
    fn unwrap_array_garbage_after_element() {
        let err = collect(ParseMode::UnwrapArray, &["[1 1]"]).unwrap_err();
        assert_eq!(err.message, "expected ] or ,");
        assert_eq!(err.offset, 3);
    }

    #[test]
    fn unwrap_array_rejects_content_after_close() {
        let err = collect(ParseMode::UnwrapArray, &["[1] 2"]).unwrap_err();
        assert_eq!(err.message, "expected eof");
    }

    #[test]
    fn empty_unwrap_array_is_empty_stream() {
        let values = collect(ParseMode::UnwrapArray, &["  []  "]).unwrap();
        assert_eq!(values, Vec::<String>::new());
    }

    #[test]
    fn empty_stream_is_legal() {
        let values = collect(ParseMode::ValueStream, &["   \n "]).unwrap();
        assert_eq!(values, Vec::<String>::new());
    }

    #[test]
    fn nested_array_as_first_unwrap_element() {
        let values = collect(ParseMode::UnwrapArray, &["[[1,2],3]"]).unwrap();
        assert_eq!(values, vec!["[1,2]", "3"]);
    }

    #[test]
    fn error_position_counts_newlines() {
        let err = collect(ParseMode::SingleValue, &["[1,\n2,]"]).unwrap_err();
        assert_eq!(err.message, "expected json value");
        assert_eq!(err.offset, 6);
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 2);
    }

    #[test]
    fn absorb_after_finish_is_an_error() {
        let mut parser = StreamParser::new(ParseMode::ValueStream, TextBuild);
        parser.absorb_str("1 ").unwrap();
        parser.finish().unwrap();
        let err = parser.absorb_str("2").unwrap_err();
        assert_eq!(err.message, "absorb after finish");
    }

    #[test]
    fn buffer_limit_enforced() {
        let config = ParseConfig::new().with_max_buffer_bytes(4);
        let mut parser = StreamParser::with_config(ParseMode::SingleValue, TextBuild, config);
        let err = parser.absorb_str("[1,2,3]").unwrap_err();
        assert_eq!(err.message, "input buffer limit exceeded");
    }

    #[test]
    fn suspended_value_resumes_mid_string() {
        let mut parser = StreamParser::new(ParseMode::SingleValue, TextBuild);
        assert!(parser.absorb_str("\"hel").unwrap().is_empty());
        assert!(parser.absorb_str("lo wo").unwrap().is_empty());
        let mut values = parser.absorb_str("rld\"").unwrap();
        values.extend(parser.finish().unwrap());
        assert_eq!(values, vec!["\"hello world\""]);
    }

    #[test]
    fn snapshot_is_independent() {
        #[derive(Clone)]
        struct CloneBuild;

        #[derive(Clone)]
        enum CloneFrame {
            Array(Vec<String>),
            Object(Vec<(String, String)>, Option<String>),
        }

        impl Build for CloneBuild {
            type Value = String;
            type Frame = CloneFrame;

            fn begin_array(&self) -> CloneFrame {
                CloneFrame::Array(Vec::new())
            }

            fn begin_object(&self) -> CloneFrame {
                CloneFrame::Object(Vec::new(), None)
            }

            fn add_key(&self, frame: &mut CloneFrame, key: &str) {
                if let CloneFrame::Object(_, slot) = frame {
                    *slot = Some(key.to_owned());
                }
            }

            fn add_value(&self, frame: &mut CloneFrame, value: String) {
                match frame {
                    CloneFrame::Array(items) => items.push(value),
                    CloneFrame::Object(entries, key) => {
                        if let Some(key) = key.take() {
                            entries.push((key, value));
                        }
                    }
                }
            }

            fn finish(&self, frame: CloneFrame) -> String {
                match frame {
                    CloneFrame::Array(items) => format!("[{}]", items.join(",")),
                    CloneFrame::Object(entries, _) => {
                        let members: Vec<String> = entries
                            .into_iter()
                            .map(|(k, v)| format!("\"{}\":{}", k, v))
                            .collect();
                        format!("{{{}}}", members.join(","))
                    }
                }
            }

            fn null(&self) -> String {
                "null".to_owned()
            }

            fn boolean(&self, value: bool) -> String {
                value.to_string()
            }

            fn string(&self, text: &str) -> String {
                format!("\"{}\"", text)
            }

            fn number(&self, literal: &str, _float: bool) -> String {
                literal.to_owned()
            }
        }

        let mut parser = StreamParser::new(ParseMode::SingleValue, CloneBuild);
        assert!(parser.absorb_str("[1,").unwrap().is_empty());

        let mut fork = parser.snapshot();

        let mut left = parser.absorb_str("2]").unwrap();
        left.extend(parser.finish().unwrap());
        assert_eq!(left, vec!["[1,2]"]);

        let mut right = fork.absorb_str("9,10]").unwrap();
        right.extend(fork.finish().unwrap());
        assert_eq!(right, vec!["[1,9,10]"]);
    }
}
