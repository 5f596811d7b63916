//! The error type reported across the driver boundary.
//!
//! Only grammar violations, truncation, resource-limit hits, and API misuse
//! surface as [`ParseError`]. Running out of buffered input mid-parse is not
//! an error at all; it is the internal [`Suspend`](crate::buffer::Suspend)
//! signal, which the driver translates into "return the values produced so
//! far".

use std::borrow::Cow;

use thiserror::Error;

/// A positioned parse failure.
///
/// Every error this parser produces is detected at one byte of the input, so
/// each carries the absolute byte offset (stable across buffer compaction),
/// the 1-based line, and the 0-based column of that byte.
///
/// After a `ParseError` the parser instance should be discarded; its
/// subsequent behavior is unspecified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at line {line}, column {column} (offset {offset})")]
pub struct ParseError {
    /// What was expected or violated.
    pub message: Cow<'static, str>,
    /// Absolute byte offset of the offending position.
    pub offset: usize,
    /// 1-based line of the offending position.
    pub line: usize,
    /// 0-based column of the offending position.
    pub column: usize,
}

impl ParseError {
    pub fn new(
        message: impl Into<Cow<'static, str>>,
        offset: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            message: message.into(),
            offset,
            line,
            column,
        }
    }
}
