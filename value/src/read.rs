//! Synchronous convenience entry points.
//!
//! Each of these is a thin loop over [`StreamParser`]; anything more
//! elaborate (chunk scheduling, async sources) should use the core API
//! directly.

use std::io::{self, Read};

use jsonriver_core::{ParseError, ParseMode, StreamParser};
use thiserror::Error;

use crate::tree::TreeBuilder;
use crate::value::JsonValue;

/// Error from [`from_reader`]: the source failed or the bytes did not parse.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Parse exactly one JSON value from a string.
pub fn parse_value(input: &str) -> Result<JsonValue, ParseError> {
    let mut values = run(ParseMode::SingleValue, input)?;
    match values.pop() {
        Some(value) => Ok(value),
        None => Err(end_of_input_error(input)),
    }
}

/// Parse a whitespace-separated stream of JSON values from a string.
pub fn parse_stream(input: &str) -> Result<Vec<JsonValue>, ParseError> {
    run(ParseMode::ValueStream, input)
}

/// Parse a string as one outer array, returning its elements.
///
/// When the input is not an array it is returned as the only element, per
/// [`ParseMode::UnwrapArray`].
pub fn parse_unwrapped(input: &str) -> Result<Vec<JsonValue>, ParseError> {
    run(ParseMode::UnwrapArray, input)
}

/// Drain `reader` in 8 KiB chunks through an incremental parse.
pub fn from_reader<R: Read>(mode: ParseMode, mut reader: R) -> Result<Vec<JsonValue>, ReadError> {
    let mut parser = StreamParser::new(mode, TreeBuilder);
    let mut values = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        values.extend(parser.absorb(&chunk[..n])?);
    }
    values.extend(parser.finish()?);
    Ok(values)
}

fn run(mode: ParseMode, input: &str) -> Result<Vec<JsonValue>, ParseError> {
    let mut parser = StreamParser::new(mode, TreeBuilder);
    let mut values = parser.absorb_str(input)?;
    values.extend(parser.finish()?);
    Ok(values)
}

/// Position an "exhausted input" error at the end of `input`.
///
/// The core accepts an empty single-value input as zero values; for this
/// one-value entry point that is a truncation.
fn end_of_input_error(input: &str) -> ParseError {
    let line = input.bytes().filter(|b| *b == b'\n').count() + 1;
    let line_start = input.rfind('\n').map(|p| p + 1).unwrap_or(0);
    ParseError::new(
        "exhausted input",
        input.len(),
        line,
        input.len() - line_start,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_value_round_trips() {
        let value = parse_value(r#"{"a":[1,2.5,"x"]}"#).unwrap();
        assert_eq!(value.to_string(), r#"{"a":[1,2.5,"x"]}"#);
    }

    #[test]
    fn parse_value_rejects_empty_input() {
        let err = parse_value("  \n ").unwrap_err();
        assert_eq!(err.message, "exhausted input");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn parse_stream_collects_values() {
        let values = parse_stream("1 2 3").unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[2].as_i64(), Some(3));
    }

    #[test]
    fn parse_unwrapped_flattens_one_level() {
        let values = parse_unwrapped(r#"[{"id":1},{"id":2}]"#).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[1].get("id").and_then(JsonValue::as_i64), Some(2));
    }

    #[test]
    fn from_reader_streams_in_chunks() {
        let input = r#"{"id":1} {"id":2}"#;
        let values = from_reader(ParseMode::ValueStream, input.as_bytes()).unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn from_reader_surfaces_parse_errors() {
        let err = from_reader(ParseMode::SingleValue, &b"[1,2,]"[..]).unwrap_err();
        assert!(matches!(err, ReadError::Parse(_)));
    }
}
