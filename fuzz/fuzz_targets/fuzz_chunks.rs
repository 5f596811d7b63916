#![no_main]

use arbitrary::Arbitrary;
use jsonriver::{JsonValue, ParseError, ParseMode, StreamParser, TreeBuilder};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    splits: Vec<u8>,
}

fn parse_chunked(
    mode: ParseMode,
    chunks: impl IntoIterator<Item = Vec<u8>>,
) -> Result<Vec<JsonValue>, ParseError> {
    let mut parser = StreamParser::new(mode, TreeBuilder);
    let mut values = Vec::new();
    for chunk in chunks {
        values.extend(parser.absorb(&chunk)?);
    }
    values.extend(parser.finish()?);
    Ok(values)
}

// Chunk independence: any partition of the input must produce the same
// values and the same error as the one-shot parse.
fuzz_target!(|input: Input| {
    let Input { data, splits } = input;

    let mut cuts: Vec<usize> = splits
        .iter()
        .map(|s| usize::from(*s) % (data.len() + 1))
        .collect();
    cuts.sort_unstable();

    let mut chunks = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        chunks.push(data[start..cut].to_vec());
        start = cut;
    }
    chunks.push(data[start..].to_vec());

    for mode in [
        ParseMode::SingleValue,
        ParseMode::ValueStream,
        ParseMode::UnwrapArray,
    ] {
        let whole = parse_chunked(mode, [data.clone()]);
        let parts = parse_chunked(mode, chunks.clone());
        assert_eq!(whole, parts);
    }
});
