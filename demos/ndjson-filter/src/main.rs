//! Filter an NDJSON stream from stdin, keeping records that carry a key.
//!
//! ```text
//! cat events.ndjson | ndjson-filter user_id
//! ```
//!
//! The input does not have to be line-delimited: any whitespace-separated
//! stream of JSON values works, and records are emitted as soon as their
//! bytes arrive.

use std::process::ExitCode;

use jsonriver::{JsonValue, ParseMode, StreamParser, TreeBuilder};
use thiserror::Error;
use tokio::io::{self, AsyncReadExt};

#[derive(Error, Debug)]
enum AppError {
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad input: {0}")]
    Parse(#[from] jsonriver::ParseError),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let key = std::env::args().nth(1).unwrap_or_else(|| "id".to_owned());
    match run(&key).await {
        Ok(kept) => {
            eprintln!("kept {kept} records");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("ndjson-filter: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(key: &str) -> Result<usize, AppError> {
    let mut stdin = io::stdin();
    let mut parser = StreamParser::new(ParseMode::ValueStream, TreeBuilder);
    let mut chunk = [0u8; 8192];
    let mut kept = 0;

    loop {
        let n = stdin.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        kept += emit_matching(key, parser.absorb(&chunk[..n])?);
    }
    kept += emit_matching(key, parser.finish()?);

    Ok(kept)
}

fn emit_matching(key: &str, values: Vec<JsonValue>) -> usize {
    let mut kept = 0;
    for value in values {
        if value.get(key).is_some() {
            println!("{value}");
            kept += 1;
        }
    }
    kept
}
