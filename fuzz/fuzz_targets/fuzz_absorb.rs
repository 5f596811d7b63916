#![no_main]

use jsonriver::{ParseMode, StreamParser, TreeBuilder};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes in every mode must never panic; errors are fine.
fuzz_target!(|data: &[u8]| {
    for mode in [
        ParseMode::SingleValue,
        ParseMode::ValueStream,
        ParseMode::UnwrapArray,
    ] {
        let mut parser = StreamParser::new(mode, TreeBuilder);
        let absorbed = parser.absorb(data);
        if absorbed.is_ok() {
            let _ = parser.finish();
        }
    }
});
