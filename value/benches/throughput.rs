use divan::{AllocProfiler, Bencher, black_box};
use jsonriver_core::{ParseMode, StreamParser};
use jsonriver_value::{TreeBuilder, parse_stream};

#[allow(unused)]
#[cfg_attr(feature = "alloc", global_allocator)]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

// Sample JSON objects for benchmarking
const SAMPLE_OBJECTS: &[&str] = &[
    r#"{"id": 1, "name": "Alice", "active": true}"#,
    r#"{"id": 2, "name": "Bob", "active": false, "score": 95.5}"#,
    r#"{"id": 3, "name": "Charlie", "tags": ["rust", "parser", "benchmark"]}"#,
    r#"{"user": {"name": "Dave", "email": "dave@example.com"}, "timestamp": 1699900000}"#,
];

/// Generate a value stream with N repetitions of sample objects
fn generate_stream(count: usize) -> String {
    let mut result = String::with_capacity(count * 100);
    for i in 0..count {
        result.push_str(SAMPLE_OBJECTS[i % SAMPLE_OBJECTS.len()]);
        result.push('\n');
    }
    result
}

/// Generate chunked input simulating network packets
fn generate_chunks(input: &str, chunk_size: usize) -> Vec<Vec<u8>> {
    input.as_bytes().chunks(chunk_size).map(<[u8]>::to_vec).collect()
}

#[divan::bench(
    name = "batch_parse",
    args = [100, 1000, 10_000, 100_000],
)]
fn bench_batch_parse(bencher: Bencher, n: usize) {
    let input = generate_stream(n);

    bencher
        .counter(divan::counter::BytesCount::new(input.len()))
        .with_inputs(|| input.clone())
        .bench_values(|input| black_box(parse_stream(&input).unwrap()));
}

#[divan::bench(
    name = "incremental_absorb",
    args = [100, 1000, 10_000, 100_000],
)]
fn bench_incremental_absorb(bencher: Bencher, n: usize) {
    let input = generate_stream(n);
    let chunks = generate_chunks(&input, 4096);

    bencher
        .counter(divan::counter::BytesCount::new(input.len()))
        .with_inputs(|| chunks.clone())
        .bench_values(|chunks| {
            let mut parser = StreamParser::new(ParseMode::ValueStream, TreeBuilder);
            let mut values = Vec::new();
            for chunk in chunks {
                values.extend(parser.absorb(&chunk).unwrap());
            }
            values.extend(parser.finish().unwrap());
            black_box(values)
        });
}

#[divan::bench(
    name = "chunk_size_impact",
    args = [64, 256, 1024, 4096, 16384, 65536],
)]
fn bench_chunk_sizes(bencher: Bencher, chunk_size: usize) {
    let input = generate_stream(10_000);
    let chunks = generate_chunks(&input, chunk_size);

    bencher
        .counter(divan::counter::BytesCount::new(input.len()))
        .with_inputs(|| chunks.clone())
        .bench_values(|chunks| {
            let mut parser = StreamParser::new(ParseMode::ValueStream, TreeBuilder);
            let mut values = Vec::new();
            for chunk in chunks {
                values.extend(parser.absorb(&chunk).unwrap());
            }
            values.extend(parser.finish().unwrap());
            black_box(values)
        });
}

/// Steady-state memory: a long stream must not accumulate buffer.
#[divan::bench]
fn bench_memory_stability() {
    let line = r#"{"id": 1, "data": "some payload here", "count": 42}"#;
    let input = format!("{}\n", line);

    let mut parser = StreamParser::new(ParseMode::ValueStream, TreeBuilder);
    let mut total_parsed = 0usize;

    for _ in 0..100_000 {
        total_parsed += parser.absorb_str(&input).unwrap().len();
    }
    total_parsed += parser.finish().unwrap().len();

    black_box(total_parsed);
    assert_eq!(total_parsed, 100_000);
}
