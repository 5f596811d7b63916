#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Incremental, resumable JSON parsing.
//!
//! Feed [`StreamParser`] byte chunks of any size; it emits every top-level
//! value as soon as the value's bytes have been seen, suspending and
//! resuming transparently across chunk boundaries. The parser is polymorphic
//! over a [`Build`] implementation and never constructs values itself; pair
//! it with a builder such as `jsonriver_value::TreeBuilder` for a concrete
//! tree.
//!
//! Three [`ParseMode`]s interpret multiple top-level values: a single value,
//! a whitespace-separated stream, or the elements of one outer array
//! unwrapped into a stream.

pub mod buffer;
pub mod config;
mod error;
mod parser;
pub mod position;
mod stream;
pub mod traits;

#[cfg(any(feature = "tokio", feature = "futures"))]
pub mod async_stream;

pub use buffer::{ChunkBuffer, Suspend};
pub use config::ParseConfig;
pub use error::ParseError;
pub use position::LineTracker;
pub use stream::{ParseMode, StreamParser};
pub use traits::Build;
