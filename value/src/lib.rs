#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! A concrete JSON tree for the jsonriver parser.
//!
//! `jsonriver-core` parses; this crate decides what parsing produces:
//!
//! - [`JsonValue`], an ordered, duplicate-preserving value tree with a
//!   compact `Display` serialization (and `serde::Serialize` behind the
//!   `serde` feature);
//! - [`TreeBuilder`], the [`Build`](jsonriver_core::Build) implementation
//!   producing it;
//! - the synchronous convenience entry points [`parse_value`],
//!   [`parse_stream`], [`parse_unwrapped`], and [`from_reader`], each a thin
//!   loop over the incremental core.

pub mod read;
pub mod tree;
pub mod value;

pub use read::{ReadError, from_reader, parse_stream, parse_unwrapped, parse_value};
pub use tree::{TreeBuilder, TreeFrame};
pub use value::{JsonNumber, JsonObject, JsonValue};
