// crates/swarm-addr-core/src/lib.rs

//! Chunk-level content addressing for the Swarm BMT chunking discipline.
//!
//! This crate owns the pieces that operate on a single ≤ `MAX_PAYLOAD`-byte
//! chunk: the span codec, the in-chunk Binary Merkle Tree (BMT), the chunk
//! address (`H(span ‖ bmt_root)`), and per-segment inclusion proofs within
//! one chunk's BMT. Splitting a larger payload into many chunks and chaining
//! their addresses into a file address lives one layer up, in
//! `swarm-addr-tree`.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub mod address;
pub mod bmt;
pub mod chunk;
pub mod error;
pub mod hash;
pub mod span;

pub use address::Address;
pub use bmt::root_from_proof;
pub use chunk::{Chunk, ChunkInclusionProof, ChunkOptions, SEGMENT_SIZE};
pub use error::{Error, Result};
pub use hash::{default_hasher, Hasher, HasherRef, Keccak256Hasher};
pub use span::{decode_span, encode_span, DEFAULT_SPAN_LENGTH, MAX_SAFE_VALUE};

/// A fixed 32-byte unit of BMT hashing (the "segment" of the data model).
pub type Segment = [u8; 32];

/// Default chunk payload capacity in bytes (Swarm's default).
pub const DEFAULT_MAX_PAYLOAD: usize = 4096;
