// crates/swarm-addr-tree/src/lib.rs

//! Multi-level chunking over `swarm-addr-core` chunks.
//!
//! Built entirely on top of `swarm_addr_core::Chunk`/`ChunkOptions`, the way
//! a commitment layer is built on top of a per-item hash: this crate never
//! touches hashing or span encoding directly, it only groups chunks into
//! higher-level chunks (handling the carrier-chunk promotion rule) and
//! produces/verifies file-level inclusion proofs across that level stack.

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

pub mod file;
pub mod level;
pub mod position;
pub mod proof;

pub use file::{file_address, make_chunked_file, ChunkedFile};
pub use position::{position_of_segment, PositionInTree};
pub use proof::{file_address_from_inclusion_proof, file_inclusion_proof_bottom_up};

// Re-exported so downstream crates can build `ChunkOptions`/inspect
// `ChunkInclusionProof` without an explicit `swarm-addr-core` dependency.
pub use swarm_addr_core::{
    Address, Chunk, ChunkInclusionProof, ChunkOptions, Error, Result, Segment,
};
