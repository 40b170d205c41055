// crates/swarm-addr-core/src/error.rs

//! Error kinds surfaced by chunk construction, span codec, and proof generation.
//!
//! The core performs no recovery: every failure is returned to the caller at
//! the boundary of the operation that detected it, and operations are pure,
//! so a failure leaves no state behind.

use thiserror::Error;

/// Failure modes for the chunk/BMT/span primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Payload exceeds `max_payload_size` for a single chunk.
    #[error("payload of {len} bytes exceeds the chunk payload limit of {max} bytes")]
    InvalidPayloadLength {
        /// Length of the offending payload.
        len: usize,
        /// Configured `max_payload_size`.
        max: usize,
    },

    /// Span value is negative (structurally impossible for `u64`) or exceeds
    /// the safe-integer cap (2^53 - 1).
    #[error("span value {value} exceeds the safe-integer cap of {max}")]
    InvalidSpanValue {
        /// The rejected value.
        value: u64,
        /// The safe-integer cap.
        max: u64,
    },

    /// Requested a proof (or a position) for a segment beyond the payload
    /// actually covered by a chunk or file.
    #[error("segment index {index} is out of range for a payload of {payload_len} bytes")]
    SegmentIndexOutOfRange {
        /// The requested segment index.
        index: usize,
        /// The payload length (bytes) the index was checked against.
        payload_len: usize,
    },

    /// Internal invariant violation: level construction was invoked with no
    /// chunks to group. Indicates a bug in the caller, not bad user input.
    #[error("level construction invoked with no chunks")]
    EmptyLevel,

    /// `max_payload_size` must be a power-of-two multiple of the segment
    /// size (32 bytes).
    #[error("max_payload_size {0} must be a power-of-two multiple of the 32-byte segment size")]
    InvalidMaxPayloadSize(usize),

    /// `span_length` must be at least 4 bytes.
    #[error("span_length {0} must be at least 4 bytes")]
    InvalidSpanLength(usize),
}

/// Convenience alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, Error>;
