// crates/swarm-addr-core/src/chunk.rs

//! The addressable unit: ≤ `max_payload_size` bytes, an additive span, and a
//! lazily-computed BMT/address/inclusion-proof surface.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::bmt::{build_levels, sister_index};
use crate::error::{Error, Result};
use crate::hash::{default_hasher, HasherRef};
use crate::span::{decode_span, encode_span, DEFAULT_SPAN_LENGTH, MAX_SAFE_VALUE};
use crate::{Segment, DEFAULT_MAX_PAYLOAD};

/// Size in bytes of one BMT leaf segment.
pub const SEGMENT_SIZE: usize = 32;

/// Construction-time configuration for a [`Chunk`] (and, transitively, for
/// every chunk a `swarm-addr-tree` builder derives from it).
///
/// This is the value-level stand-in for the reference implementation's
/// type-level `max_payload_size`/`span_length` parameters: a runtime struct
/// carried through builders, validated once at construction rather than
/// enforced by the type system.
#[derive(Clone)]
pub struct ChunkOptions {
    /// Maximum chunk payload size in bytes. Must be a power-of-two multiple
    /// of [`SEGMENT_SIZE`]. Default [`DEFAULT_MAX_PAYLOAD`].
    pub max_payload_size: usize,
    /// Width in bytes of the encoded span. Must be at least 4. Default 8.
    pub span_length: usize,
    /// Overrides the span value recorded at construction instead of
    /// defaulting to the payload length; used internally when building
    /// parent chunks so span aggregates the covered payload size.
    pub starting_span_value: Option<u64>,
    /// The 32-byte hash capability used for every BMT/address computation.
    pub hasher: HasherRef,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            span_length: DEFAULT_SPAN_LENGTH,
            starting_span_value: None,
            hasher: default_hasher(),
        }
    }
}

impl ChunkOptions {
    /// Number of children packed into one intermediate chunk
    /// (`max_payload_size / SEGMENT_SIZE`).
    #[must_use]
    pub const fn fanout(&self) -> usize {
        self.max_payload_size / SEGMENT_SIZE
    }

    /// `log2(fanout)`: number of sister segments in a per-chunk proof, and
    /// the shift width used walking between tree levels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn log2_fanout(&self) -> u32 {
        self.fanout().trailing_zeros()
    }

    /// Validate the power-of-two and minimum-width constraints.
    ///
    /// # Errors
    /// [`Error::InvalidMaxPayloadSize`] / [`Error::InvalidSpanLength`].
    pub fn validate(&self) -> Result<()> {
        if self.max_payload_size < SEGMENT_SIZE || !self.max_payload_size.is_power_of_two() {
            return Err(Error::InvalidMaxPayloadSize(self.max_payload_size));
        }
        if self.span_length < 4 {
            return Err(Error::InvalidSpanLength(self.span_length));
        }
        Ok(())
    }
}

/// A chunk: ≤ `max_payload_size` bytes of payload plus an additive span.
///
/// Immutable once constructed; `data`, `bmt`, and `address` are memoised
/// behind a one-shot [`OnceLock`] rather than computed eagerly, so repeated
/// reads (e.g. during proof generation) don't redo the hashing work. Cloning
/// a `Chunk` copies whatever has already been memoised rather than aliasing
/// it.
pub struct Chunk {
    payload: Vec<u8>,
    span: u64,
    opts: ChunkOptions,
    bmt_cache: OnceLock<Vec<Vec<Segment>>>,
    address_cache: OnceLock<Address>,
}

/// The sister path inside one chunk's BMT, together with that chunk's span,
/// sufficient to recompute the chunk's BMT root (and, combined with the
/// span, its address) from one proven segment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkInclusionProof {
    /// The chunk's encoded span.
    pub span: Vec<u8>,
    /// Sister segments from the proven leaf up to (excluding) the root.
    pub sister_segments: Vec<Segment>,
}

impl ChunkInclusionProof {
    /// Decode [`ChunkInclusionProof::span`] back into its integer value.
    ///
    /// # Errors
    /// [`Error::InvalidSpanValue`] if the encoded span is malformed.
    pub fn span_value(&self) -> Result<u64> {
        decode_span(&self.span)
    }
}

impl Chunk {
    /// Construct a chunk from ≤ `opts.max_payload_size` bytes of payload.
    ///
    /// The span defaults to `payload.len()` unless
    /// `opts.starting_span_value` overrides it (used when building parent
    /// chunks so span aggregates the covered subtree).
    ///
    /// # Errors
    /// [`Error::InvalidPayloadLength`] if the payload is too large,
    /// [`Error::InvalidSpanValue`] if the span would exceed the safe-integer
    /// cap, or a `ChunkOptions` validation error.
    pub fn new(payload: impl Into<Vec<u8>>, opts: ChunkOptions) -> Result<Self> {
        opts.validate()?;
        let payload = payload.into();
        if payload.len() > opts.max_payload_size {
            return Err(Error::InvalidPayloadLength {
                len: payload.len(),
                max: opts.max_payload_size,
            });
        }
        let span = opts
            .starting_span_value
            .unwrap_or(payload.len() as u64);
        if span > MAX_SAFE_VALUE {
            return Err(Error::InvalidSpanValue {
                value: span,
                max: MAX_SAFE_VALUE,
            });
        }
        Ok(Self {
            payload,
            span,
            opts,
            bmt_cache: OnceLock::new(),
            address_cache: OnceLock::new(),
        })
    }

    /// The raw (unpadded) payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The span value (bytes covered by this chunk's subtree).
    #[must_use]
    pub const fn span_value(&self) -> u64 {
        self.span
    }

    /// The span, little-endian encoded to `opts.span_length` bytes.
    ///
    /// # Errors
    /// Never fails in practice: the span was already validated at
    /// construction, but encoding is re-derived so it stays in sync with
    /// `opts.span_length`.
    pub fn span_bytes(&self) -> Result<Vec<u8>> {
        encode_span(self.span, self.opts.span_length)
    }

    /// This chunk's configuration.
    #[must_use]
    pub const fn options(&self) -> &ChunkOptions {
        &self.opts
    }

    /// The payload right-padded with zero bytes to `max_payload_size`: the
    /// buffer the BMT is computed over.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.opts.max_payload_size];
        buf[..self.payload.len()].copy_from_slice(&self.payload);
        buf
    }

    /// The complete in-chunk Merkle tree, leaves first, root last.
    #[must_use]
    pub fn bmt(&self) -> &Vec<Vec<Segment>> {
        self.bmt_cache
            .get_or_init(|| build_levels(&self.data(), self.opts.hasher.as_ref()))
    }

    /// The BMT root (the last, single-segment level of [`Chunk::bmt`]).
    #[must_use]
    pub fn bmt_root(&self) -> Segment {
        #[allow(clippy::unwrap_used)]
        let root_level = self.bmt().last().unwrap();
        root_level[0]
    }

    /// The chunk address: `H(span ‖ bmt_root)`.
    #[must_use]
    pub fn address(&self) -> Address {
        *self.address_cache.get_or_init(|| {
            #[allow(clippy::unwrap_used)]
            let span_bytes = self.span_bytes().unwrap();
            let root = self.bmt_root();
            Address(self.opts.hasher.hash(&[&span_bytes, &root]))
        })
    }

    /// The inclusion proof for segment `segment_index` inside this chunk's
    /// BMT: the sister segments walking from that leaf up to the root.
    ///
    /// The bound is against `payload.len()`, not `max_payload_size`:
    /// indices into the zero-padding region are not provable.
    ///
    /// # Errors
    /// [`Error::SegmentIndexOutOfRange`] if `segment_index * 32` falls
    /// outside the actual payload.
    pub fn inclusion_proof(&self, segment_index: usize) -> Result<ChunkInclusionProof> {
        let start = segment_index
            .checked_mul(SEGMENT_SIZE)
            .ok_or(Error::SegmentIndexOutOfRange {
                index: segment_index,
                payload_len: self.payload.len(),
            })?;
        if start >= self.payload.len() {
            return Err(Error::SegmentIndexOutOfRange {
                index: segment_index,
                payload_len: self.payload.len(),
            });
        }

        let levels = self.bmt();
        let mut index = segment_index;
        let mut sister_segments = Vec::with_capacity(levels.len() - 1);
        for level in &levels[..levels.len() - 1] {
            sister_segments.push(level[sister_index(index)]);
            index >>= 1;
        }
        Ok(ChunkInclusionProof {
            span: self.span_bytes()?,
            sister_segments,
        })
    }
}

impl Clone for Chunk {
    fn clone(&self) -> Self {
        let cloned = Self {
            payload: self.payload.clone(),
            span: self.span,
            opts: self.opts.clone(),
            bmt_cache: OnceLock::new(),
            address_cache: OnceLock::new(),
        };
        if let Some(levels) = self.bmt_cache.get() {
            let _ = cloned.bmt_cache.set(levels.clone());
        }
        if let Some(addr) = self.address_cache.get() {
            let _ = cloned.address_cache.set(*addr);
        }
        cloned
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("payload_len", &self.payload.len())
            .field("span", &self.span)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_span_equals_payload_length() {
        let chunk = Chunk::new(vec![1, 2, 3], ChunkOptions::default()).unwrap();
        assert_eq!(chunk.span_value(), 3);
        assert_eq!(chunk.span_bytes().unwrap(), vec![3, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn rejects_oversized_payload() {
        let opts = ChunkOptions::default();
        let payload = vec![0u8; opts.max_payload_size + 1];
        assert!(matches!(
            Chunk::new(payload, opts),
            Err(Error::InvalidPayloadLength { .. })
        ));
    }

    #[test]
    fn data_is_zero_padded_to_max_payload() {
        let chunk = Chunk::new(vec![1, 2, 3], ChunkOptions::default()).unwrap();
        let data = chunk.data();
        assert_eq!(data.len(), DEFAULT_MAX_PAYLOAD);
        assert_eq!(&data[..3], &[1, 2, 3]);
        assert!(data[3..].iter().all(|&b| b == 0));
    }

    // Spec §8 S1: payload [0x01, 0x02, 0x03].
    #[test]
    fn s1_three_byte_payload_address() {
        let chunk = Chunk::new(vec![0x01, 0x02, 0x03], ChunkOptions::default()).unwrap();
        assert_eq!(chunk.bmt().len(), 8);
        assert_eq!(
            chunk.address().to_hex(),
            "ca6357a08e317d15ec560fef34e4c45f8f19f01c372aa70f1da72bfa7f1a4338"
        );
    }

    // Spec §8 S2: payload "hello world", proof for segment 0 has 7 sisters,
    // the first one is all-zero (every other leaf in the padding region).
    #[test]
    fn s2_hello_world_proof_shape() {
        let chunk = Chunk::new(b"hello world".to_vec(), ChunkOptions::default()).unwrap();
        let proof = chunk.inclusion_proof(0).unwrap();
        assert_eq!(proof.sister_segments.len(), 7);
        assert_eq!(proof.sister_segments[0], [0u8; 32]);
    }

    #[test]
    fn inclusion_proof_out_of_range_rejected() {
        let chunk = Chunk::new(b"hello world".to_vec(), ChunkOptions::default()).unwrap();
        // "hello world" is 11 bytes: only segment 0 is provable.
        assert!(matches!(
            chunk.inclusion_proof(1),
            Err(Error::SegmentIndexOutOfRange { .. })
        ));
    }

    #[test]
    fn empty_payload_yields_a_chunk() {
        let chunk = Chunk::new(Vec::new(), ChunkOptions::default()).unwrap();
        assert_eq!(chunk.span_value(), 0);
        assert_eq!(chunk.span_bytes().unwrap(), vec![0u8; 8]);
    }

    #[test]
    fn clone_preserves_memoised_address() {
        let chunk = Chunk::new(vec![9, 9, 9], ChunkOptions::default()).unwrap();
        let addr = chunk.address();
        let cloned = chunk.clone();
        assert!(cloned.address_cache.get().is_some());
        assert_eq!(cloned.address(), addr);
    }
}
