// crates/swarm-addr-core/src/span.rs

//! Span codec: the little-endian length prefix attached to every chunk.
//!
//! A span is semantically the number of payload bytes covered by the
//! subtree rooted at a chunk. It is additive: an intermediate chunk's span
//! is the sum of its children's spans. The 8-byte little-endian encoding is
//! a Swarm wire-level invariant and must be reproduced bit-exactly.
//!
//! Rust's type system makes the "negative value" failure mode from the
//! language-neutral spec structurally unreachable (`u64` has no negative
//! values), so only the safe-integer upper bound is checked here.

use crate::error::{Error, Result};

/// Default span encoding width in bytes.
pub const DEFAULT_SPAN_LENGTH: usize = 8;

/// Largest value a span may encode: 2^53 - 1, matching the reference
/// implementation's safe-integer cap rather than the full `u64` range.
pub const MAX_SAFE_VALUE: u64 = (1u64 << 53) - 1;

/// Encode `value` as a little-endian byte vector of `length` bytes.
///
/// # Errors
/// Returns [`Error::InvalidSpanValue`] if `value` exceeds [`MAX_SAFE_VALUE`],
/// or [`Error::InvalidSpanLength`] if `length` is less than 4 bytes.
pub fn encode_span(value: u64, length: usize) -> Result<Vec<u8>> {
    if value > MAX_SAFE_VALUE {
        return Err(Error::InvalidSpanValue {
            value,
            max: MAX_SAFE_VALUE,
        });
    }
    if length < 4 {
        return Err(Error::InvalidSpanLength(length));
    }
    let mut buf = vec![0u8; length];
    let le = value.to_le_bytes();
    let n = length.min(le.len());
    buf[..n].copy_from_slice(&le[..n]);
    Ok(buf)
}

/// Decode a little-endian span encoding back into its value.
///
/// Only the first 8 bytes are significant; any bytes beyond that (a wider
/// `span_length`) must be zero in a well-formed span and are ignored here.
///
/// # Errors
/// Returns [`Error::InvalidSpanValue`] if the decoded integer exceeds
/// [`MAX_SAFE_VALUE`].
pub fn decode_span(span: &[u8]) -> Result<u64> {
    let mut le = [0u8; 8];
    let n = span.len().min(8);
    le[..n].copy_from_slice(&span[..n]);
    let value = u64::from_le_bytes(le);
    if value > MAX_SAFE_VALUE {
        return Err(Error::InvalidSpanValue {
            value,
            max: MAX_SAFE_VALUE,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_decode_roundtrip_default_width() {
        let span = encode_span(3, DEFAULT_SPAN_LENGTH).unwrap();
        assert_eq!(span, vec![0x03, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(decode_span(&span).unwrap(), 3);
    }

    #[test]
    fn rejects_value_beyond_safe_integer_cap() {
        assert!(matches!(
            encode_span(MAX_SAFE_VALUE + 1, DEFAULT_SPAN_LENGTH),
            Err(Error::InvalidSpanValue { .. })
        ));
        let over = (MAX_SAFE_VALUE + 1).to_le_bytes();
        assert!(matches!(
            decode_span(&over),
            Err(Error::InvalidSpanValue { .. })
        ));
    }

    #[test]
    fn rejects_short_span_length() {
        assert!(matches!(
            encode_span(0, 2),
            Err(Error::InvalidSpanLength(2))
        ));
    }

    proptest! {
        #[test]
        fn roundtrip_holds_for_all_safe_values(v in 0u64..=MAX_SAFE_VALUE) {
            let span = encode_span(v, DEFAULT_SPAN_LENGTH).unwrap();
            prop_assert_eq!(decode_span(&span).unwrap(), v);
        }
    }
}
