// crates/swarm-addr-core/src/hash.rs

//! Pluggable 32-byte hash capability.
//!
//! The BMT and chunk-address computations never call a hash function
//! directly; they go through a `&dyn Hasher` so an embedder can swap in a
//! different hash (or a deterministic test stub) without touching the tree
//! algorithm, per the capability-injection note in the design docs.

use std::sync::Arc;

use sha3::{Digest, Keccak256};

/// A 32-byte hash function over a variadic list of byte slices.
///
/// Implementations must be pure and deterministic: the same `parts` always
/// produce the same output.
pub trait Hasher: Send + Sync {
    /// Hash the concatenation of `parts` and return the 32-byte digest.
    fn hash(&self, parts: &[&[u8]]) -> [u8; 32];
}

/// Shared, cheaply-cloneable handle to a [`Hasher`].
pub type HasherRef = Arc<dyn Hasher>;

/// The default hash: Keccak-256 (the Swarm wire-level primitive), not the
/// NIST SHA3-256 variant.
#[derive(Clone, Copy, Debug, Default)]
pub struct Keccak256Hasher;

impl Hasher for Keccak256Hasher {
    fn hash(&self, parts: &[&[u8]]) -> [u8; 32] {
        let mut hasher = Keccak256::new();
        for part in parts {
            hasher.update(part);
        }
        hasher.finalize().into()
    }
}

/// Construct the default hasher handle (Keccak-256).
#[must_use]
pub fn default_hasher() -> HasherRef {
    Arc::new(Keccak256Hasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_matches_known_vector() {
        // Keccak-256("") per the Swarm/Ethereum reference vectors.
        let h = Keccak256Hasher.hash(&[b""]);
        assert_eq!(
            hex::encode(h),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a47"
        );
    }

    #[test]
    fn hash_is_order_sensitive() {
        let a = Keccak256Hasher.hash(&[b"a", b"b"]);
        let b = Keccak256Hasher.hash(&[b"b", b"a"]);
        assert_ne!(a, b);
    }
}
