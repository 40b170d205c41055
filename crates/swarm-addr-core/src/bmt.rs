// crates/swarm-addr-core/src/bmt.rs

//! The in-chunk Binary Merkle Tree: construction and stand-alone verification.
//!
//! [`build_levels`] is the forward direction (data → every level of the
//! tree, leaves first, root last); [`root_from_proof`] is the inverse
//! (a proven segment + its sisters → the reconstructed root), used both by
//! callers who only hold a proof and by the file-level proof machinery in
//! `swarm-addr-tree`.

use crate::hash::Hasher;
use crate::Segment;

/// Build every level of a chunk's BMT over an already-padded `data` buffer.
///
/// `data.len()` must be a power-of-two multiple of 32; the returned vector
/// has `log2(data.len() / 32) + 1` levels, the last containing a single
/// segment: the BMT root.
#[must_use]
pub fn build_levels(data: &[u8], hasher: &dyn Hasher) -> Vec<Vec<Segment>> {
    let mut current: Vec<Segment> = data
        .chunks_exact(32)
        .map(|c| {
            let mut seg = [0u8; 32];
            seg.copy_from_slice(c);
            seg
        })
        .collect();

    let mut levels = vec![current.clone()];
    while current.len() > 1 {
        current = current
            .chunks_exact(2)
            .map(|pair| hasher.hash(&[&pair[0], &pair[1]]))
            .collect();
        levels.push(current.clone());
    }
    levels
}

/// Sister index for `index` within a level: the other half of the 64-byte
/// pair that was hashed to produce the next level's entry at `index >> 1`.
#[must_use]
pub const fn sister_index(index: usize) -> usize {
    if index % 2 == 0 {
        index + 1
    } else {
        index - 1
    }
}

/// Reconstruct a BMT root from a proven segment, its index, and the ordered
/// sister segments collected walking from the leaves to the root.
///
/// This returns the **BMT root**, not a chunk address; callers combine it
/// with the chunk's span themselves (see [`crate::chunk::Chunk::address`]).
#[must_use]
pub fn root_from_proof(
    sister_segments: &[Segment],
    prove_segment: Segment,
    mut prove_index: usize,
    hasher: &dyn Hasher,
) -> Segment {
    let mut h = prove_segment;
    for sister in sister_segments {
        h = if prove_index % 2 == 0 {
            hasher.hash(&[&h, sister])
        } else {
            hasher.hash(&[sister, &h])
        };
        prove_index >>= 1;
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Keccak256Hasher;

    #[test]
    fn levels_end_in_single_root() {
        let data = vec![0u8; 4096];
        let levels = build_levels(&data, &Keccak256Hasher);
        assert_eq!(levels.len(), 8); // log2(4096/32) + 1 == 7 + 1
        assert_eq!(levels.last().unwrap().len(), 1);
        assert_eq!(levels[0].len(), 128);
    }

    #[test]
    fn sister_index_toggles_parity() {
        assert_eq!(sister_index(0), 1);
        assert_eq!(sister_index(1), 0);
        assert_eq!(sister_index(126), 127);
        assert_eq!(sister_index(127), 126);
    }
}
