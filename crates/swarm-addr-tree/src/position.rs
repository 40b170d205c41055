// crates/swarm-addr-tree/src/position.rs

//! Pure mapping from a (segment index, payload length) pair to where that
//! segment terminates in the chunk tree, accounting for carrier promotion
//! analytically rather than by simulating the build.

use swarm_addr_core::SEGMENT_SIZE;

use crate::level::level_chunk_counts;

/// Where a payload segment terminates in the chunk tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionInTree {
    /// Tree level (0 = leaves) at which the segment's chunk lives.
    pub level: u32,
    /// Index of that chunk within its level.
    pub chunk_index: usize,
}

/// Resolve `segment_index` (into a payload of `total_span` bytes, chunked
/// at `max_payload_size`) to the level and chunk index it terminates in.
///
/// A segment's own leaf chunk starts out at level 0, but a carrier chunk is
/// placed into a higher level's array unchanged (see [`crate::level::next_level`]):
/// the chunk holding a promoted leaf's segments can therefore be found at any
/// level, not just 0. This walks the same chunk-count sequence
/// [`level_chunk_counts`] produces (mirroring [`crate::level::next_level`]'s
/// carrier bookkeeping exactly, rather than re-deriving a byte-range window
/// that can desync from it) until it lands on a level whose chunk count
/// actually has room for the candidate index.
#[must_use]
pub fn position_of_segment(
    segment_index: usize,
    total_span: u64,
    max_payload_size: usize,
) -> PositionInTree {
    let fanout = max_payload_size / SEGMENT_SIZE;
    let log2_fanout = fanout.trailing_zeros();

    let total_leaves = if total_span == 0 {
        1
    } else {
        ((total_span - 1) / max_payload_size as u64 + 1) as usize
    };
    let counts = level_chunk_counts(total_leaves, fanout);

    let mut idx = segment_index;
    let mut level = 0usize;
    loop {
        let candidate = idx / fanout;
        match counts.get(level) {
            Some(&level_len) if candidate < level_len => {
                return PositionInTree {
                    level: level as u32,
                    chunk_index: candidate,
                };
            }
            Some(_) => {
                idx >>= log2_fanout;
                level += 1;
            }
            None => {
                return PositionInTree {
                    level: (counts.len() - 1) as u32,
                    chunk_index: 0,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_addr_core::DEFAULT_MAX_PAYLOAD;

    #[test]
    fn dense_body_segment_stays_at_level_zero() {
        let pos = position_of_segment(5, 4096 * 200, DEFAULT_MAX_PAYLOAD);
        assert_eq!(pos.level, 0);
    }

    #[test]
    fn single_chunk_payload_resolves_to_its_only_chunk() {
        let pos = position_of_segment(0, 3, DEFAULT_MAX_PAYLOAD);
        assert_eq!(pos, PositionInTree { level: 0, chunk_index: 0 });
    }

    // Spec §8 S4: a payload of 129 leaves (the last one partial, not a
    // multiple of max_payload_size) pops exactly one carrier at level 0
    // (129 % 128 == 1); it lands unchanged at tree[1][1] once level 1's own
    // grouping (1 parent chunk from the 128 remaining leaves, plus the
    // carrier) leaves room for it.
    #[test]
    fn s4_carrier_promoted_segment_resolves_to_tree_one_one() {
        let fanout = DEFAULT_MAX_PAYLOAD / 32;
        let total_span = 128 * DEFAULT_MAX_PAYLOAD as u64 + 17;
        let last_segment_index = 128 * fanout + (fanout - 1);

        let pos = position_of_segment(last_segment_index, total_span, DEFAULT_MAX_PAYLOAD);
        assert_eq!(pos, PositionInTree { level: 1, chunk_index: 1 });
    }

    // Regression test: a total_span that is an exact multiple of
    // max_payload_size (129*4096, no trailing partial leaf) used to make the
    // saturated-byte-window derivation degenerate to the whole span, so the
    // carrier-window test could never trigger and this case resolved to a
    // nonexistent level-0 chunk index. It must resolve the same as the
    // partial-last-leaf case above.
    #[test]
    fn carrier_promotion_also_resolved_for_exact_multiple_span() {
        let fanout = DEFAULT_MAX_PAYLOAD / 32;
        let total_span = 129 * DEFAULT_MAX_PAYLOAD as u64;
        assert_eq!(total_span % DEFAULT_MAX_PAYLOAD as u64, 0);

        let last_segment_index = 128 * fanout + (fanout - 1);
        let pos = position_of_segment(last_segment_index, total_span, DEFAULT_MAX_PAYLOAD);
        assert_eq!(pos, PositionInTree { level: 1, chunk_index: 1 });
    }
}
