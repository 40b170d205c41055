// crates/swarm-addr-tree/src/level.rs

//! One step of level construction: group a level's chunks into parents, and
//! the carrier-chunk promotion rule that keeps file addresses well-defined
//! for payload sizes that don't evenly fill the fanout.
//!
//! The level stack is a pure fold over a flat `Vec<Chunk>`, not a linked
//! graph: `next_level` takes a level and an optional carrier and returns the
//! next level and its (possibly different) carrier, keeping all per-level
//! state on the stack rather than threaded through mutable shared state.

use swarm_addr_core::{Chunk, ChunkOptions, Error, Result};

/// Group `chunks` into one parent chunk: payload is the concatenation of
/// child addresses, span is the sum of child spans.
fn group_into_parent(chunks: &[Chunk], opts: &ChunkOptions) -> Result<Chunk> {
    if chunks.is_empty() {
        return Err(Error::EmptyLevel);
    }
    let mut payload = Vec::with_capacity(chunks.len() * 32);
    let mut total_span: u64 = 0;
    for c in chunks {
        payload.extend_from_slice(c.address().as_bytes());
        total_span = total_span.saturating_add(c.span_value());
    }
    let mut parent_opts = opts.clone();
    parent_opts.starting_span_value = Some(total_span);
    Chunk::new(payload, parent_opts)
}

/// If `level` has more than one chunk and its length is congruent to 1 mod
/// `fanout`, the rightmost chunk cannot be paired with siblings; pop it off
/// and return it as the level's carrier.
pub(crate) fn pop_carrier(level: &mut Vec<Chunk>, fanout: usize) -> Option<Chunk> {
    if level.len() > 1 && level.len() % fanout == 1 {
        level.pop()
    } else {
        None
    }
}

/// Build the next level up from `level`, absorbing or propagating `carrier`
/// per the promotion rule (spec §4.3):
///
/// 1. Group `level` into consecutive runs of up to `fanout` chunks, each run
///    becoming one parent chunk in `next_level`.
/// 2. If an input `carrier` exists: if `next_level`'s length isn't a
///    multiple of `fanout`, append the carrier as-is and the carrier is
///    absorbed (`None` propagates); otherwise keep propagating it unchanged.
/// 3. If there was no input carrier, apply the carrier-pop rule to
///    `next_level` itself.
///
/// # Errors
/// [`Error::EmptyLevel`] if `level` is empty.
pub(crate) fn next_level(
    level: Vec<Chunk>,
    carrier: Option<Chunk>,
    opts: &ChunkOptions,
) -> Result<(Vec<Chunk>, Option<Chunk>)> {
    if level.is_empty() {
        return Err(Error::EmptyLevel);
    }
    let fanout = opts.fanout();
    let mut next: Vec<Chunk> = Vec::with_capacity(level.len().div_ceil(fanout));
    for group in level.chunks(fanout) {
        next.push(group_into_parent(group, opts)?);
    }

    let next_carrier = match carrier {
        Some(c) => {
            if next.len() % fanout != 0 {
                next.push(c);
                None
            } else {
                Some(c)
            }
        }
        None => pop_carrier(&mut next, fanout),
    };

    Ok((next, next_carrier))
}

/// Chunk count at every level (leaves first, root last) for a tree built
/// from `total_leaves` leaves, counting only — no chunks are built.
///
/// This mirrors [`next_level`]'s carrier bookkeeping exactly, so the
/// sequence it returns is `tree[i].len()` for the tree [`crate::file::build_tree`]
/// would actually produce. It's what lets [`crate::proof::file_address_from_inclusion_proof`]
/// replicate [`crate::proof::file_inclusion_proof_bottom_up`]'s level-skipping
/// decisions without ever holding the tree itself.
pub(crate) fn level_chunk_counts(total_leaves: usize, fanout: usize) -> Vec<usize> {
    let mut count = total_leaves.max(1);
    let mut carrier = count > 1 && count % fanout == 1;
    if carrier {
        count -= 1;
    }
    let mut counts = vec![count];
    while !(count == 1 && !carrier) {
        let groups = count.div_ceil(fanout);
        let (next_count, next_carrier) = if carrier {
            if groups % fanout == 0 {
                (groups, true)
            } else {
                (groups + 1, false)
            }
        } else if groups > 1 && groups % fanout == 1 {
            (groups - 1, true)
        } else {
            (groups, false)
        };
        count = next_count;
        carrier = next_carrier;
        counts.push(count);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_addr_core::ChunkOptions;

    fn leaf(n: u8) -> Chunk {
        Chunk::new(vec![n], ChunkOptions::default()).unwrap()
    }

    #[test]
    fn group_into_parent_sums_spans() {
        let chunks = vec![leaf(1), leaf(2), leaf(3)];
        let parent = group_into_parent(&chunks, &ChunkOptions::default()).unwrap();
        assert_eq!(parent.span_value(), 3); // each leaf has span 1
        assert_eq!(parent.payload().len(), 3 * 32);
    }

    #[test]
    fn pop_carrier_only_on_congruent_lengths() {
        let opts = ChunkOptions::default();
        let fanout = opts.fanout();

        let mut exact: Vec<Chunk> = (0..fanout as u8).map(leaf).collect();
        assert!(pop_carrier(&mut exact, fanout).is_none());

        let mut one_over: Vec<Chunk> = (0..=fanout as u8).map(leaf).collect();
        let popped = pop_carrier(&mut one_over, fanout);
        assert!(popped.is_some());
        assert_eq!(one_over.len(), fanout);
    }

    #[test]
    fn single_chunk_level_has_no_carrier() {
        let mut level = vec![leaf(1)];
        assert!(pop_carrier(&mut level, ChunkOptions::default().fanout()).is_none());
    }

    #[test]
    fn level_chunk_counts_matches_no_carrier_case() {
        let counts = level_chunk_counts(200, 128);
        // 200 leaves -> ceil(200/128) = 2 level-1 chunks, then 1 root.
        assert_eq!(counts, vec![200, 2, 1]);
    }

    #[test]
    fn level_chunk_counts_tracks_deep_carrier_promotion() {
        // 16386 leaves: no carrier at level 0 (16386 % 128 == 2), one pops
        // out while folding into level 1 (129 % 128 == 1) and is absorbed
        // two levels up, once the grouping above it also bottoms out at 1.
        let counts = level_chunk_counts(16386, 128);
        assert_eq!(counts, vec![16386, 128, 2, 1]);
    }
}
