// crates/swarm-addr-tree/src/file.rs

//! The chunked file builder: splits a payload into leaf chunks and folds
//! the level stack up to a single root chunk whose address is the file
//! address.

use std::sync::OnceLock;

use swarm_addr_core::{Address, Chunk, ChunkOptions, Result};

use crate::level::{next_level, pop_carrier};

/// Partition `payload` into contiguous `max_payload_size`-byte windows
/// (the last may be shorter, including empty for an empty payload, which
/// yields exactly one empty leaf chunk).
fn split_leaves(payload: &[u8], opts: &ChunkOptions) -> Result<Vec<Chunk>> {
    if payload.is_empty() {
        return Ok(vec![Chunk::new(Vec::new(), opts.clone())?]);
    }
    payload
        .chunks(opts.max_payload_size)
        .map(|window| Chunk::new(window.to_vec(), opts.clone()))
        .collect()
}

/// Fold `leaves` up to the root, recording every intermediate level
/// (leaves first, the final level holding exactly one chunk: the root).
fn build_tree(mut leaves: Vec<Chunk>, opts: &ChunkOptions) -> Result<Vec<Vec<Chunk>>> {
    let fanout = opts.fanout();
    let mut carrier = pop_carrier(&mut leaves, fanout);
    let mut level = leaves;
    let mut levels = Vec::new();

    loop {
        levels.push(level.clone());
        if level.len() == 1 && carrier.is_none() {
            break;
        }
        let (next, next_carrier) = next_level(level, carrier, opts)?;
        level = next;
        carrier = next_carrier;
    }
    Ok(levels)
}

/// A payload split into leaf chunks and folded into a single root chunk.
///
/// Everything beyond the leaves (the level stack, the root chunk, the file
/// address/span) is computed lazily and memoised behind a one-shot
/// [`OnceLock`], the same discipline `swarm-addr-core::Chunk` uses for its
/// own `data`/`bmt`/`address`.
pub struct ChunkedFile {
    leaves: Vec<Chunk>,
    opts: ChunkOptions,
    tree: OnceLock<Vec<Vec<Chunk>>>,
}

impl ChunkedFile {
    /// The leaf-level chunks (level 0, before any carrier has been popped).
    #[must_use]
    pub fn leaf_chunks(&self) -> &[Chunk] {
        &self.leaves
    }

    /// This file's chunking configuration.
    #[must_use]
    pub const fn options(&self) -> &ChunkOptions {
        &self.opts
    }

    /// Every level of the chunk tree, leaves first, root last.
    ///
    /// # Panics
    /// Never: `leaves` was already validated at construction, so folding it
    /// to a root cannot hit [`swarm_addr_core::Error::EmptyLevel`].
    #[must_use]
    #[allow(clippy::missing_panics_doc)]
    pub fn bmt_tree(&self) -> &Vec<Vec<Chunk>> {
        self.tree.get_or_init(|| {
            #[allow(clippy::expect_used)]
            build_tree(self.leaves.clone(), &self.opts)
                .expect("tree construction is infallible for leaves validated at construction")
        })
    }

    /// The single surviving chunk at the top of [`ChunkedFile::bmt_tree`];
    /// its address is the file address.
    #[must_use]
    pub fn root_chunk(&self) -> &Chunk {
        #[allow(clippy::unwrap_used)]
        let root_level = self.bmt_tree().last().unwrap();
        &root_level[0]
    }

    /// The file address (the root chunk's address).
    #[must_use]
    pub fn address(&self) -> Address {
        self.root_chunk().address()
    }

    /// The total payload length covered by this file (the root chunk's
    /// span).
    #[must_use]
    pub fn span(&self) -> u64 {
        self.root_chunk().span_value()
    }
}

/// Split `payload` into leaf chunks and build the full chunk tree.
///
/// # Errors
/// Propagates any [`swarm_addr_core::Error`] from leaf construction (e.g.
/// an invalid `opts`).
pub fn make_chunked_file(payload: &[u8], opts: ChunkOptions) -> Result<ChunkedFile> {
    opts.validate()?;
    let leaves = split_leaves(payload, &opts)?;
    Ok(ChunkedFile {
        leaves,
        opts,
        tree: OnceLock::new(),
    })
}

/// Convenience whole-payload hash: build the chunk tree and return just the
/// file address, for callers that don't need leaves or proofs.
///
/// # Errors
/// See [`make_chunked_file`].
pub fn file_address(payload: &[u8], opts: ChunkOptions) -> Result<Address> {
    Ok(make_chunked_file(payload, opts)?.address())
}
