// crates/swarm-addr-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swarm_addr_core::{ChunkInclusionProof, ChunkOptions};
use swarm_addr_tree::{
    file_address_from_inclusion_proof, file_inclusion_proof_bottom_up, make_chunked_file,
};

#[derive(Parser, Debug)]
#[command(
    name = "swarm-addr",
    about = "Content-addressing, chunking, and inclusion proofs",
    long_about = "Compute content addresses, split files into chunks, and produce/verify bottom-up inclusion proofs over the chunk tree.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compute the content address of a file.
    Address {
        /// File to address.
        #[arg(long)]
        input: PathBuf,

        /// Maximum chunk payload size in bytes (power of two, at least 32).
        #[arg(long, default_value_t = swarm_addr_core::DEFAULT_MAX_PAYLOAD)]
        max_payload_size: usize,
    },

    /// Produce a bottom-up inclusion proof for one payload segment.
    Proof {
        /// File the proof is computed over.
        #[arg(long)]
        input: PathBuf,

        /// Global index of the 32-byte segment to prove.
        #[arg(long)]
        segment_index: usize,

        /// Maximum chunk payload size in bytes (power of two, at least 32).
        #[arg(long, default_value_t = swarm_addr_core::DEFAULT_MAX_PAYLOAD)]
        max_payload_size: usize,

        /// Output path for the proof document (JSON).
        #[arg(long, default_value = "proof.json")]
        out: PathBuf,
    },

    /// Verify a proof document reconstructs the expected file address.
    Verify {
        /// Proof document produced by `proof`.
        #[arg(long)]
        proof: PathBuf,

        /// Expected file address, as 64 hex characters.
        #[arg(long)]
        address: String,
    },
}

/// The proof subcommand's on-disk format: everything
/// [`file_address_from_inclusion_proof`] needs, plus the segment bytes
/// themselves so `verify` is self-contained.
#[derive(Serialize, Deserialize)]
struct ProofDocument {
    segment_index: usize,
    total_span: u64,
    max_payload_size: usize,
    segment_hex: String,
    entries: Vec<ChunkInclusionProof>,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Address {
            input,
            max_payload_size,
        } => address(&input, max_payload_size),
        Cmd::Proof {
            input,
            segment_index,
            max_payload_size,
            out,
        } => proof(&input, segment_index, max_payload_size, &out),
        Cmd::Verify { proof, address } => verify(&proof, &address),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn opts_for(max_payload_size: usize) -> ChunkOptions {
    ChunkOptions {
        max_payload_size,
        ..ChunkOptions::default()
    }
}

fn address(input: &Path, max_payload_size: usize) -> Result<()> {
    info!(input = %input.display(), max_payload_size, "addressing file");
    let payload = fs::read(input).with_context(|| format!("reading {}", input.display()))?;

    let file = make_chunked_file(&payload, opts_for(max_payload_size))
        .context("splitting payload into chunks")?;

    println!("{}", file.address().to_hex());
    Ok(())
}

fn proof(input: &Path, segment_index: usize, max_payload_size: usize, out: &Path) -> Result<()> {
    info!(input = %input.display(), segment_index, max_payload_size, "generating inclusion proof");
    let payload = fs::read(input).with_context(|| format!("reading {}", input.display()))?;

    let file = make_chunked_file(&payload, opts_for(max_payload_size))
        .context("splitting payload into chunks")?;

    let fanout = file.options().fanout();
    let leaf = file
        .leaf_chunks()
        .get(segment_index / fanout)
        .context("segment index falls outside this file's leaves")?;
    let local = (segment_index % fanout) * swarm_addr_core::SEGMENT_SIZE;
    let data = leaf.data();
    let segment = data
        .get(local..local + swarm_addr_core::SEGMENT_SIZE)
        .context("segment index falls outside this leaf's payload")?;

    let entries = file_inclusion_proof_bottom_up(&file, segment_index)
        .context("building inclusion proof")?;

    let doc = ProofDocument {
        segment_index,
        total_span: file.span(),
        max_payload_size,
        segment_hex: hex::encode(segment),
        entries,
    };

    if let Some(dir) = out.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(&doc).context("serializing proof document")?;
    fs::write(out, json).with_context(|| format!("writing {}", out.display()))?;

    println!(
        "Wrote inclusion proof for segment {segment_index} ({} entries) → {}",
        doc.entries.len(),
        out.display()
    );
    Ok(())
}

fn verify(proof_path: &Path, expected_address: &str) -> Result<()> {
    info!(proof = %proof_path.display(), "verifying inclusion proof");
    let json = fs::read_to_string(proof_path)
        .with_context(|| format!("reading {}", proof_path.display()))?;
    let doc: ProofDocument = serde_json::from_str(&json).context("parsing proof document")?;

    let mut segment = [0u8; 32];
    hex::decode_to_slice(&doc.segment_hex, &mut segment).context("decoding segment_hex")?;

    let opts = opts_for(doc.max_payload_size);
    let address = file_address_from_inclusion_proof(
        &doc.entries,
        segment,
        doc.segment_index,
        doc.total_span,
        &opts,
    )
    .context("reconstructing address from proof")?;

    let expected = expected_address.trim().to_ascii_lowercase();
    if address.to_hex() == expected {
        println!("OK: proof reconstructs address {}", address.to_hex());
        Ok(())
    } else {
        anyhow::bail!(
            "proof reconstructs {} but expected {}",
            address.to_hex(),
            expected
        );
    }
}
