//! DataMirror CLI Library
//!
//! Command definitions and handlers for the `mirror` binary.
//!
//! Load commands (`full-load`, `incremental`) drive the sync engine
//! in-process against the simulated adapters; checkpoints land in the
//! shared checkpoint directory, so an interrupted load resumes on the
//! next invocation. Status commands (`status`, `jobs`) query a running
//! `mirror-server` over HTTP, since job records live in the server
//! process.

use clap::{Parser, Subcommand};

pub mod commands;

/// DataMirror sync engine CLI
#[derive(Debug, Parser)]
#[command(name = "mirror", version, about = "Checkpointed full/incremental data loads")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a full table load against the simulated adapters
    FullLoad {
        /// Source table to extract
        #[arg(long)]
        table: String,

        /// Job id; generated when omitted. Reuse an id to resume from
        /// its checkpoint.
        #[arg(long)]
        job_id: Option<String>,

        /// Records per chunk (default from MIRROR_CHUNK_SIZE or 10000)
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Ask the target to compress batch payloads
        #[arg(long)]
        compress: bool,

        /// Override the simulated source row count
        #[arg(long)]
        rows: Option<u64>,
    },

    /// Run an incremental load against the simulated adapters
    Incremental {
        /// Source table to pull changes from
        #[arg(long)]
        table: String,

        /// Monotonic key column driving the high-water mark
        #[arg(long)]
        key_column: String,

        /// Target table, when different from the source table
        #[arg(long)]
        target_table: Option<String>,

        /// Records per batch (default from MIRROR_BATCH_SIZE or 1000)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Batch cap for this invocation
        #[arg(long)]
        max_batches: Option<usize>,

        /// Job id; generated when omitted
        #[arg(long)]
        job_id: Option<String>,

        /// Override the simulated source row count
        #[arg(long)]
        rows: Option<u64>,
    },

    /// Fetch the status of a job from a running mirror-server
    Status {
        /// Job id to look up
        job_id: String,
    },

    /// List all job statuses from a running mirror-server
    Jobs,
}
