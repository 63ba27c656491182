// /////////////////////////////////////////////////////////////////////////////
// SlideTap Core
// Licensed under the Apache License, Version 2.0.
// /////////////////////////////////////////////////////////////////////////////

//! Command-line surface, grounded on the teacher bootstrap's `cli/parser.rs`
//! (one `clap::Parser` struct, a `Subcommand` enum, global flags above the
//! subcommand). SlideTap's stores are process-local and in-memory (spec's
//! concurrency model), so each subcommand is self-contained rather than
//! operating on state left behind by a previous invocation - `run` seeds,
//! processes, and exports a whole project in one pass.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "slidetap")]
#[command(about = concat!("SlideTap curation engine v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit structured JSON log lines instead of plain text.
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Layered configuration file (defaults -> this file -> SLIDETAP_* env).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Loads a root schema definition and prints a summary of what it
    /// defines, without touching any stores.
    ValidateSchema {
        /// Path to a JSON-encoded `RootSchema`.
        #[arg(long)]
        schema: PathBuf,
    },

    /// Runs a whole project end-to-end: creates the project and its
    /// default batch, seeds one image item per file under `slides_dir`,
    /// searches, pre-processes, processes, validates, and exports.
    Run {
        /// Path to a JSON-encoded `RootSchema`.
        #[arg(long)]
        schema: PathBuf,

        /// Directory of source slide files to seed as image items.
        #[arg(long)]
        slides_dir: PathBuf,

        /// Root directory the storage adapter writes stored images,
        /// thumbnails, and the export outbox under.
        #[arg(long)]
        storage_root: PathBuf,

        #[arg(long, default_value = "demo-project")]
        project_name: String,

        #[arg(long, default_value = "demo-dataset")]
        dataset_name: String,
    },

    /// Prints the Prometheus text-format exposition of a freshly
    /// initialized metrics registry, to smoke-test the ambient stack.
    Metrics,
}
