//! CLI definition using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use planocheck_types::OutputFormat;

#[derive(Parser)]
#[command(name = "planocheck")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Retail shelf compliance auditing against store planograms")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (stores, audits, images). Uses config value if not specified.
    #[arg(long, global = true, env = "PLANOCHECK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// External detector command. Without one, <image>.detections.json sidecars are read.
    #[arg(long, global = true, env = "PLANOCHECK_DETECTOR")]
    pub detector: Option<String>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage stores and their planograms
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },

    /// Audit a single shelf photo
    Audit {
        /// Store id
        store_id: u64,

        /// Path to shelf image
        image: PathBuf,
    },

    /// Audit every image in a folder against one store
    Batch {
        /// Store id
        store_id: u64,

        /// Folder containing shelf images
        folder: PathBuf,
    },

    /// Evaluate recorded detections against a planogram without saving anything
    Evaluate {
        /// Planogram file (json, toml, csv)
        #[arg(long, short = 'p')]
        planogram: PathBuf,

        /// Detections JSON file ({"detections": [...]} or a bare array)
        #[arg(long, short = 'd')]
        detections: PathBuf,
    },

    /// List past audits
    History {
        /// Only audits of this store
        #[arg(long, short = 's')]
        store: Option<u64>,
    },

    /// Show one audit in full
    Report {
        /// Audit id
        audit_id: u64,
    },

    /// Register the demo store if no store exists
    Seed,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set data directory
        #[arg(long)]
        set_data_dir: Option<PathBuf>,

        /// Set detector command
        #[arg(long)]
        set_detector: Option<String>,

        /// Remove detector command (use sidecar JSON)
        #[arg(long)]
        clear_detector: bool,

        /// Set minimum detection confidence (0.0-1.0)
        #[arg(long)]
        set_min_confidence: Option<f64>,

        /// Set low-confidence logging threshold (0.0-1.0)
        #[arg(long)]
        set_low_confidence: Option<f64>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,
    },
}

#[derive(Subcommand)]
pub enum StoreAction {
    /// Register a store
    Add {
        /// Store name
        #[arg(long)]
        name: String,

        /// Store location
        #[arg(long, default_value = "")]
        location: String,

        /// Planogram file (json, toml, csv). Omit for no expectation.
        #[arg(long, short = 'p')]
        planogram: Option<PathBuf>,
    },

    /// List stores
    List,

    /// Show one store and its planogram
    Show {
        /// Store id
        store_id: u64,
    },
}
