//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// odata-harvest CLI
#[derive(Parser, Debug)]
#[command(name = "odata-harvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (YAML); environment variables override its values
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe the service and resolve the partition key
    Check,

    /// Resolve the partition key and list its distinct values
    Partitions,

    /// Run the full extraction and write the CSV output
    Run {
        /// Output CSV path (overrides the configured destination)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
