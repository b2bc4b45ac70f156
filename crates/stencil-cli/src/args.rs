//! Command-line argument definitions for the Stencil CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects the operation; the global flags
//! control configuration file selection and logging verbosity.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Stencil design compressor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

/// Operations offered by the CLI
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compress a design document into its template form
    Compress {
        /// Path to the design document (JSON)
        input: String,

        /// Output path; standard output when omitted
        #[arg(short, long)]
        output: Option<String>,

        /// Name of the compressed design; defaults to the document name
        #[arg(long)]
        name: Option<String>,
    },

    /// Expand a compressed design back into a design document
    Expand {
        /// Path to the compressed design (JSON)
        input: String,

        /// Output path; standard output when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Check that a compressed design expands back to the original document
    Validate {
        /// Path to the original design document (JSON)
        original: String,

        /// Path to the compressed design (JSON)
        compressed: String,

        /// Compare every visual property, not just the tree shape
        #[arg(long)]
        full: bool,
    },
}
