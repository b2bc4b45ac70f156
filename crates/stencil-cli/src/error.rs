//! Error type for the CLI.

use std::io;

use thiserror::Error;

use stencil::StencilError;

use crate::config::ConfigError;

/// Everything a CLI run can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An input file is not valid JSON of the expected shape.
    #[error("Invalid JSON in `{path}`: {err}")]
    Json {
        path: String,
        src: String,
        #[source]
        err: serde_json::Error,
    },

    #[error(transparent)]
    Stencil(#[from] StencilError),

    /// Expansion did not reproduce the original document.
    #[error("Expanded design differs from the original in {mismatches} place(s)")]
    Validation { mismatches: usize },
}

impl CliError {
    /// Create a JSON error that keeps the input text for diagnostics.
    pub fn new_json_error(
        path: impl Into<String>,
        src: impl Into<String>,
        err: serde_json::Error,
    ) -> Self {
        Self::Json {
            path: path.into(),
            src: src.into(),
            err,
        }
    }
}
