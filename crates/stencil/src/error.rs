//! Error types for Stencil operations.
//!
//! Recoverable conditions (orphan instances, unknown slots, incompatible
//! groups, rejected grids) are handled where they occur and only logged.
//! [`StencilError`] covers what a caller has to deal with.

use thiserror::Error;

/// The main error type for Stencil operations.
#[derive(Debug, Error)]
pub enum StencilError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
