//! Compression statistics.

use serde::Serialize;

use stencil_core::{
    compressed::{CompressedDesign, GlobalVars},
    node::DesignNode,
};

use crate::{error::StencilError, size};

/// Size and content summary of one compression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionStats {
    /// Compact JSON size of the uncompressed document.
    pub original_bytes: usize,
    /// Compact JSON size of the compressed design.
    pub compressed_bytes: usize,
    pub components: usize,
    pub instances: usize,
    pub passthrough_nodes: usize,
    pub slots: usize,
    pub grids: usize,
}

impl CompressionStats {
    /// Measures a compressed design against the document it came from.
    ///
    /// # Errors
    ///
    /// Returns [`StencilError::Serialization`] if either side fails to encode.
    pub fn measure(
        original: &[DesignNode],
        global_vars: &GlobalVars,
        compressed: &CompressedDesign,
    ) -> Result<Self, StencilError> {
        Ok(Self {
            original_bytes: size::document_len(&compressed.name, original, global_vars)?,
            compressed_bytes: size::design_len(compressed)?,
            components: compressed.components.len(),
            instances: compressed.instances.len(),
            passthrough_nodes: compressed.nodes.len(),
            slots: compressed
                .components
                .values()
                .map(|component| component.slots.len())
                .sum(),
            grids: compressed.grids.len(),
        })
    }

    /// Compressed size as a fraction of the original size.
    pub fn ratio(&self) -> f64 {
        if self.original_bytes == 0 {
            return 1.0;
        }
        self.compressed_bytes as f64 / self.original_bytes as f64
    }

    /// Fraction of the original size saved; negative when output grew.
    pub fn savings(&self) -> f64 {
        1.0 - self.ratio()
    }
}
