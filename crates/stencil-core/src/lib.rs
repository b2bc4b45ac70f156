//! Stencil Core Types and Definitions
//!
//! This crate provides the data model shared by the Stencil design
//! compression engine and its callers. It includes:
//!
//! - **Nodes**: The uniform design node tree ([`node::DesignNode`])
//! - **Properties**: Addressable properties and tagged values ([`property`] module)
//! - **Paints**: Fills, strokes and effects ([`paint`] module)
//! - **Colors**: CSS colors that keep their spelling ([`color::Color`])
//! - **Geometry**: Layout boxes and grid cells ([`geometry`] module)
//! - **Compressed form**: Templates, slots, instances and grids ([`compressed`] module)
//! - **Trees**: Stack-safe traversal helpers ([`tree`] module)

pub mod color;
pub mod compressed;
pub mod geometry;
pub mod node;
pub mod paint;
pub mod property;
pub mod tree;
