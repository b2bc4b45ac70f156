//! Stencil - lossless template compression for design-tool node trees.
//!
//! Repeated component instances are factored into one shared template per
//! component plus a small record per instance holding only what differs.
//! Regularly spaced instances additionally share a grid descriptor instead of
//! absolute coordinates. [`expand`] restores the original forest.

pub mod config;
pub mod grid;

mod encode;
mod error;
mod expand;
mod group;
mod size;
mod slot;
mod stats;
mod template;
mod validate;

pub use stencil_core::{color, compressed, geometry, node, paint, property, tree};
pub use stencil_core::{
    compressed::{CompressedDesign, DesignDocument, GlobalVars},
    node::DesignNode,
};

pub use error::StencilError;
pub use expand::expand;
pub use stats::CompressionStats;
pub use validate::{
    Mismatch, MismatchKind, ValidationMode, ValidationReport, validate_expansion,
    validate_expansion_with,
};

use std::{collections::HashSet, ptr};

use indexmap::IndexMap;
use log::{debug, info, trace};

use stencil_core::{
    compressed::{ComponentDefinition, CompressedInstance, GridLayout},
    geometry::LayoutBox,
};

use config::CompressionConfig;
use encode::Benefit;
use group::ComponentGroup;
use template::Alignment;

/// Entry point for compressing designs.
///
/// # Examples
///
/// ```
/// use stencil::{DesignCompressor, DesignNode, GlobalVars, expand, validate_expansion};
///
/// let nodes = vec![DesignNode::new("1:1", "Page", "FRAME")];
/// let compressor = DesignCompressor::default();
///
/// let design = compressor
///     .compress("Landing", &nodes, &GlobalVars::default())
///     .expect("Failed to compress");
///
/// assert!(validate_expansion(&nodes, &expand(&design)));
/// ```
#[derive(Debug, Default)]
pub struct DesignCompressor {
    config: CompressionConfig,
}

/// A templated group ready to be added to a design.
struct EncodedGroup {
    component: ComponentDefinition,
    instances: Vec<CompressedInstance>,
    grid: Option<GridLayout>,
}

impl DesignCompressor {
    /// Create a new compressor with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Grouping, benefit and grid detection settings
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Compress a node forest.
    ///
    /// Groups that cannot share a template, or whose compact form does not
    /// save enough, stay in `nodes` unchanged.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the design
    /// * `nodes` - Root nodes of the design
    /// * `global_vars` - Style table, copied through untouched
    ///
    /// # Errors
    ///
    /// Returns [`StencilError::Config`] for an out-of-range configuration and
    /// [`StencilError::Serialization`] if measuring encoded sizes fails.
    pub fn compress(
        &self,
        name: &str,
        nodes: &[DesignNode],
        global_vars: &GlobalVars,
    ) -> Result<CompressedDesign, StencilError> {
        self.config.validate()?;
        info!(
            name,
            roots = nodes.len(),
            depth = tree::depth(nodes);
            "Compressing design"
        );

        let groups = group::group_instances(nodes, self.config.nested_instances());

        let mut components = IndexMap::new();
        let mut instances = Vec::new();
        let mut grids = IndexMap::new();
        let mut compressed: HashSet<*const DesignNode> = HashSet::new();

        for group in &groups {
            if group.len() < self.config.min_group_size() {
                trace!(
                    component = group.component_id,
                    instances = group.len();
                    "Group too small to template"
                );
                continue;
            }
            let Some(encoded) = self.compress_group(group, grids.len())? else {
                continue;
            };

            compressed.extend(group.sites.iter().map(|site| ptr::from_ref(site.node)));
            if let Some(grid) = encoded.grid {
                grids.insert(grid.id.clone(), grid);
            }
            components.insert(encoded.component.id.clone(), encoded.component);
            instances.extend(encoded.instances);
        }

        let passthrough =
            tree::filter_forest(nodes, |node| !compressed.contains(&ptr::from_ref(node)));

        info!(
            components = components.len(),
            instances = instances.len(),
            passthrough_nodes = passthrough.len(),
            grids = grids.len();
            "Design compressed"
        );

        Ok(CompressedDesign {
            name: name.to_string(),
            components,
            instances,
            nodes: passthrough,
            grids,
            global_vars: global_vars.clone(),
        })
    }

    /// Compress a design document.
    ///
    /// # Errors
    ///
    /// See [`DesignCompressor::compress`].
    pub fn compress_document(
        &self,
        document: &DesignDocument,
    ) -> Result<CompressedDesign, StencilError> {
        self.compress(&document.name, &document.nodes, &document.global_vars)
    }

    /// Template one group; `None` keeps its instances literal.
    fn compress_group(
        &self,
        group: &ComponentGroup<'_>,
        grid_number: usize,
    ) -> Result<Option<EncodedGroup>, StencilError> {
        let nodes = group.nodes();
        let alignment = match Alignment::new(&nodes) {
            Ok(alignment) => alignment,
            Err(err) => {
                debug!(
                    component = group.component_id,
                    err:% = err;
                    "Instances differ structurally, keeping them literal"
                );
                return Ok(None);
            }
        };
        let Some(lead) = nodes.first() else {
            return Ok(None);
        };

        let instance_ids: Vec<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
        let mut drafts = template::draft(&alignment);
        let slots =
            slot::detect_slots(&alignment, &instance_ids, &mut drafts, self.config.scoped_ids());
        let component = ComponentDefinition {
            id: group.component_id.to_string(),
            name: lead.name.clone(),
            node_type: lead.node_type.clone(),
            template: template::assemble(&alignment, drafts),
            slot_ids: slots.keys().cloned().collect(),
            slots,
        };

        let grid = if self.config.grid().enabled() {
            let members: Vec<(&str, Option<LayoutBox>)> = nodes
                .iter()
                .map(|node| (node.id.as_str(), node.layout))
                .collect();
            grid::detect_grid(&format!("grid-{grid_number}"), &members, self.config.grid()).grid
        } else {
            None
        };

        let (instances, grid) = encode::encode_instances(
            &group.sites,
            &component,
            grid,
            self.config.override_policy(),
        );

        let benefit = Benefit::measure(&group.sites, &component, &instances, grid.as_ref())?;
        if !benefit.is_worth_it(self.config.min_benefit_ratio()) {
            debug!(
                component = group.component_id,
                literal_bytes = benefit.literal,
                compressed_bytes = benefit.compressed;
                "Compression benefit too small, keeping instances literal"
            );
            return Ok(None);
        }

        debug!(
            component = group.component_id,
            instances = instances.len(),
            slots = component.slots.len(),
            literal_bytes = benefit.literal,
            compressed_bytes = benefit.compressed;
            "Component templated"
        );

        Ok(Some(EncodedGroup {
            component,
            instances,
            grid,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::{
        color::Color,
        paint::{Effect, EffectKind, Offset, Paint},
    };

    fn shadow() -> Effect {
        Effect {
            kind: EffectKind::DropShadow,
            visible: true,
            radius: 8.0,
            color: Some(Color::new("rgba(0, 0, 0, 0.25)").unwrap()),
            offset: Some(Offset { x: 0.0, y: 4.0 }),
            spread: None,
        }
    }

    fn card(id: &str, title: &str) -> DesignNode {
        DesignNode::new(id, "Card", "INSTANCE")
            .with_component_id("card")
            .with_fills(vec![Paint::solid(Color::new("#FFFFFF").unwrap())])
            .with_corner_radius(12.0)
            .with_stroke_weight(1.0)
            .with_effects(vec![shadow()])
            .with_children(vec![
                DesignNode::new(format!("I{id};1:2"), "Title", "TEXT")
                    .with_text(title)
                    .with_text_style("heading"),
                DesignNode::new(format!("I{id};1:3"), "Body", "TEXT")
                    .with_text("Lorem ipsum dolor sit amet, consectetur adipiscing elit.")
                    .with_text_style("body"),
            ])
    }

    #[test]
    fn test_compress_templates_repeated_instances() {
        let nodes = vec![
            card("1", "First"),
            DesignNode::new("9", "Divider", "LINE"),
            card("2", "Second"),
            card("3", "Third"),
            card("4", "Fourth"),
            card("5", "Fifth"),
        ];

        let design = DesignCompressor::default()
            .compress("Cards", &nodes, &GlobalVars::default())
            .unwrap();

        assert_eq!(design.components.len(), 1);
        assert_eq!(design.instances.len(), 5);
        assert_eq!(design.nodes.len(), 1);
        assert_eq!(design.nodes[0].id, "9");
        assert_eq!(design.components["card"].slot_ids, ["s0"]);
    }

    #[test]
    fn test_structural_mismatch_keeps_nodes_literal() {
        let mut odd = card("2", "Second");
        if let Some(children) = odd.children.as_mut() {
            children.pop();
        }
        let nodes = vec![card("1", "First"), odd];

        let design = DesignCompressor::default()
            .compress("Cards", &nodes, &GlobalVars::default())
            .unwrap();

        assert!(design.components.is_empty());
        assert_eq!(design.nodes, nodes);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let compressor = DesignCompressor::new(
            CompressionConfig::default().with_min_benefit_ratio(2.0),
        );

        let result = compressor.compress("x", &[], &GlobalVars::default());
        assert!(matches!(result, Err(StencilError::Config(_))));
    }

    #[test]
    fn test_min_group_size_is_respected() {
        let nodes = vec![card("1", "A"), card("2", "B"), card("3", "C")];
        let compressor = DesignCompressor::new(CompressionConfig::default().with_min_group_size(4));

        let design = compressor
            .compress("Cards", &nodes, &GlobalVars::default())
            .unwrap();

        assert!(design.components.is_empty());
        assert_eq!(design.nodes.len(), 3);
    }
}
