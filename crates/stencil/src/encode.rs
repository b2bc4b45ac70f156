//! Instance encoding.
//!
//! Turns every instance of a templated group into a [`CompressedInstance`]
//! and decides whether the group is worth compressing at all.

use indexmap::IndexMap;

use stencil_core::{
    compressed::{ComponentDefinition, CompressedInstance, GridLayout, SlotDefinition, SlotId},
    property::SlotValue,
};

use crate::{config::OverridePolicy, error::StencilError, group::InstanceSite, size};

/// Builds the override map of one instance.
pub(crate) fn overrides_for(
    instance_id: &str,
    slots: &IndexMap<SlotId, SlotDefinition>,
    policy: OverridePolicy,
) -> IndexMap<SlotId, Option<SlotValue>> {
    slots
        .iter()
        .filter_map(|(slot_id, slot)| {
            let value = match policy {
                OverridePolicy::Changed => slot.variations.get(instance_id)?.clone(),
                OverridePolicy::All => slot.value_for(instance_id).cloned(),
            };
            Some((slot_id.clone(), value))
        })
        .collect()
}

/// Encodes the instances of a group.
///
/// An instance is placed on `grid` only when the grid reproduces its layout
/// box exactly; everyone else keeps explicit layout data. The grid is
/// narrowed to its placed members and dropped when none remain.
pub(crate) fn encode_instances(
    sites: &[InstanceSite<'_>],
    component: &ComponentDefinition,
    grid: Option<GridLayout>,
    policy: OverridePolicy,
) -> (Vec<CompressedInstance>, Option<GridLayout>) {
    let mut placed: IndexMap<String, _> = IndexMap::new();

    let instances = sites
        .iter()
        .map(|site| {
            let node = site.node;
            let mut instance = CompressedInstance {
                id: node.id.clone(),
                component_id: component.id.clone(),
                name: node.name.clone(),
                visible: node.visible,
                overrides: overrides_for(&node.id, &component.slots, policy),
                layout_data: node.layout,
                grid_id: None,
                position: None,
                parent_id: site.parent_id.map(str::to_string),
                index: site.parent_id.map(|_| site.index),
            };

            if let (Some(grid), Some(layout)) = (&grid, node.layout) {
                if let Some(position) = grid.positions.get(&node.id).copied() {
                    if grid.resolve(position) == Some(layout) {
                        instance.layout_data = None;
                        instance.grid_id = Some(grid.id.clone());
                        instance.position = Some(position);
                        placed.insert(node.id.clone(), position);
                    }
                }
            }
            instance
        })
        .collect();

    let grid = grid
        .map(|grid| GridLayout {
            positions: placed,
            ..grid
        })
        .filter(|grid| !grid.positions.is_empty());

    (instances, grid)
}

/// Encoded sizes of a group in its literal and compact forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Benefit {
    pub literal: usize,
    pub compressed: usize,
}

impl Benefit {
    /// Measures both encodings of a group.
    pub fn measure(
        sites: &[InstanceSite<'_>],
        component: &ComponentDefinition,
        instances: &[CompressedInstance],
        grid: Option<&GridLayout>,
    ) -> Result<Self, StencilError> {
        let mut literal = 0;
        for site in sites {
            literal += size::tree_len(site.node)?;
        }

        let mut compressed = size::component_len(component)?;
        for instance in instances {
            compressed += size::encoded_len(instance)?;
        }
        if let Some(grid) = grid {
            compressed += size::encoded_len(grid)?;
        }

        Ok(Self {
            literal,
            compressed,
        })
    }

    /// Checks that the compact form saves at least `min_ratio` of the literal size.
    pub fn is_worth_it(self, min_ratio: f64) -> bool {
        self.compressed < self.literal
            && self.compressed as f64 <= self.literal as f64 * (1.0 - min_ratio)
    }
}
