//! Expansion of a compressed design back into a node forest.
//!
//! Each instance is rebuilt from its component template. Template trees are
//! flattened into an arena first and assembled bottom-up, so expansion never
//! recurses.

use indexmap::IndexMap;
use log::{info, warn};

use stencil_core::{
    compressed::{
        ComponentDefinition, CompressedDesign, CompressedInstance, GridLayout, Placement,
        TemplateNode, TemplateValue,
    },
    node::DesignNode,
    property::SlotValue,
};

/// Reconstructs the full node forest of a compressed design.
///
/// Top-level instances come first, in instance order, followed by the
/// passthrough nodes. Instances anchored to a passthrough container are
/// inserted back into that container at their recorded index. Instances whose
/// component is missing contribute nothing.
///
/// # Examples
///
/// ```
/// # use stencil::{expand, CompressedDesign};
/// let design = CompressedDesign::default();
/// assert!(expand(&design).is_empty());
/// ```
pub fn expand(design: &CompressedDesign) -> Vec<DesignNode> {
    info!(
        instances = design.instances.len(),
        nodes = design.nodes.len();
        "Expanding design"
    );

    let mut forest = Vec::with_capacity(design.instances.len() + design.nodes.len());
    let mut anchored: IndexMap<&str, Vec<(usize, DesignNode)>> = IndexMap::new();

    for instance in &design.instances {
        let Some(component) = design.components.get(&instance.component_id) else {
            warn!(
                instance = instance.id,
                component = instance.component_id;
                "Skipping instance of unknown component"
            );
            continue;
        };

        let node = instantiate(component, instance, &design.grids);
        match &instance.parent_id {
            Some(parent_id) => anchored
                .entry(parent_id.as_str())
                .or_default()
                .push((instance.index.unwrap_or(usize::MAX), node)),
            None => forest.push(node),
        }
    }

    forest.extend(design.nodes.iter().cloned());

    if !anchored.is_empty() {
        splice_anchored(&mut forest, anchored);
    }

    info!(nodes = forest.len(); "Design expanded");
    forest
}

/// Inserts anchored instances into their parent containers.
fn splice_anchored(forest: &mut Vec<DesignNode>, mut anchored: IndexMap<&str, Vec<(usize, DesignNode)>>) {
    let mut pending: Vec<&mut DesignNode> = forest.iter_mut().collect();
    while let Some(node) = pending.pop() {
        if anchored.is_empty() {
            break;
        }
        if let Some(mut inserts) = anchored.shift_remove(node.id.as_str()) {
            inserts.sort_by_key(|(index, _)| *index);
            let children = node.children.get_or_insert_with(Vec::new);
            for (index, child) in inserts {
                let at = index.min(children.len());
                children.insert(at, child);
            }
        }
        if let Some(children) = node.children.as_mut() {
            pending.extend(children.iter_mut().filter(|child| !child.is_instance()));
        }
    }

    for (parent_id, inserts) in anchored {
        warn!(parent = parent_id, count = inserts.len(); "Anchor parent not found, appending at top level");
        forest.extend(inserts.into_iter().map(|(_, node)| node));
    }
}

/// Resolves one template value for an instance.
fn resolve_value(
    value: &TemplateValue,
    component: &ComponentDefinition,
    instance: &CompressedInstance,
) -> Option<SlotValue> {
    match value {
        TemplateValue::Literal(literal) => Some(literal.clone()),
        TemplateValue::Scoped(scoped) => Some(SlotValue::Reference(scoped.resolve(&instance.id))),
        TemplateValue::Slot(slot_ref) => {
            let Some(slot) = component.slots.get(&slot_ref.slot) else {
                warn!(
                    component = component.id,
                    slot = slot_ref.slot;
                    "Template references an unknown slot"
                );
                return None;
            };
            match instance.overrides.get(&slot_ref.slot) {
                Some(value) => value.clone(),
                None => slot.default_value.clone(),
            }
        }
    }
}

fn apply_properties(
    node: &mut DesignNode,
    template: &TemplateNode,
    component: &ComponentDefinition,
    instance: &CompressedInstance,
) {
    for (key, value) in &template.properties {
        let resolved = resolve_value(value, component, instance);
        if let Err(err) = node.set_property(*key, resolved) {
            warn!(
                instance = instance.id,
                component = component.id,
                err:% = err;
                "Dropping unusable template value"
            );
        }
    }
}

/// Builds the node tree of one instance.
pub(crate) fn instantiate(
    component: &ComponentDefinition,
    instance: &CompressedInstance,
    grids: &IndexMap<String, GridLayout>,
) -> DesignNode {
    for slot_id in instance.overrides.keys() {
        if !component.slots.contains_key(slot_id) {
            warn!(instance = instance.id, slot = slot_id; "Ignoring override of unknown slot");
        }
    }

    // Breadth-first arena; children always follow their parent.
    let mut arena: Vec<(&TemplateNode, Option<Vec<usize>>)> = vec![(&component.template, None)];
    let mut cursor = 0;
    while cursor < arena.len() {
        let template = arena[cursor].0;
        if let Some(children) = &template.children {
            let start = arena.len();
            arena.extend(children.iter().map(|child| (child, None)));
            arena[cursor].1 = Some((start..arena.len()).collect());
        }
        cursor += 1;
    }

    let mut built: Vec<Option<DesignNode>> = arena
        .iter()
        .map(|(template, _)| {
            let mut node = DesignNode::new(String::new(), String::new(), template.node_type.clone());
            apply_properties(&mut node, template, component, instance);
            Some(node)
        })
        .collect();

    for index in (0..arena.len()).rev() {
        if let Some(child_indices) = &arena[index].1 {
            let children: Vec<DesignNode> = child_indices
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            if let Some(node) = built[index].as_mut() {
                node.children = Some(children);
            }
        }
    }

    let mut root = built
        .first_mut()
        .and_then(Option::take)
        .unwrap_or_else(|| DesignNode::new(String::new(), String::new(), component.node_type.clone()));

    root.id = instance.id.clone();
    root.name = instance.name.clone();
    root.visible = instance.visible;
    root.component_id = Some(instance.component_id.clone());
    root.layout = match instance.placement() {
        Placement::Absolute(layout) => Some(layout),
        Placement::Grid { grid_id, position } => {
            let layout = grids.get(grid_id).and_then(|grid| grid.resolve(position));
            if layout.is_none() {
                warn!(instance = instance.id, grid = grid_id; "Grid cannot place instance");
            }
            layout
        }
        Placement::Unplaced => None,
    };

    root
}
