//! Slot detection.
//!
//! Compares every templated property across the aligned instances of a group
//! and decides, position by position, whether the drafted literal stands or
//! the property becomes a slot.

use indexmap::IndexMap;
use log::trace;

use stencil_core::{
    compressed::{NodePath, ScopedId, SlotDefinition, SlotId, TemplateValue},
    property::{PropertyKey, SlotValue},
};

use crate::template::{Alignment, DraftNode, templated_keys};

/// Classifies the properties of an aligned group, rewriting `drafts` in place.
///
/// Slot ids are `s0`, `s1`, ... in preorder of the template and
/// [`PropertyKey::ALL`] order within a node. `instance_ids` holds the id of
/// each instance in group order.
///
/// Returns the slot definitions in allocation order.
pub(crate) fn detect_slots(
    alignment: &Alignment<'_>,
    instance_ids: &[&str],
    drafts: &mut [DraftNode],
    scoped_ids: bool,
) -> IndexMap<SlotId, SlotDefinition> {
    let mut slots = IndexMap::new();
    let positions = alignment.positions();

    for index in alignment.preorder() {
        let position = &positions[index];
        let properties = &mut drafts[index].properties;

        for key in templated_keys(position.is_root()) {
            if scoped_ids && key == PropertyKey::Id && !position.is_root() {
                let ids = position.nodes.iter().map(|node| node.id.as_str());
                if let Some(suffix) = common_scoped_suffix(ids, instance_ids) {
                    properties.insert(key, TemplateValue::scoped(suffix));
                    continue;
                }
            }

            let values: Vec<Option<SlotValue>> =
                position.nodes.iter().map(|node| node.property(key)).collect();
            let default_value = values[0].clone();
            if values.iter().all(|value| *value == default_value) {
                match default_value {
                    Some(value) => {
                        properties.insert(key, TemplateValue::Literal(value));
                    }
                    None => {
                        properties.shift_remove(&key);
                    }
                }
                continue;
            }

            let slot_id = format!("s{}", slots.len());
            let node_path = NodePath::new(alignment.path(index), key);
            let variations: IndexMap<String, Option<SlotValue>> = values
                .iter()
                .zip(instance_ids)
                .filter(|(value, _)| **value != default_value)
                .map(|(value, instance_id)| (instance_id.to_string(), value.clone()))
                .collect();

            trace!(
                slot = slot_id,
                path = node_path.to_string(),
                variations = variations.len();
                "Allocated slot"
            );

            properties.insert(key, TemplateValue::slot(slot_id.clone()));
            slots.insert(
                slot_id,
                SlotDefinition {
                    node_path,
                    value_type: key.value_type(),
                    default_value,
                    variations,
                    instance_count: instance_ids.len(),
                },
            );
        }
    }

    slots
}

/// Returns the shared suffix when every id is `I<instanceId>;<suffix>` for its
/// own instance.
fn common_scoped_suffix<'a>(
    mut ids: impl Iterator<Item = &'a str>,
    instance_ids: &[&str],
) -> Option<&'a str> {
    let mut instance_ids = instance_ids.iter();
    let suffix = ScopedId::suffix_of(ids.next()?, instance_ids.next()?)?;
    for (id, instance_id) in ids.zip(instance_ids) {
        if ScopedId::suffix_of(id, instance_id)? != suffix {
            return None;
        }
    }
    Some(suffix)
}
