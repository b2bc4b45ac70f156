//! Encoded size measurement.
//!
//! Node trees are measured one node at a time through their borrowed field
//! views, so the depth of a design never reaches serde's recursion. Fields
//! holding a tree are serialized as a `()` placeholder and measured separately.

use std::io;

use indexmap::IndexMap;
use serde::Serialize;

use stencil_core::{
    compressed::{
        ComponentDefinition, CompressedDesign, CompressedInstance, GlobalVars, GridLayout,
        SlotDefinition, SlotId, TemplateNode,
    },
    node::DesignNode,
};

use crate::error::StencilError;

/// `,"children":` written between a node's fields and its child list.
const CHILDREN_KEY: usize = ",\"children\":".len();
/// `null`, the encoding of a `()` placeholder.
const PLACEHOLDER: usize = "null".len();

/// Writer that discards its input and counts the bytes.
#[derive(Debug, Default)]
struct ByteCounter {
    count: usize,
}

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.count += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Returns the length of the compact JSON encoding of `value`.
///
/// Only for values without nested trees; see [`tree_len`].
pub(crate) fn encoded_len<T: Serialize + ?Sized>(value: &T) -> Result<usize, StencilError> {
    let mut counter = ByteCounter::default();
    serde_json::to_writer(&mut counter, value)?;
    Ok(counter.count)
}

/// A node type serialized as its own fields followed by an optional
/// `children` list of the same type.
pub(crate) trait Tree: Sized {
    fn fields_len(&self) -> Result<usize, StencilError>;

    fn child_nodes(&self) -> Option<&[Self]>;
}

impl Tree for DesignNode {
    fn fields_len(&self) -> Result<usize, StencilError> {
        encoded_len(&self.fields())
    }

    fn child_nodes(&self) -> Option<&[Self]> {
        self.children.as_deref()
    }
}

impl Tree for TemplateNode {
    fn fields_len(&self) -> Result<usize, StencilError> {
        encoded_len(&self.fields())
    }

    fn child_nodes(&self) -> Option<&[Self]> {
        self.children.as_deref()
    }
}

/// Brackets and commas of a JSON array or object with `len` entries.
fn list_overhead(len: usize) -> usize {
    2 + len.saturating_sub(1)
}

/// Compact JSON length of a whole tree.
pub(crate) fn tree_len<N: Tree>(root: &N) -> Result<usize, StencilError> {
    let mut total = 0;
    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        total += node.fields_len()?;
        if let Some(children) = node.child_nodes() {
            total += CHILDREN_KEY + list_overhead(children.len());
            pending.extend(children);
        }
    }
    Ok(total)
}

/// Compact JSON length of an array of trees.
pub(crate) fn forest_len<N: Tree>(roots: &[N]) -> Result<usize, StencilError> {
    let mut total = list_overhead(roots.len());
    for root in roots {
        total += tree_len(root)?;
    }
    Ok(total)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ComponentShell<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    node_type: &'a str,
    template: (),
    slot_ids: &'a [SlotId],
    slots: &'a IndexMap<SlotId, SlotDefinition>,
}

/// Compact JSON length of a component definition.
pub(crate) fn component_len(component: &ComponentDefinition) -> Result<usize, StencilError> {
    let shell = encoded_len(&ComponentShell {
        id: &component.id,
        name: &component.name,
        node_type: &component.node_type,
        template: (),
        slot_ids: &component.slot_ids,
        slots: &component.slots,
    })?;
    Ok(shell - PLACEHOLDER + tree_len(&component.template)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DesignShell<'a> {
    name: &'a str,
    components: (),
    instances: &'a [CompressedInstance],
    nodes: (),
    #[serde(skip_serializing_if = "Option::is_none")]
    grids: Option<&'a IndexMap<String, GridLayout>>,
    global_vars: &'a GlobalVars,
}

/// Compact JSON length of a compressed design.
pub(crate) fn design_len(design: &CompressedDesign) -> Result<usize, StencilError> {
    let shell = encoded_len(&DesignShell {
        name: &design.name,
        components: (),
        instances: &design.instances,
        nodes: (),
        grids: (!design.grids.is_empty()).then_some(&design.grids),
        global_vars: &design.global_vars,
    })?;

    let mut components = list_overhead(design.components.len());
    for (id, component) in &design.components {
        components += encoded_len(id)? + 1 + component_len(component)?;
    }

    Ok(shell - 2 * PLACEHOLDER + components + forest_len(&design.nodes)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentShell<'a> {
    name: &'a str,
    nodes: (),
    global_vars: &'a GlobalVars,
}

/// Compact JSON length of a `DesignDocument` with these parts.
pub(crate) fn document_len(
    name: &str,
    nodes: &[DesignNode],
    global_vars: &GlobalVars,
) -> Result<usize, StencilError> {
    let shell = encoded_len(&DocumentShell {
        name,
        nodes: (),
        global_vars,
    })?;
    Ok(shell - PLACEHOLDER + forest_len(nodes)?)
}
