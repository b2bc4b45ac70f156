//! Template building.
//!
//! All instances of a group are walked in lockstep. Every tree position is
//! recorded in an arena of [`AlignedPosition`]s holding the node each instance
//! has there. Children are appended after their parent, so a reverse sweep of
//! the arena always sees children before parents; that sweep assembles the
//! final [`TemplateNode`] tree without recursion.

use indexmap::IndexMap;
use thiserror::Error;

use stencil_core::{
    compressed::{TemplateNode, TemplateValue},
    node::DesignNode,
    property::PropertyKey,
};

/// Root properties stored on each compressed instance instead of the template.
pub(crate) const INSTANCE_KEYS: [PropertyKey; 5] = [
    PropertyKey::Id,
    PropertyKey::Name,
    PropertyKey::Visible,
    PropertyKey::Layout,
    PropertyKey::ComponentId,
];

/// Returns the properties a template position can carry.
pub(crate) fn templated_keys(is_root: bool) -> impl Iterator<Item = PropertyKey> {
    PropertyKey::ALL
        .into_iter()
        .filter(move |key| !is_root || !INSTANCE_KEYS.contains(key))
}

/// Reason a group of instances cannot share one template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum StructuralMismatch {
    #[error("node type differs at {path:?}: `{expected}` vs `{found}`")]
    Type {
        path: Vec<usize>,
        expected: String,
        found: String,
    },

    #[error("child count differs at {path:?}: {expected} vs {found}")]
    ChildCount {
        path: Vec<usize>,
        expected: usize,
        found: usize,
    },

    #[error("child list missing on some instances at {path:?}")]
    ChildList { path: Vec<usize> },
}

/// One tree position, seen across every instance of the group.
#[derive(Debug)]
pub(crate) struct AlignedPosition<'a> {
    /// Arena index of the parent position; `None` for the root.
    pub parent: Option<usize>,
    /// Index among the parent's children.
    pub child_index: usize,
    /// The node at this position, one per instance in group order.
    pub nodes: Vec<&'a DesignNode>,
    /// Arena indices of the child positions.
    pub children: Option<Vec<usize>>,
}

impl AlignedPosition<'_> {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn node_type(&self) -> &str {
        self.nodes.first().map_or("", |node| node.node_type.as_str())
    }
}

/// Position arena for a structurally compatible group.
#[derive(Debug)]
pub(crate) struct Alignment<'a> {
    positions: Vec<AlignedPosition<'a>>,
}

impl<'a> Alignment<'a> {
    /// Walks `instances` in lockstep.
    ///
    /// # Errors
    ///
    /// Returns the first [`StructuralMismatch`] found: a differing node type,
    /// child count, or presence of a child list.
    pub fn new(instances: &[&'a DesignNode]) -> Result<Self, StructuralMismatch> {
        let mut positions: Vec<AlignedPosition<'a>> = Vec::new();
        let Some(lead) = instances.first() else {
            return Ok(Self { positions });
        };
        if let Some(other) = first_other_type(instances, lead) {
            return Err(StructuralMismatch::Type {
                path: Vec::new(),
                expected: lead.node_type.clone(),
                found: other.to_string(),
            });
        }
        positions.push(AlignedPosition {
            parent: None,
            child_index: 0,
            nodes: instances.to_vec(),
            children: None,
        });

        let mut cursor = 0;
        while cursor < positions.len() {
            let nodes = positions[cursor].nodes.clone();
            let lead = nodes[0];

            let Some(lead_children) = &lead.children else {
                if nodes.iter().any(|node| node.children.is_some()) {
                    return Err(StructuralMismatch::ChildList {
                        path: path_of(&positions, cursor),
                    });
                }
                cursor += 1;
                continue;
            };

            let mut child_lists = Vec::with_capacity(nodes.len());
            for node in &nodes {
                let Some(children) = &node.children else {
                    return Err(StructuralMismatch::ChildList {
                        path: path_of(&positions, cursor),
                    });
                };
                if children.len() != lead_children.len() {
                    return Err(StructuralMismatch::ChildCount {
                        path: path_of(&positions, cursor),
                        expected: lead_children.len(),
                        found: children.len(),
                    });
                }
                child_lists.push(children);
            }

            let mut indices = Vec::with_capacity(lead_children.len());
            for (child_index, lead_child) in lead_children.iter().enumerate() {
                let column: Vec<&'a DesignNode> =
                    child_lists.iter().map(|children| &children[child_index]).collect();
                if let Some(other) = first_other_type(&column, lead_child) {
                    let mut path = path_of(&positions, cursor);
                    path.push(child_index);
                    return Err(StructuralMismatch::Type {
                        path,
                        expected: lead_child.node_type.clone(),
                        found: other.to_string(),
                    });
                }

                indices.push(positions.len());
                positions.push(AlignedPosition {
                    parent: Some(cursor),
                    child_index,
                    nodes: column,
                    children: None,
                });
            }
            positions[cursor].children = Some(indices);
            cursor += 1;
        }

        Ok(Self { positions })
    }

    pub fn positions(&self) -> &[AlignedPosition<'a>] {
        &self.positions
    }

    /// Child indices leading from the root to the position at `index`.
    pub fn path(&self, index: usize) -> Vec<usize> {
        path_of(&self.positions, index)
    }

    /// Arena indices in depth-first preorder.
    pub fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.positions.len());
        if self.positions.is_empty() {
            return order;
        }
        let mut pending = vec![0];
        while let Some(index) = pending.pop() {
            order.push(index);
            if let Some(children) = &self.positions[index].children {
                pending.extend(children.iter().rev());
            }
        }
        order
    }
}

fn path_of(positions: &[AlignedPosition<'_>], index: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut cursor = index;
    while let Some(parent) = positions[cursor].parent {
        path.push(positions[cursor].child_index);
        cursor = parent;
    }
    path.reverse();
    path
}

/// Returns the first node type that differs from `lead`'s.
fn first_other_type<'n>(nodes: &[&'n DesignNode], lead: &DesignNode) -> Option<&'n str> {
    nodes
        .iter()
        .copied()
        .find(|node| node.node_type != lead.node_type)
        .map(|node| node.node_type.as_str())
}

/// Template position under construction.
#[derive(Debug, Clone)]
pub(crate) struct DraftNode {
    pub node_type: String,
    pub properties: IndexMap<PropertyKey, TemplateValue>,
}

/// Drafts every position with the first instance's property values as literals.
pub(crate) fn draft(alignment: &Alignment<'_>) -> Vec<DraftNode> {
    alignment
        .positions()
        .iter()
        .map(|position| {
            let lead = position.nodes[0];
            let properties = templated_keys(position.is_root())
                .filter_map(|key| {
                    lead.property(key)
                        .map(|value| (key, TemplateValue::Literal(value)))
                })
                .collect();
            DraftNode {
                node_type: position.node_type().to_string(),
                properties,
            }
        })
        .collect()
}

/// Builds the template tree from finished drafts, indexed like the arena.
pub(crate) fn assemble(alignment: &Alignment<'_>, drafts: Vec<DraftNode>) -> TemplateNode {
    let positions = alignment.positions();
    let mut built: Vec<Option<TemplateNode>> = drafts
        .into_iter()
        .map(|draft| {
            let mut properties = draft.properties;
            properties.sort_keys();
            Some(TemplateNode {
                node_type: draft.node_type,
                properties,
                children: None,
            })
        })
        .collect();

    for index in (0..positions.len()).rev() {
        if let Some(child_indices) = &positions[index].children {
            let children: Vec<TemplateNode> = child_indices
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            if let Some(node) = built[index].as_mut() {
                node.children = Some(children);
            }
        }
    }

    built
        .first_mut()
        .and_then(Option::take)
        .unwrap_or_else(|| TemplateNode::new(""))
}
