//! Round-trip validation.
//!
//! Compares an original forest with the forest produced by expansion. Top-level
//! nodes are matched by id, since expansion emits instances ahead of
//! passthrough nodes; below the top level children are compared in order.

use std::fmt::{self, Write};

use indexmap::IndexMap;

use stencil_core::node::DesignNode;

/// How much of each node is compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Ids, names, types and child counts.
    #[default]
    Shape,
    /// Everything in [`ValidationMode::Shape`] plus every visual property and
    /// the presence of child lists.
    Full,
}

/// What differs at a mismatch location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchKind {
    Length { expected: usize, found: usize },
    Id { expected: String, found: String },
    Name { expected: String, found: String },
    Type { expected: String, found: String },
    Properties,
    ChildList,
    Missing,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { expected, found } => {
                write!(f, "expected {expected} nodes, found {found}")
            }
            Self::Id { expected, found } => write!(f, "expected id `{expected}`, found `{found}`"),
            Self::Name { expected, found } => {
                write!(f, "expected name `{expected}`, found `{found}`")
            }
            Self::Type { expected, found } => {
                write!(f, "expected type `{expected}`, found `{found}`")
            }
            Self::Properties => f.write_str("visual properties differ"),
            Self::ChildList => f.write_str("child list present on one side only"),
            Self::Missing => f.write_str("node missing from expansion"),
        }
    }
}

/// A single difference between two forests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// `/<rootId>/<childIndex>/...`; `/` for the forest itself.
    pub path: String,
    pub kind: MismatchKind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// Result of comparing two forests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    mismatches: Vec<Mismatch>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }
}

/// Checks that `expanded` has the same shape as `original`.
///
/// # Examples
///
/// ```
/// # use stencil::{validate_expansion, DesignNode};
/// let original = vec![DesignNode::new("1", "Card", "FRAME")];
/// let renamed = vec![DesignNode::new("1", "Tile", "FRAME")];
///
/// assert!(validate_expansion(&original, &original.clone()));
/// assert!(!validate_expansion(&original, &renamed));
/// ```
pub fn validate_expansion(original: &[DesignNode], expanded: &[DesignNode]) -> bool {
    validate_expansion_with(original, expanded, ValidationMode::Shape).is_valid()
}

/// Compares two forests and lists every difference found.
pub fn validate_expansion_with(
    original: &[DesignNode],
    expanded: &[DesignNode],
    mode: ValidationMode,
) -> ValidationReport {
    let mut mismatches = Vec::new();
    if original.len() != expanded.len() {
        mismatches.push(Mismatch {
            path: "/".to_string(),
            kind: MismatchKind::Length {
                expected: original.len(),
                found: expanded.len(),
            },
        });
    }

    let mut by_id: IndexMap<&str, Vec<&DesignNode>> = IndexMap::new();
    for node in expanded.iter().rev() {
        by_id.entry(node.id.as_str()).or_default().push(node);
    }

    let mut paths = PathArena::default();
    let mut roots = Vec::with_capacity(original.len());
    for node in original {
        let path = paths.push(None, PathSegment::Root(&node.id));
        match by_id.get_mut(node.id.as_str()).and_then(Vec::pop) {
            Some(other) => roots.push((path, node, other)),
            None => mismatches.push(Mismatch {
                path: paths.render(path),
                kind: MismatchKind::Missing,
            }),
        }
    }

    let mut pending: Vec<(usize, &DesignNode, &DesignNode)> = roots.into_iter().rev().collect();
    while let Some((path, left, right)) = pending.pop() {
        if let Some(kind) = compare_shallow(left, right, mode) {
            mismatches.push(Mismatch {
                path: paths.render(path),
                kind,
            });
        }

        let (left_children, right_children) = (left.children(), right.children());
        if left_children.len() != right_children.len() {
            mismatches.push(Mismatch {
                path: paths.render(path),
                kind: MismatchKind::Length {
                    expected: left_children.len(),
                    found: right_children.len(),
                },
            });
            continue;
        }
        for (index, (left_child, right_child)) in
            left_children.iter().zip(right_children).enumerate().rev()
        {
            let child_path = paths.push(Some(path), PathSegment::Child(index));
            pending.push((child_path, left_child, right_child));
        }
    }

    ValidationReport { mismatches }
}

#[derive(Debug, Clone, Copy)]
enum PathSegment<'a> {
    Root(&'a str),
    Child(usize),
}

/// Parent-linked path segments, rendered only when a mismatch is reported.
#[derive(Debug, Default)]
struct PathArena<'a> {
    entries: Vec<(Option<usize>, PathSegment<'a>)>,
}

impl<'a> PathArena<'a> {
    fn push(&mut self, parent: Option<usize>, segment: PathSegment<'a>) -> usize {
        self.entries.push((parent, segment));
        self.entries.len() - 1
    }

    fn render(&self, index: usize) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(index);
        while let Some(current) = cursor {
            let (parent, segment) = self.entries[current];
            segments.push(segment);
            cursor = parent;
        }

        let mut path = String::new();
        for segment in segments.iter().rev() {
            // Writing to a `String` cannot fail.
            let _ = match segment {
                PathSegment::Root(id) => write!(path, "/{id}"),
                PathSegment::Child(index) => write!(path, "/{index}"),
            };
        }
        path
    }
}

fn compare_shallow(left: &DesignNode, right: &DesignNode, mode: ValidationMode) -> Option<MismatchKind> {
    if left.id != right.id {
        return Some(MismatchKind::Id {
            expected: left.id.clone(),
            found: right.id.clone(),
        });
    }
    if left.name != right.name {
        return Some(MismatchKind::Name {
            expected: left.name.clone(),
            found: right.name.clone(),
        });
    }
    if left.node_type != right.node_type {
        return Some(MismatchKind::Type {
            expected: left.node_type.clone(),
            found: right.node_type.clone(),
        });
    }
    if mode == ValidationMode::Full {
        if !left.shallow_eq(right) {
            return Some(MismatchKind::Properties);
        }
        if left.children.is_some() != right.children.is_some() {
            return Some(MismatchKind::ChildList);
        }
    }
    None
}
