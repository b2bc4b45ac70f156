//! Stack-safe traversal helpers for design trees.
//!
//! Design exports can nest frames and groups arbitrarily deep, so nothing in
//! this module recurses. Walks keep their own work list on the heap.

use crate::node::DesignNode;

/// Preorder iterator over a forest of [`DesignNode`]s.
///
/// # Examples
///
/// ```
/// use stencil_core::{node::DesignNode, tree::Preorder};
///
/// let forest = vec![
///     DesignNode::new("1", "A", "FRAME").with_children(vec![DesignNode::new("2", "B", "TEXT")]),
///     DesignNode::new("3", "C", "FRAME"),
/// ];
/// let ids: Vec<&str> = Preorder::new(&forest).map(|node| node.id.as_str()).collect();
/// assert_eq!(ids, ["1", "2", "3"]);
/// ```
#[derive(Debug, Clone)]
pub struct Preorder<'a> {
    stack: Vec<&'a DesignNode>,
}

impl<'a> Preorder<'a> {
    /// Starts a walk over `roots`, visiting them in order.
    pub fn new(roots: &'a [DesignNode]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a DesignNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Copies a forest, leaving out every node (and its subtree) rejected by `keep`.
///
/// A parent whose child list is fully filtered keeps an empty list, so the
/// distinction between "no child list" and "no children" survives the copy.
pub fn filter_forest<'a, F>(roots: &'a [DesignNode], mut keep: F) -> Vec<DesignNode>
where
    F: FnMut(&'a DesignNode) -> bool,
{
    struct Entry<'a> {
        node: &'a DesignNode,
        children: Option<Vec<usize>>,
    }

    let mut entries: Vec<Entry<'a>> = Vec::new();
    let mut root_indices = Vec::new();
    for root in roots {
        if keep(root) {
            root_indices.push(entries.len());
            entries.push(Entry {
                node: root,
                children: None,
            });
        }
    }

    // Children are always appended after their parent.
    let mut cursor = 0;
    while cursor < entries.len() {
        let node = entries[cursor].node;
        if let Some(children) = &node.children {
            let mut indices = Vec::with_capacity(children.len());
            for child in children {
                if keep(child) {
                    indices.push(entries.len());
                    entries.push(Entry {
                        node: child,
                        children: None,
                    });
                }
            }
            entries[cursor].children = Some(indices);
        }
        cursor += 1;
    }

    let mut built: Vec<Option<DesignNode>> = std::iter::repeat_with(|| None)
        .take(entries.len())
        .collect();
    for (index, entry) in entries.iter().enumerate().rev() {
        let mut node = entry.node.shallow_clone();
        if let Some(indices) = &entry.children {
            node.children = Some(indices.iter().filter_map(|&child| built[child].take()).collect());
        }
        built[index] = Some(node);
    }

    root_indices
        .into_iter()
        .filter_map(|index| built[index].take())
        .collect()
}

/// Returns the maximum depth of a forest; a lone root has depth 1.
pub fn depth(roots: &[DesignNode]) -> usize {
    let mut deepest = 0;
    let mut pending: Vec<(&DesignNode, usize)> = roots.iter().map(|node| (node, 1)).collect();
    while let Some((node, level)) = pending.pop() {
        deepest = deepest.max(level);
        pending.extend(node.children().iter().map(|child| (child, level + 1)));
    }
    deepest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(depth: usize) -> DesignNode {
        let mut node = DesignNode::new(format!("n{depth}"), "leaf", "FRAME");
        for level in (0..depth - 1).rev() {
            node = DesignNode::new(format!("n{level}"), "frame", "FRAME").with_children(vec![node]);
        }
        node
    }

    #[test]
    fn test_preorder_visits_every_node_once() {
        let forest = vec![
            DesignNode::new("a", "A", "FRAME").with_children(vec![
                DesignNode::new("b", "B", "FRAME")
                    .with_children(vec![DesignNode::new("c", "C", "TEXT")]),
                DesignNode::new("d", "D", "TEXT"),
            ]),
            DesignNode::new("e", "E", "TEXT"),
        ];

        let ids: Vec<&str> = Preorder::new(&forest).map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_filter_forest_drops_subtrees() {
        let forest = vec![
            DesignNode::new("a", "A", "FRAME").with_children(vec![
                DesignNode::new("b", "B", "INSTANCE")
                    .with_children(vec![DesignNode::new("c", "C", "TEXT")]),
            ]),
            DesignNode::new("d", "D", "TEXT"),
        ];

        let filtered = filter_forest(&forest, |node| node.id != "b");

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].children, Some(vec![]));
        assert_eq!(Preorder::new(&filtered).count(), 2);
    }

    #[test]
    fn test_depth() {
        assert_eq!(depth(&[]), 0);
        assert_eq!(depth(&[chain(5)]), 5);
    }

    #[test]
    fn test_deep_tree_is_stack_safe() {
        // Deep enough to overflow a recursive clone, compare or drop.
        let deep = chain(200_000);

        assert_eq!(deep.descendants().count(), 200_000);
        assert_eq!(depth(std::slice::from_ref(&deep)), 200_000);

        let copy = deep.clone();
        assert_eq!(copy, deep);
    }
}
