//! Component grouping.
//!
//! Partitions the instance nodes of a forest by component reference. Roots
//! that are instances are visited first, then the walk continues into plain
//! containers. The walk never enters an instance, so component references
//! inside an instance stay opaque properties of that instance.

use indexmap::IndexMap;
use log::trace;

use stencil_core::node::DesignNode;

/// Where an instance node was found.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InstanceSite<'a> {
    pub node: &'a DesignNode,
    /// Id of the containing node; `None` at the top level.
    pub parent_id: Option<&'a str>,
    /// Child index inside the parent, or root index at the top level.
    pub index: usize,
}

/// All instances of one component, in visiting order.
#[derive(Debug)]
pub(crate) struct ComponentGroup<'a> {
    pub component_id: &'a str,
    pub sites: Vec<InstanceSite<'a>>,
}

impl<'a> ComponentGroup<'a> {
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn nodes(&self) -> Vec<&'a DesignNode> {
        self.sites.iter().map(|site| site.node).collect()
    }
}

/// Buckets the instances of `roots` by component reference.
///
/// Groups come out in order of their first instance. With `include_nested`
/// unset only top-level instances are considered.
pub(crate) fn group_instances(roots: &[DesignNode], include_nested: bool) -> Vec<ComponentGroup<'_>> {
    let mut groups: IndexMap<&str, Vec<InstanceSite<'_>>> = IndexMap::new();

    for (index, root) in roots.iter().enumerate() {
        if let Some(component_id) = root.component_ref() {
            groups.entry(component_id).or_default().push(InstanceSite {
                node: root,
                parent_id: None,
                index,
            });
        }
    }

    if include_nested {
        let mut pending: Vec<&DesignNode> =
            roots.iter().rev().filter(|root| !root.is_instance()).collect();
        while let Some(container) = pending.pop() {
            for (index, child) in container.children().iter().enumerate() {
                if let Some(component_id) = child.component_ref() {
                    groups.entry(component_id).or_default().push(InstanceSite {
                        node: child,
                        parent_id: Some(container.id.as_str()),
                        index,
                    });
                }
            }
            pending.extend(
                container
                    .children()
                    .iter()
                    .rev()
                    .filter(|child| !child.is_instance()),
            );
        }
    }

    trace!(groups = groups.len(); "Grouped component instances");

    groups
        .into_iter()
        .map(|(component_id, sites)| ComponentGroup {
            component_id,
            sites,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: &str, component: &str) -> DesignNode {
        DesignNode::new(id, "Button", "INSTANCE").with_component_id(component)
    }

    #[test]
    fn test_groups_by_component_in_first_seen_order() {
        let roots = vec![
            instance("1", "b"),
            instance("2", "a"),
            DesignNode::new("3", "Divider", "LINE"),
            instance("4", "b"),
        ];

        let groups = group_instances(&roots, true);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].component_id, "b");
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0].sites[1].index, 3);
        assert_eq!(groups[1].component_id, "a");
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn test_top_level_instances_come_before_nested() {
        let roots = vec![
            DesignNode::new("f", "Frame", "FRAME").with_children(vec![instance("n1", "a")]),
            instance("t1", "a"),
        ];

        let groups = group_instances(&roots, true);
        let ids: Vec<&str> = groups[0].sites.iter().map(|s| s.node.id.as_str()).collect();

        assert_eq!(ids, ["t1", "n1"]);
        assert_eq!(groups[0].sites[1].parent_id, Some("f"));
        assert_eq!(groups[0].sites[1].index, 0);
    }

    #[test]
    fn test_does_not_descend_into_instances() {
        let roots = vec![
            instance("1", "card").with_children(vec![instance("I1;2", "icon")]),
            instance("3", "card").with_children(vec![instance("I3;2", "icon")]),
        ];

        let groups = group_instances(&roots, true);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].component_id, "card");
    }

    #[test]
    fn test_nested_walk_can_be_disabled() {
        let roots = vec![
            DesignNode::new("f", "Frame", "FRAME")
                .with_children(vec![instance("n1", "a"), instance("n2", "a")]),
        ];

        assert!(group_instances(&roots, false).is_empty());
        assert_eq!(group_instances(&roots, true)[0].len(), 2);
    }

    #[test]
    fn test_nested_sites_in_preorder() {
        let roots = vec![DesignNode::new("f", "Frame", "FRAME").with_children(vec![
            DesignNode::new("g", "Group", "GROUP").with_children(vec![instance("deep", "a")]),
            instance("shallow", "a"),
        ])];

        let groups = group_instances(&roots, true);
        let ids: Vec<&str> = groups[0].sites.iter().map(|s| s.node.id.as_str()).collect();

        // Siblings are recorded when their container is visited.
        assert_eq!(ids, ["shallow", "deep"]);
        assert_eq!(groups[0].sites[0].parent_id, Some("f"));
        assert_eq!(groups[0].sites[0].index, 1);
        assert_eq!(groups[0].sites[1].parent_id, Some("g"));
    }
}
