//! The compact representation of a design.
//!
//! A [`CompressedDesign`] factors repeated component instances into one
//! [`ComponentDefinition`] per component (a [`TemplateNode`] tree plus
//! [`SlotDefinition`]s) and one small [`CompressedInstance`] record per
//! instance. Everything else is kept verbatim in `nodes`.
//!
//! The serialized shape is self-describing; decoding needs no outside state.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    geometry::{GridPosition, LayoutBox},
    node::DesignNode,
    property::{PropertyKey, SlotValue, ValueType},
};

/// Identifier of a slot, unique within one component.
pub type SlotId = String;

/// Locates a property inside a template: child indices from the template
/// root followed by the property name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath {
    path: Vec<usize>,
    property: PropertyKey,
}

impl NodePath {
    pub fn new(path: Vec<usize>, property: PropertyKey) -> Self {
        Self { path, property }
    }

    /// Child indices from the template root; empty for the root itself.
    pub fn indices(&self) -> &[usize] {
        &self.path
    }

    pub fn property(&self) -> PropertyKey {
        self.property
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in &self.path {
            write!(f, "/{index}")?;
        }
        if self.path.is_empty() {
            f.write_str("/")?;
        }
        write!(f, "#{}", self.property)
    }
}

/// A reference from a template property to a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlotRef {
    pub slot: SlotId,
}

/// An identifier derived from the owning instance id: `I<instanceId>;<scoped>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopedId {
    pub scoped: String,
}

impl ScopedId {
    /// Builds the identifier for a concrete instance.
    pub fn resolve(&self, instance_id: &str) -> String {
        format!("I{instance_id};{}", self.scoped)
    }

    /// Returns the suffix of `id` if it is scoped to `instance_id`.
    pub fn suffix_of<'a>(id: &'a str, instance_id: &str) -> Option<&'a str> {
        id.strip_prefix('I')?
            .strip_prefix(instance_id)?
            .strip_prefix(';')
            .filter(|suffix| !suffix.is_empty())
    }
}

/// The value of a template property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Slot(SlotRef),
    Scoped(ScopedId),
    Literal(SlotValue),
}

impl TemplateValue {
    pub fn slot(id: impl Into<SlotId>) -> Self {
        Self::Slot(SlotRef { slot: id.into() })
    }

    pub fn scoped(suffix: impl Into<String>) -> Self {
        Self::Scoped(ScopedId {
            scoped: suffix.into(),
        })
    }

    /// Returns the referenced slot id, if this value is a slot reference.
    pub fn slot_id(&self) -> Option<&str> {
        match self {
            TemplateValue::Slot(slot_ref) => Some(&slot_ref.slot),
            _ => None,
        }
    }
}

/// The canonical shape shared by all instances of one component.
///
/// Properties absent on every instance are absent from `properties`. Like
/// [`DesignNode`], cloning, comparing and dropping never recurse.
#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<PropertyKey, TemplateValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TemplateNode>>,
}

impl TemplateNode {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            properties: IndexMap::new(),
            children: None,
        }
    }

    /// Counts the nodes of this template without recursion.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter().flatten());
        }
        count
    }

    /// Borrows every field except the child list.
    pub fn fields(&self) -> TemplateFields<'_> {
        TemplateFields {
            node_type: &self.node_type,
            properties: &self.properties,
        }
    }

    /// Copies the node with an empty child list of the same presence.
    fn shallow_clone(&self) -> Self {
        Self {
            node_type: self.node_type.clone(),
            properties: self.properties.clone(),
            children: self
                .children
                .as_ref()
                .map(|children| Vec::with_capacity(children.len())),
        }
    }
}

impl Clone for TemplateNode {
    fn clone(&self) -> Self {
        // Breadth-first, so every node comes after its parent.
        let mut order: Vec<(&TemplateNode, Option<usize>)> = vec![(self, None)];
        let mut cursor = 0;
        while cursor < order.len() {
            let node = order[cursor].0;
            order.extend(node.children.iter().flatten().map(|child| (child, Some(cursor))));
            cursor += 1;
        }

        let mut built: Vec<Option<TemplateNode>> = order
            .iter()
            .map(|(node, _)| Some(node.shallow_clone()))
            .collect();
        let mut root = None;
        for index in (0..order.len()).rev() {
            let Some(mut node) = built[index].take() else {
                continue;
            };
            // Children were attached last to first.
            if let Some(children) = node.children.as_mut() {
                children.reverse();
            }
            match order[index].1 {
                Some(parent) => {
                    if let Some(Some(parent)) = built.get_mut(parent) {
                        parent.children.get_or_insert_with(Vec::new).push(node);
                    }
                }
                None => root = Some(node),
            }
        }
        root.unwrap_or_else(|| self.shallow_clone())
    }
}

impl PartialEq for TemplateNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if left.node_type != right.node_type || left.properties != right.properties {
                return false;
            }
            match (&left.children, &right.children) {
                (None, None) => {}
                (Some(a), Some(b)) if a.len() == b.len() => pending.extend(a.iter().zip(b)),
                _ => return false,
            }
        }
        true
    }
}

impl Drop for TemplateNode {
    fn drop(&mut self) {
        let Some(mut pending) = self.children.take() else {
            return;
        };
        while let Some(mut node) = pending.pop() {
            if let Some(children) = node.children.take() {
                pending.extend(children);
            }
        }
    }
}

/// Borrowed view of a [`TemplateNode`] without its child list.
#[derive(Debug, Serialize)]
pub struct TemplateFields<'a> {
    #[serde(rename = "type")]
    node_type: &'a str,
    #[serde(skip_serializing_if = "no_properties")]
    properties: &'a IndexMap<PropertyKey, TemplateValue>,
}

fn no_properties(properties: &&IndexMap<PropertyKey, TemplateValue>) -> bool {
    properties.is_empty()
}

/// Metadata of one varying property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDefinition {
    pub node_path: NodePath,
    pub value_type: ValueType,
    /// `null` when the default is the property being absent.
    pub default_value: Option<SlotValue>,
    /// Instances whose value differs from the default, keyed by instance id.
    #[serde(default)]
    pub variations: IndexMap<String, Option<SlotValue>>,
    pub instance_count: usize,
}

impl SlotDefinition {
    /// Returns the value an instance holds for this slot.
    pub fn value_for(&self, instance_id: &str) -> Option<&SlotValue> {
        match self.variations.get(instance_id) {
            Some(value) => value.as_ref(),
            None => self.default_value.as_ref(),
        }
    }
}

/// A component shared by two or more instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub template: TemplateNode,
    pub slot_ids: Vec<SlotId>,
    pub slots: IndexMap<SlotId, SlotDefinition>,
}

/// Where an expanded instance is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement<'a> {
    Absolute(LayoutBox),
    Grid {
        grid_id: &'a str,
        position: GridPosition,
    },
    Unplaced,
}

/// One instance of a component in compact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedInstance {
    pub id: String,
    pub component_id: String,
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub overrides: IndexMap<SlotId, Option<SlotValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_data: Option<LayoutBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<GridPosition>,
    /// Id of the passthrough container this instance was nested in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Child index inside `parent_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

fn default_visible() -> bool {
    true
}

impl CompressedInstance {
    /// Returns how this instance is positioned.
    ///
    /// Explicit layout data wins over a grid reference.
    pub fn placement(&self) -> Placement<'_> {
        match (&self.layout_data, &self.grid_id, &self.position) {
            (Some(layout), _, _) => Placement::Absolute(*layout),
            (None, Some(grid_id), Some(position)) => Placement::Grid {
                grid_id,
                position: *position,
            },
            _ => Placement::Unplaced,
        }
    }
}

/// A detected regular arrangement of instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    pub id: String,
    pub columns: usize,
    pub rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_height: Option<f64>,
    pub gap_x: f64,
    pub gap_y: f64,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
    pub positions: IndexMap<String, GridPosition>,
    pub confidence: f64,
}

impl GridLayout {
    /// Returns the top-left corner of a cell.
    pub fn cell_origin(&self, position: GridPosition) -> (f64, f64) {
        let pitch_x = self.column_width.unwrap_or(0.0) + self.gap_x;
        let pitch_y = self.row_height.unwrap_or(0.0) + self.gap_y;
        (
            self.origin_x + position.column() as f64 * pitch_x,
            self.origin_y + position.row() as f64 * pitch_y,
        )
    }

    /// Returns the full box of a cell, or `None` when the grid does not
    /// record a uniform cell size.
    ///
    /// # Examples
    ///
    /// ```
    /// # use indexmap::IndexMap;
    /// # use stencil_core::{compressed::GridLayout, geometry::{GridPosition, LayoutBox}};
    /// let grid = GridLayout {
    ///     id: "grid-0".into(),
    ///     columns: 4,
    ///     rows: 1,
    ///     column_width: Some(100.0),
    ///     row_height: Some(50.0),
    ///     gap_x: 10.0,
    ///     gap_y: 0.0,
    ///     origin_x: 0.0,
    ///     origin_y: 0.0,
    ///     positions: IndexMap::new(),
    ///     confidence: 1.0,
    /// };
    /// assert_eq!(
    ///     grid.resolve(GridPosition::new(2, 0)),
    ///     Some(LayoutBox::new(220.0, 0.0, 100.0, 50.0))
    /// );
    /// ```
    pub fn resolve(&self, position: GridPosition) -> Option<LayoutBox> {
        let (x, y) = self.cell_origin(position);
        Some(LayoutBox::new(x, y, self.column_width?, self.row_height?))
    }
}

/// Style lookup table of a design. Opaque to the compression engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalVars {
    #[serde(default)]
    pub styles: IndexMap<String, serde_json::Value>,
}

/// A design in compact form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedDesign {
    pub name: String,
    #[serde(default)]
    pub components: IndexMap<String, ComponentDefinition>,
    #[serde(default)]
    pub instances: Vec<CompressedInstance>,
    #[serde(default)]
    pub nodes: Vec<DesignNode>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub grids: IndexMap<String, GridLayout>,
    #[serde(default)]
    pub global_vars: GlobalVars,
}

/// A design as delivered by the extraction layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDocument {
    #[serde(default)]
    pub name: String,
    pub nodes: Vec<DesignNode>,
    #[serde(default)]
    pub global_vars: GlobalVars,
}
