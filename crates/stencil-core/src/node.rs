//! The uniform design node produced by the extraction layer.
//!
//! A [`DesignNode`] owns its children. Cloning, comparing and dropping a node
//! walk the subtree with an explicit work list instead of native recursion, so
//! trees of any depth are safe to handle.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    geometry::LayoutBox,
    paint::{Effect, Paint},
    property::{ComponentProperty, PropertyKey, SlotValue},
    tree::{self, Preorder},
};

/// Error returned when a value cannot be stored in a node property.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    #[error("property `{key}` cannot hold a `{found}` value")]
    TypeMismatch {
        key: PropertyKey,
        found: &'static str,
    },

    #[error("property `{key}` is required and cannot be cleared")]
    Required { key: PropertyKey },
}

/// A normalized node of a design tree.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fills: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strokes: Option<Vec<Paint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<Effect>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f64>,
    /// Key into the design's global style table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_properties: Option<IndexMap<String, ComponentProperty>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DesignNode>>,
}

fn default_visible() -> bool {
    true
}

/// Borrowed view of a [`DesignNode`] without its child list.
///
/// Serializes exactly like the node with `children` removed, so encoded sizes
/// can be summed one node at a time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFields<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    node_type: &'a str,
    visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fills: Option<&'a [Paint]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strokes: Option<&'a [Paint]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    effects: Option<&'a [Effect]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    corner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stroke_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_style: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<&'a LayoutBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    component_properties: Option<&'a IndexMap<String, ComponentProperty>>,
}

impl DesignNode {
    /// Creates a visible node with no visual properties and no child list.
    ///
    /// # Examples
    ///
    /// ```
    /// use stencil_core::node::DesignNode;
    ///
    /// let label = DesignNode::new("1:2", "Label", "TEXT").with_text("Submit");
    /// let button = DesignNode::new("1:1", "Button", "INSTANCE")
    ///     .with_component_id("10:1")
    ///     .with_children(vec![label]);
    ///
    /// assert!(button.is_instance());
    /// assert_eq!(button.descendants().count(), 2);
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            visible: true,
            text: None,
            fills: None,
            strokes: None,
            effects: None,
            opacity: None,
            corner_radius: None,
            stroke_weight: None,
            text_style: None,
            layout: None,
            component_id: None,
            component_properties: None,
            children: None,
        }
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_fills(mut self, fills: Vec<Paint>) -> Self {
        self.fills = Some(fills);
        self
    }

    pub fn with_strokes(mut self, strokes: Vec<Paint>) -> Self {
        self.strokes = Some(strokes);
        self
    }

    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = Some(effects);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    pub fn with_stroke_weight(mut self, weight: f64) -> Self {
        self.stroke_weight = Some(weight);
        self
    }

    pub fn with_text_style(mut self, style: impl Into<String>) -> Self {
        self.text_style = Some(style.into());
        self
    }

    pub fn with_layout(mut self, layout: LayoutBox) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_component_id(mut self, component_id: impl Into<String>) -> Self {
        self.component_id = Some(component_id.into());
        self
    }

    pub fn with_component_properties(
        mut self,
        properties: IndexMap<String, ComponentProperty>,
    ) -> Self {
        self.component_properties = Some(properties);
        self
    }

    pub fn with_children(mut self, children: Vec<DesignNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Returns the component reference when it is present and non-empty.
    pub fn component_ref(&self) -> Option<&str> {
        self.component_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Checks whether this node is an instance of a component.
    pub fn is_instance(&self) -> bool {
        self.component_ref().is_some()
    }

    /// Returns the children, or an empty slice when the node has no child list.
    pub fn children(&self) -> &[DesignNode] {
        self.children.as_deref().unwrap_or_default()
    }

    /// Iterates over this node and all of its descendants in preorder.
    pub fn descendants(&self) -> Preorder<'_> {
        Preorder::new(std::slice::from_ref(self))
    }

    /// Reads a property as a tagged value; `None` when the property is absent.
    pub fn property(&self, key: PropertyKey) -> Option<SlotValue> {
        match key {
            PropertyKey::Id => Some(SlotValue::Reference(self.id.clone())),
            PropertyKey::Name => Some(SlotValue::Text(self.name.clone())),
            PropertyKey::Visible => Some(SlotValue::Visible(self.visible)),
            PropertyKey::Text => self.text.clone().map(SlotValue::Text),
            PropertyKey::Fills => self.fills.clone().map(SlotValue::Fills),
            PropertyKey::Strokes => self.strokes.clone().map(SlotValue::Strokes),
            PropertyKey::Effects => self.effects.clone().map(SlotValue::Effects),
            PropertyKey::Opacity => self.opacity.map(SlotValue::Opacity),
            PropertyKey::CornerRadius => self.corner_radius.map(SlotValue::Number),
            PropertyKey::StrokeWeight => self.stroke_weight.map(SlotValue::Number),
            PropertyKey::TextStyle => self.text_style.clone().map(SlotValue::Reference),
            PropertyKey::Layout => self.layout.map(SlotValue::Layout),
            PropertyKey::ComponentId => self.component_id.clone().map(SlotValue::Reference),
            PropertyKey::ComponentProperties => self
                .component_properties
                .clone()
                .map(SlotValue::Properties),
        }
    }

    /// Writes a property from a tagged value; `None` clears an optional property.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::TypeMismatch`] when the value variant does not
    /// belong to `key`, and [`PropertyError::Required`] when clearing `id`,
    /// `name` or `visible`. The node is left unchanged on error.
    pub fn set_property(
        &mut self,
        key: PropertyKey,
        value: Option<SlotValue>,
    ) -> Result<(), PropertyError> {
        let Some(value) = value else {
            return self.clear_property(key);
        };
        if !key.accepts(&value) {
            return Err(PropertyError::TypeMismatch {
                key,
                found: value.tag(),
            });
        }

        match (key, value) {
            (PropertyKey::Id, SlotValue::Reference(id)) => self.id = id,
            (PropertyKey::Name, SlotValue::Text(name)) => self.name = name,
            (PropertyKey::Visible, SlotValue::Visible(visible)) => self.visible = visible,
            (PropertyKey::Text, SlotValue::Text(text)) => self.text = Some(text),
            (PropertyKey::Fills, SlotValue::Fills(fills)) => self.fills = Some(fills),
            (PropertyKey::Strokes, SlotValue::Strokes(strokes)) => self.strokes = Some(strokes),
            (PropertyKey::Effects, SlotValue::Effects(effects)) => self.effects = Some(effects),
            (PropertyKey::Opacity, SlotValue::Opacity(opacity)) => self.opacity = Some(opacity),
            (PropertyKey::CornerRadius, SlotValue::Number(radius)) => {
                self.corner_radius = Some(radius)
            }
            (PropertyKey::StrokeWeight, SlotValue::Number(weight)) => {
                self.stroke_weight = Some(weight)
            }
            (PropertyKey::TextStyle, SlotValue::Reference(style)) => self.text_style = Some(style),
            (PropertyKey::Layout, SlotValue::Layout(layout)) => self.layout = Some(layout),
            (PropertyKey::ComponentId, SlotValue::Reference(id)) => self.component_id = Some(id),
            (PropertyKey::ComponentProperties, SlotValue::Properties(properties)) => {
                self.component_properties = Some(properties)
            }
            // `accepts` admitted only the pairs above.
            _ => {}
        }
        Ok(())
    }

    fn clear_property(&mut self, key: PropertyKey) -> Result<(), PropertyError> {
        match key {
            PropertyKey::Id | PropertyKey::Name | PropertyKey::Visible => {
                return Err(PropertyError::Required { key });
            }
            PropertyKey::Text => self.text = None,
            PropertyKey::Fills => self.fills = None,
            PropertyKey::Strokes => self.strokes = None,
            PropertyKey::Effects => self.effects = None,
            PropertyKey::Opacity => self.opacity = None,
            PropertyKey::CornerRadius => self.corner_radius = None,
            PropertyKey::StrokeWeight => self.stroke_weight = None,
            PropertyKey::TextStyle => self.text_style = None,
            PropertyKey::Layout => self.layout = None,
            PropertyKey::ComponentId => self.component_id = None,
            PropertyKey::ComponentProperties => self.component_properties = None,
        }
        Ok(())
    }

    /// Borrows every field except the child list.
    pub fn fields(&self) -> NodeFields<'_> {
        NodeFields {
            id: &self.id,
            name: &self.name,
            node_type: &self.node_type,
            visible: self.visible,
            text: self.text.as_deref(),
            fills: self.fills.as_deref(),
            strokes: self.strokes.as_deref(),
            effects: self.effects.as_deref(),
            opacity: self.opacity,
            corner_radius: self.corner_radius,
            stroke_weight: self.stroke_weight,
            text_style: self.text_style.as_deref(),
            layout: self.layout.as_ref(),
            component_id: self.component_id.as_deref(),
            component_properties: self.component_properties.as_ref(),
        }
    }

    /// Copies every field except the child list, which is left as `None`.
    pub(crate) fn shallow_clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            node_type: self.node_type.clone(),
            visible: self.visible,
            text: self.text.clone(),
            fills: self.fills.clone(),
            strokes: self.strokes.clone(),
            effects: self.effects.clone(),
            opacity: self.opacity,
            corner_radius: self.corner_radius,
            stroke_weight: self.stroke_weight,
            text_style: self.text_style.clone(),
            layout: self.layout,
            component_id: self.component_id.clone(),
            component_properties: self.component_properties.clone(),
            children: None,
        }
    }

    /// Compares every field except the child list.
    pub fn shallow_eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.node_type == other.node_type
            && self.visible == other.visible
            && self.text == other.text
            && self.fills == other.fills
            && self.strokes == other.strokes
            && self.effects == other.effects
            && self.opacity == other.opacity
            && self.corner_radius == other.corner_radius
            && self.stroke_weight == other.stroke_weight
            && self.text_style == other.text_style
            && self.layout == other.layout
            && self.component_id == other.component_id
            && self.component_properties == other.component_properties
    }
}

impl Clone for DesignNode {
    fn clone(&self) -> Self {
        tree::filter_forest(std::slice::from_ref(self), |_| true)
            .pop()
            .unwrap_or_else(|| self.shallow_clone())
    }
}

impl PartialEq for DesignNode {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if !left.shallow_eq(right) {
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

impl Drop for DesignNode {
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
