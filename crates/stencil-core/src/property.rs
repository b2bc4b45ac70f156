//! Addressable node properties and their tagged values.
//!
//! Every property of a [`DesignNode`](crate::node::DesignNode) that may vary
//! between component instances is named by a [`PropertyKey`] and carried as a
//! [`SlotValue`]. `SlotValue` is a closed sum type: each variant holds exactly
//! one kind of data, and its serialized form carries the variant tag.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    geometry::LayoutBox,
    paint::{Effect, Paint},
};

/// Names a property of a design node.
///
/// The declaration order is the order properties are visited in, which makes
/// slot numbering reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKey {
    Id,
    Name,
    Visible,
    Text,
    Fills,
    Strokes,
    Effects,
    Opacity,
    CornerRadius,
    StrokeWeight,
    TextStyle,
    Layout,
    ComponentId,
    ComponentProperties,
}

impl PropertyKey {
    /// Every property key, in visiting order.
    pub const ALL: [PropertyKey; 14] = [
        PropertyKey::Id,
        PropertyKey::Name,
        PropertyKey::Visible,
        PropertyKey::Text,
        PropertyKey::Fills,
        PropertyKey::Strokes,
        PropertyKey::Effects,
        PropertyKey::Opacity,
        PropertyKey::CornerRadius,
        PropertyKey::StrokeWeight,
        PropertyKey::TextStyle,
        PropertyKey::Layout,
        PropertyKey::ComponentId,
        PropertyKey::ComponentProperties,
    ];

    /// Returns the wire name of this property.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKey::Id => "id",
            PropertyKey::Name => "name",
            PropertyKey::Visible => "visible",
            PropertyKey::Text => "text",
            PropertyKey::Fills => "fills",
            PropertyKey::Strokes => "strokes",
            PropertyKey::Effects => "effects",
            PropertyKey::Opacity => "opacity",
            PropertyKey::CornerRadius => "cornerRadius",
            PropertyKey::StrokeWeight => "strokeWeight",
            PropertyKey::TextStyle => "textStyle",
            PropertyKey::Layout => "layout",
            PropertyKey::ComponentId => "componentId",
            PropertyKey::ComponentProperties => "componentProperties",
        }
    }

    /// Returns the value type tag recorded for slots on this property.
    pub fn value_type(self) -> ValueType {
        match self {
            PropertyKey::Text => ValueType::Text,
            PropertyKey::Fills => ValueType::FillList,
            PropertyKey::Strokes => ValueType::StrokeList,
            PropertyKey::Opacity => ValueType::Opacity,
            PropertyKey::Visible => ValueType::Visibility,
            PropertyKey::Layout => ValueType::Layout,
            PropertyKey::Id
            | PropertyKey::Name
            | PropertyKey::Effects
            | PropertyKey::CornerRadius
            | PropertyKey::StrokeWeight
            | PropertyKey::TextStyle
            | PropertyKey::ComponentId
            | PropertyKey::ComponentProperties => ValueType::Other,
        }
    }

    /// Checks whether `value` has the variant this property stores.
    pub fn accepts(self, value: &SlotValue) -> bool {
        matches!(
            (self, value),
            (PropertyKey::Id, SlotValue::Reference(_))
                | (PropertyKey::Name, SlotValue::Text(_))
                | (PropertyKey::Visible, SlotValue::Visible(_))
                | (PropertyKey::Text, SlotValue::Text(_))
                | (PropertyKey::Fills, SlotValue::Fills(_))
                | (PropertyKey::Strokes, SlotValue::Strokes(_))
                | (PropertyKey::Effects, SlotValue::Effects(_))
                | (PropertyKey::Opacity, SlotValue::Opacity(_))
                | (PropertyKey::CornerRadius, SlotValue::Number(_))
                | (PropertyKey::StrokeWeight, SlotValue::Number(_))
                | (PropertyKey::TextStyle, SlotValue::Reference(_))
                | (PropertyKey::Layout, SlotValue::Layout(_))
                | (PropertyKey::ComponentId, SlotValue::Reference(_))
                | (PropertyKey::ComponentProperties, SlotValue::Properties(_))
        )
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse type tag of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Text,
    FillList,
    StrokeList,
    Opacity,
    Visibility,
    Layout,
    Other,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Text => "text",
            ValueType::FillList => "fill-list",
            ValueType::StrokeList => "stroke-list",
            ValueType::Opacity => "opacity",
            ValueType::Visibility => "visibility",
            ValueType::Layout => "layout",
            ValueType::Other => "other",
        };
        f.write_str(name)
    }
}

/// The value of one node property.
///
/// Serialized adjacently tagged, e.g. `{"type": "text", "value": "Submit"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SlotValue {
    Text(String),
    Fills(Vec<Paint>),
    Strokes(Vec<Paint>),
    Effects(Vec<Effect>),
    Opacity(f64),
    Visible(bool),
    Layout(LayoutBox),
    Number(f64),
    Reference(String),
    Properties(IndexMap<String, ComponentProperty>),
}

impl SlotValue {
    /// Returns the serialized variant tag.
    pub fn tag(&self) -> &'static str {
        match self {
            SlotValue::Text(_) => "text",
            SlotValue::Fills(_) => "fills",
            SlotValue::Strokes(_) => "strokes",
            SlotValue::Effects(_) => "effects",
            SlotValue::Opacity(_) => "opacity",
            SlotValue::Visible(_) => "visible",
            SlotValue::Layout(_) => "layout",
            SlotValue::Number(_) => "number",
            SlotValue::Reference(_) => "reference",
            SlotValue::Properties(_) => "properties",
        }
    }

    /// Returns the coarse type tag of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            SlotValue::Text(_) => ValueType::Text,
            SlotValue::Fills(_) => ValueType::FillList,
            SlotValue::Strokes(_) => ValueType::StrokeList,
            SlotValue::Opacity(_) => ValueType::Opacity,
            SlotValue::Visible(_) => ValueType::Visibility,
            SlotValue::Layout(_) => ValueType::Layout,
            SlotValue::Effects(_)
            | SlotValue::Number(_)
            | SlotValue::Reference(_)
            | SlotValue::Properties(_) => ValueType::Other,
        }
    }
}

/// Kind of a component property exposed by a design tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentPropertyKind {
    Boolean,
    Text,
    InstanceSwap,
    Variant,
}

/// Raw value of a component property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Text(String),
}

/// A component property set on an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentProperty {
    #[serde(rename = "type")]
    pub kind: ComponentPropertyKind,
    pub value: PropertyValue,
}
