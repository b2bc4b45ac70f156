//! Fill, stroke and effect definitions.
//!
//! These mirror the normalized paint and effect shapes produced by the
//! extraction layer. Fills and strokes share the [`Paint`] type.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// A single paint layer used for fills and strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Paint {
    Solid {
        color: Color,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        opacity: Option<f64>,
    },
    GradientLinear {
        stops: Vec<GradientStop>,
    },
    GradientRadial {
        stops: Vec<GradientStop>,
    },
    Image {
        #[serde(rename = "imageRef")]
        image_ref: String,
        #[serde(rename = "scaleMode", default, skip_serializing_if = "Option::is_none")]
        scale_mode: Option<String>,
    },
}

impl Paint {
    /// Creates an opaque solid paint.
    pub fn solid(color: Color) -> Self {
        Self::Solid {
            color,
            opacity: None,
        }
    }
}

/// A color stop along a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f64,
    pub color: Color,
}

/// Kind of a visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
    LayerBlur,
    BackgroundBlur,
}

/// Offset of a shadow effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

/// A shadow or blur effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Offset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
}

fn default_visible() -> bool {
    true
}
