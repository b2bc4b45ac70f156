//! Color handling for design paints
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Colors compare by their spelling, so `#FF0000` and
//! `#ff0000` are different values and each serializes back to the exact text
//! it was created from. [`Color::same_color`] compares the parsed values.

use std::{fmt, str::FromStr};

use color::DynamicColor;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Error returned when a string is not a valid CSS color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{input}`: {reason}")]
pub struct ColorError {
    input: String,
    reason: String,
}

/// A CSS color that remembers its original spelling.
#[derive(Clone, Debug)]
pub struct Color {
    raw: String,
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a string
    /// This will parse CSS color strings such as "#ff0000", "rgb(255, 0, 0)", "red", etc.
    ///
    /// # Examples
    ///
    /// ```
    /// use stencil_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let same = Color::new("#FF0000").unwrap();
    /// assert_ne!(red, same);
    /// assert!(red.same_color(&same));
    /// assert_eq!(same.as_str(), "#FF0000");
    /// ```
    pub fn new(color_str: &str) -> Result<Self, ColorError> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self {
                raw: color_str.to_string(),
                color,
            }),
            Err(err) => Err(ColorError {
                input: color_str.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// Returns the text this color was created from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if both colors parse to the same value, whatever their
    /// spelling.
    pub fn same_color(&self, other: &Self) -> bool {
        self.color == other.color
    }

    /// Returns the alpha (transparency) component of this color.
    ///
    /// The value is between 0.0 (fully transparent) and 1.0 (fully opaque).
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::new(&raw).map_err(de::Error::custom)
    }
}
