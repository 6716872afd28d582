//! ARGB colours and the scalar-or-per-vertex colour argument.
//!
//! On the wire a colour is a single 32-bit integer laid out as
//! `(alpha << 24) | (red << 16) | (green << 8) | blue`.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, RewindError};

// ── Color ────────────────────────────────────────────────────────

/// A colour with 8-bit red, green, blue and alpha channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0xFF, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xFF);
    pub const GRAY: Color = Color::rgb(0x27, 0x31, 0x42);
    pub const TRANSPARENT: Color = Color::argb(0, 0, 0, 0);

    /// Build a colour from alpha, red, green and blue components.
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a fully opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xFF, r, g, b)
    }

    /// Pack into the wire representation.
    pub const fn pack(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Inverse of [`Color::pack`].
    pub const fn unpack(value: u32) -> Self {
        Self {
            a: (value >> 24) as u8,
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    /// Same colour with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self::unpack(value)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.pack()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.pack())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.pack())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Some clients emit the packed value as a signed 32-bit integer.
        let raw = i64::deserialize(deserializer)?;
        if !(i64::from(i32::MIN)..=i64::from(u32::MAX)).contains(&raw) {
            return Err(D::Error::custom(format!("color {raw} does not fit in 32 bits")));
        }
        Ok(Self::unpack(raw as u32))
    }
}

// ── Colors ───────────────────────────────────────────────────────

/// Colour argument for shapes with several vertices.
///
/// A single colour is broadcast to every vertex; a per-vertex list must
/// match the vertex count exactly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Colors {
    Single(Color),
    PerVertex(Vec<Color>),
}

/// A one-element list is written as a scalar, like [`Colors::Single`].
impl Serialize for Colors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Colors::Single(color) => color.serialize(serializer),
            Colors::PerVertex(list) => match list.as_slice() {
                [color] => color.serialize(serializer),
                _ => list.serialize(serializer),
            },
        }
    }
}

impl Colors {
    /// Check this argument against a shape with `vertices` vertices.
    ///
    /// A one-element list collapses to [`Colors::Single`] so that it is
    /// written as a scalar.
    pub fn resolve(self, vertices: usize) -> Result<Self> {
        self.check(vertices)?;
        match self {
            Colors::PerVertex(list) if list.len() == 1 => Ok(Colors::Single(list[0])),
            other => Ok(other),
        }
    }

    /// Validate the colour count without normalising.
    pub fn check(&self, vertices: usize) -> Result<()> {
        match self {
            Colors::Single(_) => Ok(()),
            Colors::PerVertex(list) => match list.len() {
                0 => Err(RewindError::MissingArgument("colors")),
                1 => Ok(()),
                n if n == vertices => Ok(()),
                n => Err(RewindError::ColorCountMismatch {
                    expected: vertices,
                    actual: n,
                }),
            },
        }
    }

    /// Number of colours carried.
    pub fn len(&self) -> usize {
        match self {
            Colors::Single(_) => 1,
            Colors::PerVertex(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Color> for Colors {
    fn from(color: Color) -> Self {
        Colors::Single(color)
    }
}

impl From<Vec<Color>> for Colors {
    fn from(list: Vec<Color>) -> Self {
        Colors::PerVertex(list)
    }
}

impl From<&[Color]> for Colors {
    fn from(list: &[Color]) -> Self {
        Colors::PerVertex(list.to_vec())
    }
}

impl<const N: usize> From<[Color; N]> for Colors {
    fn from(list: [Color; N]) -> Self {
        Colors::PerVertex(list.to_vec())
    }
}
