//! Primitive type tags and the trait every sendable command implements.
//!
//! Uses proper enums with `TryFrom`: unknown tags are errors, not panics.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Result, RewindError};

// ── PrimitiveType ────────────────────────────────────────────────

/// Every `"type"` tag the viewer dispatches on.
///
/// The first group belongs to the current protocol revision; the second
/// group only exists in the older revision (see [`crate::legacy`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    // ── Current revision ─────────────────────────────────────────
    Circle,
    Rectangle,
    Triangle,
    Polyline,
    Message,
    Popup,
    Options,
    /// Frame boundary.
    End,

    // ── Legacy revision ──────────────────────────────────────────
    Line,
    Unit,
    Area,
    Facility,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 12] = [
        PrimitiveType::Circle,
        PrimitiveType::Rectangle,
        PrimitiveType::Triangle,
        PrimitiveType::Polyline,
        PrimitiveType::Message,
        PrimitiveType::Popup,
        PrimitiveType::Options,
        PrimitiveType::End,
        PrimitiveType::Line,
        PrimitiveType::Unit,
        PrimitiveType::Area,
        PrimitiveType::Facility,
    ];

    /// The wire tag.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Circle => "circle",
            PrimitiveType::Rectangle => "rectangle",
            PrimitiveType::Triangle => "triangle",
            PrimitiveType::Polyline => "polyline",
            PrimitiveType::Message => "message",
            PrimitiveType::Popup => "popup",
            PrimitiveType::Options => "options",
            PrimitiveType::End => "end",
            PrimitiveType::Line => "line",
            PrimitiveType::Unit => "unit",
            PrimitiveType::Area => "area",
            PrimitiveType::Facility => "facility",
        }
    }

    /// Returns `true` for tags only understood by the older viewer.
    pub const fn is_legacy(&self) -> bool {
        matches!(
            self,
            PrimitiveType::Line
                | PrimitiveType::Unit
                | PrimitiveType::Area
                | PrimitiveType::Facility
        )
    }

    /// Returns `true` for control directives that draw nothing.
    pub const fn is_control(&self) -> bool {
        matches!(self, PrimitiveType::Options | PrimitiveType::End)
    }
}

impl TryFrom<&str> for PrimitiveType {
    type Error = RewindError;

    fn try_from(value: &str) -> Result<Self> {
        PrimitiveType::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| RewindError::UnknownVariant {
                type_name: "PrimitiveType",
                value: value.to_string(),
            })
    }
}

impl FromStr for PrimitiveType {
    type Err = RewindError;

    fn from_str(s: &str) -> Result<Self> {
        PrimitiveType::try_from(s)
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Primitive ────────────────────────────────────────────────────

/// A value that can be written to the viewer as one JSON object.
pub trait Primitive: Serialize {
    /// The `"type"` tag this value serializes with.
    fn kind(&self) -> PrimitiveType;

    /// Check argument constraints. Runs before any byte is written.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

impl<T: Primitive + ?Sized> Primitive for &T {
    fn kind(&self) -> PrimitiveType {
        (**self).kind()
    }

    fn validate(&self) -> Result<()> {
        (**self).validate()
    }
}
