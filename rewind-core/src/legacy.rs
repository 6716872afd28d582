//! Commands of the older protocol revision.
//!
//! The older viewer takes coordinates as separate scalar fields, carries
//! the layer on every shape instead of through `options`, and knows a few
//! game-specific primitives (units, terrain areas, facilities).
//!
//! ```text
//! {"type":"circle","x":1.0,"y":2.0,"r":3.0,"color":11189196,"layer":3}
//! {"type":"unit","x":5.0,"y":5.0,"r":2.0,"hp":10,"max_hp":100,"enemy":1,...}
//! {"type":"end"}
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::color::Color;
use crate::command::check_layer;
use crate::error::{Result, RewindError};
use crate::primitive::{Primitive, PrimitiveType};

pub use crate::command::DEFAULT_LAYER;

// ── Integer-coded enums ──────────────────────────────────────────

/// Declares an enum written as its integer discriminant, with a
/// `TryFrom<i32>` that rejects unknown values.
macro_rules! int_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[repr(i32)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl TryFrom<i32> for $name {
            type Error = RewindError;

            fn try_from(value: i32) -> Result<Self> {
                match value {
                    $(v if v == $value => Ok($name::$variant),)+
                    _ => Err(RewindError::UnknownVariant {
                        type_name: stringify!($name),
                        value: value.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_i32(*self as i32)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = i32::deserialize(deserializer)?;
                $name::try_from(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Flags the older viewer reads as `0`/`1`. Decoding also takes a bool.
mod int_bool {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(i32::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        struct IntBool;

        impl Visitor<'_> for IntBool {
            type Value = bool;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("0, 1 or a boolean")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
                Ok(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
                match v {
                    0 => Ok(false),
                    1 => Ok(true),
                    _ => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
                }
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
                match v {
                    0 => Ok(false),
                    1 => Ok(true),
                    _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
                }
            }
        }

        deserializer.deserialize_any(IntBool)
    }
}

int_enum! {
    /// Owner of a unit or facility, relative to the strategy.
    Side {
        Ally = -1,
        Neutral = 0,
        Enemy = 1,
    }
}

int_enum! {
    /// Selects the unit texture.
    UnitType {
        Unknown = 0,
        Tank = 1,
        Ifv = 2,
        Arrv = 3,
        Helicopter = 4,
        Fighter = 5,
    }
}

int_enum! {
    /// Terrain or weather of one map cell.
    AreaType {
        Unknown = 0,
        Forest = 1,
        Swamp = 2,
        Rain = 3,
        Cloud = 4,
    }
}

int_enum! {
    FacilityType {
        ControlCenter = 0,
        VehicleFactory = 1,
    }
}

// ── LegacyCommand ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LegacyCommand {
    Circle {
        x: f64,
        y: f64,
        r: f64,
        color: Color,
        layer: u32,
    },
    Rectangle {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        layer: u32,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        layer: u32,
    },
    Popup {
        x: f64,
        y: f64,
        r: f64,
        text: String,
    },
    /// A living unit; the viewer interpolates units between frames.
    Unit(Unit),
    /// Description of one map cell, accumulated across frames.
    Area { x: i32, y: i32, area_type: AreaType },
    Facility(Facility),
    Message { message: String },
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub hp: i32,
    pub max_hp: i32,
    pub enemy: Side,
    pub unit_type: UnitType,
    /// Rotation in radians, counter clockwise, in `[0, 2π)`.
    pub course: f64,
    pub rem_cooldown: i32,
    pub cooldown: i32,
    #[serde(with = "int_bool")]
    pub selected: bool,
}

impl Unit {
    /// A unit with only position, size, health and owner set.
    pub fn new(x: f64, y: f64, r: f64, hp: i32, max_hp: i32, side: Side) -> Self {
        Self {
            x,
            y,
            r,
            hp,
            max_hp,
            enemy: side,
            unit_type: UnitType::Unknown,
            course: 0.0,
            rem_cooldown: 0,
            cooldown: 0,
            selected: false,
        }
    }
}

/// A capturable building occupying one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub x: i32,
    pub y: i32,
    pub facility_type: FacilityType,
    pub enemy: Side,
    pub production: i32,
    pub max_production: i32,
    pub capture: i32,
    pub max_capture: i32,
}

impl LegacyCommand {
    pub fn circle(x: f64, y: f64, r: f64, color: Color, layer: u32) -> Self {
        LegacyCommand::Circle {
            x,
            y,
            r,
            color,
            layer,
        }
    }

    pub fn rectangle(x1: f64, y1: f64, x2: f64, y2: f64, color: Color, layer: u32) -> Self {
        LegacyCommand::Rectangle {
            x1,
            y1,
            x2,
            y2,
            color,
            layer,
        }
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64, color: Color, layer: u32) -> Self {
        LegacyCommand::Line {
            x1,
            y1,
            x2,
            y2,
            color,
            layer,
        }
    }

    pub fn popup(x: f64, y: f64, r: f64, text: impl Into<String>) -> Self {
        LegacyCommand::Popup {
            x,
            y,
            r,
            text: text.into(),
        }
    }

    pub fn area(x: i32, y: i32, area_type: AreaType) -> Self {
        LegacyCommand::Area { x, y, area_type }
    }

    pub fn message(text: impl Into<String>) -> Self {
        LegacyCommand::Message {
            message: text.into(),
        }
    }
}

impl From<Unit> for LegacyCommand {
    fn from(unit: Unit) -> Self {
        LegacyCommand::Unit(unit)
    }
}

impl From<Facility> for LegacyCommand {
    fn from(facility: Facility) -> Self {
        LegacyCommand::Facility(facility)
    }
}

impl Primitive for LegacyCommand {
    fn kind(&self) -> PrimitiveType {
        match self {
            LegacyCommand::Circle { .. } => PrimitiveType::Circle,
            LegacyCommand::Rectangle { .. } => PrimitiveType::Rectangle,
            LegacyCommand::Line { .. } => PrimitiveType::Line,
            LegacyCommand::Popup { .. } => PrimitiveType::Popup,
            LegacyCommand::Unit(_) => PrimitiveType::Unit,
            LegacyCommand::Area { .. } => PrimitiveType::Area,
            LegacyCommand::Facility(_) => PrimitiveType::Facility,
            LegacyCommand::Message { .. } => PrimitiveType::Message,
            LegacyCommand::End => PrimitiveType::End,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            LegacyCommand::Circle { layer, .. }
            | LegacyCommand::Rectangle { layer, .. }
            | LegacyCommand::Line { layer, .. } => check_layer(*layer),
            _ => Ok(()),
        }
    }
}
