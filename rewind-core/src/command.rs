//! Commands of the current protocol revision.
//!
//! # Wire format
//!
//! Each command is one flat JSON object whose `"type"` field names its
//! shape. Commands between two `end` markers form one frame:
//!
//! ```text
//! {"type":"circle","p":[10.0,20.0],"r":5.0,"color":4278255360,"fill":true}
//! {"type":"options","layer":4,"permanent":false}
//! {"type":"polyline","points":[0.0,0.0,5.0,5.0],"color":4294901760}
//! {"type":"end"}
//! ```
//!
//! `color` is a packed ARGB integer, or an array of them for shapes that
//! take one colour per vertex.

use serde::{Deserialize, Serialize};

use crate::color::{Color, Colors};
use crate::error::{Result, RewindError};
use crate::geometry::{FlatPoints, Point};
use crate::primitive::{Primitive, PrimitiveType};

/// Lowest layer the viewer accepts.
pub const LAYER_MIN: u32 = 1;
/// Highest layer the viewer accepts.
pub const LAYER_MAX: u32 = 10;
/// Layer the viewer draws on until told otherwise.
pub const DEFAULT_LAYER: u32 = 3;

/// Reject layers outside `[LAYER_MIN, LAYER_MAX]`.
pub fn check_layer(layer: u32) -> Result<()> {
    if (LAYER_MIN..=LAYER_MAX).contains(&layer) {
        Ok(())
    } else {
        Err(RewindError::LayerOutOfRange {
            layer,
            min: LAYER_MIN,
            max: LAYER_MAX,
        })
    }
}

// ── PopupArea ────────────────────────────────────────────────────

/// Hover area of a popup: a circle or an axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PopupArea {
    Circle { p: Point, r: f64 },
    Rect { tl: Point, br: Point },
}

// ── Command ──────────────────────────────────────────────────────

/// One drawing primitive or control directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Circle {
        p: Point,
        r: f64,
        color: Color,
        #[serde(default)]
        fill: bool,
    },
    Rectangle {
        tl: Point,
        br: Point,
        color: Colors,
        #[serde(default)]
        fill: bool,
    },
    Triangle {
        points: FlatPoints,
        color: Colors,
        #[serde(default)]
        fill: bool,
    },
    Polyline {
        points: FlatPoints,
        color: Color,
    },
    /// Free text shown in the viewer's message window for this frame.
    Message { message: String },
    /// Text shown when the cursor hovers the given area.
    Popup {
        #[serde(flatten)]
        area: PopupArea,
        text: String,
    },
    /// Switch layer and/or permanence for the commands that follow.
    Options {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        layer: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        permanent: Option<bool>,
    },
    /// Frame boundary.
    End,
}

impl Command {
    pub fn circle(center: impl Into<Point>, r: f64, color: Color, fill: bool) -> Self {
        Command::Circle {
            p: center.into(),
            r,
            color,
            fill,
        }
    }

    /// Rectangle from its top-left and bottom-right corners.
    ///
    /// `colors` is one colour or exactly four (one per corner).
    pub fn rectangle(
        tl: impl Into<Point>,
        br: impl Into<Point>,
        colors: impl Into<Colors>,
        fill: bool,
    ) -> Result<Self> {
        Ok(Command::Rectangle {
            tl: tl.into(),
            br: br.into(),
            color: colors.into().resolve(4)?,
            fill,
        })
    }

    /// `colors` is one colour or exactly three (one per vertex).
    pub fn triangle(
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
        colors: impl Into<Colors>,
        fill: bool,
    ) -> Result<Self> {
        Ok(Command::Triangle {
            points: FlatPoints(vec![p1.into(), p2.into(), p3.into()]),
            color: colors.into().resolve(3)?,
            fill,
        })
    }

    pub fn polyline<P: Into<Point>>(
        points: impl IntoIterator<Item = P>,
        color: Color,
    ) -> Result<Self> {
        let cmd = Command::Polyline {
            points: points.into_iter().collect(),
            color,
        };
        cmd.validate()?;
        Ok(cmd)
    }

    /// A single segment, sent as a two-point polyline.
    pub fn line(p1: impl Into<Point>, p2: impl Into<Point>, color: Color) -> Self {
        Command::Polyline {
            points: FlatPoints(vec![p1.into(), p2.into()]),
            color,
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Command::Message {
            message: text.into(),
        }
    }

    pub fn popup(center: impl Into<Point>, r: f64, text: impl Into<String>) -> Self {
        Command::Popup {
            area: PopupArea::Circle {
                p: center.into(),
                r,
            },
            text: text.into(),
        }
    }

    pub fn rect_popup(tl: impl Into<Point>, br: impl Into<Point>, text: impl Into<String>) -> Self {
        Command::Popup {
            area: PopupArea::Rect {
                tl: tl.into(),
                br: br.into(),
            },
            text: text.into(),
        }
    }

    pub fn options(layer: u32, permanent: bool) -> Result<Self> {
        check_layer(layer)?;
        Ok(Command::Options {
            layer: Some(layer),
            permanent: Some(permanent),
        })
    }

    pub fn end() -> Self {
        Command::End
    }

    /// Returns `true` for the frame boundary marker.
    pub fn is_end(&self) -> bool {
        matches!(self, Command::End)
    }
}

impl Primitive for Command {
    fn kind(&self) -> PrimitiveType {
        match self {
            Command::Circle { .. } => PrimitiveType::Circle,
            Command::Rectangle { .. } => PrimitiveType::Rectangle,
            Command::Triangle { .. } => PrimitiveType::Triangle,
            Command::Polyline { .. } => PrimitiveType::Polyline,
            Command::Message { .. } => PrimitiveType::Message,
            Command::Popup { .. } => PrimitiveType::Popup,
            Command::Options { .. } => PrimitiveType::Options,
            Command::End => PrimitiveType::End,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Command::Rectangle { color, .. } => color.check(4),
            Command::Triangle { points, color, .. } => {
                if points.len() != 3 {
                    return Err(RewindError::PointCountMismatch {
                        expected: 3,
                        actual: points.len(),
                    });
                }
                color.check(3)
            }
            Command::Polyline { points, .. } if points.len() < 2 => {
                if points.is_empty() {
                    Err(RewindError::MissingArgument("points"))
                } else {
                    Err(RewindError::TooFewPoints {
                        min: 2,
                        actual: points.len(),
                    })
                }
            }
            Command::Options {
                layer: Some(layer), ..
            } => check_layer(*layer),
            _ => Ok(()),
        }
    }
}
