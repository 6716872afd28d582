//! Domain-specific error types for the rewind protocol.
//!
//! All fallible operations return `Result<T, RewindError>`.
//! Argument validation happens before any byte reaches the socket, so a
//! rejected call never leaves a half-written command on the stream.

use std::time::Duration;
use thiserror::Error;

/// Shorthand used throughout the crate.
pub type Result<T, E = RewindError> = std::result::Result<T, E>;

/// The canonical error type for the rewind client.
#[derive(Debug, Error)]
pub enum RewindError {
    // ── Connection Errors ────────────────────────────────────────
    /// The TCP connect or a later write failed.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// The connect attempt exceeded the configured deadline.
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),

    /// The client was already closed.
    #[error("client is closed")]
    Closed,

    // ── Construction Errors ──────────────────────────────────────
    /// Host was empty or whitespace.
    #[error("host must not be empty")]
    InvalidHost,

    /// Port was zero.
    #[error("port must be positive")]
    InvalidPort,

    // ── Argument Errors ──────────────────────────────────────────
    /// A layer index outside the range the viewer supports.
    #[error("layer {layer} out of range [{min}, {max}]")]
    LayerOutOfRange { layer: u32, min: u32, max: u32 },

    /// A per-vertex colour list whose length does not match the shape.
    #[error("expected 1 or {expected} colors, got {actual}")]
    ColorCountMismatch { expected: usize, actual: usize },

    /// A required collection was empty.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// A shape with a fixed vertex count got a different number of points.
    #[error("expected {expected} points, got {actual}")]
    PointCountMismatch { expected: usize, actual: usize },

    /// A polyline needs at least two points.
    #[error("too few points: need at least {min}, got {actual}")]
    TooFewPoints { min: usize, actual: usize },

    // ── Protocol Errors ──────────────────────────────────────────
    /// A numeric value or tag did not map to any known enum variant.
    #[error("unknown {type_name} value: {value}")]
    UnknownVariant { type_name: &'static str, value: String },

    /// The decoder buffered more than its limit without a complete object.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    // ── Serialization Errors ─────────────────────────────────────
    /// JSON encoding or decoding failed.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<serde_json::Error> for RewindError {
    fn from(e: serde_json::Error) -> Self {
        RewindError::Encoding(e.to_string())
    }
}

impl RewindError {
    /// Returns `true` for errors raised locally before any I/O.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidHost
                | Self::InvalidPort
                | Self::LayerOutOfRange { .. }
                | Self::ColorCountMismatch { .. }
                | Self::MissingArgument(_)
                | Self::PointCountMismatch { .. }
                | Self::TooFewPoints { .. }
        )
    }
}
