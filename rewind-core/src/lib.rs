//! # rewind-core
//!
//! Client library for rewind-viewer, a tool that replays what a game
//! strategy draws tick by tick.
//!
//! This crate contains:
//! - **Protocol types**: `Color`, `Colors`, `Point`, `PrimitiveType`
//! - **Commands**: `Command` for the current protocol revision and
//!   `LegacyCommand` for the older one
//! - **Codec**: `CommandCodec` for framed TCP I/O via `tokio_util`
//! - **Network**: `RewindClient`, the command emitter, plus an opt-in
//!   shared default client
//! - **Frame**: `FrameAssembler` / `FrameReader` for the receiving side
//! - **Error**: `RewindError`, the typed `thiserror`-based error hierarchy
//!
//! ```no_run
//! use rewind_core::{Color, RewindClient};
//!
//! # async fn run() -> rewind_core::Result<()> {
//! let mut rewind = RewindClient::connect_default().await?;
//! rewind.circle((10.0, 20.0), 5.0, Color::GREEN, true).await?;
//! rewind.message("tick 1").await?;
//! rewind.end_frame().await?;
//! rewind.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod color;
pub mod command;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod legacy;
pub mod network;
pub mod primitive;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::{CommandCodec, Framing, MAX_FRAME_SIZE};
pub use color::{Color, Colors};
pub use command::{Command, DEFAULT_LAYER, LAYER_MAX, LAYER_MIN, PopupArea};
pub use error::{Result, RewindError};
pub use frame::{Frame, FrameAssembler, FrameReader};
pub use geometry::{FlatPoints, Point};
pub use legacy::LegacyCommand;
pub use network::{ClientConfig, DEFAULT_HOST, DEFAULT_PORT, RewindClient};
pub use primitive::{Primitive, PrimitiveType};
