//! # rewind-cli
//!
//! Command-line companion to `rewind-core`:
//! - `rewind demo` connects to a running viewer and animates a synthetic
//!   scene, one frame per tick.
//! - `rewind listen` stands in for the viewer, logging every completed
//!   frame it receives.

pub mod config;
pub mod demo;
pub mod listen;
