//! TCP transport: connection settings, the client, and the opt-in
//! process-wide default client.

pub mod client;
pub mod config;
pub mod shared;

pub use client::RewindClient;
pub use config::{ClientConfig, DEFAULT_HOST, DEFAULT_PORT};
