//! Opt-in process-wide client.
//!
//! Nothing in the crate touches this unless the application calls
//! [`default_client`]. The first call connects to `127.0.0.1:9111`;
//! concurrent first calls wait for that single attempt. A failed attempt
//! leaves the cell empty so a later call can try again.
//!
//! ```no_run
//! # async fn tick() -> rewind_core::Result<()> {
//! let client = rewind_core::network::shared::default_client().await?;
//! let mut client = client.lock().await;
//! client.message("tick").await?;
//! client.end_frame().await?;
//! # Ok(())
//! # }
//! ```

use tokio::sync::{Mutex, OnceCell};

use crate::error::{Result, RewindError};
use crate::network::client::RewindClient;
use crate::network::config::ClientConfig;

static DEFAULT_CLIENT: OnceCell<Mutex<RewindClient>> = OnceCell::const_new();

/// The shared client, connecting on first use.
///
/// The mutex serialises writers so commands from different tasks never
/// interleave mid-object. Frames from different tasks still interleave
/// unless each task holds the lock for the whole frame.
pub async fn default_client() -> Result<&'static Mutex<RewindClient>> {
    DEFAULT_CLIENT
        .get_or_try_init(|| async {
            let client = RewindClient::connect(&ClientConfig::default()).await?;
            Ok::<_, RewindError>(Mutex::new(client))
        })
        .await
}

/// Returns `true` once [`default_client`] has connected.
pub fn is_initialized() -> bool {
    DEFAULT_CLIENT.initialized()
}
