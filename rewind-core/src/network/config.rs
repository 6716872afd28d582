use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::Framing;
use crate::error::{Result, RewindError};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9111;

/// Socket buffer size suggested for the viewer link.
pub const DEFAULT_BUFFER_SIZE: u32 = 1 << 20;

/// Where and how to connect to the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub framing: Framing,
    /// Disable Nagle's algorithm so each command leaves immediately.
    pub nodelay: bool,
    pub send_buffer_size: Option<u32>,
    pub recv_buffer_size: Option<u32>,
    #[serde(with = "millis")]
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            framing: Framing::default(),
            nodelay: true,
            send_buffer_size: Some(DEFAULT_BUFFER_SIZE),
            recv_buffer_size: Some(DEFAULT_BUFFER_SIZE),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    pub fn with_buffer_sizes(mut self, send: Option<u32>, recv: Option<u32>) -> Self {
        self.send_buffer_size = send;
        self.recv_buffer_size = recv;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Reject an empty host or a zero port.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(RewindError::InvalidHost);
        }
        if self.port == 0 {
            return Err(RewindError::InvalidPort);
        }
        Ok(())
    }
}

impl fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}
