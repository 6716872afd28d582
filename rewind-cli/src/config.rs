//! CLI configuration.

use std::path::Path;
use std::time::Duration;

use rewind_core::{ClientConfig, DEFAULT_HOST, DEFAULT_LAYER, DEFAULT_PORT, Framing};
use serde::{Deserialize, Serialize};

/// Top-level configuration for the `rewind` binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewindConfig {
    /// Viewer endpoint.
    pub network: NetworkConfig,
    /// Synthetic scene settings.
    pub demo: DemoConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Viewer endpoint. `listen` binds it, `demo` connects to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
    /// "concatenated" or "newline_delimited".
    pub framing: Framing,
    pub nodelay: bool,
    /// Connect timeout in milliseconds.
    pub timeout_ms: u64,
}

/// Synthetic scene settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of frames to send; 0 runs until interrupted.
    pub frames: u64,
    /// Delay between frames in milliseconds.
    pub tick_ms: u64,
    /// Speak the older protocol revision (units, areas, facilities).
    pub legacy: bool,
    /// Layer for the moving objects.
    pub layer: u32,
    /// Number of orbiting objects.
    pub objects: u32,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level, overridden by `RUST_LOG`.
    pub level: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            framing: Framing::default(),
            nodelay: true,
            timeout_ms: 5000,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            tick_ms: 16,
            legacy: false,
            layer: DEFAULT_LAYER,
            objects: 8,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl RewindConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write default config to a file.
    pub fn write_default(path: &Path) -> std::io::Result<()> {
        let text = toml::to_string_pretty(&Self::default()).map_err(std::io::Error::other)?;
        std::fs::write(path, text)
    }

    /// Client settings for the `[network]` section.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.network.host.clone(), self.network.port)
            .with_framing(self.network.framing)
            .with_nodelay(self.network.nodelay)
            .with_connect_timeout(Duration::from_millis(self.network.timeout_ms))
    }

    /// `host:port` for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.network.host, self.network.port)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let text = toml::to_string_pretty(&RewindConfig::default()).unwrap();
        assert!(text.contains("[network]"));
        assert!(text.contains("framing = \"concatenated\""));
        assert!(text.contains("tick_ms"));
    }

    #[test]
    fn roundtrip_config() {
        let text = toml::to_string_pretty(&RewindConfig::default()).unwrap();
        let parsed: RewindConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.network.port, 9111);
        assert_eq!(parsed.network.host, "127.0.0.1");
        assert_eq!(parsed.demo.layer, DEFAULT_LAYER);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let parsed: RewindConfig = toml::from_str(
            r#"
            [network]
            port = 9200
            framing = "newline_delimited"

            [demo]
            legacy = true
            "#,
        )
        .unwrap();
        assert_eq!(parsed.network.port, 9200);
        assert_eq!(parsed.network.host, DEFAULT_HOST);
        assert_eq!(parsed.network.framing, Framing::NewlineDelimited);
        assert!(parsed.demo.legacy);
        assert_eq!(parsed.demo.frames, 600);
    }

    #[test]
    fn client_config_follows_network_section() {
        let mut cfg = RewindConfig::default();
        cfg.network.port = 9300;
        cfg.network.timeout_ms = 250;
        let client = cfg.client_config();
        assert_eq!(client.port, 9300);
        assert_eq!(client.connect_timeout, Duration::from_millis(250));
        assert_eq!(cfg.bind_address(), "127.0.0.1:9300");
    }

    #[test]
    fn missing_file_falls_back() {
        let cfg = RewindConfig::load(Path::new("/nonexistent/rewind.toml"));
        assert_eq!(cfg.network.port, DEFAULT_PORT);
    }

    #[test]
    fn write_then_load() {
        let path = std::env::temp_dir().join(format!("rewind-cfg-{}.toml", std::process::id()));
        RewindConfig::write_default(&path).unwrap();
        let cfg = RewindConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.demo.objects, 8);
    }
}
