//! rewind: drive or impersonate a rewind-viewer.
//!
//! ```text
//! rewind demo                     Animate a scene in a running viewer
//! rewind demo --legacy            Same, in the older protocol revision
//! rewind listen                   Pretend to be the viewer and log frames
//! rewind --config <path> ...     Use custom config TOML
//! rewind --gen-config             Dump default config and exit
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rewind_core::{Framing, RewindClient};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rewind_cli::config::RewindConfig;
use rewind_cli::{demo, listen};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rewind", about = "rewind-viewer demo driver and stand-in")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "rewind.toml", global = true)]
    config: PathBuf,

    /// Viewer host (overrides config).
    #[arg(long, global = true)]
    host: Option<String>,

    /// Viewer port (overrides config).
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Terminate each command with a newline.
    #[arg(long, global = true)]
    newline: bool,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to a viewer and animate a synthetic scene.
    Demo {
        /// Frames to send; 0 runs until interrupted.
        #[arg(short, long)]
        frames: Option<u64>,

        /// Delay between frames in milliseconds.
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Use the older protocol revision.
        #[arg(long)]
        legacy: bool,
    },
    /// Accept clients like the viewer does and log every frame.
    Listen {
        /// Stop after this many frames.
        #[arg(long)]
        max_frames: Option<u64>,
    },
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.gen_config {
        let text = toml::to_string_pretty(&RewindConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let mut config = RewindConfig::load(&cli.config);
    if let Some(host) = cli.host {
        config.network.host = host;
    }
    if let Some(port) = cli.port {
        config.network.port = port;
    }
    if cli.newline {
        config.network.framing = Framing::NewlineDelimited;
    }

    // Init tracing.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("rewind v{}", env!("CARGO_PKG_VERSION"));

    match cli.command.unwrap_or(Command::Demo {
        frames: None,
        tick_ms: None,
        legacy: false,
    }) {
        Command::Demo {
            frames,
            tick_ms,
            legacy,
        } => {
            if let Some(frames) = frames {
                config.demo.frames = frames;
            }
            if let Some(tick_ms) = tick_ms {
                config.demo.tick_ms = tick_ms;
            }
            config.demo.legacy |= legacy;
            run_demo(&config).await?;
        }
        Command::Listen { max_frames } => {
            let listener = TcpListener::bind(config.bind_address()).await?;
            tokio::select! {
                result = listen::serve(listener, max_frames) => {
                    let frames = result?;
                    info!(frames, "listener finished");
                }
                _ = tokio::signal::ctrl_c() => info!("interrupted"),
            }
        }
    }

    Ok(())
}

async fn run_demo(config: &RewindConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client_config = config.client_config();
    let mut client = match RewindClient::connect(&client_config).await {
        Ok(client) => client,
        Err(e) => {
            error!("cannot reach viewer at {client_config}: {e}");
            return Err(e.into());
        }
    };
    info!(peer = ?client.peer_addr().ok(), legacy = config.demo.legacy, "connected");

    let outcome = tokio::select! {
        result = demo::run(&mut client, &config.demo) => result.map(Some),
        _ = tokio::signal::ctrl_c() => Ok(None),
    };
    client.close().await?;

    match outcome? {
        Some(frames) => info!(frames, "demo complete"),
        None => info!(frames = client.frames_sent(), "interrupted"),
    }
    Ok(())
}
