//! Logging stand-in for the viewer.
//!
//! Accepts one client at a time, like the viewer does, and logs every
//! frame once its `end` marker arrives.

use std::net::SocketAddr;

use rewind_core::{Frame, FrameReader, PrimitiveType, Result};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Serve clients until `max_frames` frames have been received in total
/// (forever when `None`). Returns the number of frames received.
pub async fn serve(listener: TcpListener, max_frames: Option<u64>) -> Result<u64> {
    info!(addr = ?listener.local_addr().ok(), "listening for clients");
    let mut total = 0;

    loop {
        let (stream, peer) = listener.accept().await?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!(%peer, error = %e, "could not set nodelay");
        }
        info!(%peer, "client connected");

        let mut reader = FrameReader::new(stream);
        loop {
            match reader.next_frame().await {
                Ok(Some(frame)) => {
                    log_frame(peer, &frame);
                    total += 1;
                    if max_frames.is_some_and(|max| total >= max) {
                        info!(frames = total, "frame limit reached");
                        return Ok(total);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(%peer, error = %e, "dropping client");
                    break;
                }
            }
        }
        info!(%peer, frames = reader.frames_completed(), "client disconnected");
    }
}

fn log_frame(peer: SocketAddr, frame: &Frame) {
    info!(%peer, frame = frame.index, commands = frame.len(), "{}", summarize(frame));
    let text = frame.message_text();
    if !text.is_empty() {
        debug!(frame = frame.index, "message: {}", text.trim_end());
    }
}

/// Per-tag command counts, e.g. `circle=3 polyline=1 message=1`.
pub fn summarize(frame: &Frame) -> String {
    let mut parts: Vec<String> = PrimitiveType::ALL
        .into_iter()
        .map(|kind| (kind, frame.count(kind)))
        .filter(|(_, n)| *n > 0)
        .map(|(kind, n)| format!("{kind}={n}"))
        .collect();

    let unknown = frame.kinds().filter(Option::is_none).count();
    if unknown > 0 {
        parts.push(format!("unknown={unknown}"));
    }
    if parts.is_empty() {
        return "empty".into();
    }
    parts.join(" ")
}
