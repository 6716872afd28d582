//! Receiver side: grouping decoded commands into frames.
//!
//! The viewer keeps every command it receives in a pending frame and only
//! renders that frame when an `end` marker arrives. [`FrameAssembler`]
//! models exactly that, which makes it the natural test double for
//! anything that talks to the viewer.

use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tracing::{debug, warn};

use crate::codec::CommandCodec;
use crate::error::Result;
use crate::primitive::PrimitiveType;

// ── Frame ────────────────────────────────────────────────────────

/// The commands received between two `end` markers, in arrival order.
/// The closing marker itself is not stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Zero-based position of this frame in the stream.
    pub index: u64,
    commands: Vec<Value>,
}

impl Frame {
    pub fn commands(&self) -> &[Value] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Tag of every command, `None` where the tag is missing or unknown.
    pub fn kinds(&self) -> impl Iterator<Item = Option<PrimitiveType>> + '_ {
        self.commands.iter().map(tag_of)
    }

    pub fn count(&self, kind: PrimitiveType) -> usize {
        self.kinds().filter(|k| *k == Some(kind)).count()
    }

    /// All `message` texts of the frame joined together, as the viewer
    /// shows them.
    pub fn message_text(&self) -> String {
        self.commands
            .iter()
            .filter(|v| tag_of(v) == Some(PrimitiveType::Message))
            .filter_map(|v| v["message"].as_str())
            .collect()
    }

    /// Decode every command into `T`.
    pub fn typed<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.commands
            .iter()
            .map(|v| Ok(serde_json::from_value(v.clone())?))
            .collect()
    }
}

fn tag_of(value: &Value) -> Option<PrimitiveType> {
    value["type"].as_str().and_then(|t| PrimitiveType::try_from(t).ok())
}

// ── FrameAssembler ───────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FrameAssembler {
    pending: Vec<Value>,
    completed: u64,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one decoded object. Returns the finished frame when `value`
    /// is an `end` marker.
    pub fn push(&mut self, value: Value) -> Option<Frame> {
        match tag_of(&value) {
            Some(PrimitiveType::End) => {
                let frame = Frame {
                    index: self.completed,
                    commands: std::mem::take(&mut self.pending),
                };
                self.completed += 1;
                debug!(index = frame.index, commands = frame.len(), "frame complete");
                Some(frame)
            }
            Some(_) => {
                self.pending.push(value);
                None
            }
            None => {
                warn!(%value, "command without a known type tag");
                self.pending.push(value);
                None
            }
        }
    }

    /// Commands received since the last `end`.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn frames_completed(&self) -> u64 {
        self.completed
    }
}

// ── FrameReader ──────────────────────────────────────────────────

/// Reads complete frames from any byte stream.
pub struct FrameReader<R> {
    inner: FramedRead<R, CommandCodec>,
    assembler: FrameAssembler,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: FramedRead::new(reader, CommandCodec::default()),
            assembler: FrameAssembler::new(),
        }
    }

    /// Wait for the next complete frame.
    ///
    /// Returns `Ok(None)` when the stream ends. Commands of an unfinished
    /// frame at that point are dropped, as the viewer would never show them.
    pub async fn next_frame(&mut self) -> Result<Option<Frame>> {
        while let Some(value) = self.inner.next().await {
            if let Some(frame) = self.assembler.push(value?) {
                return Ok(Some(frame));
            }
        }
        if self.assembler.pending() > 0 {
            warn!(
                commands = self.assembler.pending(),
                "stream closed with an unterminated frame"
            );
        }
        Ok(None)
    }

    pub fn pending(&self) -> usize {
        self.assembler.pending()
    }

    pub fn frames_completed(&self) -> u64 {
        self.assembler.frames_completed()
    }
}
