//! Stream codec for rewind commands.
//!
//! The encoder writes each [`Primitive`] as one compact JSON object,
//! optionally followed by `\n`. The decoder is the receiving half: it
//! splits a byte stream back into JSON objects regardless of framing,
//! and copes with objects split across reads.

use bytes::{Buf, BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{trace, warn};

use crate::error::RewindError;
use crate::primitive::Primitive;

/// Upper bound on bytes buffered while waiting for one object to complete.
pub const MAX_FRAME_SIZE: usize = 1 << 20;

/// How consecutive objects are separated on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Framing {
    /// Objects back to back with nothing in between.
    #[default]
    Concatenated,
    /// Each object followed by a newline.
    NewlineDelimited,
}

#[derive(Debug, Clone)]
pub struct CommandCodec {
    framing: Framing,
    max_frame_size: usize,
}

impl CommandCodec {
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    pub fn with_max_frame_size(mut self, max: usize) -> Self {
        self.max_frame_size = max;
        self
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Drop bytes up to and including the next `}`, the same point at
    /// which the viewer's reader resynchronises.
    fn skip_garbage(src: &mut BytesMut) {
        match src.iter().position(|&b| b == b'}') {
            Some(i) => src.advance(i + 1),
            None => src.clear(),
        }
    }
}

impl Default for CommandCodec {
    fn default() -> Self {
        Self::new(Framing::default())
    }
}

impl<T: Primitive> tokio_util::codec::Encoder<T> for CommandCodec {
    type Error = RewindError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.validate()?;

        let json = serde_json::to_vec(&item)?;
        dst.reserve(json.len() + 1);
        dst.extend_from_slice(&json);
        if self.framing == Framing::NewlineDelimited {
            dst.put_u8(b'\n');
        }
        trace!(kind = %item.kind(), bytes = json.len(), "encoded command");
        Ok(())
    }
}

impl tokio_util::codec::Decoder for CommandCodec {
    type Item = Value;
    type Error = RewindError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let leading = src
                .iter()
                .position(|b| !b.is_ascii_whitespace())
                .unwrap_or(src.len());
            src.advance(leading);
            if src.is_empty() {
                return Ok(None);
            }

            let (next, consumed) = {
                let mut stream =
                    serde_json::Deserializer::from_slice(&src[..]).into_iter::<Value>();
                let next = stream.next();
                (next, stream.byte_offset())
            };
            match next {
                Some(Ok(value)) => {
                    src.advance(consumed);
                    if value.is_object() {
                        return Ok(Some(value));
                    }
                    warn!(%value, "skipping non-object value");
                }
                Some(Err(e)) if e.is_eof() => {
                    if src.len() > self.max_frame_size {
                        return Err(RewindError::FrameTooLarge {
                            size: src.len(),
                            max: self.max_frame_size,
                        });
                    }
                    return Ok(None);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "skipping malformed object");
                    Self::skip_garbage(src);
                }
                None => return Ok(None),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(value) => Ok(Some(value)),
            None => {
                if !src.is_empty() {
                    warn!(bytes = src.len(), "stream ended inside an object");
                    src.clear();
                }
                Ok(None)
            }
        }
    }
}

/// Decode one received object into a typed command.
pub fn decode_as<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T, RewindError> {
    Ok(serde_json::from_value(value)?)
}
