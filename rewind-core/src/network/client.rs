//! The command emitter.
//!
//! Every drawing call encodes one command and awaits its write and flush
//! before returning; nothing is buffered between calls and no background
//! task is spawned. Commands only appear in the viewer once the frame is
//! closed with [`RewindClient::end_frame`].
//!
//! All operations take `&mut self`, so a client can only be driven by one
//! task at a time. To share one connection, wrap it in a mutex (see
//! [`crate::network::shared`]) or open one client per task.

use std::io;
use std::net::SocketAddr;

use futures::SinkExt;
use tokio::io::AsyncWrite;
use tokio::net::{TcpSocket, TcpStream};
use tokio_util::codec::FramedWrite;
use tracing::{debug, warn};

use crate::codec::{CommandCodec, Framing};
use crate::color::{Color, Colors};
use crate::command::Command;
use crate::error::{Result, RewindError};
use crate::geometry::Point;
use crate::network::config::ClientConfig;
use crate::primitive::{Primitive, PrimitiveType};

pub struct RewindClient<W = TcpStream> {
    sink: Option<FramedWrite<W, CommandCodec>>,
    commands_sent: u64,
    frames_sent: u64,
}

impl RewindClient<TcpStream> {
    /// Connect to the viewer described by `config`.
    ///
    /// Fails immediately if the host cannot be reached; there is no retry.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        debug!(addr = %config, framing = ?config.framing, "connecting to viewer");

        let stream = tokio::time::timeout(config.connect_timeout, open_stream(config))
            .await
            .map_err(|_| RewindError::Timeout(config.connect_timeout))??;

        debug!(peer = ?stream.peer_addr().ok(), "connected to viewer");
        Ok(Self::from_writer(stream, config.framing))
    }

    /// Connect to `127.0.0.1:9111` with default settings.
    pub async fn connect_default() -> Result<Self> {
        Self::connect(&ClientConfig::default()).await
    }

    pub async fn connect_to(host: &str, port: u16) -> Result<Self> {
        Self::connect(&ClientConfig::new(host, port)).await
    }

    pub fn peer_addr(&self) -> Result<SocketAddr> {
        let sink = self.sink.as_ref().ok_or(RewindError::Closed)?;
        Ok(sink.get_ref().peer_addr()?)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        let sink = self.sink.as_ref().ok_or(RewindError::Closed)?;
        Ok(sink.get_ref().local_addr()?)
    }
}

async fn open_stream(config: &ClientConfig) -> Result<TcpStream> {
    let mut last_err = None;
    for addr in tokio::net::lookup_host((config.host.as_str(), config.port)).await? {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        // Large buffers help bursty frames but are not required.
        if let Some(size) = config.send_buffer_size {
            if let Err(e) = socket.set_send_buffer_size(size) {
                warn!(size, error = %e, "could not set send buffer size");
            }
        }
        if let Some(size) = config.recv_buffer_size {
            if let Err(e) = socket.set_recv_buffer_size(size) {
                warn!(size, error = %e, "could not set receive buffer size");
            }
        }

        match socket.connect(addr).await {
            Ok(stream) => {
                stream.set_nodelay(config.nodelay)?;
                return Ok(stream);
            }
            Err(e) => {
                debug!(%addr, error = %e, "connect attempt failed");
                last_err = Some(e);
            }
        }
    }

    Err(last_err
        .unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::AddrNotAvailable, "host resolved to no addresses")
        })
        .into())
}

impl<W: AsyncWrite + Unpin> RewindClient<W> {
    /// Wrap an already-open writer.
    pub fn from_writer(writer: W, framing: Framing) -> Self {
        Self {
            sink: Some(FramedWrite::new(writer, CommandCodec::new(framing))),
            commands_sent: 0,
            frames_sent: 0,
        }
    }

    /// Validate, encode, write and flush one command.
    ///
    /// The codec rejects an invalid command before touching the stream. A
    /// write failure is returned as is; the frame in flight is lost.
    pub async fn send<P: Primitive>(&mut self, command: P) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(RewindError::Closed)?;
        let is_end = command.kind() == PrimitiveType::End;

        sink.send(command).await?;

        self.commands_sent += 1;
        if is_end {
            self.frames_sent += 1;
        }
        Ok(())
    }

    pub async fn circle(
        &mut self,
        center: impl Into<Point>,
        r: f64,
        color: Color,
        fill: bool,
    ) -> Result<()> {
        self.send(Command::circle(center, r, color, fill)).await
    }

    pub async fn fill_circle(
        &mut self,
        center: impl Into<Point>,
        r: f64,
        color: Color,
    ) -> Result<()> {
        self.circle(center, r, color, true).await
    }

    pub async fn rectangle(
        &mut self,
        tl: impl Into<Point>,
        br: impl Into<Point>,
        color: Color,
        fill: bool,
    ) -> Result<()> {
        self.rectangle_colors(tl, br, color, fill).await
    }

    /// Rectangle with one colour or one colour per corner.
    pub async fn rectangle_colors(
        &mut self,
        tl: impl Into<Point>,
        br: impl Into<Point>,
        colors: impl Into<Colors>,
        fill: bool,
    ) -> Result<()> {
        self.send(Command::rectangle(tl, br, colors, fill)?).await
    }

    pub async fn triangle(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        p3: impl Into<Point>,
        colors: impl Into<Colors>,
        fill: bool,
    ) -> Result<()> {
        self.send(Command::triangle(p1, p2, p3, colors, fill)?).await
    }

    pub async fn line(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        color: Color,
    ) -> Result<()> {
        self.send(Command::line(p1, p2, color)).await
    }

    pub async fn polyline<P: Into<Point>>(
        &mut self,
        points: impl IntoIterator<Item = P>,
        color: Color,
    ) -> Result<()> {
        self.send(Command::polyline(points, color)?).await
    }

    /// Text for the viewer's message window. May be called several times
    /// per frame; the pieces are concatenated.
    pub async fn message(&mut self, text: impl Into<String>) -> Result<()> {
        self.send(Command::message(text)).await
    }

    pub async fn popup(
        &mut self,
        center: impl Into<Point>,
        r: f64,
        text: impl Into<String>,
    ) -> Result<()> {
        self.send(Command::popup(center, r, text)).await
    }

    pub async fn rect_popup(
        &mut self,
        tl: impl Into<Point>,
        br: impl Into<Point>,
        text: impl Into<String>,
    ) -> Result<()> {
        self.send(Command::rect_popup(tl, br, text)).await
    }

    /// Select the layer and permanence for the commands that follow.
    ///
    /// `layer` must lie in `[1, 10]`; permanent commands stay on screen
    /// across frames.
    pub async fn options(&mut self, layer: u32, permanent: bool) -> Result<()> {
        self.send(Command::options(layer, permanent)?).await
    }

    pub async fn set_layer(&mut self, layer: u32) -> Result<()> {
        self.send(Command::Options {
            layer: Some(layer),
            permanent: None,
        })
        .await
    }

    pub async fn set_permanent(&mut self, permanent: bool) -> Result<()> {
        self.send(Command::Options {
            layer: None,
            permanent: Some(permanent),
        })
        .await
    }

    /// Close the current frame. Call once per tick of the driving program.
    pub async fn end_frame(&mut self) -> Result<()> {
        self.send(Command::End).await
    }

    /// Flush and shut down the writer. Later calls are no-ops.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut sink) = self.sink.take() {
            debug!(
                commands = self.commands_sent,
                frames = self.frames_sent,
                "closing viewer connection"
            );
            // The codec encodes several item types; any of them names the sink.
            SinkExt::<Command>::close(&mut sink).await?;
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }

    pub fn framing(&self) -> Option<Framing> {
        self.sink.as_ref().map(|s| s.encoder().framing())
    }

    /// Commands written since the client was created.
    pub fn commands_sent(&self) -> u64 {
        self.commands_sent
    }

    /// `end` markers written since the client was created.
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    pub fn get_ref(&self) -> Option<&W> {
        self.sink.as_ref().map(FramedWrite::get_ref)
    }
}

impl<W> std::fmt::Debug for RewindClient<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewindClient")
            .field("connected", &self.sink.is_some())
            .field("commands_sent", &self.commands_sent)
            .field("frames_sent", &self.frames_sent)
            .finish()
    }
}
