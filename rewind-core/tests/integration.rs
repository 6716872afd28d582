//! Integration tests: client against a stand-in viewer over a real TCP
//! connection on localhost.

use std::time::Duration;

use rewind_core::legacy::{AreaType, Side, Unit};
use rewind_core::{
    ClientConfig, Color, Command, Frame, FrameReader, Framing, LegacyCommand, PrimitiveType,
    RewindClient, RewindError,
};
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

// ── Helpers ──────────────────────────────────────────────────────

/// Listener on an OS-assigned port plus a config pointing at it.
async fn ephemeral_listener() -> (TcpListener, ClientConfig) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = ClientConfig::new(addr.ip().to_string(), addr.port());
    (listener, config)
}

/// Connect a client and accept the matching server-side stream.
async fn connected_pair(framing: Framing) -> (RewindClient, TcpStream) {
    let (listener, config) = ephemeral_listener().await;
    let config = config.with_framing(framing);
    let client_handle = tokio::spawn(async move { RewindClient::connect(&config).await.unwrap() });
    let (stream, _) = listener.accept().await.unwrap();
    (client_handle.await.unwrap(), stream)
}

async fn read_to_end(mut stream: TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("timeout")
        .unwrap();
    buf
}

async fn next_frame(reader: &mut FrameReader<TcpStream>) -> Option<Frame> {
    tokio::time::timeout(Duration::from_secs(5), reader.next_frame())
        .await
        .expect("timeout")
        .unwrap()
}

fn parse_all(bytes: &[u8]) -> Vec<Value> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<Value>()
        .map(Result::unwrap)
        .collect()
}

// ── Wire format ──────────────────────────────────────────────────

#[tokio::test]
async fn test_circle_then_end_reaches_viewer() {
    let (mut client, server) = connected_pair(Framing::Concatenated).await;

    client
        .circle((10.0, 20.0), 5.0, Color::argb(255, 0, 255, 0), true)
        .await
        .unwrap();
    client.end_frame().await.unwrap();
    client.close().await.unwrap();

    let bytes = read_to_end(server).await;
    let expected = format!(
        r#"{{"type":"circle","p":[10.0,20.0],"r":5.0,"color":{},"fill":true}}{{"type":"end"}}"#,
        0xFF00_FF00u32
    );
    assert_eq!(String::from_utf8(bytes).unwrap(), expected);
}

#[tokio::test]
async fn test_every_primitive_is_one_tagged_object() {
    let (mut client, server) = connected_pair(Framing::NewlineDelimited).await;

    client.circle((0.0, 0.0), 1.0, Color::RED, false).await.unwrap();
    client.fill_circle((1.0, 1.0), 2.0, Color::BLUE).await.unwrap();
    client
        .rectangle((0.0, 0.0), (4.0, 4.0), Color::GREEN, true)
        .await
        .unwrap();
    client
        .triangle((0.0, 0.0), (1.0, 0.0), (0.0, 1.0), Color::GRAY, false)
        .await
        .unwrap();
    client
        .polyline([(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], Color::WHITE)
        .await
        .unwrap();
    client.line((0.0, 0.0), (9.0, 9.0), Color::BLACK).await.unwrap();
    client.message("hello").await.unwrap();
    client.popup((3.0, 3.0), 1.5, "round").await.unwrap();
    client.rect_popup((0.0, 0.0), (2.0, 2.0), "square").await.unwrap();
    client.options(5, true).await.unwrap();
    client.end_frame().await.unwrap();
    client.close().await.unwrap();

    let bytes = read_to_end(server).await;
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let expected_tags = [
        "circle", "circle", "rectangle", "triangle", "polyline", "polyline", "message", "popup",
        "popup", "options", "end",
    ];
    assert_eq!(lines.len(), expected_tags.len());
    for (line, tag) in lines.iter().zip(expected_tags) {
        let v: Value = serde_json::from_str(line).unwrap();
        assert!(v.is_object());
        assert_eq!(v["type"], tag);
    }
}

#[tokio::test]
async fn test_color_argument_shapes() {
    let (mut client, server) = connected_pair(Framing::Concatenated).await;

    client
        .rectangle_colors((0.0, 0.0), (1.0, 1.0), [Color::RED], false)
        .await
        .unwrap();
    client
        .rectangle_colors(
            (0.0, 0.0),
            (1.0, 1.0),
            [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE],
            true,
        )
        .await
        .unwrap();
    let err = client
        .rectangle_colors((0.0, 0.0), (1.0, 1.0), [Color::RED, Color::GREEN], true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RewindError::ColorCountMismatch {
            expected: 4,
            actual: 2
        }
    ));
    client.close().await.unwrap();

    let values = parse_all(&read_to_end(server).await);
    assert_eq!(values.len(), 2);
    assert_eq!(values[0]["color"], json!(Color::RED.pack()));
    assert_eq!(values[1]["color"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_rejected_options_emit_nothing() {
    let (mut client, server) = connected_pair(Framing::Concatenated).await;

    assert!(client.options(0, true).await.unwrap_err().is_argument_error());
    assert!(client.options(11, false).await.is_err());
    client.options(1, false).await.unwrap();
    client.options(10, true).await.unwrap();
    client.close().await.unwrap();

    let values = parse_all(&read_to_end(server).await);
    assert_eq!(
        values,
        vec![
            json!({"type":"options","layer":1,"permanent":false}),
            json!({"type":"options","layer":10,"permanent":true}),
        ]
    );
}

#[tokio::test]
async fn test_message_text_is_escaped_on_the_wire() {
    let (mut client, server) = connected_pair(Framing::Concatenated).await;
    let nasty = "quote \" backslash \\ brace } newline \n tab \t";

    client.message(nasty).await.unwrap();
    client.end_frame().await.unwrap();
    client.close().await.unwrap();

    let values = parse_all(&read_to_end(server).await);
    assert_eq!(values[0]["message"], nasty);
    assert_eq!(values[1], json!({"type":"end"}));
}

// ── Frames ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_draws_followed_by_end_form_one_frame() {
    let (mut client, server) = connected_pair(Framing::Concatenated).await;
    let mut reader = FrameReader::new(server);

    const N: usize = 25;
    for i in 0..N {
        client
            .circle((i as f64, i as f64), 1.0, Color::RED, false)
            .await
            .unwrap();
    }
    client.end_frame().await.unwrap();

    let frame = next_frame(&mut reader).await.expect("frame");
    assert_eq!(frame.index, 0);
    assert_eq!(frame.len(), N);
    assert_eq!(frame.count(PrimitiveType::Circle), N);
    assert_eq!(reader.pending(), 0);

    // Draws without an end are never delivered as a frame.
    client.message("unfinished").await.unwrap();
    client.close().await.unwrap();
    assert!(next_frame(&mut reader).await.is_none());
    assert_eq!(reader.frames_completed(), 1);
}

#[tokio::test]
async fn test_frames_arrive_in_order() {
    let (mut client, server) = connected_pair(Framing::NewlineDelimited).await;
    let mut reader = FrameReader::new(server);

    for tick in 0..5u32 {
        client.message(format!("tick {tick}")).await.unwrap();
        for _ in 0..tick {
            client.line((0.0, 0.0), (1.0, 1.0), Color::GREEN).await.unwrap();
        }
        client.end_frame().await.unwrap();
    }
    // An empty frame is still a frame.
    client.end_frame().await.unwrap();
    assert_eq!(client.frames_sent(), 6);
    client.close().await.unwrap();

    for tick in 0..5u32 {
        let frame = next_frame(&mut reader).await.unwrap();
        assert_eq!(frame.index, tick as u64);
        assert_eq!(frame.message_text(), format!("tick {tick}"));
        assert_eq!(frame.count(PrimitiveType::Polyline), tick as usize);
    }
    let last = next_frame(&mut reader).await.unwrap();
    assert!(last.is_empty());
    assert!(next_frame(&mut reader).await.is_none());
}

#[tokio::test]
async fn test_typed_frame_roundtrip() {
    let (mut client, server) = connected_pair(Framing::Concatenated).await;
    let mut reader = FrameReader::new(server);

    client
        .triangle(
            (0.0, 0.0),
            (2.0, 0.0),
            (1.0, 2.0),
            [Color::RED, Color::GREEN, Color::BLUE],
            true,
        )
        .await
        .unwrap();
    client.set_layer(7).await.unwrap();
    client.set_permanent(true).await.unwrap();
    client.end_frame().await.unwrap();

    let frame = next_frame(&mut reader).await.unwrap();
    let cmds: Vec<Command> = frame.typed().unwrap();
    assert_eq!(
        cmds,
        vec![
            Command::triangle(
                (0.0, 0.0),
                (2.0, 0.0),
                (1.0, 2.0),
                [Color::RED, Color::GREEN, Color::BLUE],
                true
            )
            .unwrap(),
            Command::Options {
                layer: Some(7),
                permanent: None
            },
            Command::Options {
                layer: None,
                permanent: Some(true)
            },
        ]
    );
}

#[tokio::test]
async fn test_legacy_commands_over_tcp() {
    let (mut client, server) = connected_pair(Framing::Concatenated).await;

    client
        .send(LegacyCommand::area(0, 0, AreaType::Cloud))
        .await
        .unwrap();
    client
        .send(LegacyCommand::from(Unit::new(1.0, 2.0, 3.0, 40, 100, Side::Enemy)))
        .await
        .unwrap();
    client.send(LegacyCommand::End).await.unwrap();
    assert_eq!(client.frames_sent(), 1);
    client.close().await.unwrap();

    let values = parse_all(&read_to_end(server).await);
    assert_eq!(values[0], json!({"type":"area","x":0,"y":0,"area_type":4}));
    assert_eq!(values[1]["type"], "unit");
    assert_eq!(values[1]["enemy"], 1);
    assert_eq!(values[2], json!({"type":"end"}));
}

// ── Lifecycle & errors ───────────────────────────────────────────

#[tokio::test]
async fn test_close_twice_closes_once() {
    let (mut client, server) = connected_pair(Framing::Concatenated).await;
    assert!(client.is_connected());
    assert!(client.peer_addr().is_ok());

    client.close().await.unwrap();
    client.close().await.unwrap();
    assert!(!client.is_connected());
    assert!(matches!(client.peer_addr(), Err(RewindError::Closed)));

    // Server sees a clean EOF with nothing written.
    assert!(read_to_end(server).await.is_empty());
}

#[tokio::test]
async fn test_drop_releases_socket() {
    let (mut client, server) = connected_pair(Framing::Concatenated).await;
    client.end_frame().await.unwrap();
    drop(client);

    let values = parse_all(&read_to_end(server).await);
    assert_eq!(values, vec![json!({"type":"end"})]);
}

#[tokio::test]
async fn test_connect_failure_surfaces_immediately() {
    let (listener, config) = ephemeral_listener().await;
    drop(listener);

    let err = RewindClient::connect(&config).await.unwrap_err();
    assert!(matches!(err, RewindError::Connection(_)), "got {err:?}");
}

#[tokio::test]
async fn test_write_after_peer_closed_errors() {
    let (mut client, server) = connected_pair(Framing::Concatenated).await;
    drop(server);

    // The first writes may still be accepted by the local stack; a reset
    // from the peer turns a later one into an error.
    let result = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Err(e) = client.message("anyone there?").await {
                return e;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("write never failed");
    assert!(matches!(result, RewindError::Connection(_)));
    // The client is not closed by a transport failure.
    assert!(client.is_connected());
}
