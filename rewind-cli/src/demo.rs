//! Synthetic scene for exercising a viewer.
//!
//! Objects orbit the centre of an 800x600 world; every tick sends one
//! complete frame. The first frame also lays down a permanent grid.

use std::f64::consts::TAU;
use std::time::Duration;

use rewind_core::command::check_layer;
use rewind_core::legacy::{AreaType, Facility, FacilityType, Side, Unit, UnitType};
use rewind_core::{Color, LegacyCommand, Result, RewindClient};
use tokio::io::AsyncWrite;
use tracing::{debug, info};

use crate::config::DemoConfig;

pub const WORLD_WIDTH: f64 = 800.0;
pub const WORLD_HEIGHT: f64 = 600.0;
const GRID_STEP: f64 = 100.0;
const ORBIT_RADIUS: f64 = 220.0;
const TRAIL_LEN: u64 = 12;

const PALETTE: [Color; 6] = [
    Color::RED,
    Color::GREEN,
    Color::BLUE,
    Color::rgb(0xFF, 0xC8, 0x00),
    Color::rgb(0xC0, 0x40, 0xFF),
    Color::rgb(0x00, 0xC8, 0xC8),
];

const UNIT_TYPES: [UnitType; 5] = [
    UnitType::Tank,
    UnitType::Ifv,
    UnitType::Arrv,
    UnitType::Helicopter,
    UnitType::Fighter,
];

/// Send `cfg.frames` frames (forever when 0), pacing them by `cfg.tick_ms`.
/// Returns the number of frames sent.
pub async fn run<W: AsyncWrite + Unpin>(
    client: &mut RewindClient<W>,
    cfg: &DemoConfig,
) -> Result<u64> {
    check_layer(cfg.layer)?;
    let mut interval = (cfg.tick_ms > 0)
        .then(|| tokio::time::interval(Duration::from_millis(cfg.tick_ms)));

    let mut tick = 0;
    while cfg.frames == 0 || tick < cfg.frames {
        if let Some(interval) = interval.as_mut() {
            interval.tick().await;
        }
        if cfg.legacy {
            draw_legacy_frame(client, tick, cfg).await?;
        } else {
            draw_frame(client, tick, cfg).await?;
        }
        tick += 1;
        if tick % 100 == 0 {
            debug!(tick, commands = client.commands_sent(), "demo progress");
        }
    }

    info!(frames = tick, commands = client.commands_sent(), "demo finished");
    Ok(tick)
}

/// Position of object `i` of `n` at `tick`.
pub fn orbit(tick: u64, i: u32, n: u32) -> (f64, f64) {
    let angle = tick as f64 * 0.03 + f64::from(i) * TAU / f64::from(n.max(1));
    (
        WORLD_WIDTH / 2.0 + ORBIT_RADIUS * angle.cos(),
        WORLD_HEIGHT / 2.0 + ORBIT_RADIUS * angle.sin(),
    )
}

fn palette(i: u32) -> Color {
    PALETTE[i as usize % PALETTE.len()]
}

/// One frame in the current protocol revision.
pub async fn draw_frame<W: AsyncWrite + Unpin>(
    client: &mut RewindClient<W>,
    tick: u64,
    cfg: &DemoConfig,
) -> Result<()> {
    if tick == 0 {
        client.options(1, true).await?;
        client
            .rectangle((0.0, 0.0), (WORLD_WIDTH, WORLD_HEIGHT), Color::GRAY, true)
            .await?;
        let mut x = GRID_STEP;
        while x < WORLD_WIDTH {
            client.line((x, 0.0), (x, WORLD_HEIGHT), Color::BLACK).await?;
            x += GRID_STEP;
        }
        let mut y = GRID_STEP;
        while y < WORLD_HEIGHT {
            client.line((0.0, y), (WORLD_WIDTH, y), Color::BLACK).await?;
            y += GRID_STEP;
        }
    }
    client.options(cfg.layer, false).await?;

    let (cx, cy) = (WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0);
    let spin = tick as f64 * 0.05;
    let corner = |k: f64| {
        let angle = spin + k * TAU / 3.0;
        (cx + 60.0 * angle.cos(), cy + 60.0 * angle.sin())
    };
    client
        .triangle(
            corner(0.0),
            corner(1.0),
            corner(2.0),
            [Color::RED, Color::GREEN, Color::BLUE],
            true,
        )
        .await?;
    client
        .rectangle_colors(
            (cx - 20.0, cy - 20.0),
            (cx + 20.0, cy + 20.0),
            [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE],
            true,
        )
        .await?;
    client
        .rect_popup((cx - 20.0, cy - 20.0), (cx + 20.0, cy + 20.0), "centre")
        .await?;

    for i in 0..cfg.objects {
        let p = orbit(tick, i, cfg.objects);
        client.circle(p, 10.0, palette(i), i % 2 == 0).await?;
    }

    if cfg.objects > 0 {
        // A polyline needs two points, so the trail starts on the second tick.
        if tick > 0 {
            let trail = (tick.saturating_sub(TRAIL_LEN)..=tick).map(|t| orbit(t, 0, cfg.objects));
            client.polyline(trail, Color::WHITE.with_alpha(0x80)).await?;
        }
        let (x, y) = orbit(tick, 0, cfg.objects);
        client
            .popup((x, y), 10.0, format!("object 0 at ({x:.1}, {y:.1})"))
            .await?;
    }

    client.message(format!("tick {tick}\nobjects {}\n", cfg.objects)).await?;
    client.end_frame().await
}

/// One frame in the older protocol revision: terrain, facilities and units.
pub async fn draw_legacy_frame<W: AsyncWrite + Unpin>(
    client: &mut RewindClient<W>,
    tick: u64,
    cfg: &DemoConfig,
) -> Result<()> {
    for (x, y, area_type) in [
        (1, 1, AreaType::Forest),
        (2, 4, AreaType::Swamp),
        (6, 2, AreaType::Rain),
    ] {
        client.send(LegacyCommand::area(x, y, area_type)).await?;
    }
    let clouds = (tick / 30 % 8) as i32;
    client.send(LegacyCommand::area(clouds, 5, AreaType::Cloud)).await?;

    let capture = (tick % 100) as i32;
    for (x, facility_type, enemy) in [
        (0, FacilityType::ControlCenter, Side::Ally),
        (7, FacilityType::VehicleFactory, Side::Enemy),
    ] {
        client
            .send(LegacyCommand::from(Facility {
                x,
                y: 0,
                facility_type,
                enemy,
                production: capture / 2,
                max_production: 50,
                capture,
                max_capture: 100,
            }))
            .await?;
    }

    for i in 0..cfg.objects {
        let (x, y) = orbit(tick, i, cfg.objects);
        let side = match i % 3 {
            0 => Side::Ally,
            1 => Side::Enemy,
            _ => Side::Neutral,
        };
        let max_hp = 100;
        let mut unit = Unit::new(x, y, 8.0, max_hp - (tick % max_hp as u64) as i32, max_hp, side);
        unit.unit_type = UNIT_TYPES[i as usize % UNIT_TYPES.len()];
        unit.course = (tick as f64 * 0.03 + f64::from(i) * TAU / f64::from(cfg.objects)) % TAU;
        unit.cooldown = 30;
        unit.rem_cooldown = (tick % 30) as i32;
        unit.selected = i == 0;
        client.send(LegacyCommand::from(unit)).await?;
    }

    let (cx, cy) = (WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0);
    client
        .send(LegacyCommand::circle(cx, cy, 30.0, Color::RED, cfg.layer))
        .await?;
    client
        .send(LegacyCommand::rectangle(
            cx - 50.0,
            cy - 50.0,
            cx + 50.0,
            cy + 50.0,
            Color::BLUE,
            cfg.layer,
        ))
        .await?;
    client
        .send(LegacyCommand::line(0.0, 0.0, cx, cy, Color::GREEN, cfg.layer))
        .await?;
    client
        .send(LegacyCommand::popup(cx, cy, 30.0, format!("tick {tick}")))
        .await?;
    client
        .send(LegacyCommand::message(format!("tick {tick}\nunits {}\n", cfg.objects)))
        .await?;
    client.send(LegacyCommand::End).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_core::{Frame, FrameReader, Framing, PrimitiveType, RewindError};

    async fn frames_of(bytes: &[u8]) -> Vec<Frame> {
        let mut reader = FrameReader::new(bytes);
        let mut frames = Vec::new();
        while let Some(frame) = reader.next_frame().await.unwrap() {
            frames.push(frame);
        }
        assert_eq!(reader.pending(), 0);
        frames
    }

    fn quick(frames: u64, legacy: bool) -> DemoConfig {
        DemoConfig {
            frames,
            tick_ms: 0,
            legacy,
            ..DemoConfig::default()
        }
    }

    #[test]
    fn orbit_stays_in_world() {
        for tick in [0, 1, 57, 1000] {
            for i in 0..8 {
                let (x, y) = orbit(tick, i, 8);
                assert!((0.0..=WORLD_WIDTH).contains(&x));
                assert!((0.0..=WORLD_HEIGHT).contains(&y));
            }
        }
        // Zero objects must not divide by zero.
        assert!(orbit(3, 0, 0).0.is_finite());
    }

    #[tokio::test]
    async fn sends_one_frame_per_tick() {
        let cfg = quick(5, false);
        let mut client = RewindClient::from_writer(Vec::new(), Framing::Concatenated);
        assert_eq!(run(&mut client, &cfg).await.unwrap(), 5);
        assert_eq!(client.frames_sent(), 5);

        let frames = frames_of(client.get_ref().unwrap()).await;
        assert_eq!(frames.len(), 5);
        assert_eq!(frames[3].count(PrimitiveType::Circle), cfg.objects as usize);
        assert_eq!(frames[3].message_text(), "tick 3\nobjects 8\n");
        // Only the first frame draws the permanent grid.
        assert!(frames[0].len() > frames[1].len());
        assert_eq!(frames[1].len(), frames[2].len());
    }

    #[tokio::test]
    async fn legacy_scene_uses_legacy_tags() {
        let cfg = quick(2, true);
        let mut client = RewindClient::from_writer(Vec::new(), Framing::NewlineDelimited);
        run(&mut client, &cfg).await.unwrap();

        let frames = frames_of(client.get_ref().unwrap()).await;
        assert_eq!(frames.len(), 2);
        let frame = &frames[1];
        assert_eq!(frame.count(PrimitiveType::Unit), cfg.objects as usize);
        assert_eq!(frame.count(PrimitiveType::Area), 4);
        assert_eq!(frame.count(PrimitiveType::Facility), 2);
        assert_eq!(frame.count(PrimitiveType::Line), 1);
        assert_eq!(frame.count(PrimitiveType::Polyline), 0);
    }

    #[tokio::test]
    async fn bad_layer_sends_nothing() {
        let cfg = DemoConfig {
            layer: 42,
            ..quick(3, false)
        };
        let mut client = RewindClient::from_writer(Vec::new(), Framing::Concatenated);
        let err = run(&mut client, &cfg).await.unwrap_err();
        assert!(matches!(err, RewindError::LayerOutOfRange { layer: 42, .. }));
        assert!(client.get_ref().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_objects_still_closes_frames() {
        let cfg = DemoConfig {
            objects: 0,
            ..quick(2, false)
        };
        let mut client = RewindClient::from_writer(Vec::new(), Framing::Concatenated);
        run(&mut client, &cfg).await.unwrap();
        let frames = frames_of(client.get_ref().unwrap()).await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].count(PrimitiveType::Circle), 0);
    }
}
