//! Lossy Link Demo
//!
//! One player entity crosses an emulated network to a hub and back:
//! - The player predicts every move locally and reconciles on acks
//! - The hub simulates moves ten times a second and broadcasts acks
//! - An observer interpolates the acks it receives
//!
//! Both directions drop, delay, and reorder datagrams. Run with
//! `RUST_LOG=trace` to follow every move.

use netmove_core::{AxisInput, EntityId, Pose, Vec3};
use netmove_hub::{Hub, HubConfig};
use netmove_netcode::{
    decode, encode, EmulatedLink, Envelope, Frame, LocalController, NetEntity,
    NetworkConditions, RemoteObserver, Role,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Session settings loaded from RON
#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    hub: HubConfig,
    uplink: NetworkConditions,
    downlink: NetworkConditions,
    seed: u64,
    frame_ms: u64,
    duration_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        let lossy = NetworkConditions {
            latency_ms: 80,
            jitter_ms: 40,
            loss: 0.1,
        };
        Self {
            hub: HubConfig::default(),
            uplink: lossy,
            downlink: lossy,
            seed: 42,
            frame_ms: 16,
            duration_ms: 6000,
        }
    }
}

const PLAYER: EntityId = EntityId(1);
const LOG_EVERY_MS: u64 = 1000;
/// Input stops here so the tail of the run shows the roles settling
const INPUT_UNTIL_MS: u64 = 4000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = load_config()?;
    config.hub.net.validate()?;
    let frame = Duration::from_millis(config.frame_ms);

    let mut hub = Hub::with_config(config.hub.clone());
    hub.spawn(PLAYER, Pose::default())?;

    let mut player = LocalController::new(Pose::default(), &config.hub.net);

    let (published_tx, published_rx) = mpsc::channel();
    let mut observer = NetEntity::new(
        PLAYER,
        Box::new(RemoteObserver::new(Pose::default(), &config.hub.net)),
    )
    .with_publish(move |_, pose| {
        let _ = published_tx.send(*pose);
    });

    let mut uplink = EmulatedLink::new(config.uplink, config.seed);
    let mut to_player = EmulatedLink::new(config.downlink, config.seed.wrapping_add(1));
    let mut to_observer = EmulatedLink::new(config.downlink, config.seed.wrapping_add(2));

    let mut observer_trail: Vec<Pose> = Vec::new();
    let mut elapsed_ms = 0;
    while elapsed_ms < config.duration_ms {
        elapsed_ms += config.frame_ms;

        // Player: predict and send
        let input = scripted_input(elapsed_ms);
        for packet in player.update(&Frame::with_input(frame, input)) {
            uplink.send(encode(&Envelope::new(PLAYER, packet))?);
        }

        // Hub: route arrived moves, broadcast acks on the interval
        for bytes in uplink.advance(frame) {
            if let Err(err) = hub.receive_bytes(&bytes) {
                tracing::warn!(error = %err, "Hub rejected datagram");
            }
        }
        for ack in hub.update(frame) {
            let bytes = encode(&ack)?;
            to_player.send(bytes.clone());
            to_observer.send(bytes);
        }

        // Player: reconcile
        for bytes in to_player.advance(frame) {
            let envelope = decode(&bytes)?;
            player.receive(&envelope.packet)?;
        }

        // Observer: buffer and blend
        for bytes in to_observer.advance(frame) {
            observer.receive(&decode(&bytes)?)?;
        }
        observer.update(&Frame::idle(frame));
        observer_trail.extend(published_rx.try_iter());

        if elapsed_ms % LOG_EVERY_MS < config.frame_ms {
            let stats = player.stats();
            tracing::info!(
                t_ms = elapsed_ms,
                sent = stats.sent_moves,
                acked = stats.acked_moves,
                pending = stats.pending_moves,
                corrections = stats.corrections,
                drift = player.current_pose().distance(&hub_pose(&hub)),
                "Session progress"
            );
        }
    }

    print_summary(
        &player,
        &hub,
        &observer,
        &observer_trail,
        [&uplink, &to_player, &to_observer],
    );
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,netmove_netcode=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

fn load_config() -> Result<DemoConfig, Box<dyn std::error::Error>> {
    // Try multiple paths for the data file
    let paths = [
        "demos/lossy_link/data/lossy_link.ron",
        "data/lossy_link.ron",
        "../data/lossy_link.ron",
    ];

    for path in &paths {
        if Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            tracing::info!(path = %path, "Loaded session config");
            return Ok(ron::from_str(&content)?);
        }
    }

    tracing::info!("No session config found, using defaults");
    Ok(DemoConfig::default())
}

/// Walk a curve, strafe, back up while looking down, then stand still
fn scripted_input(elapsed_ms: u64) -> AxisInput {
    match elapsed_ms {
        0..=1999 => AxisInput::new(1.0, 0.0, 1.5, 0.0),
        2000..=2999 => AxisInput::new(0.0, 0.5, 0.0, 0.0),
        3000..=INPUT_UNTIL_MS => AxisInput::new(-1.0, 0.0, 0.0, -0.5),
        _ => AxisInput::default(),
    }
}

fn hub_pose(hub: &Hub) -> Pose {
    hub.pose(PLAYER).unwrap_or_default()
}

fn print_summary(
    player: &LocalController,
    hub: &Hub,
    observer: &NetEntity,
    observer_trail: &[Pose],
    links: [&EmulatedLink; 3],
) {
    let stats = player.stats();
    let authority = hub_pose(hub);

    println!("=== Lossy link session ===");
    for (name, link) in ["uplink", "to player", "to observer"].iter().zip(links) {
        println!(
            "{:<12} sent {:>4}  dropped {:>3}  delivered {:>4}",
            name,
            link.sent(),
            link.dropped(),
            link.delivered()
        );
    }
    println!(
        "moves: sent {}, acked {}, pending {}",
        stats.sent_moves, stats.acked_moves, stats.pending_moves
    );
    println!(
        "corrections: {} (last moved {:.3})",
        stats.corrections, stats.last_correction_distance
    );
    println!("authority  {}", describe(&authority));
    println!("player     {}", describe(&player.current_pose()));
    println!("observer   {}", describe(&observer.current_pose()));

    let largest_step = observer_trail
        .windows(2)
        .map(|pair| pair[0].distance(&pair[1]))
        .fold(0.0_f32, f32::max);
    println!("observer largest per-frame step: {largest_step:.3}");
}

fn describe(pose: &Pose) -> String {
    let Vec3 { x, y, z } = pose.position;
    format!(
        "pos ({x:8.3}, {y:6.3}, {z:8.3})  yaw {:7.2}  pitch {:6.2}",
        pose.yaw, pose.pitch
    )
}
