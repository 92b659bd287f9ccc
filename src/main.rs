//! # SBUS Bridge
//!
//! Decode SBUS RC receiver frames from a serial port and log channel
//! movements.
//!
//! The binary wires the protocol core to a tokio-serial transport: a
//! receive task pushes decoded frames onto a channel, and the main loop
//! suppresses byte-identical repeats before reporting them.

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use sbus_bridge::config::Config;
use sbus_bridge::sbus::protocol::SbusFrame;
use sbus_bridge::serial::{FrameDedup, SbusSerial};

/// Default configuration file path
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of decoded frames between status log messages
const LOG_INTERVAL_FRAMES: u64 = 1000;

/// Format one frame the way the receiver test rigs print them:
/// 16 right-aligned channel values, then switches and status flags.
fn dump_frame(frame: &SbusFrame) -> String {
    let mut out = String::with_capacity(96);
    for value in frame.channels.iter() {
        out.push_str(&format!("{:4} ", value));
    }
    out.push_str(&format!(
        "| {} {} {} {}",
        frame.switches[0] as u8,
        frame.switches[1] as u8,
        frame.frame_lost as u8,
        frame.failsafe as u8,
    ));
    out
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("SBUS Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration (path from argv, or the default file)
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    // Open the serial port with SBUS line settings (100000 baud, 8E2)
    let serial = SbusSerial::open(&config)?;
    info!("SBUS serial port opened at: {}", serial.device_path());

    // The receive task owns the synchronizer; frames arrive over a channel
    let (tx, mut rx) = mpsc::channel::<SbusFrame>(32);
    let receive_task = tokio::spawn(serial.run(tx));

    info!("Receiving SBUS frames (Ctrl+C to exit)");

    let mut dedup = FrameDedup::default();
    let mut frame_count: u64 = 0;
    let mut last_log_count: u64 = 0;

    loop {
        tokio::select! {
            maybe_frame = rx.recv() => {
                let Some(frame) = maybe_frame else {
                    // Receive task ended (port closed or failed)
                    break;
                };

                frame_count += 1;

                // Repeated frames mean no stick movement; skip them unless
                // suppression is disabled in the config.
                let delivered = if config.link.dedup {
                    dedup.push(frame)
                } else {
                    Some(frame)
                };
                if let Some(frame) = delivered {
                    info!("{}", dump_frame(&frame));
                } else {
                    debug!("suppressed repeated frame");
                }

                if frame_count - last_log_count >= LOG_INTERVAL_FRAMES {
                    info!("Decoded {} frames", frame_count);
                    last_log_count = frame_count;
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    rx.close();
    receive_task.abort();
    if let Ok(Err(e)) = receive_task.await {
        debug!("receive task ended with error: {}", e);
    }

    info!("Total frames decoded: {}", frame_count);
    Ok(())
}
