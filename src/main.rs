//! # Gyropad
//!
//! Turn DualSense motion into analog stick input.
//!
//! This application reads the controller's gamepad and motion sensor nodes,
//! feeds them through the synthesis engine and polls the fused gamepad at a
//! fixed rate.

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use gyropad::config::Config;
use gyropad::controller::reader::{
    spawn_gamepad_reader, spawn_motion_reader, ReaderConfig, MOTION_CHANNEL_CAPACITY,
};
use gyropad::synth::source::{MonotonicClock, WatchedGamepad};
use gyropad::synth::{EngineSettings, SynthesisEngine};

/// Configuration file used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of polls between status log messages
const LOG_INTERVAL_POLLS: u64 = 600;

/// Main entry point for Gyropad
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (first argument, default `config/default.toml`)
///    - Start the gamepad and motion sensor reader threads
///
/// 2. **Main Loop**
///    - Drain pending motion samples into the engine
///    - Poll the engine at `rate_hz`
///    - Log status every 600 polls
///    - Handle Ctrl+C for graceful shutdown
///
/// # Errors
///
/// Returns error if the configuration cannot be loaded or a reader thread
/// cannot be started. Missing devices are not errors; readers keep retrying.
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO gyropad: Gyropad v0.1.0 starting...
/// INFO gyropad::controller::dualsense: Found DualSense MotionSensor node at: /dev/input/event21
/// INFO gyropad: Polling at 60Hz
/// INFO gyropad: 600 polls, axes [0.00, 0.00, 0.41, -0.12], indicator AlwaysOn
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Gyropad v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;
    info!("Configuration loaded from {}", config_path);

    let reconnect_ms = config.device.reconnect_interval_ms;
    let (pad_tx, pad_rx) = watch::channel(None);
    let (motion_tx, mut motion_rx) = mpsc::channel(MOTION_CHANNEL_CAPACITY);
    spawn_gamepad_reader(ReaderConfig::new(&config.device.gamepad_path, reconnect_ms), pad_tx)?;
    spawn_motion_reader(ReaderConfig::new(&config.device.motion_path, reconnect_ms), motion_tx)?;

    let mut engine = SynthesisEngine::new(
        EngineSettings::from(&config),
        Box::new(WatchedGamepad::new(pad_rx)),
        Box::new(MonotonicClock::new()),
    );

    let mut poll_interval = interval(poll_period(config.poll.rate_hz));
    poll_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Polling at {}Hz", config.poll.rate_hz);
    info!("Press Ctrl+C to exit");

    let mut poll_count: u64 = 0;

    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                let mut samples = 0u32;
                while let Ok(sample) = motion_rx.try_recv() {
                    engine.handle_rotation(sample);
                    samples += 1;
                }
                debug!("Applied {} motion samples", samples);

                let [pad] = engine.poll();
                poll_count += 1;

                if poll_count % LOG_INTERVAL_POLLS == 0 {
                    info!(
                        "{} polls, axes [{:.2}, {:.2}, {:.2}, {:.2}], indicator {:?}",
                        poll_count, pad.axes[0], pad.axes[1], pad.axes[2], pad.axes[3],
                        engine.indicator()
                    );
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!("Total polls: {}", poll_count);
                break;
            }
        }
    }

    Ok(())
}

/// Interval between polls for a rate in Hz
fn poll_period(rate_hz: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(rate_hz.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_interval_constant() {
        assert_eq!(LOG_INTERVAL_POLLS, 600);

        // At the default 60Hz, 600 polls = 10 seconds
        let seconds = LOG_INTERVAL_POLLS as f64 / 60.0;
        assert_eq!(seconds, 10.0, "Log interval should be 10 seconds at 60Hz");
    }

    #[test]
    fn test_poll_period_calculation() {
        assert_eq!(poll_period(60), Duration::from_micros(16_666));
        assert_eq!(poll_period(1000), Duration::from_millis(1));
        assert_eq!(poll_period(0), Duration::from_secs(1));
    }

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }
}
