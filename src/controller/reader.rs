//! # Device Reader Module
//!
//! Blocking reader threads that own one DualSense node each and forward
//! mapped input to the async poll loop.
//!
//! | Reader | Channel | Semantics |
//! |--------|---------|-----------|
//! | Gamepad | `watch` | latest frame, `None` while disconnected |
//! | Motion | `mpsc` | every sample, drained before each poll |
//!
//! Readers retry discovery every `reconnect_interval` and exit when the
//! receiving side is dropped.

use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::dualsense::DualSenseDevice;
use super::mapper::{GamepadMapper, MotionMapper};
use crate::error::{GyropadError, Result};
use crate::synth::types::{RawGamepad, RotationSample};

/// Capacity of the rotation sample channel.
pub const MOTION_CHANNEL_CAPACITY: usize = 1024;

/// Reader settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Explicit event node, `None` to auto-detect.
    pub path: Option<String>,
    /// Delay between discovery attempts.
    pub reconnect_interval: Duration,
}

impl ReaderConfig {
    /// Builds reader settings; an empty path means auto-detect.
    #[must_use]
    pub fn new(path: &str, reconnect_interval_ms: u64) -> Self {
        Self {
            path: (!path.is_empty()).then(|| path.to_string()),
            reconnect_interval: Duration::from_millis(reconnect_interval_ms),
        }
    }
}

/// Why a connected reader stopped reading.
enum ReadEnd {
    Disconnected(GyropadError),
    ReceiverDropped,
}

/// Spawns the gamepad reader thread
///
/// # Errors
///
/// Returns `Io` error if the thread cannot be spawned
pub fn spawn_gamepad_reader(
    config: ReaderConfig,
    tx: watch::Sender<Option<RawGamepad>>,
) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("gamepad-reader".to_string())
        .spawn(move || run_gamepad_reader(&config, &tx))?;
    Ok(handle)
}

/// Spawns the motion sensor reader thread
///
/// # Errors
///
/// Returns `Io` error if the thread cannot be spawned
pub fn spawn_motion_reader(
    config: ReaderConfig,
    tx: mpsc::Sender<RotationSample>,
) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("motion-reader".to_string())
        .spawn(move || run_motion_reader(&config, &tx))?;
    Ok(handle)
}

fn run_gamepad_reader(config: &ReaderConfig, tx: &watch::Sender<Option<RawGamepad>>) {
    let mut mapper = GamepadMapper::new();
    loop {
        match DualSenseDevice::open_gamepad(config.path.as_deref()) {
            Ok(mut device) => {
                log_connected(&device);
                let end = read_gamepad(&mut device, &mut mapper, tx);
                // Held buttons must not survive into the next connection
                mapper.reset();
                // Report absence so the engine leaves passthrough
                if tx.send(None).is_err() {
                    return;
                }
                match end {
                    ReadEnd::Disconnected(e) => warn!("Gamepad disconnected: {}", e),
                    ReadEnd::ReceiverDropped => return,
                }
            }
            Err(e) => debug!("Gamepad not available: {}", e),
        }

        if tx.is_closed() {
            return;
        }
        thread::sleep(config.reconnect_interval);
    }
}

fn read_gamepad(
    device: &mut DualSenseDevice,
    mapper: &mut GamepadMapper,
    tx: &watch::Sender<Option<RawGamepad>>,
) -> ReadEnd {
    loop {
        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(e) => return ReadEnd::Disconnected(e),
        };
        for event in events {
            if mapper.process_event(&event) && tx.send(Some(mapper.gamepad())).is_err() {
                return ReadEnd::ReceiverDropped;
            }
        }
    }
}

fn run_motion_reader(config: &ReaderConfig, tx: &mpsc::Sender<RotationSample>) {
    loop {
        match DualSenseDevice::open_motion_sensor(config.path.as_deref()) {
            Ok(mut device) => {
                log_connected(&device);
                match read_motion(&mut device, tx) {
                    ReadEnd::Disconnected(e) => warn!("Motion sensor disconnected: {}", e),
                    ReadEnd::ReceiverDropped => return,
                }
            }
            Err(e) => debug!("Motion sensor not available: {}", e),
        }

        if tx.is_closed() {
            return;
        }
        thread::sleep(config.reconnect_interval);
    }
}

fn log_connected(device: &DualSenseDevice) {
    info!(
        "{:?} connected: {} ({})",
        device.kind(),
        device.name().unwrap_or("unknown"),
        device.device_path()
    );
}

fn read_motion(device: &mut DualSenseDevice, tx: &mpsc::Sender<RotationSample>) -> ReadEnd {
    let mut mapper = MotionMapper::new();
    loop {
        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(e) => return ReadEnd::Disconnected(e),
        };
        for event in events {
            if let Some(sample) = mapper.process_event(&event) {
                if tx.blocking_send(sample).is_err() {
                    return ReadEnd::ReceiverDropped;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_config_auto_detect() {
        let config = ReaderConfig::new("", 1000);
        assert_eq!(config.path, None);
        assert_eq!(config.reconnect_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_reader_config_explicit_path() {
        let config = ReaderConfig::new("/dev/input/event7", 250);
        assert_eq!(config.path.as_deref(), Some("/dev/input/event7"));
        assert_eq!(config.reconnect_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_gamepad_reader_exits_when_receiver_dropped() {
        let (tx, rx) = watch::channel(None);
        drop(rx);
        let config = ReaderConfig::new("/nonexistent/event99", 1);
        let handle = spawn_gamepad_reader(config, tx).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_motion_reader_exits_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(MOTION_CHANNEL_CAPACITY);
        drop(rx);
        let config = ReaderConfig::new("/nonexistent/event99", 1);
        let handle = spawn_motion_reader(config, tx).unwrap();
        handle.join().unwrap();
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_motion_reader_with_real_hardware() {
        let (tx, mut rx) = mpsc::channel(MOTION_CHANNEL_CAPACITY);
        let _handle = spawn_motion_reader(ReaderConfig::new("", 1000), tx).unwrap();

        let sample = rx.blocking_recv().expect("No motion sample received");
        assert!(sample.alpha.is_some());
    }
}
