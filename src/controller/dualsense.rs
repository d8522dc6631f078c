//! # DualSense Device Module
//!
//! Discovery and connection of PS5 DualSense input nodes using the Linux
//! evdev interface.
//!
//! ## Device Detection
//!
//! The kernel exposes one controller as several event nodes, all with:
//! - Vendor ID: 0x054c (Sony)
//! - Product ID: 0x0ce6 (DualSense, both wired and Bluetooth)
//!
//! | Node | Name suffix | Used for |
//! |------|-------------|----------|
//! | Gamepad | (none) | sticks, triggers, buttons |
//! | Motion sensor | `Motion Sensors` | gyroscope |
//! | Touchpad | `Touchpad` | not used |

use evdev::Device;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{GyropadError, Result};

/// PS5 DualSense vendor ID (Sony)
const DUALSENSE_VENDOR_ID: u16 = 0x054c;

/// PS5 DualSense product ID (wired and Bluetooth)
const DUALSENSE_PRODUCT_ID: u16 = 0x0ce6;

const MOTION_SUFFIX: &str = "Motion Sensors";
const TOUCHPAD_SUFFIX: &str = "Touchpad";

/// Which DualSense event node to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Buttons, sticks and triggers.
    Gamepad,
    /// Gyroscope and accelerometer.
    MotionSensor,
}

impl NodeKind {
    /// True when a DualSense node with this device name is of this kind.
    #[must_use]
    pub fn matches_name(self, name: &str) -> bool {
        let name = name.trim_end();
        match self {
            NodeKind::Gamepad => !name.ends_with(MOTION_SUFFIX) && !name.ends_with(TOUCHPAD_SUFFIX),
            NodeKind::MotionSensor => name.ends_with(MOTION_SUFFIX),
        }
    }

    fn not_found(self) -> GyropadError {
        match self {
            NodeKind::Gamepad => GyropadError::ControllerNotFound,
            NodeKind::MotionSensor => GyropadError::MotionSensorNotFound,
        }
    }
}

/// Open DualSense event node
pub struct DualSenseDevice {
    device: Device,
    device_path: String,
    kind: NodeKind,
}

impl DualSenseDevice {
    /// Open the gamepad node
    ///
    /// Uses `path` when given, otherwise scans `/dev/input`.
    ///
    /// # Errors
    ///
    /// - `ControllerNotFound`: no DualSense gamepad node found
    /// - `Controller`: the given path could not be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gyropad::controller::dualsense::DualSenseDevice;
    ///
    /// let gamepad = DualSenseDevice::open_gamepad(None)?;
    /// println!("Gamepad at: {}", gamepad.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open_gamepad(path: Option<&str>) -> Result<Self> {
        Self::open(NodeKind::Gamepad, path)
    }

    /// Open the motion sensor node
    ///
    /// Uses `path` when given, otherwise scans `/dev/input`.
    ///
    /// # Errors
    ///
    /// - `MotionSensorNotFound`: no DualSense motion node found
    /// - `Controller`: the given path could not be opened
    pub fn open_motion_sensor(path: Option<&str>) -> Result<Self> {
        Self::open(NodeKind::MotionSensor, path)
    }

    fn open(kind: NodeKind, path: Option<&str>) -> Result<Self> {
        match path.filter(|p| !p.is_empty()) {
            Some(p) => {
                let device = Device::open(p)
                    .map_err(|e| GyropadError::Controller(format!("Failed to open {}: {}", p, e)))?;
                info!("Opened {:?} node at: {}", kind, p);
                Ok(Self {
                    device,
                    device_path: p.to_string(),
                    kind,
                })
            }
            None => Self::scan(kind),
        }
    }

    /// Scans `/dev/input/event*` in sorted order for the first matching node.
    fn scan(kind: NodeKind) -> Result<Self> {
        let input_dir = Path::new("/dev/input");

        if !input_dir.exists() {
            return Err(GyropadError::Controller(
                "/dev/input directory not found".to_string(),
            ));
        }

        let mut entries: Vec<_> = std::fs::read_dir(input_dir)
            .map_err(|e| GyropadError::Controller(format!("Failed to read /dev/input: {}", e)))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with("event"))
            })
            .collect();
        entries.sort();

        for path in entries {
            let device = match Device::open(&path) {
                Ok(device) => device,
                Err(e) => {
                    debug!("Could not open {}: {}", path.display(), e);
                    continue;
                }
            };

            let id = device.input_id();
            let name = device.name().unwrap_or_default();
            debug!(
                "Found input device: {} '{}' (vendor: 0x{:04x}, product: 0x{:04x})",
                path.display(),
                name,
                id.vendor(),
                id.product()
            );

            if id.vendor() == DUALSENSE_VENDOR_ID
                && id.product() == DUALSENSE_PRODUCT_ID
                && kind.matches_name(name)
            {
                let device_path = path.to_string_lossy().to_string();
                info!("Found DualSense {:?} node at: {}", kind, device_path);
                return Ok(Self {
                    device,
                    device_path,
                    kind,
                });
            }
        }

        Err(kind.not_found())
    }

    /// Event node path
    #[must_use]
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Node kind
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Device name reported by the kernel
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }

    /// Fetch pending events, blocking until at least one arrives
    ///
    /// # Errors
    ///
    /// Returns `Controller` error when the read fails, typically because the
    /// device was unplugged.
    pub fn fetch_events(&mut self) -> Result<impl Iterator<Item = evdev::InputEvent> + '_> {
        self.device
            .fetch_events()
            .map_err(|e| GyropadError::Controller(format!("Failed to fetch events: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dualsense_ids() {
        assert_eq!(DUALSENSE_VENDOR_ID, 0x054c, "Sony vendor ID should be 0x054c");
        assert_eq!(DUALSENSE_PRODUCT_ID, 0x0ce6, "DualSense product ID should be 0x0ce6");
    }

    #[test]
    fn test_gamepad_node_name() {
        assert!(NodeKind::Gamepad.matches_name("DualSense Wireless Controller"));
        assert!(NodeKind::Gamepad.matches_name("Sony Interactive Entertainment DualSense Wireless Controller"));
        assert!(!NodeKind::Gamepad.matches_name("DualSense Wireless Controller Motion Sensors"));
        assert!(!NodeKind::Gamepad.matches_name("DualSense Wireless Controller Touchpad"));
    }

    #[test]
    fn test_motion_node_name() {
        assert!(NodeKind::MotionSensor.matches_name("DualSense Wireless Controller Motion Sensors"));
        assert!(NodeKind::MotionSensor.matches_name("DualSense Wireless Controller Motion Sensors\n"));
        assert!(!NodeKind::MotionSensor.matches_name("DualSense Wireless Controller"));
    }

    #[test]
    fn test_not_found_errors() {
        assert!(matches!(NodeKind::Gamepad.not_found(), GyropadError::ControllerNotFound));
        assert!(matches!(
            NodeKind::MotionSensor.not_found(),
            GyropadError::MotionSensorNotFound
        ));
    }

    #[test]
    fn test_explicit_missing_path() {
        let result = DualSenseDevice::open_gamepad(Some("/nonexistent/event99"));
        assert!(matches!(result, Err(GyropadError::Controller(_))));
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_open_with_real_hardware() {
        let gamepad = DualSenseDevice::open_gamepad(None).unwrap();
        assert!(gamepad.device_path().starts_with("/dev/input/event"));
        assert_eq!(gamepad.kind(), NodeKind::Gamepad);

        let motion = DualSenseDevice::open_motion_sensor(None).unwrap();
        assert_ne!(gamepad.device_path(), motion.device_path());
        assert!(motion.name().is_some_and(|n| n.ends_with(MOTION_SUFFIX)));
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_fetch_motion_events_with_real_hardware() {
        let mut motion = DualSenseDevice::open_motion_sensor(None).expect("Motion sensor not found");

        // The motion node streams continuously, no user interaction needed
        let events: Vec<_> = motion.fetch_events().unwrap().collect();
        assert!(!events.is_empty());
    }
}
