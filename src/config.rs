//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every key has a default, so a file only needs the section headers it
//! wants to change. The validated [`Config`] converts into the
//! [`EngineSettings`] the synthesis engine starts from.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{GyropadError, Result};
use crate::synth::conditioner::ConditionerSettings;
use crate::synth::engine::EngineSettings;
use crate::synth::touch::HitRegion;
use crate::synth::types::{Stick, BUTTON_COUNT};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub arbiter: ArbiterConfig,
    #[serde(default)]
    pub latch: LatchConfig,
    #[serde(default)]
    pub touch: TouchConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

/// Motion sensor conditioning
#[derive(Debug, Deserialize, Clone)]
pub struct SensorConfig {
    #[serde(default = "default_sensor_enabled")]
    pub enabled: bool,

    #[serde(default = "default_alpha")]
    pub alpha: f32,

    #[serde(default = "default_deadzone")]
    pub deadzone: f32,

    #[serde(default = "default_max_angle")]
    pub max_angle: f32,

    #[serde(default)]
    pub invert_x: bool,

    #[serde(default)]
    pub invert_y: bool,

    #[serde(default = "default_stick")]
    pub stick: Stick,
}

/// Real-stick arbitration
#[derive(Debug, Deserialize, Clone)]
pub struct ArbiterConfig {
    #[serde(default = "default_movement_threshold")]
    pub movement_threshold: f32,
}

/// Arm/disarm latch
#[derive(Debug, Deserialize, Clone)]
pub struct LatchConfig {
    /// Standard-layout button index, `-1` to disable.
    #[serde(default = "default_latch_button")]
    pub button: i32,
}

/// On-screen touch sticks
///
/// Regions are `[left, top, width, height]` in screen pixels. An unset
/// region falls back to [`HitRegion::around_radius`] at the origin, which
/// the host is expected to move with `set_stick_region`.
#[derive(Debug, Deserialize, Clone)]
pub struct TouchConfig {
    #[serde(default = "default_stick_radius")]
    pub stick_radius: f32,

    #[serde(default)]
    pub left_region: Option<[f32; 4]>,

    #[serde(default)]
    pub right_region: Option<[f32; 4]>,
}

impl TouchConfig {
    fn region(&self, region: Option<[f32; 4]>) -> HitRegion {
        match region {
            Some([left, top, width, height]) => HitRegion::new(left, top, width, height),
            None => HitRegion::around_radius(self.stick_radius),
        }
    }
}

/// Consumer poll loop
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_rate_hz")]
    pub rate_hz: u32,
}

/// Input device discovery
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    /// Gamepad event node, empty to auto-detect.
    #[serde(default)]
    pub gamepad_path: String,

    /// Motion sensor event node, empty to auto-detect.
    #[serde(default)]
    pub motion_path: String,

    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
}

// Default value functions
fn default_sensor_enabled() -> bool { true }
fn default_alpha() -> f32 { 0.1 }
fn default_deadzone() -> f32 { 0.1 }
fn default_max_angle() -> f32 { 45.0 }
fn default_stick() -> Stick { Stick::Right }

fn default_movement_threshold() -> f32 { 0.03 }

fn default_latch_button() -> i32 { -1 }

fn default_stick_radius() -> f32 { 45.0 }

fn default_rate_hz() -> u32 { 60 }

fn default_reconnect_interval_ms() -> u64 { 1000 }

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            enabled: default_sensor_enabled(),
            alpha: default_alpha(),
            deadzone: default_deadzone(),
            max_angle: default_max_angle(),
            invert_x: false,
            invert_y: false,
            stick: default_stick(),
        }
    }
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self { movement_threshold: default_movement_threshold() }
    }
}

impl Default for LatchConfig {
    fn default() -> Self {
        Self { button: default_latch_button() }
    }
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            stick_radius: default_stick_radius(),
            left_region: None,
            right_region: None,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { rate_hz: default_rate_hz() }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            gamepad_path: String::new(),
            motion_path: String::new(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gyropad::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Latch button as an index, `None` when disabled
    #[must_use]
    pub fn latch_button(&self) -> Option<usize> {
        usize::try_from(self.latch.button).ok()
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        let sensor = &self.sensor;

        if !(sensor.alpha > 0.0 && sensor.alpha <= 1.0) {
            return Err(invalid("alpha must be greater than 0.0 and at most 1.0"));
        }

        if !(sensor.max_angle > 0.0 && sensor.max_angle <= 1000.0) {
            return Err(invalid("max_angle must be greater than 0.0 and at most 1000.0"));
        }

        if !(sensor.deadzone >= 0.0 && sensor.deadzone < sensor.max_angle) {
            return Err(invalid("deadzone must be at least 0.0 and below max_angle"));
        }

        let threshold = self.arbiter.movement_threshold;
        if !(0.0..1.0).contains(&threshold) {
            return Err(invalid("movement_threshold must be between 0.0 and 1.0 (exclusive)"));
        }

        if self.latch.button < -1 || self.latch.button >= BUTTON_COUNT as i32 {
            return Err(invalid(format!(
                "latch button {} is out of bounds (must be -1 to {})",
                self.latch.button,
                BUTTON_COUNT - 1
            )));
        }

        if !(self.touch.stick_radius > 0.0 && self.touch.stick_radius <= 10000.0) {
            return Err(invalid("stick_radius must be greater than 0.0 and at most 10000.0"));
        }

        validate_region("left_region", self.touch.left_region)?;
        validate_region("right_region", self.touch.right_region)?;

        if self.poll.rate_hz == 0 || self.poll.rate_hz > 1000 {
            return Err(invalid("rate_hz must be between 1 and 1000"));
        }

        // Device paths can be empty (auto-detect)
        if self.device.reconnect_interval_ms == 0 || self.device.reconnect_interval_ms > 60000 {
            return Err(invalid("reconnect_interval_ms must be between 1 and 60000"));
        }

        Ok(())
    }
}

fn validate_region(name: &str, region: Option<[f32; 4]>) -> Result<()> {
    let Some([left, top, width, height]) = region else {
        return Ok(());
    };
    if !(left.is_finite() && top.is_finite()) {
        return Err(invalid(format!("{} position must be finite", name)));
    }
    if !(width > 0.0 && width.is_finite() && height > 0.0 && height.is_finite()) {
        return Err(invalid(format!("{} width and height must be greater than 0.0", name)));
    }
    Ok(())
}

fn invalid(msg: impl std::fmt::Display) -> GyropadError {
    GyropadError::Config(toml::de::Error::custom(msg))
}

impl From<&Config> for EngineSettings {
    fn from(config: &Config) -> Self {
        let sensor = &config.sensor;
        let mut conditioner =
            ConditionerSettings::new(sensor.alpha, sensor.deadzone, sensor.max_angle);
        conditioner.invert_x = sensor.invert_x;
        conditioner.invert_y = sensor.invert_y;

        let touch = &config.touch;
        Self {
            conditioner,
            stick: sensor.stick,
            movement_threshold: config.arbiter.movement_threshold,
            latch_button: config.latch_button(),
            sensor_enabled: sensor.enabled,
            stick_radius: touch.stick_radius,
            left_region: touch.region(touch.left_region),
            right_region: touch.region(touch.right_region),
        }
    }
}
