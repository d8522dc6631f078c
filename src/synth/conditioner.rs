//! # Signal Conditioner
//!
//! Turns raw angular-rate samples into a bounded, smoothed stick vector.
//!
//! ## Pipeline
//!
//! 1. **Deadzone**: a raw rate with `|rate| < deadzone` becomes 0.
//! 2. **Smoothing**: first-order low-pass,
//!    `smoothed = k * rate + (1 - k) * smoothed_prev` with `k = 1.1 - alpha`.
//!    Lower `alpha` means a larger `k`, so `alpha = 0.1` gives `k = 1.0`
//!    (follow the sample) and `alpha = 1.0` gives `k = 0.1` (heavy smoothing).
//! 3. **Normalize**: `clamp(smoothed / max_angle, -1, 1)`.
//! 4. **Invert**: optional per-axis sign flip.
//!
//! The conditioner runs for every sample whether or not its output is used,
//! so the smoothing state never jumps when the sensor is re-armed.
//!
//! ## Usage
//!
//! ```
//! use gyropad::synth::conditioner::{ConditionerSettings, SignalConditioner};
//! use gyropad::synth::types::{RotationSample, Stick};
//!
//! let mut conditioner = SignalConditioner::new(ConditionerSettings::default(), Stick::Left);
//! let v = conditioner.process(RotationSample::new(50.0, 0.0));
//! assert!((v.x - 1.0).abs() < 1e-6);
//! assert_eq!(conditioner.output(Stick::Left), v);
//! ```

use super::types::{RotationSample, Stick, StickVector};

/// Smallest accepted responsiveness.
pub const MIN_ALPHA: f32 = 0.01;
/// Largest accepted responsiveness.
pub const MAX_ALPHA: f32 = 1.0;
/// Smallest accepted full-deflection rate.
pub const MIN_MAX_ANGLE: f32 = 0.001;

/// Default responsiveness.
pub const DEFAULT_ALPHA: f32 = 0.1;
/// Default deadzone, in raw rate units.
pub const DEFAULT_DEADZONE: f32 = 0.1;
/// Default rate that maps to full stick deflection.
pub const DEFAULT_MAX_ANGLE: f32 = 45.0;

/// Largest rate magnitude (deg/s) accepted from a sample.
pub const MAX_RATE: f64 = 1.0e6;

/// Tuning for the [`SignalConditioner`].
///
/// Every setter clamps to the valid range instead of rejecting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConditionerSettings {
    alpha: f32,
    deadzone: f32,
    max_angle: f32,
    /// Flip the sign of the X output.
    pub invert_x: bool,
    /// Flip the sign of the Y output.
    pub invert_y: bool,
}

impl Default for ConditionerSettings {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            deadzone: DEFAULT_DEADZONE,
            max_angle: DEFAULT_MAX_ANGLE,
            invert_x: false,
            invert_y: false,
        }
    }
}

impl ConditionerSettings {
    /// Creates settings, clamping each value into its valid range.
    ///
    /// # Arguments
    ///
    /// * `alpha` - Responsiveness in `(0, 1]`, clamped to `[0.01, 1.0]`
    /// * `deadzone` - Raw-rate deadzone, clamped to `>= 0`
    /// * `max_angle` - Rate for full deflection, clamped to `>= 0.001`
    ///
    /// # Examples
    ///
    /// ```
    /// use gyropad::synth::conditioner::ConditionerSettings;
    ///
    /// let settings = ConditionerSettings::new(3.0, -1.0, 0.0);
    /// assert_eq!(settings.alpha(), 1.0);
    /// assert_eq!(settings.deadzone(), 0.0);
    /// assert_eq!(settings.max_angle(), 0.001);
    /// ```
    #[must_use]
    pub fn new(alpha: f32, deadzone: f32, max_angle: f32) -> Self {
        let mut settings = Self::default();
        settings.set_alpha(alpha);
        settings.set_deadzone(deadzone);
        settings.set_max_angle(max_angle);
        settings
    }

    /// Returns the responsiveness.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Returns the deadzone.
    #[must_use]
    pub fn deadzone(&self) -> f32 {
        self.deadzone
    }

    /// Returns the full-deflection rate.
    #[must_use]
    pub fn max_angle(&self) -> f32 {
        self.max_angle
    }

    /// Sets the responsiveness. NaN keeps the current value.
    pub fn set_alpha(&mut self, alpha: f32) {
        if !alpha.is_nan() {
            self.alpha = alpha.clamp(MIN_ALPHA, MAX_ALPHA);
        }
    }

    /// Sets the deadzone. NaN keeps the current value.
    pub fn set_deadzone(&mut self, deadzone: f32) {
        if !deadzone.is_nan() {
            self.deadzone = deadzone.max(0.0);
        }
    }

    /// Sets the full-deflection rate. NaN and infinity keep the current value.
    pub fn set_max_angle(&mut self, max_angle: f32) {
        if max_angle.is_finite() {
            self.max_angle = max_angle.max(MIN_MAX_ANGLE);
        }
    }

    /// Weight of the new sample in the low-pass filter.
    ///
    /// # Examples
    ///
    /// ```
    /// use gyropad::synth::conditioner::ConditionerSettings;
    ///
    /// let settings = ConditionerSettings::new(0.1, 0.1, 45.0);
    /// assert!((settings.smoothing_coefficient() - 1.0).abs() < 1e-6);
    /// ```
    #[must_use]
    pub fn smoothing_coefficient(&self) -> f64 {
        1.1 - f64::from(self.alpha)
    }
}

/// Low-pass filter accumulators, in raw rate units.
///
/// Always finite.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SmoothingState {
    /// Smoothed X rate.
    pub x: f64,
    /// Smoothed Y rate.
    pub y: f64,
}

/// Conditions motion samples and keeps the last output of each stick.
///
/// Output goes to the currently assigned stick; the other stick keeps
/// whatever value it last received.
#[derive(Debug, Clone)]
pub struct SignalConditioner {
    settings: ConditionerSettings,
    state: SmoothingState,
    target: Stick,
    outputs: [StickVector; 2],
}

impl SignalConditioner {
    /// Creates a conditioner with zeroed smoothing state.
    #[must_use]
    pub fn new(settings: ConditionerSettings, target: Stick) -> Self {
        Self {
            settings,
            state: SmoothingState::default(),
            target,
            outputs: [StickVector::ZERO; 2],
        }
    }

    /// Returns the current settings.
    #[must_use]
    pub fn settings(&self) -> &ConditionerSettings {
        &self.settings
    }

    /// Mutable access to the settings; changes apply from the next sample.
    pub fn settings_mut(&mut self) -> &mut ConditionerSettings {
        &mut self.settings
    }

    /// Returns the smoothing accumulators.
    #[must_use]
    pub fn smoothing(&self) -> SmoothingState {
        self.state
    }

    /// Returns the stick currently driven by the sensor.
    #[must_use]
    pub fn target(&self) -> Stick {
        self.target
    }

    /// Retargets the sensor. The previous stick keeps its last output.
    pub fn set_target(&mut self, stick: Stick) {
        self.target = stick;
    }

    /// Last conditioned output written to `stick`.
    #[must_use]
    pub fn output(&self, stick: Stick) -> StickVector {
        self.outputs[stick.index()]
    }

    /// Feeds one sample through the pipeline.
    ///
    /// Missing or non-finite rates count as 0. Returns the new output of the
    /// assigned stick.
    pub fn process(&mut self, sample: RotationSample) -> StickVector {
        let deadzone = f64::from(self.settings.deadzone);
        let raw_x = apply_deadzone(coerce(sample.alpha), deadzone);
        let raw_y = apply_deadzone(coerce(sample.beta), deadzone);

        let k = self.settings.smoothing_coefficient();
        self.state.x = low_pass(k, raw_x, self.state.x);
        self.state.y = low_pass(k, raw_y, self.state.y);

        let vector = self.normalize();
        self.outputs[self.target.index()] = vector;
        vector
    }

    /// Maps the smoothing state to a stick vector.
    fn normalize(&self) -> StickVector {
        let max_angle = f64::from(self.settings.max_angle);
        let mut x = (self.state.x / max_angle).clamp(-1.0, 1.0) as f32;
        let mut y = (self.state.y / max_angle).clamp(-1.0, 1.0) as f32;

        if self.settings.invert_x {
            x = -x;
        }
        if self.settings.invert_y {
            y = -y;
        }

        StickVector::new(x, y)
    }
}

/// Missing or non-finite rates become 0; finite rates are bounded by [`MAX_RATE`].
#[inline]
fn coerce(rate: Option<f64>) -> f64 {
    match rate {
        Some(value) if value.is_finite() => value.clamp(-MAX_RATE, MAX_RATE),
        _ => 0.0,
    }
}

/// One filter step. A non-finite result restarts from the sample.
#[inline]
fn low_pass(k: f64, rate: f64, previous: f64) -> f64 {
    let next = k * rate + (1.0 - k) * previous;
    if next.is_finite() {
        next
    } else {
        rate
    }
}

#[inline]
fn apply_deadzone(rate: f64, deadzone: f64) -> f64 {
    if rate.abs() < deadzone {
        0.0
    } else {
        rate
    }
}
