//! # Synthesis Engine
//!
//! Owns all mutable state of the synthesized gamepad and exposes it through
//! explicit methods. There are no statics: tests build as many independent
//! engines as they need.
//!
//! ## Event Model
//!
//! The engine is single-owner. Sensor samples, touch events and button
//! writes are applied between polls, and each [`SynthesisEngine::poll`]
//! observes every mutation made before it. Hosts with several input threads
//! forward events over channels to the task that owns the engine.
//!
//! ## Poll
//!
//! 1. Read the real gamepad from the injected [`RealGamepadSource`].
//! 2. Arbitrate each stick.
//! 3. Compose the snapshot.
//! 4. Feed the snapshot's buttons to the latch.
//!
//! ## Usage
//!
//! ```
//! use gyropad::synth::engine::{EngineSettings, SynthesisEngine};
//! use gyropad::synth::source::{MonotonicClock, NoGamepad};
//! use gyropad::synth::types::{RotationSample, Stick};
//!
//! let settings = EngineSettings { stick: Stick::Left, ..EngineSettings::default() };
//! let mut engine = SynthesisEngine::new(settings, Box::new(NoGamepad), Box::new(MonotonicClock::new()));
//!
//! engine.handle_rotation(RotationSample::new(50.0, 0.0));
//! let [pad] = engine.poll();
//! assert!((pad.axes[0] - 1.0).abs() < 1e-6);
//! ```

use tracing::{debug, info, warn};

use super::arbiter::{arbitrate, ArbiterInputs, Arbitration, Mode, DEFAULT_MOVEMENT_THRESHOLD};
use super::composer::{compose, ComposeInputs};
use super::conditioner::{ConditionerSettings, SignalConditioner};
use super::latch::{ArmState, Indicator, LatchController};
use super::source::{Clock, RealGamepadSource};
use super::touch::{HitRegion, TouchId, TouchPoint, DEFAULT_STICK_RADIUS};
use super::types::{
    GamepadSnapshot, RawGamepad, RotationSample, Stick, StickVector, BUTTON_COUNT,
};
use super::virtual_pad::VirtualPad;
use crate::error::{GyropadError, Result};

/// Initial engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Signal conditioner tuning.
    pub conditioner: ConditionerSettings,
    /// Stick driven by the sensor.
    pub stick: Stick,
    /// Real-stick movement threshold.
    pub movement_threshold: f32,
    /// Latch button index, `None` for always armed.
    pub latch_button: Option<usize>,
    /// Whether motion samples are ingested.
    pub sensor_enabled: bool,
    /// On-screen knob travel radius in pixels.
    pub stick_radius: f32,
    /// Left stick touch zone. Both defaults sit at the origin and overlap,
    /// so a host with no configured zones places them with
    /// [`SynthesisEngine::set_stick_region`] before showing the pad.
    pub left_region: HitRegion,
    /// Right stick touch zone.
    pub right_region: HitRegion,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            conditioner: ConditionerSettings::default(),
            stick: Stick::Right,
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
            latch_button: None,
            sensor_enabled: true,
            stick_radius: DEFAULT_STICK_RADIUS,
            left_region: HitRegion::around_radius(DEFAULT_STICK_RADIUS),
            right_region: HitRegion::around_radius(DEFAULT_STICK_RADIUS),
        }
    }
}

/// The unified virtual gamepad.
pub struct SynthesisEngine {
    source: Box<dyn RealGamepadSource>,
    clock: Box<dyn Clock>,
    conditioner: SignalConditioner,
    virtual_pad: VirtualPad,
    latch: LatchController,
    movement_threshold: f32,
    sensor_enabled: bool,
    snapshot: GamepadSnapshot,
    last_mode: Option<Mode>,
}

impl std::fmt::Debug for SynthesisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisEngine")
            .field("conditioner", &self.conditioner)
            .field("latch", &self.latch)
            .field("movement_threshold", &self.movement_threshold)
            .field("sensor_enabled", &self.sensor_enabled)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl SynthesisEngine {
    /// Creates an engine.
    ///
    /// # Arguments
    ///
    /// * `settings` - Initial tuning
    /// * `source` - Provider of the real gamepad, if any
    /// * `clock` - Timestamp source
    ///
    /// An out-of-range latch button is dropped with a warning.
    #[must_use]
    pub fn new(
        settings: EngineSettings,
        source: Box<dyn RealGamepadSource>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let latch_button = match settings.latch_button {
            Some(index) if index >= BUTTON_COUNT => {
                warn!("Ignoring latch button {}: outside the standard layout", index);
                None
            }
            button => button,
        };

        Self {
            source,
            clock,
            conditioner: SignalConditioner::new(settings.conditioner, settings.stick),
            virtual_pad: VirtualPad::new(
                settings.left_region,
                settings.right_region,
                settings.stick_radius,
            ),
            latch: LatchController::new(latch_button),
            movement_threshold: sanitize_threshold(
                settings.movement_threshold,
                DEFAULT_MOVEMENT_THRESHOLD,
            ),
            sensor_enabled: settings.sensor_enabled,
            snapshot: GamepadSnapshot::default(),
            last_mode: None,
        }
    }

    // ==================== Consumer Contract ====================

    /// Builds and returns the snapshot for this poll.
    ///
    /// Wrapped in a one-element array to mirror multi-device APIs. Always
    /// fully populated.
    pub fn poll(&mut self) -> [GamepadSnapshot; 1] {
        let real = self.source.poll();
        let arbitration = self.arbitrate(real.as_ref());

        if self.last_mode != Some(arbitration.mode) {
            debug!("Arbitration mode: {:?}", arbitration.mode);
            self.last_mode = Some(arbitration.mode);
        }

        let snapshot = compose(
            &arbitration,
            &ComposeInputs {
                previous: &self.snapshot,
                real: real.as_ref(),
                virtual_buttons: self.virtual_pad.buttons(),
                now: self.clock.now_ms(),
            },
        );

        self.latch.observe(&snapshot.buttons);
        self.snapshot = snapshot.clone();
        [snapshot]
    }

    /// Snapshot returned by the last poll.
    #[must_use]
    pub fn snapshot(&self) -> &GamepadSnapshot {
        &self.snapshot
    }

    fn arbitrate(&self, real: Option<&RawGamepad>) -> Arbitration {
        arbitrate(&ArbiterInputs {
            real,
            virtual_active: self.virtual_pad.is_active(),
            assignment: self.conditioner.target(),
            armed: self.latch.is_armed(),
            movement_threshold: self.movement_threshold,
            sensor: Stick::ALL.map(|s| self.conditioner.output(s)),
            touch: self.virtual_pad.vectors(),
            touch_active: Stick::ALL.map(|s| self.virtual_pad.stick(s).is_active()),
        })
    }

    // ==================== Sensor ====================

    /// Feeds one motion sample to the conditioner.
    ///
    /// Returns the conditioned vector, or `None` when the sensor is switched
    /// off. The conditioner runs whether or not the sensor is armed.
    pub fn handle_rotation(&mut self, sample: RotationSample) -> Option<StickVector> {
        if !self.sensor_enabled {
            return None;
        }
        Some(self.conditioner.process(sample))
    }

    /// Switches sample ingestion on or off. While off, sensor outputs freeze.
    pub fn set_sensor_enabled(&mut self, enabled: bool) {
        if self.sensor_enabled != enabled {
            info!("Motion sensor {}", if enabled { "enabled" } else { "disabled" });
        }
        self.sensor_enabled = enabled;
    }

    /// True while samples are ingested.
    #[must_use]
    pub fn sensor_enabled(&self) -> bool {
        self.sensor_enabled
    }

    /// Conditioner tuning.
    #[must_use]
    pub fn conditioner_settings(&self) -> &ConditionerSettings {
        self.conditioner.settings()
    }

    /// Sets responsiveness; clamped to `[0.01, 1.0]`.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.conditioner.settings_mut().set_alpha(alpha);
    }

    /// Sets the sensor deadzone; clamped to `>= 0`.
    pub fn set_deadzone(&mut self, deadzone: f32) {
        self.conditioner.settings_mut().set_deadzone(deadzone);
    }

    /// Sets the full-deflection rate; clamped to `>= 0.001`.
    pub fn set_max_angle(&mut self, max_angle: f32) {
        self.conditioner.settings_mut().set_max_angle(max_angle);
    }

    /// Flips the sensor's X output.
    pub fn set_invert_x(&mut self, invert: bool) {
        self.conditioner.settings_mut().invert_x = invert;
    }

    /// Flips the sensor's Y output.
    pub fn set_invert_y(&mut self, invert: bool) {
        self.conditioner.settings_mut().invert_y = invert;
    }

    /// Stick currently driven by the sensor.
    #[must_use]
    pub fn stick_assignment(&self) -> Stick {
        self.conditioner.target()
    }

    /// Assigns the sensor to a stick.
    pub fn set_stick_assignment(&mut self, stick: Stick) {
        if self.conditioner.target() != stick {
            info!("Sensor now drives the {:?} stick", stick);
        }
        self.conditioner.set_target(stick);
    }

    /// Moves the sensor to the other stick and returns the new assignment.
    pub fn toggle_stick_assignment(&mut self) -> Stick {
        let next = self.conditioner.target().other();
        self.set_stick_assignment(next);
        next
    }

    // ==================== Arbitration ====================

    /// Real-stick movement threshold.
    #[must_use]
    pub fn movement_threshold(&self) -> f32 {
        self.movement_threshold
    }

    /// Sets the real-stick movement threshold; clamped to `[0, 1]`.
    pub fn set_movement_threshold(&mut self, threshold: f32) {
        self.movement_threshold = sanitize_threshold(threshold, self.movement_threshold);
    }

    // ==================== Latch ====================

    /// Assigns the latch button. Any negative index means no latch.
    ///
    /// # Errors
    ///
    /// Returns [`GyropadError::InvalidButton`] for an index of 18 or more.
    pub fn set_latch_button(&mut self, index: i32) -> Result<()> {
        let button = usize::try_from(index).ok();
        self.latch.set_button(button)?;
        debug!("Latch button set to {:?}", button);
        Ok(())
    }

    /// Latch button index, if any.
    #[must_use]
    pub fn latch_button(&self) -> Option<usize> {
        self.latch.button()
    }

    /// Stored latch state.
    #[must_use]
    pub fn arm_state(&self) -> ArmState {
        self.latch.state()
    }

    /// True when sensor output may drive a stick.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.latch.is_armed()
    }

    /// Indicator color for the host UI.
    #[must_use]
    pub fn indicator(&self) -> Indicator {
        self.latch.indicator()
    }

    // ==================== Virtual Controller ====================

    /// Shows or hides the on-screen controller.
    ///
    /// Hiding releases every on-screen stick and button.
    ///
    /// # Errors
    ///
    /// Returns [`GyropadError::VirtualControllerUnavailable`] when asked to
    /// show the controller while a real gamepad is connected.
    pub fn set_virtual_controller_active(&mut self, active: bool) -> Result<()> {
        if active == self.virtual_pad.is_active() {
            return Ok(());
        }

        if active {
            if self.source.poll().is_some_and(|pad| pad.connected) {
                return Err(GyropadError::VirtualControllerUnavailable);
            }
            self.virtual_pad.activate();
            info!("Virtual controller shown");
        } else {
            self.virtual_pad.deactivate();
            info!("Virtual controller hidden");
        }
        Ok(())
    }

    /// True while the on-screen controller is shown.
    #[must_use]
    pub fn virtual_controller_active(&self) -> bool {
        self.virtual_pad.is_active()
    }

    /// On-screen controller state, for rendering.
    #[must_use]
    pub fn virtual_pad(&self) -> &VirtualPad {
        &self.virtual_pad
    }

    /// Touch-start on a stick zone.
    pub fn touch_start(&mut self, stick: Stick, touches: &[TouchPoint]) -> bool {
        self.virtual_pad.touch_start(stick, touches)
    }

    /// Touch-move on a stick zone.
    pub fn touch_move(&mut self, stick: Stick, touches: &[TouchPoint]) -> Option<StickVector> {
        self.virtual_pad.touch_move(stick, touches)
    }

    /// Touch-end on a stick zone.
    pub fn touch_end(&mut self, stick: Stick, ended: &[TouchId]) -> bool {
        self.virtual_pad.touch_end(stick, ended)
    }

    /// Moves a stick's touch zone.
    pub fn set_stick_region(&mut self, stick: Stick, region: HitRegion) {
        self.virtual_pad.stick_mut(stick).set_region(region);
    }

    /// Sets the knob travel radius of both on-screen sticks.
    pub fn set_stick_radius(&mut self, radius: f32) {
        for stick in Stick::ALL {
            self.virtual_pad.stick_mut(stick).set_radius(radius);
        }
    }

    /// Presses an on-screen button fully.
    ///
    /// # Errors
    ///
    /// Returns [`GyropadError::InvalidButton`] for an index of 18 or more.
    pub fn press_button(&mut self, index: usize) -> Result<()> {
        self.virtual_pad.set_button(index, 1.0)
    }

    /// Releases an on-screen button.
    ///
    /// # Errors
    ///
    /// Returns [`GyropadError::InvalidButton`] for an index of 18 or more.
    pub fn release_button(&mut self, index: usize) -> Result<()> {
        self.virtual_pad.set_button(index, 0.0)
    }

    /// Writes an analog value to an on-screen button.
    ///
    /// # Errors
    ///
    /// Returns [`GyropadError::InvalidButton`] for an index of 18 or more.
    pub fn set_button_value(&mut self, index: usize, value: f32) -> Result<()> {
        self.virtual_pad.set_button(index, value)
    }
}

/// Clamps a movement threshold to `[0, 1]`; NaN keeps `fallback`.
fn sanitize_threshold(threshold: f32, fallback: f32) -> f32 {
    if threshold.is_nan() {
        fallback
    } else {
        threshold.clamp(0.0, 1.0)
    }
}
