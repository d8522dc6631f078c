//! # Event Mapper Module
//!
//! Turns raw evdev events from the DualSense nodes into engine inputs:
//! [`GamepadMapper`] builds a [`RawGamepad`] in the standard layout and
//! [`MotionMapper`] builds [`RotationSample`]s from the gyroscope.
//!
//! Both mappers accumulate events and emit on `SYN_REPORT`, so consumers
//! never see a half-updated frame.
//!
//! ## Gamepad Axes (EV_ABS)
//!
//! | Input | evdev Code | Range | Standard slot |
//! |-------|------------|-------|---------------|
//! | Left Stick X / Y | ABS_X / ABS_Y | 0-255 | axes 0 / 1 |
//! | Right Stick X / Y | ABS_RX / ABS_RY | 0-255 | axes 2 / 3 |
//! | L2 / R2 | ABS_Z / ABS_RZ | 0-255 | buttons 6 / 7 (analog) |
//! | D-Pad X | ABS_HAT0X | -1/0/1 | buttons 14 / 15 |
//! | D-Pad Y | ABS_HAT0Y | -1/0/1 | buttons 12 / 13 |
//!
//! ## Gamepad Buttons (EV_KEY)
//!
//! | Button | evdev Code | Standard slot |
//! |--------|------------|---------------|
//! | Cross (×) | BTN_SOUTH | 0 (A) |
//! | Circle (○) | BTN_EAST | 1 (B) |
//! | Square (□) | BTN_WEST | 2 (X) |
//! | Triangle (△) | BTN_NORTH | 3 (Y) |
//! | L1 / R1 | BTN_TL / BTN_TR | 4 / 5 |
//! | Create | BTN_SELECT | 8 |
//! | Options | BTN_START | 9 |
//! | L3 / R3 | BTN_THUMBL / BTN_THUMBR | 10 / 11 |
//! | PS | BTN_MODE | 16 |
//! | Touchpad | BTN_TOUCH | 17 |
//!
//! ## Motion Axes
//!
//! The motion node reports angular rate on ABS_RX (pitch), ABS_RY (yaw) and
//! ABS_RZ (roll) at 1024 units per deg/s. Roll is not used.
//!
//! ## Usage
//!
//! ```no_run
//! use gyropad::controller::dualsense::DualSenseDevice;
//! use gyropad::controller::mapper::GamepadMapper;
//!
//! let mut gamepad = DualSenseDevice::open_gamepad(None)?;
//! let mut mapper = GamepadMapper::new();
//!
//! loop {
//!     for event in gamepad.fetch_events()? {
//!         if mapper.process_event(&event) {
//!             println!("{:?}", mapper.gamepad().axes);
//!         }
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use evdev::{AbsoluteAxisType, InputEvent, InputEventKind, Key, Synchronization};

use crate::synth::types::{buttons, ButtonState, RawGamepad, RotationSample, AXIS_COUNT, BUTTON_COUNT};

/// Raw stick and trigger range.
pub const AXIS_MIN: i32 = 0;
/// Raw stick and trigger range.
pub const AXIS_MAX: i32 = 255;
/// Raw stick center.
pub const AXIS_CENTER: i32 = 128;

/// Gyroscope resolution.
pub const GYRO_UNITS_PER_DEG_S: f64 = 1024.0;

/// Maps a raw stick value to `[-1, 1]`, exact at center.
#[must_use]
pub fn normalize_stick(raw: i32) -> f32 {
    let half_range = (AXIS_MAX - AXIS_CENTER) as f32;
    ((raw - AXIS_CENTER) as f32 / half_range).clamp(-1.0, 1.0)
}

/// Maps a raw trigger value to `[0, 1]`.
#[must_use]
pub fn normalize_trigger(raw: i32) -> f32 {
    ((raw - AXIS_MIN) as f32 / (AXIS_MAX - AXIS_MIN) as f32).clamp(0.0, 1.0)
}

fn is_report(event: &InputEvent) -> bool {
    matches!(
        event.kind(),
        InputEventKind::Synchronization(sync) if sync == Synchronization::SYN_REPORT
    )
}

/// Accumulates gamepad-node events into a standard-layout [`RawGamepad`].
///
/// # Examples
///
/// ```
/// use gyropad::controller::mapper::GamepadMapper;
///
/// let mapper = GamepadMapper::new();
/// let pad = mapper.gamepad();
/// assert_eq!(pad.axes, vec![0.0; 4]);
/// assert!(pad.connected);
/// ```
#[derive(Debug, Clone)]
pub struct GamepadMapper {
    axes: [i32; AXIS_COUNT],
    buttons: [ButtonState; BUTTON_COUNT],
}

impl Default for GamepadMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl GamepadMapper {
    /// Creates a mapper with centered sticks and released buttons.
    #[must_use]
    pub fn new() -> Self {
        Self {
            axes: [AXIS_CENTER; AXIS_COUNT],
            buttons: [ButtonState::RELEASED; BUTTON_COUNT],
        }
    }

    /// Current state as a connected gamepad.
    #[must_use]
    pub fn gamepad(&self) -> RawGamepad {
        RawGamepad {
            axes: self.axes.iter().map(|&raw| normalize_stick(raw)).collect(),
            buttons: self.buttons.to_vec(),
            connected: true,
        }
    }

    /// Processes one event. Returns true on `SYN_REPORT`.
    pub fn process_event(&mut self, event: &InputEvent) -> bool {
        match event.kind() {
            InputEventKind::AbsAxis(axis) => {
                self.process_axis_event(axis, event.value());
                false
            }
            InputEventKind::Key(key) => {
                self.process_key_event(key, event.value() != 0);
                false
            }
            _ => is_report(event),
        }
    }

    fn process_axis_event(&mut self, axis: AbsoluteAxisType, value: i32) {
        match axis {
            AbsoluteAxisType::ABS_X => self.axes[0] = value,
            AbsoluteAxisType::ABS_Y => self.axes[1] = value,
            AbsoluteAxisType::ABS_RX => self.axes[2] = value,
            AbsoluteAxisType::ABS_RY => self.axes[3] = value,

            AbsoluteAxisType::ABS_Z => self.set_analog(buttons::LT, value),
            AbsoluteAxisType::ABS_RZ => self.set_analog(buttons::RT, value),

            AbsoluteAxisType::ABS_HAT0X => {
                self.set_digital(buttons::DPAD_LEFT, value < 0);
                self.set_digital(buttons::DPAD_RIGHT, value > 0);
            }
            AbsoluteAxisType::ABS_HAT0Y => {
                self.set_digital(buttons::DPAD_UP, value < 0);
                self.set_digital(buttons::DPAD_DOWN, value > 0);
            }

            _ => {}
        }
    }

    fn process_key_event(&mut self, key: Key, pressed: bool) {
        let index = match key {
            Key::BTN_SOUTH => buttons::A,
            Key::BTN_EAST => buttons::B,
            Key::BTN_WEST => buttons::X,
            Key::BTN_NORTH => buttons::Y,
            Key::BTN_TL => buttons::LB,
            Key::BTN_TR => buttons::RB,
            Key::BTN_SELECT => buttons::SELECT,
            Key::BTN_START => buttons::START,
            Key::BTN_THUMBL => buttons::L3,
            Key::BTN_THUMBR => buttons::R3,
            Key::BTN_MODE => buttons::HOME,
            Key::BTN_TOUCH => buttons::TOUCHPAD,
            // BTN_TL2 / BTN_TR2 duplicate the analog trigger axes
            _ => return,
        };
        self.set_digital(index, pressed);
    }

    fn set_analog(&mut self, index: usize, raw: i32) {
        self.buttons[index] = ButtonState {
            touched: false,
            ..ButtonState::from_value(normalize_trigger(raw))
        };
    }

    fn set_digital(&mut self, index: usize, pressed: bool) {
        self.buttons[index] = ButtonState {
            pressed,
            touched: false,
            value: if pressed { 1.0 } else { 0.0 },
        };
    }

    /// Recenters sticks and releases buttons.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Accumulates motion-node events into [`RotationSample`]s.
///
/// # Examples
///
/// ```
/// use evdev::{AbsoluteAxisType, EventType, InputEvent};
/// use gyropad::controller::mapper::MotionMapper;
///
/// let mut mapper = MotionMapper::new();
/// mapper.process_event(&InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_RY.0, 2048));
/// let sample = mapper.process_event(&InputEvent::new(EventType::SYNCHRONIZATION, 0, 0)).unwrap();
/// assert_eq!(sample.alpha, Some(2.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MotionMapper {
    pitch: i32,
    yaw: i32,
}

impl MotionMapper {
    /// Creates a mapper at rest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one event. Returns a sample on `SYN_REPORT`.
    pub fn process_event(&mut self, event: &InputEvent) -> Option<RotationSample> {
        match event.kind() {
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_RX) => self.pitch = event.value(),
            InputEventKind::AbsAxis(AbsoluteAxisType::ABS_RY) => self.yaw = event.value(),
            _ if is_report(event) => return Some(self.sample()),
            // Roll, accelerometer and timestamp events
            _ => {}
        }
        None
    }

    /// Current angular rate as a sample, in deg/s.
    #[must_use]
    pub fn sample(&self) -> RotationSample {
        RotationSample::new(
            f64::from(self.yaw) / GYRO_UNITS_PER_DEG_S,
            f64::from(self.pitch) / GYRO_UNITS_PER_DEG_S,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::EventType;

    /// Helper to create an axis event for testing.
    fn make_axis_event(axis: AbsoluteAxisType, value: i32) -> InputEvent {
        InputEvent::new(EventType::ABSOLUTE, axis.0, value)
    }

    /// Helper to create a key event for testing.
    fn make_key_event(key: Key, pressed: bool) -> InputEvent {
        InputEvent::new(EventType::KEY, key.code(), if pressed { 1 } else { 0 })
    }

    fn make_report() -> InputEvent {
        InputEvent::new(EventType::SYNCHRONIZATION, 0, 0)
    }

    // ==================== Normalization Tests ====================

    #[test]
    fn test_normalize_stick() {
        assert_eq!(normalize_stick(AXIS_CENTER), 0.0);
        assert_eq!(normalize_stick(AXIS_MAX), 1.0);
        assert_eq!(normalize_stick(AXIS_MIN), -1.0);
        assert!((normalize_stick(191) - 0.496).abs() < 0.01);
    }

    #[test]
    fn test_normalize_trigger() {
        assert_eq!(normalize_trigger(0), 0.0);
        assert_eq!(normalize_trigger(255), 1.0);
        assert_eq!(normalize_trigger(300), 1.0);
    }

    // ==================== GamepadMapper Tests ====================

    #[test]
    fn test_gamepad_mapper_default() {
        let pad = GamepadMapper::new().gamepad();
        assert_eq!(pad.axes.len(), AXIS_COUNT);
        assert_eq!(pad.buttons.len(), BUTTON_COUNT);
        assert!(pad.axes.iter().all(|&a| a == 0.0));
        assert!(pad.buttons.iter().all(|b| !b.pressed));
    }

    #[test]
    fn test_report_completes_frame() {
        let mut mapper = GamepadMapper::new();
        assert!(!mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_X, 255)));
        assert!(mapper.process_event(&make_report()));
    }

    #[test]
    fn test_process_sticks() {
        let mut mapper = GamepadMapper::new();
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_X, 255));
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_Y, 0));
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_RX, 0));
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_RY, 255));

        assert_eq!(mapper.gamepad().axes, vec![1.0, -1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_process_triggers_are_analog_buttons() {
        let mut mapper = GamepadMapper::new();
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_Z, 255));
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_RZ, 51));

        let pad = mapper.gamepad();
        assert_eq!(pad.buttons[buttons::LT].value, 1.0);
        assert!(pad.buttons[buttons::LT].pressed);
        assert!((pad.buttons[buttons::RT].value - 0.2).abs() < 1e-6);
        assert!(!pad.buttons[buttons::RT].touched);

        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_Z, 0));
        assert!(!mapper.gamepad().buttons[buttons::LT].pressed);
    }

    #[test]
    fn test_process_dpad() {
        let mut mapper = GamepadMapper::new();
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0X, -1));
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0Y, 1));

        let pad = mapper.gamepad();
        assert!(pad.buttons[buttons::DPAD_LEFT].pressed);
        assert!(!pad.buttons[buttons::DPAD_RIGHT].pressed);
        assert!(pad.buttons[buttons::DPAD_DOWN].pressed);
        assert!(!pad.buttons[buttons::DPAD_UP].pressed);

        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0X, 1));
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_HAT0Y, 0));
        let pad = mapper.gamepad();
        assert!(!pad.buttons[buttons::DPAD_LEFT].pressed);
        assert!(pad.buttons[buttons::DPAD_RIGHT].pressed);
        assert!(!pad.buttons[buttons::DPAD_DOWN].pressed);
    }

    #[test]
    fn test_process_buttons_standard_layout() {
        let layout = [
            (Key::BTN_SOUTH, buttons::A),
            (Key::BTN_EAST, buttons::B),
            (Key::BTN_WEST, buttons::X),
            (Key::BTN_NORTH, buttons::Y),
            (Key::BTN_TL, buttons::LB),
            (Key::BTN_TR, buttons::RB),
            (Key::BTN_SELECT, buttons::SELECT),
            (Key::BTN_START, buttons::START),
            (Key::BTN_THUMBL, buttons::L3),
            (Key::BTN_THUMBR, buttons::R3),
            (Key::BTN_MODE, buttons::HOME),
            (Key::BTN_TOUCH, buttons::TOUCHPAD),
        ];

        for (key, index) in layout {
            let mut mapper = GamepadMapper::new();
            mapper.process_event(&make_key_event(key, true));
            let pad = mapper.gamepad();
            assert!(pad.buttons[index].pressed, "{:?} should press button {}", key, index);
            assert_eq!(pad.buttons[index].value, 1.0);
            assert_eq!(pad.buttons.iter().filter(|b| b.pressed).count(), 1);

            mapper.process_event(&make_key_event(key, false));
            assert!(!mapper.gamepad().buttons[index].pressed);
        }
    }

    #[test]
    fn test_digital_trigger_click_ignored() {
        let mut mapper = GamepadMapper::new();
        mapper.process_event(&make_key_event(Key::BTN_TL2, true));
        assert!(!mapper.gamepad().buttons[buttons::LT].pressed);
    }

    #[test]
    fn test_unknown_axis_ignored() {
        let mut mapper = GamepadMapper::new();
        let event = InputEvent::new(EventType::ABSOLUTE, AbsoluteAxisType::ABS_MISC.0, 100);
        assert!(!mapper.process_event(&event));
        assert_eq!(mapper.gamepad(), GamepadMapper::new().gamepad());
    }

    #[test]
    fn test_gamepad_mapper_reset() {
        let mut mapper = GamepadMapper::new();
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_X, 0));
        mapper.process_event(&make_key_event(Key::BTN_SOUTH, true));
        mapper.reset();
        assert_eq!(mapper.gamepad(), GamepadMapper::new().gamepad());
    }

    // ==================== MotionMapper Tests ====================

    #[test]
    fn test_motion_sample_on_report_only() {
        let mut mapper = MotionMapper::new();
        assert!(mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_RY, 1024)).is_none());
        assert!(mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_RX, -512)).is_none());

        let sample = mapper.process_event(&make_report()).unwrap();
        assert_eq!(sample.alpha, Some(1.0));
        assert_eq!(sample.beta, Some(-0.5));
    }

    #[test]
    fn test_motion_rates_persist_between_reports() {
        let mut mapper = MotionMapper::new();
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_RY, 46080));
        mapper.process_event(&make_report());

        // Frame with only accelerometer data
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_X, 300));
        let sample = mapper.process_event(&make_report()).unwrap();
        assert_eq!(sample.alpha, Some(45.0));
        assert_eq!(sample.beta, Some(0.0));
    }

    #[test]
    fn test_motion_roll_not_in_sample() {
        let mut mapper = MotionMapper::new();
        mapper.process_event(&make_axis_event(AbsoluteAxisType::ABS_RZ, 2048));
        let sample = mapper.process_event(&make_report()).unwrap();
        assert_eq!(sample, RotationSample::new(0.0, 0.0));
    }

    #[test]
    fn test_axis_constants() {
        assert_eq!(AXIS_MIN, 0);
        assert_eq!(AXIS_MAX, 255);
        assert_eq!(AXIS_CENTER, 128);
        assert_eq!(GYRO_UNITS_PER_DEG_S, 1024.0);
    }
}
