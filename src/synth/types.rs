//! # Gamepad Data Model
//!
//! Value types shared by every stage of the synthesis pipeline.
//!
//! ## Axis Layout
//!
//! | Axis | Stick | Direction |
//! |------|-------|-----------|
//! | 0 | Left | X (-1 = left, 1 = right) |
//! | 1 | Left | Y (-1 = up, 1 = down) |
//! | 2 | Right | X |
//! | 3 | Right | Y |
//!
//! ## Button Layout
//!
//! Buttons follow the standard gamepad mapping; see [`buttons`].

use serde::Deserialize;

/// Number of buttons in every snapshot.
pub const BUTTON_COUNT: usize = 18;

/// Number of axes in every snapshot.
pub const AXIS_COUNT: usize = 4;

/// Standard gamepad button indices.
pub mod buttons {
    /// A / Cross
    pub const A: usize = 0;
    /// B / Circle
    pub const B: usize = 1;
    /// X / Square
    pub const X: usize = 2;
    /// Y / Triangle
    pub const Y: usize = 3;
    /// Left bumper
    pub const LB: usize = 4;
    /// Right bumper
    pub const RB: usize = 5;
    /// Left trigger (analog)
    pub const LT: usize = 6;
    /// Right trigger (analog)
    pub const RT: usize = 7;
    /// Select / Share
    pub const SELECT: usize = 8;
    /// Start / Options
    pub const START: usize = 9;
    /// Left stick click
    pub const L3: usize = 10;
    /// Right stick click
    pub const R3: usize = 11;
    /// D-Pad up
    pub const DPAD_UP: usize = 12;
    /// D-Pad down
    pub const DPAD_DOWN: usize = 13;
    /// D-Pad left
    pub const DPAD_LEFT: usize = 14;
    /// D-Pad right
    pub const DPAD_RIGHT: usize = 15;
    /// Home / PS
    pub const HOME: usize = 16;
    /// Touchpad click
    pub const TOUCHPAD: usize = 17;
}

/// Logical analog stick.
///
/// Also serves as the sensor's stick assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stick {
    /// Axes 0 and 1.
    Left,
    /// Axes 2 and 3.
    Right,
}

impl Stick {
    /// Both sticks, in axis order.
    pub const ALL: [Stick; 2] = [Stick::Left, Stick::Right];

    /// Returns the snapshot axis indices `(x, y)` for this stick.
    ///
    /// # Examples
    ///
    /// ```
    /// use gyropad::synth::types::Stick;
    ///
    /// assert_eq!(Stick::Left.axes(), (0, 1));
    /// assert_eq!(Stick::Right.axes(), (2, 3));
    /// ```
    #[must_use]
    pub fn axes(self) -> (usize, usize) {
        match self {
            Stick::Left => (0, 1),
            Stick::Right => (2, 3),
        }
    }

    /// Position of this stick in per-stick arrays.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Stick::Left => 0,
            Stick::Right => 1,
        }
    }

    /// Returns the other stick.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Stick::Left => Stick::Right,
            Stick::Right => Stick::Left,
        }
    }
}

/// 2-D analog value of one stick, each component in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickVector {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl StickVector {
    /// Centered stick.
    pub const ZERO: StickVector = StickVector { x: 0.0, y: 0.0 };

    /// Creates a vector, clamping each component to `[-1, 1]`.
    ///
    /// Non-finite components become 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use gyropad::synth::types::StickVector;
    ///
    /// let v = StickVector::new(1.5, f32::NAN);
    /// assert_eq!(v, StickVector { x: 1.0, y: 0.0 });
    /// ```
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Euclidean length of the vector.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.x.hypot(self.y)
    }

    /// True when either component exceeds `threshold` in absolute value.
    ///
    /// # Examples
    ///
    /// ```
    /// use gyropad::synth::types::StickVector;
    ///
    /// assert!(!StickVector::new(0.02, -0.01).is_moving(0.03));
    /// assert!(StickVector::new(0.0, -0.2).is_moving(0.03));
    /// ```
    #[must_use]
    pub fn is_moving(&self, threshold: f32) -> bool {
        self.x.abs() > threshold || self.y.abs() > threshold
    }
}

/// Clamps a value to `[-1, 1]`, mapping NaN and infinities to 0.
#[inline]
pub(crate) fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// State of one gamepad button.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ButtonState {
    /// Button is held down.
    pub pressed: bool,
    /// A finger is on the button (on-screen buttons only).
    pub touched: bool,
    /// Analog value in `[0, 1]`.
    pub value: f32,
}

impl ButtonState {
    /// Released, untouched button.
    pub const RELEASED: ButtonState = ButtonState {
        pressed: false,
        touched: false,
        value: 0.0,
    };

    /// Fully pressed on-screen button.
    pub const TOUCHED: ButtonState = ButtonState {
        pressed: true,
        touched: true,
        value: 1.0,
    };

    /// Creates a synthetic button from an analog value.
    ///
    /// The value is clamped to `[0, 1]` and `pressed == (value > 0)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gyropad::synth::types::ButtonState;
    ///
    /// let trigger = ButtonState::from_value(0.4);
    /// assert!(trigger.pressed && trigger.touched);
    ///
    /// let released = ButtonState::from_value(-3.0);
    /// assert_eq!(released, ButtonState::RELEASED);
    /// ```
    #[must_use]
    pub fn from_value(value: f32) -> Self {
        let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        let pressed = value > 0.0;
        Self {
            pressed,
            touched: pressed,
            value,
        }
    }
}

/// Snapshot of a real gamepad as reported by the host.
///
/// Devices vary: axis and button counts are whatever the device reports.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawGamepad {
    /// Raw axis values, nominally in `[-1, 1]`.
    pub axes: Vec<f32>,
    /// Raw button states.
    pub buttons: Vec<ButtonState>,
    /// Whether the device reports itself connected.
    pub connected: bool,
}

impl RawGamepad {
    /// Returns axis `index`, or 0 when the device has no such axis.
    #[must_use]
    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    /// Returns the raw axis pair for a stick, unclamped.
    #[must_use]
    pub fn stick(&self, stick: Stick) -> StickVector {
        let (x, y) = stick.axes();
        StickVector {
            x: self.axis(x),
            y: self.axis(y),
        }
    }
}

/// One angular-rate sample from the motion sensor.
///
/// Either field may be missing when the sensor does not report that axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationSample {
    /// Rate about the first axis (drives stick X).
    pub alpha: Option<f64>,
    /// Rate about the second axis (drives stick Y).
    pub beta: Option<f64>,
}

impl RotationSample {
    /// Creates a sample with both axes present.
    #[must_use]
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha: Some(alpha),
            beta: Some(beta),
        }
    }
}

/// The unified gamepad returned to consumers on every poll.
///
/// Fixed-size arrays: every slot can always be indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct GamepadSnapshot {
    /// Button states in standard layout.
    pub buttons: [ButtonState; BUTTON_COUNT],
    /// Axis values, each in `[-1, 1]`.
    pub axes: [f32; AXIS_COUNT],
    /// Milliseconds since engine start at the last synthetic update.
    pub timestamp: f64,
    /// Always true for the synthesized pad.
    pub connected: bool,
}

impl Default for GamepadSnapshot {
    /// Idle pad: centered sticks, all buttons released.
    fn default() -> Self {
        Self {
            buttons: [ButtonState::RELEASED; BUTTON_COUNT],
            axes: [0.0; AXIS_COUNT],
            timestamp: 0.0,
            connected: true,
        }
    }
}

impl GamepadSnapshot {
    /// Reads the axis pair of a stick.
    #[must_use]
    pub fn stick(&self, stick: Stick) -> StickVector {
        let (x, y) = stick.axes();
        StickVector {
            x: self.axes[x],
            y: self.axes[y],
        }
    }

    /// Writes a stick vector into its axis pair.
    pub fn set_stick(&mut self, stick: Stick, value: StickVector) {
        let (x, y) = stick.axes();
        self.axes[x] = clamp_unit(value.x);
        self.axes[y] = clamp_unit(value.y);
    }
}
