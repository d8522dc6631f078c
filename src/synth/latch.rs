//! # Latch Controller
//!
//! Arms and disarms the sensor with a single button.
//!
//! The latch toggles on a press→release edge of its button: the button was
//! pressed at the previous observation and is released now. Holding the
//! button, or releasing it without a recorded press, does nothing.
//!
//! With no latch button assigned the sensor counts as permanently armed and
//! no edge detection happens.
//!
//! ## Usage
//!
//! ```
//! use gyropad::synth::latch::{ArmState, LatchController};
//! use gyropad::synth::types::ButtonState;
//!
//! let mut latch = LatchController::new(Some(0));
//! assert_eq!(latch.state(), ArmState::Armed);
//!
//! latch.observe(&[ButtonState::TOUCHED]);
//! let toggled = latch.observe(&[ButtonState::RELEASED]);
//! assert_eq!(toggled, Some(ArmState::Disarmed));
//! ```

use super::types::{ButtonState, BUTTON_COUNT};
use crate::error::{GyropadError, Result};
use tracing::info;

/// Latch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    /// Sensor output may drive a stick.
    Armed,
    /// Sensor output is ignored.
    Disarmed,
}

impl ArmState {
    /// Returns the opposite state.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            ArmState::Armed => ArmState::Disarmed,
            ArmState::Disarmed => ArmState::Armed,
        }
    }
}

/// What the arm indicator should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// No latch button; the sensor is always armed.
    AlwaysOn,
    /// Latched on.
    Armed,
    /// Latched off.
    Disarmed,
}

/// Edge-triggered toggle on one button.
#[derive(Debug, Clone)]
pub struct LatchController {
    button: Option<usize>,
    state: ArmState,
    prev_pressed: bool,
}

impl LatchController {
    /// Creates a latch on `button` (`None` for no latch).
    ///
    /// Starts armed when a button is assigned and disarmed otherwise; with no
    /// button the stored state is never consulted.
    #[must_use]
    pub fn new(button: Option<usize>) -> Self {
        let state = if button.is_some() {
            ArmState::Armed
        } else {
            ArmState::Disarmed
        };
        Self {
            button,
            state,
            prev_pressed: false,
        }
    }

    /// Returns the latch button index.
    #[must_use]
    pub fn button(&self) -> Option<usize> {
        self.button
    }

    /// Reassigns the latch button and clears edge memory.
    ///
    /// # Errors
    ///
    /// Returns [`GyropadError::InvalidButton`] when the index is outside the
    /// standard layout; the latch is left unchanged.
    pub fn set_button(&mut self, button: Option<usize>) -> Result<()> {
        if let Some(index) = button {
            if index >= BUTTON_COUNT {
                return Err(GyropadError::InvalidButton(index));
            }
        }
        self.button = button;
        self.prev_pressed = false;
        Ok(())
    }

    /// Stored latch state.
    #[must_use]
    pub fn state(&self) -> ArmState {
        self.state
    }

    /// True when sensor output is allowed through.
    ///
    /// Always true when no latch button is assigned.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.button.is_none() || self.state == ArmState::Armed
    }

    /// Indicator color for the current state.
    #[must_use]
    pub fn indicator(&self) -> Indicator {
        match (self.button, self.state) {
            (None, _) => Indicator::AlwaysOn,
            (Some(_), ArmState::Armed) => Indicator::Armed,
            (Some(_), ArmState::Disarmed) => Indicator::Disarmed,
        }
    }

    /// Observes the button array of one poll.
    ///
    /// Returns the new state when the latch toggled.
    pub fn observe(&mut self, buttons: &[ButtonState]) -> Option<ArmState> {
        let index = self.button?;
        let pressed = buttons.get(index)?.pressed;

        let released_edge = self.prev_pressed && !pressed;
        self.prev_pressed = pressed;

        if released_edge {
            self.state = self.state.toggled();
            info!("Latch button {} released, sensor {:?}", index, self.state);
            Some(self.state)
        } else {
            None
        }
    }
}
