//! # Virtual Pad
//!
//! Logical state of the on-screen controller: whether it is shown, its two
//! touch sticks and its buttons.
//!
//! Buttons are sticky. A button keeps its state until the host reports the
//! matching touch-end, so buttons not touched in a frame keep their previous
//! value.

use super::touch::{HitRegion, TouchId, TouchPoint, TouchStick};
use super::types::{ButtonState, Stick, StickVector, BUTTON_COUNT};
use crate::error::{GyropadError, Result};

/// On-screen controller state.
#[derive(Debug, Clone)]
pub struct VirtualPad {
    active: bool,
    sticks: [TouchStick; 2],
    buttons: [ButtonState; BUTTON_COUNT],
}

impl VirtualPad {
    /// Creates a hidden pad with the given stick zones and knob radius.
    #[must_use]
    pub fn new(left: HitRegion, right: HitRegion, radius: f32) -> Self {
        Self {
            active: false,
            sticks: [TouchStick::new(left, radius), TouchStick::new(right, radius)],
            buttons: [ButtonState::RELEASED; BUTTON_COUNT],
        }
    }

    /// True while the on-screen controller is shown.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Shows the pad.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Hides the pad, releasing every stick and button.
    pub fn deactivate(&mut self) {
        self.active = false;
        for stick in &mut self.sticks {
            stick.release();
        }
        self.buttons = [ButtonState::RELEASED; BUTTON_COUNT];
    }

    /// Returns one touch stick.
    #[must_use]
    pub fn stick(&self, stick: Stick) -> &TouchStick {
        &self.sticks[stick.index()]
    }

    /// Mutable access to one touch stick.
    pub fn stick_mut(&mut self, stick: Stick) -> &mut TouchStick {
        &mut self.sticks[stick.index()]
    }

    /// Current vectors of both sticks, in axis order.
    #[must_use]
    pub fn vectors(&self) -> [StickVector; 2] {
        [self.sticks[0].vector(), self.sticks[1].vector()]
    }

    /// Current button array.
    #[must_use]
    pub fn buttons(&self) -> &[ButtonState; BUTTON_COUNT] {
        &self.buttons
    }

    /// Forwards a touch-start to a stick zone. Ignored while hidden.
    pub fn touch_start(&mut self, stick: Stick, touches: &[TouchPoint]) -> bool {
        self.active && self.sticks[stick.index()].touch_start(touches)
    }

    /// Forwards a touch-move to a stick zone. Ignored while hidden.
    pub fn touch_move(&mut self, stick: Stick, touches: &[TouchPoint]) -> Option<StickVector> {
        if !self.active {
            return None;
        }
        self.sticks[stick.index()].touch_move(touches)
    }

    /// Forwards a touch-end to a stick zone.
    pub fn touch_end(&mut self, stick: Stick, ended: &[TouchId]) -> bool {
        self.sticks[stick.index()].touch_end(ended)
    }

    /// Writes an analog value to an on-screen button. Ignored while hidden.
    ///
    /// # Errors
    ///
    /// Returns [`GyropadError::InvalidButton`] when `index >= 18`.
    pub fn set_button(&mut self, index: usize, value: f32) -> Result<()> {
        let slot = self
            .buttons
            .get_mut(index)
            .ok_or(GyropadError::InvalidButton(index))?;
        if self.active {
            *slot = ButtonState::from_value(value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> VirtualPad {
        VirtualPad::new(
            HitRegion::new(0.0, 0.0, 100.0, 100.0),
            HitRegion::new(500.0, 0.0, 100.0, 100.0),
            25.0,
        )
    }

    #[test]
    fn test_new_pad_is_hidden_and_idle() {
        let p = pad();
        assert!(!p.is_active());
        assert_eq!(p.vectors(), [StickVector::ZERO; 2]);
        assert!(p.buttons().iter().all(|b| !b.pressed));
    }

    #[test]
    fn test_touches_ignored_while_hidden() {
        let mut p = pad();
        assert!(!p.touch_start(Stick::Left, &[TouchPoint::new(1, 50.0, 50.0)]));
        assert!(p.touch_move(Stick::Left, &[TouchPoint::new(1, 75.0, 50.0)]).is_none());
    }

    #[test]
    fn test_sticks_are_independent() {
        let mut p = pad();
        p.activate();
        assert!(p.touch_start(Stick::Left, &[TouchPoint::new(1, 50.0, 50.0)]));
        assert!(p.touch_start(Stick::Right, &[TouchPoint::new(2, 550.0, 50.0)]));

        p.touch_move(Stick::Left, &[TouchPoint::new(1, 75.0, 50.0), TouchPoint::new(2, 550.0, 25.0)]);
        p.touch_move(Stick::Right, &[TouchPoint::new(1, 75.0, 50.0), TouchPoint::new(2, 550.0, 25.0)]);

        let [left, right] = p.vectors();
        assert_eq!(left, StickVector::new(1.0, 0.0));
        assert_eq!(right, StickVector::new(0.0, -1.0));
    }

    #[test]
    fn test_buttons_are_sticky() {
        let mut p = pad();
        p.activate();
        p.set_button(0, 1.0).unwrap();
        p.set_button(7, 0.5).unwrap();
        assert!(p.buttons()[0].pressed);
        assert_eq!(p.buttons()[7].value, 0.5);

        p.set_button(0, 0.0).unwrap();
        assert!(!p.buttons()[0].pressed);
        assert!(p.buttons()[7].pressed);
    }

    #[test]
    fn test_set_button_out_of_range() {
        let mut p = pad();
        assert!(matches!(p.set_button(18, 1.0), Err(GyropadError::InvalidButton(18))));
    }

    #[test]
    fn test_buttons_ignored_while_hidden() {
        let mut p = pad();
        p.set_button(2, 1.0).unwrap();
        assert!(!p.buttons()[2].pressed);
    }

    #[test]
    fn test_deactivate_releases_everything() {
        let mut p = pad();
        p.activate();
        p.touch_start(Stick::Left, &[TouchPoint::new(1, 50.0, 50.0)]);
        p.touch_move(Stick::Left, &[TouchPoint::new(1, 60.0, 50.0)]);
        p.set_button(3, 1.0).unwrap();

        p.deactivate();
        assert!(!p.is_active());
        assert!(!p.stick(Stick::Left).is_active());
        assert_eq!(p.vectors(), [StickVector::ZERO; 2]);
        assert!(!p.buttons()[3].pressed);
    }
}
