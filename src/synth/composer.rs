//! # Gamepad State Composer
//!
//! Builds the snapshot returned to consumers from an [`Arbitration`].
//!
//! | Mode | Axes | Buttons | Timestamp |
//! |------|------|---------|-----------|
//! | Passthrough | real, sensor overrides applied | real (touched dropped) | bumped only on override |
//! | Virtual | touch sticks | on-screen buttons | always bumped |
//! | SensorOnly | sensor | all released | always bumped |
//!
//! Snapshots always carry 4 axes and 18 buttons. Real devices with fewer
//! are padded with centered axes and released buttons; extras are dropped.

use super::arbiter::{Arbitration, Mode, StickSource};
use super::types::{
    clamp_unit, ButtonState, GamepadSnapshot, RawGamepad, Stick, AXIS_COUNT, BUTTON_COUNT,
};

/// Inputs to one composition besides the arbitration.
#[derive(Debug, Clone, Copy)]
pub struct ComposeInputs<'a> {
    /// Snapshot returned by the previous poll.
    pub previous: &'a GamepadSnapshot,
    /// Real gamepad, used for passthrough buttons and axes.
    pub real: Option<&'a RawGamepad>,
    /// On-screen button states.
    pub virtual_buttons: &'a [ButtonState; BUTTON_COUNT],
    /// Current time in milliseconds.
    pub now: f64,
}

/// Produces the snapshot for one poll.
#[must_use]
pub fn compose(arbitration: &Arbitration, inputs: &ComposeInputs<'_>) -> GamepadSnapshot {
    match (arbitration.mode, inputs.real) {
        (Mode::Passthrough, Some(real)) => compose_passthrough(arbitration, real, inputs),
        (Mode::Virtual, _) => GamepadSnapshot {
            buttons: *inputs.virtual_buttons,
            axes: synthetic_axes(arbitration),
            timestamp: inputs.now,
            connected: true,
        },
        _ => GamepadSnapshot {
            buttons: [ButtonState::RELEASED; BUTTON_COUNT],
            axes: synthetic_axes(arbitration),
            timestamp: inputs.now,
            connected: true,
        },
    }
}

fn compose_passthrough(
    arbitration: &Arbitration,
    real: &RawGamepad,
    inputs: &ComposeInputs<'_>,
) -> GamepadSnapshot {
    let mut snapshot = GamepadSnapshot {
        buttons: copy_real_buttons(&real.buttons),
        axes: copy_real_axes(&real.axes),
        timestamp: inputs.previous.timestamp,
        connected: true,
    };

    for stick in Stick::ALL {
        let decision = arbitration.stick(stick);
        if decision.source == StickSource::Sensor {
            snapshot.set_stick(stick, decision.value);
        }
    }

    if arbitration.overrides_real() {
        snapshot.timestamp = inputs.now;
    }
    snapshot
}

fn synthetic_axes(arbitration: &Arbitration) -> [f32; AXIS_COUNT] {
    let mut snapshot = GamepadSnapshot::default();
    for stick in Stick::ALL {
        snapshot.set_stick(stick, arbitration.stick(stick).value);
    }
    snapshot.axes
}

fn copy_real_axes(axes: &[f32]) -> [f32; AXIS_COUNT] {
    let mut out = [0.0; AXIS_COUNT];
    for (slot, value) in out.iter_mut().zip(axes) {
        *slot = clamp_unit(*value);
    }
    out
}

fn copy_real_buttons(buttons: &[ButtonState]) -> [ButtonState; BUTTON_COUNT] {
    let mut out = [ButtonState::RELEASED; BUTTON_COUNT];
    for (slot, button) in out.iter_mut().zip(buttons) {
        *slot = ButtonState {
            pressed: button.pressed,
            touched: false,
            value: button.value,
        };
    }
    out
}
