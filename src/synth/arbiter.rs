//! # Source Arbiter
//!
//! Decides, per poll and per stick, which source supplies the stick value.
//!
//! ## Priority
//!
//! | Virtual pad | Real pad | Stick | Source |
//! |-------------|----------|-------|--------|
//! | shown | any | both | Touch (Rest when no finger) |
//! | hidden | connected | assigned, at rest, armed | Sensor |
//! | hidden | connected | otherwise | Real device |
//! | hidden | absent | both | Sensor when armed, else Rest |
//!
//! The sensor only takes over a real stick while the thumb is off it, so the
//! two never fight. Only the assigned stick is ever overridden; drift on the
//! other stick passes through.
//!
//! [`arbitrate`] is pure: the same [`ArbiterInputs`] always yield the same
//! [`Arbitration`].

use super::types::{RawGamepad, Stick, StickVector};

/// Default movement threshold for real sticks.
pub const DEFAULT_MOVEMENT_THRESHOLD: f32 = 0.03;

/// Where a stick value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickSource {
    /// Real gamepad axis pair, passed through.
    RealDevice,
    /// Signal conditioner output.
    Sensor,
    /// On-screen touch stick.
    Touch,
    /// Centered; no source drives the stick.
    Rest,
}

/// Which branch of the priority table applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Real gamepad connected, on-screen pad hidden.
    Passthrough,
    /// On-screen pad shown.
    Virtual,
    /// Neither real nor on-screen pad.
    SensorOnly,
}

/// The chosen value and source of one stick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickDecision {
    /// Value to report.
    pub value: StickVector,
    /// Where it came from.
    pub source: StickSource,
}

impl StickDecision {
    fn new(value: StickVector, source: StickSource) -> Self {
        Self { value, source }
    }

    fn rest() -> Self {
        Self::new(StickVector::ZERO, StickSource::Rest)
    }
}

/// Result of one arbitration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arbitration {
    /// Branch that applied.
    pub mode: Mode,
    /// Per-stick decisions, indexed by [`Stick::index`].
    pub sticks: [StickDecision; 2],
}

impl Arbitration {
    /// Decision for one stick.
    #[must_use]
    pub fn stick(&self, stick: Stick) -> StickDecision {
        self.sticks[stick.index()]
    }

    /// True when the sensor replaced at least one real stick.
    #[must_use]
    pub fn overrides_real(&self) -> bool {
        self.mode == Mode::Passthrough
            && self.sticks.iter().any(|s| s.source == StickSource::Sensor)
    }
}

/// Everything the arbiter looks at.
#[derive(Debug, Clone, Copy)]
pub struct ArbiterInputs<'a> {
    /// Real gamepad snapshot, if the host reported one.
    pub real: Option<&'a RawGamepad>,
    /// On-screen pad shown.
    pub virtual_active: bool,
    /// Stick assigned to the sensor.
    pub assignment: Stick,
    /// Sensor armed (true when no latch button is assigned).
    pub armed: bool,
    /// Real-stick movement threshold.
    pub movement_threshold: f32,
    /// Last conditioner output per stick.
    pub sensor: [StickVector; 2],
    /// Touch stick vector per stick.
    pub touch: [StickVector; 2],
    /// Whether each touch stick has a finger on it.
    pub touch_active: [bool; 2],
}

/// Picks the authoritative value for each stick.
///
/// # Examples
///
/// ```
/// use gyropad::synth::arbiter::{arbitrate, ArbiterInputs, Mode, StickSource};
/// use gyropad::synth::types::{Stick, StickVector};
///
/// let inputs = ArbiterInputs {
///     real: None,
///     virtual_active: false,
///     assignment: Stick::Left,
///     armed: true,
///     movement_threshold: 0.03,
///     sensor: [StickVector::new(0.5, 0.0), StickVector::ZERO],
///     touch: [StickVector::ZERO; 2],
///     touch_active: [false; 2],
/// };
///
/// let decision = arbitrate(&inputs);
/// assert_eq!(decision.mode, Mode::SensorOnly);
/// assert_eq!(decision.stick(Stick::Left).source, StickSource::Sensor);
/// assert_eq!(decision.stick(Stick::Left).value.x, 0.5);
/// ```
#[must_use]
pub fn arbitrate(inputs: &ArbiterInputs<'_>) -> Arbitration {
    if inputs.virtual_active {
        return Arbitration {
            mode: Mode::Virtual,
            sticks: Stick::ALL.map(|stick| {
                let i = stick.index();
                if inputs.touch_active[i] {
                    StickDecision::new(inputs.touch[i], StickSource::Touch)
                } else {
                    StickDecision::rest()
                }
            }),
        };
    }

    match inputs.real.filter(|pad| pad.connected) {
        Some(pad) => Arbitration {
            mode: Mode::Passthrough,
            sticks: Stick::ALL.map(|stick| {
                let raw = pad.stick(stick);
                let at_rest = !raw.is_moving(inputs.movement_threshold);
                if at_rest && stick == inputs.assignment && inputs.armed {
                    StickDecision::new(inputs.sensor[stick.index()], StickSource::Sensor)
                } else {
                    StickDecision::new(raw, StickSource::RealDevice)
                }
            }),
        },
        None => Arbitration {
            mode: Mode::SensorOnly,
            sticks: Stick::ALL.map(|stick| {
                if inputs.armed {
                    StickDecision::new(inputs.sensor[stick.index()], StickSource::Sensor)
                } else {
                    StickDecision::rest()
                }
            }),
        },
    }
}
