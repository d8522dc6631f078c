//! # Synthesis Module
//!
//! The input fusion engine: conditions motion samples, maps touches to
//! sticks, arbitrates between sources and composes the gamepad snapshot.
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | shared value types and the standard button layout |
//! | [`conditioner`] | deadzone, low-pass filter, normalization |
//! | [`touch`] | on-screen stick sessions and displacement mapping |
//! | [`virtual_pad`] | on-screen controller state |
//! | [`latch`] | arm/disarm toggle |
//! | [`arbiter`] | per-stick source selection |
//! | [`composer`] | snapshot assembly |
//! | [`source`] | injected real-gamepad and clock collaborators |
//! | [`engine`] | owner of all of the above |

pub mod arbiter;
pub mod composer;
pub mod conditioner;
pub mod engine;
pub mod latch;
pub mod source;
pub mod touch;
pub mod types;
pub mod virtual_pad;

pub use engine::{EngineSettings, SynthesisEngine};
pub use types::{ButtonState, GamepadSnapshot, RawGamepad, RotationSample, Stick, StickVector};
