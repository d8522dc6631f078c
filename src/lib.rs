//! # Gyropad Library
//!
//! Turn controller motion into analog stick input.
//!
//! This library fuses three input sources into one virtual gamepad: a real
//! gamepad, a motion sensor and an on-screen touch controller. The
//! [`synth::SynthesisEngine`] decides per stick which source is in charge and
//! produces a standard-layout snapshot on every poll.

pub mod config;
pub mod controller;
pub mod error;
pub mod synth;
