//! Collaborators injected into the [`SynthesisEngine`](super::engine::SynthesisEngine)
//! so it never reaches for global state.

use std::time::Instant;

use tokio::sync::watch;

use super::types::RawGamepad;

/// Provides the real gamepad, if one is attached.
#[cfg_attr(test, mockall::automock)]
pub trait RealGamepadSource: Send {
    /// Returns the current real gamepad snapshot, or `None` when absent.
    fn poll(&mut self) -> Option<RawGamepad>;
}

/// Monotonic time source for snapshot timestamps.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> f64;
}

/// Source for hosts without a real gamepad.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGamepad;

impl RealGamepadSource for NoGamepad {
    fn poll(&mut self) -> Option<RawGamepad> {
        None
    }
}

/// Latest gamepad state published by a device reader over a watch channel.
///
/// # Examples
///
/// ```
/// use gyropad::synth::source::{RealGamepadSource, WatchedGamepad};
/// use gyropad::synth::types::RawGamepad;
/// use tokio::sync::watch;
///
/// let (tx, rx) = watch::channel(None);
/// let mut source = WatchedGamepad::new(rx);
/// assert!(source.poll().is_none());
///
/// tx.send_replace(Some(RawGamepad { connected: true, ..RawGamepad::default() }));
/// assert!(source.poll().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct WatchedGamepad {
    rx: watch::Receiver<Option<RawGamepad>>,
}

impl WatchedGamepad {
    /// Wraps the receiving end of a reader's channel.
    #[must_use]
    pub fn new(rx: watch::Receiver<Option<RawGamepad>>) -> Self {
        Self { rx }
    }
}

impl RealGamepadSource for WatchedGamepad {
    fn poll(&mut self) -> Option<RawGamepad> {
        self.rx.borrow().clone()
    }
}

/// Wall-independent clock starting at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}
