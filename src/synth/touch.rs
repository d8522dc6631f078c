//! # Touch Vector Mapper
//!
//! Converts a finger dragged inside an on-screen stick zone into a stick
//! vector plus an offset for drawing the knob.
//!
//! ## Clamping
//!
//! Two clamps are applied, and they are kept separate:
//!
//! - The **logical vector** normalizes each axis by `stick_radius`, then
//!   rescales onto the unit circle if the touch is beyond the radius. The
//!   reported direction stays exact on diagonals.
//! - The **knob offset** is the pixel displacement capped at `stick_radius`
//!   along the true touch angle, so the knob never leaves its track.
//!
//! Touch input is not smoothed.
//!
//! ## Usage
//!
//! ```
//! use gyropad::synth::touch::{HitRegion, TouchPoint, TouchStick};
//!
//! let mut stick = TouchStick::new(HitRegion::new(0.0, 0.0, 200.0, 200.0), 50.0);
//! assert!(stick.touch_start(&[TouchPoint::new(1, 100.0, 100.0)]));
//!
//! stick.touch_move(&[TouchPoint::new(1, 125.0, 100.0)]);
//! assert_eq!(stick.vector().x, 0.5);
//!
//! stick.touch_end(&[1]);
//! assert!(!stick.is_active());
//! ```

use super::types::StickVector;

/// Default knob travel radius in pixels.
pub const DEFAULT_STICK_RADIUS: f32 = 45.0;

/// Smallest accepted knob travel radius.
pub const MIN_STICK_RADIUS: f32 = 1.0;

/// Host-assigned identifier of one finger.
pub type TouchId = u64;

/// A finger position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Identifier stable for the lifetime of the touch.
    pub id: TouchId,
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

impl TouchPoint {
    /// Creates a touch point.
    #[must_use]
    pub fn new(id: TouchId, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// Axis-aligned screen rectangle that captures touches for one stick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRegion {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl HitRegion {
    /// Creates a region from its top-left corner and size.
    #[must_use]
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Square region of side `4 * radius` anchored at the origin.
    ///
    /// Placeholder until the host reports the real layout.
    #[must_use]
    pub fn around_radius(radius: f32) -> Self {
        let side = 4.0 * radius;
        Self::new(0.0, 0.0, side, side)
    }

    /// Region center in screen pixels.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// True when the point lies inside the region (edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left
            && x <= self.left + self.width
            && y >= self.top
            && y <= self.top + self.height
    }
}

/// The finger currently bound to a stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchSession {
    /// Identifier of the bound finger.
    pub touch_id: TouchId,
}

/// Knob drawing offset from the zone center, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KnobOffset {
    /// Horizontal offset.
    pub x: f32,
    /// Vertical offset.
    pub y: f32,
}

/// Maps a pixel displacement from the zone center to a stick vector and a
/// knob offset.
///
/// # Arguments
///
/// * `dx`, `dy` - Displacement from the zone center in pixels
/// * `radius` - Knob travel radius in pixels (must be > 0)
///
/// # Examples
///
/// ```
/// use gyropad::synth::touch::map_displacement;
///
/// // Inside the radius: plain per-axis division
/// let (v, _) = map_displacement(15.0, -30.0, 60.0);
/// assert_eq!((v.x, v.y), (0.25, -0.5));
///
/// // Outside: the vector is rescaled onto the unit circle
/// let (v, knob) = map_displacement(120.0, 120.0, 60.0);
/// assert!((v.magnitude() - 1.0).abs() < 1e-6);
/// assert!((knob.x.hypot(knob.y) - 60.0).abs() < 1e-3);
/// ```
#[must_use]
pub fn map_displacement(dx: f32, dy: f32, radius: f32) -> (StickVector, KnobOffset) {
    let dx = if dx.is_finite() { dx } else { 0.0 };
    let dy = if dy.is_finite() { dy } else { 0.0 };

    let mut norm_x = dx / radius;
    let mut norm_y = dy / radius;

    let distance = dx.hypot(dy);
    if distance > radius {
        let magnitude = norm_x.hypot(norm_y);
        norm_x /= magnitude;
        norm_y /= magnitude;
    }

    let clamped = distance.min(radius);
    let angle = dy.atan2(dx);
    let knob = KnobOffset {
        x: angle.cos() * clamped,
        y: angle.sin() * clamped,
    };

    (StickVector::new(norm_x, norm_y), knob)
}

/// One on-screen analog stick.
///
/// At most one finger drives the stick. The first touch that starts inside
/// the zone wins; others are ignored until it lifts.
#[derive(Debug, Clone)]
pub struct TouchStick {
    region: HitRegion,
    radius: f32,
    session: Option<TouchSession>,
    vector: StickVector,
    knob: KnobOffset,
}

impl TouchStick {
    /// Creates an idle stick.
    ///
    /// `radius` is clamped to at least [`MIN_STICK_RADIUS`].
    #[must_use]
    pub fn new(region: HitRegion, radius: f32) -> Self {
        Self {
            region,
            radius: sanitize_radius(radius, DEFAULT_STICK_RADIUS),
            session: None,
            vector: StickVector::ZERO,
            knob: KnobOffset::default(),
        }
    }

    /// Returns the hit region.
    #[must_use]
    pub fn region(&self) -> HitRegion {
        self.region
    }

    /// Moves or resizes the hit region. An active session keeps running.
    pub fn set_region(&mut self, region: HitRegion) {
        self.region = region;
    }

    /// Returns the knob travel radius.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Sets the knob travel radius, clamped to at least [`MIN_STICK_RADIUS`].
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = sanitize_radius(radius, self.radius);
    }

    /// Returns the active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<TouchSession> {
        self.session
    }

    /// True while a finger is bound to the stick.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Current stick vector; zero when idle.
    #[must_use]
    pub fn vector(&self) -> StickVector {
        self.vector
    }

    /// Current knob drawing offset.
    #[must_use]
    pub fn knob_offset(&self) -> KnobOffset {
        self.knob
    }

    /// Handles touch-start with every finger currently on screen.
    ///
    /// Binds the first finger inside the zone unless a session already
    /// exists. Returns true when a new session started.
    pub fn touch_start(&mut self, touches: &[TouchPoint]) -> bool {
        if self.session.is_some() {
            return false;
        }

        match touches.iter().find(|t| self.region.contains(t.x, t.y)) {
            Some(touch) => {
                self.session = Some(TouchSession { touch_id: touch.id });
                true
            }
            None => false,
        }
    }

    /// Handles touch-move with every finger currently on screen.
    ///
    /// Only the bound finger is used. Returns the new vector when it moved.
    pub fn touch_move(&mut self, touches: &[TouchPoint]) -> Option<StickVector> {
        let session = self.session?;
        let touch = touches.iter().find(|t| t.id == session.touch_id)?;

        let (cx, cy) = self.region.center();
        let (vector, knob) = map_displacement(touch.x - cx, touch.y - cy, self.radius);
        self.vector = vector;
        self.knob = knob;
        Some(vector)
    }

    /// Handles touch-end for the given finger ids.
    ///
    /// Returns true when the bound finger lifted and the stick recentered.
    pub fn touch_end(&mut self, ended: &[TouchId]) -> bool {
        match self.session {
            Some(session) if ended.contains(&session.touch_id) => {
                self.release();
                true
            }
            _ => false,
        }
    }

    /// Drops any session and recenters the stick.
    pub fn release(&mut self) {
        self.session = None;
        self.vector = StickVector::ZERO;
        self.knob = KnobOffset::default();
    }
}

fn sanitize_radius(radius: f32, fallback: f32) -> f32 {
    if radius.is_finite() {
        radius.max(MIN_STICK_RADIUS)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stick() -> TouchStick {
        // Center at (100, 100)
        TouchStick::new(HitRegion::new(0.0, 0.0, 200.0, 200.0), 50.0)
    }

    // ==================== HitRegion Tests ====================

    #[test]
    fn test_region_center() {
        let region = HitRegion::new(10.0, 20.0, 100.0, 60.0);
        assert_eq!(region.center(), (60.0, 50.0));
    }

    #[test]
    fn test_region_contains() {
        let region = HitRegion::new(10.0, 20.0, 100.0, 60.0);
        assert!(region.contains(10.0, 20.0));
        assert!(region.contains(110.0, 80.0));
        assert!(!region.contains(9.9, 50.0));
        assert!(!region.contains(50.0, 80.1));
    }

    #[test]
    fn test_region_around_radius() {
        let region = HitRegion::around_radius(45.0);
        assert_eq!(region.width, 180.0);
        assert_eq!(region.center(), (90.0, 90.0));
    }

    // ==================== map_displacement Tests ====================

    #[test]
    fn test_map_center_is_zero() {
        let (v, knob) = map_displacement(0.0, 0.0, 45.0);
        assert_eq!(v, StickVector::ZERO);
        assert_eq!(knob.x, 0.0);
        assert_eq!(knob.y, 0.0);
    }

    #[test]
    fn test_map_inside_radius_is_exact() {
        let radius = 45.0;
        for &(dx, dy) in &[(10.0, 0.0), (-45.0, 0.0), (0.0, 44.9), (20.0, -30.0), (31.8, 31.8)] {
            let (v, _) = map_displacement(dx, dy, radius);
            assert_eq!(v.x, dx / radius, "dx={} dy={}", dx, dy);
            assert_eq!(v.y, dy / radius, "dx={} dy={}", dx, dy);
        }
    }

    #[test]
    fn test_map_magnitude_never_exceeds_one() {
        let radius = 45.0;
        let mut dx = -400.0;
        while dx <= 400.0 {
            let mut dy = -400.0;
            while dy <= 400.0 {
                let (v, knob) = map_displacement(dx, dy, radius);
                assert!(v.magnitude() <= 1.0 + 1e-5, "dx={} dy={} m={}", dx, dy, v.magnitude());
                assert!(knob.x.hypot(knob.y) <= radius + 1e-3);
                dy += 13.7;
            }
            dx += 13.7;
        }
    }

    #[test]
    fn test_map_diagonal_keeps_direction() {
        let (v, _) = map_displacement(100.0, 100.0, 45.0);
        assert!((v.x - v.y).abs() < 1e-6);
        assert!((v.x - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_map_knob_follows_true_angle() {
        let (_, knob) = map_displacement(0.0, -200.0, 45.0);
        assert!(knob.x.abs() < 1e-3);
        assert!((knob.y + 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_map_non_finite_displacement() {
        let (v, knob) = map_displacement(f32::NAN, 22.5, 45.0);
        assert_eq!(v.x, 0.0);
        assert_eq!(v.y, 0.5);
        assert!(knob.x.is_finite() && knob.y.is_finite());
    }

    // ==================== TouchStick Tests ====================

    #[test]
    fn test_touch_start_binds_first_touch_inside() {
        let mut s = stick();
        let touches = [
            TouchPoint::new(7, 500.0, 500.0),
            TouchPoint::new(8, 90.0, 90.0),
            TouchPoint::new(9, 110.0, 110.0),
        ];
        assert!(s.touch_start(&touches));
        assert_eq!(s.session(), Some(TouchSession { touch_id: 8 }));
    }

    #[test]
    fn test_touch_start_outside_is_ignored() {
        let mut s = stick();
        assert!(!s.touch_start(&[TouchPoint::new(1, 300.0, 100.0)]));
        assert!(!s.is_active());
    }

    #[test]
    fn test_second_touch_ignored_while_active() {
        let mut s = stick();
        s.touch_start(&[TouchPoint::new(1, 100.0, 100.0)]);
        assert!(!s.touch_start(&[TouchPoint::new(2, 120.0, 100.0)]));
        assert_eq!(s.session().map(|t| t.touch_id), Some(1));

        // Finger 2 moving does not drive the stick
        assert!(s.touch_move(&[TouchPoint::new(2, 150.0, 100.0)]).is_none());
        assert_eq!(s.vector(), StickVector::ZERO);
    }

    #[test]
    fn test_touch_move_updates_vector_and_knob() {
        let mut s = stick();
        s.touch_start(&[TouchPoint::new(1, 100.0, 100.0)]);
        let v = s.touch_move(&[TouchPoint::new(1, 100.0, 200.0)]);
        assert_eq!(v, Some(StickVector::new(0.0, 1.0)));
        assert!((s.knob_offset().y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_touch_move_without_session_is_ignored() {
        let mut s = stick();
        assert!(s.touch_move(&[TouchPoint::new(1, 150.0, 100.0)]).is_none());
    }

    #[test]
    fn test_touch_end_recenters() {
        let mut s = stick();
        s.touch_start(&[TouchPoint::new(1, 100.0, 100.0)]);
        s.touch_move(&[TouchPoint::new(1, 140.0, 60.0)]);
        assert!(s.touch_end(&[1]));
        assert!(!s.is_active());
        assert_eq!(s.vector(), StickVector::ZERO);
        assert_eq!(s.knob_offset(), KnobOffset::default());
    }

    #[test]
    fn test_touch_end_other_finger_keeps_session() {
        let mut s = stick();
        s.touch_start(&[TouchPoint::new(1, 100.0, 100.0)]);
        s.touch_move(&[TouchPoint::new(1, 125.0, 100.0)]);
        assert!(!s.touch_end(&[2]));
        assert!(s.is_active());
        assert_eq!(s.vector().x, 0.5);
    }

    #[test]
    fn test_new_session_after_release() {
        let mut s = stick();
        s.touch_start(&[TouchPoint::new(1, 100.0, 100.0)]);
        s.touch_end(&[1]);
        assert!(s.touch_start(&[TouchPoint::new(2, 100.0, 100.0)]));
        assert_eq!(s.session().map(|t| t.touch_id), Some(2));
    }

    #[test]
    fn test_radius_is_clamped() {
        let mut s = TouchStick::new(HitRegion::around_radius(45.0), 0.0);
        assert_eq!(s.radius(), MIN_STICK_RADIUS);
        s.set_radius(f32::NAN);
        assert_eq!(s.radius(), MIN_STICK_RADIUS);
        s.set_radius(60.0);
        assert_eq!(s.radius(), 60.0);
    }
}
