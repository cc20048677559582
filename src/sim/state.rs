//! Body state
//!
//! Bodies carry no velocity field: velocity is implied by the gap between
//! `position` and `previous_position` (position Verlet).

use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// Stable handle to a body in the solver's body store
///
/// Bodies are never removed, so a handle stays valid for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u32);

impl BodyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Display colour, carried for the renderer only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// A circular point mass
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Current position
    pub position: Vec2,
    /// Position one sub-step ago
    pub previous_position: Vec2,
    /// Collision radius, fixed at creation
    pub radius: f32,
    pub color: Color,
}

impl Body {
    /// Create a body at rest
    pub fn new(position: Vec2, radius: f32, color: Color) -> Self {
        Self {
            position,
            previous_position: position,
            radius,
            color,
        }
    }

    /// Displacement over the last sub-step
    #[inline]
    pub fn displacement(&self) -> Vec2 {
        self.position - self.previous_position
    }

    /// Velocity in world units per second for a sub-step of `dt`
    pub fn velocity(&self, dt: f32) -> Vec2 {
        if dt > 0.0 {
            self.displacement() / dt
        } else {
            Vec2::ZERO
        }
    }

    /// Advance one sub-step.
    ///
    /// Damping acts as a drag force proportional to the implicit velocity,
    /// so its effect per sub-step scales with `damping * dt^2`.
    #[inline]
    pub fn integrate(&mut self, dt: f32, acceleration: Vec2, damping: f32) {
        let velocity = self.displacement();
        self.previous_position = self.position;
        self.position += velocity + (acceleration - velocity * damping) * (dt * dt);
    }

    /// Overwrite the implicit velocity for a sub-step of `dt`
    #[inline]
    pub fn set_velocity(&mut self, dt: f32, velocity: Vec2) {
        self.previous_position = self.position - velocity * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn body_at(x: f32, y: f32) -> Body {
        Body::new(Vec2::new(x, y), 5.0, Color::WHITE)
    }

    #[test]
    fn test_new_body_is_at_rest() {
        let body = body_at(10.0, 20.0);
        assert_eq!(body.displacement(), Vec2::ZERO);
        assert_eq!(body.previous_position, body.position);
    }

    #[test]
    fn test_set_velocity() {
        let mut body = body_at(50.0, 50.0);
        body.set_velocity(0.1, Vec2::new(100.0, 0.0));
        assert!(body.previous_position.approx_eq(Vec2::new(40.0, 50.0), EPSILON));
    }

    #[test]
    fn test_set_velocity_then_integrate() {
        let mut body = body_at(50.0, 50.0);
        body.set_velocity(0.1, Vec2::new(100.0, 0.0));
        body.integrate(0.1, Vec2::ZERO, 0.0);

        assert!(body.position.approx_eq(Vec2::new(60.0, 50.0), EPSILON));
        assert!(body.previous_position.approx_eq(Vec2::new(50.0, 50.0), EPSILON));
    }

    #[test]
    fn test_integrate_applies_acceleration() {
        let mut body = body_at(0.0, 0.0);
        body.integrate(0.5, Vec2::new(0.0, 8.0), 0.0);
        // a * dt^2 = 8 * 0.25
        assert!(body.position.approx_eq(Vec2::new(0.0, 2.0), EPSILON));
    }

    #[test]
    fn test_integrate_damping_reduces_displacement() {
        let mut damped = body_at(0.0, 0.0);
        let mut free = body_at(0.0, 0.0);
        damped.set_velocity(0.1, Vec2::new(100.0, 0.0));
        free.set_velocity(0.1, Vec2::new(100.0, 0.0));

        damped.integrate(0.1, Vec2::ZERO, 50.0);
        free.integrate(0.1, Vec2::ZERO, 0.0);

        // v = 10, v * k * dt^2 = 10 * 50 * 0.01 = 5
        assert!(damped.position.approx_eq(Vec2::new(5.0, 0.0), EPSILON));
        assert!(free.position.approx_eq(Vec2::new(10.0, 0.0), EPSILON));
    }

    #[test]
    fn test_integrate_zero_dt_at_rest_does_not_move() {
        let mut body = body_at(3.0, 4.0);
        body.integrate(0.0, Vec2::new(0.0, 1200.0), 50.0);
        assert_eq!(body.position, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_integrate_determinism() {
        let mut a = body_at(12.5, 7.25);
        a.previous_position = Vec2::new(12.0, 7.0);
        let mut b = a.clone();

        for _ in 0..1000 {
            a.integrate(1.0 / 480.0, Vec2::new(0.0, 1200.0), 50.0);
            b.integrate(1.0 / 480.0, Vec2::new(0.0, 1200.0), 50.0);
        }

        assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
        assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn test_velocity() {
        let mut body = body_at(0.0, 0.0);
        body.set_velocity(0.01, Vec2::new(300.0, -200.0));
        assert!(body.velocity(0.01).approx_eq(Vec2::new(300.0, -200.0), EPSILON));
        assert_eq!(body.velocity(0.0), Vec2::ZERO);
    }
}
