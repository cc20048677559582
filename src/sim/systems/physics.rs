use crate::sim::state::Body;
use crate::util::vec2::Vec2;

/// Integrate every body by one sub-step of `dt`
pub fn update(bodies: &mut [Body], dt: f32, acceleration: Vec2, damping: f32) {
    for body in bodies.iter_mut() {
        body.integrate(dt, acceleration, damping);
    }
}

/// Total kinetic energy over a sub-step of `dt`
///
/// Mass is taken as proportional to radius, matching the collision split.
pub fn kinetic_energy(bodies: &[Body], dt: f32) -> f32 {
    bodies
        .iter()
        .map(|body| 0.5 * body.radius * body.velocity(dt).length_sq())
        .sum()
}
