//! Narrow-phase collision resolution
//!
//! Overlapping pairs are separated by moving both bodies along the line
//! between their centres. The split is inversely proportional to radius,
//! so the larger body moves less. Only positions change; the integrator
//! turns the correction into velocity on the next sub-step.

use crate::sim::spatial::Grid;
use crate::sim::state::Body;
use crate::util::vec2::Vec2;

/// Separation axis used when two centres coincide exactly
const COINCIDENT_AXIS: Vec2 = Vec2::RIGHT;

/// Separate `a` and `b` if they overlap.
///
/// `response` is the fraction of the overlap removed: 1.0 leaves the pair
/// exactly touching, 0.5 removes half. Returns true if the pair overlapped.
#[inline]
pub fn resolve_pair(a: &mut Body, b: &mut Body, response: f32) -> bool {
    let sum_radius = a.radius + b.radius;
    let delta = a.position - b.position;

    // Cheap reject before the square root
    if delta.length_sq() >= sum_radius * sum_radius {
        return false;
    }

    // Coincident centres have no direction; fall back to a fixed axis so the
    // outcome is deterministic
    let (dir, dist) = delta
        .try_normalize_with_length()
        .unwrap_or((COINCIDENT_AXIS, 0.0));

    let correction = (sum_radius - dist) * response;
    b.position -= dir * (correction * (a.radius / sum_radius));
    a.position += dir * (correction * (b.radius / sum_radius));

    true
}

/// Resolve every overlapping pair the grid reports.
/// Returns the number of overlapping pairs found.
pub fn update(grid: &Grid, bodies: &mut [Body], response: f32) -> usize {
    let mut contacts = 0;

    grid.for_each_potential_collision(|a, b| {
        let (first, second) = pair_mut(bodies, a.index(), b.index());
        if resolve_pair(first, second, response) {
            contacts += 1;
        }
    });

    contacts
}

/// Borrow two distinct bodies mutably, in the order requested
#[inline]
fn pair_mut(bodies: &mut [Body], a: usize, b: usize) -> (&mut Body, &mut Body) {
    debug_assert_ne!(a, b, "a body cannot collide with itself");
    if a < b {
        let (low, high) = bodies.split_at_mut(b);
        (&mut low[a], &mut high[0])
    } else {
        let (low, high) = bodies.split_at_mut(a);
        (&mut high[0], &mut low[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Color;

    const EPSILON: f32 = 1e-4;

    fn body(x: f32, y: f32, radius: f32) -> Body {
        Body::new(Vec2::new(x, y), radius, Color::WHITE)
    }

    #[test]
    fn test_separated_pair_untouched() {
        let mut a = body(0.0, 0.0, 3.0);
        let mut b = body(10.0, 0.0, 3.0);
        assert!(!resolve_pair(&mut a, &mut b, 1.0));
        assert_eq!(a.position, Vec2::new(0.0, 0.0));
        assert_eq!(b.position, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn test_touching_pair_untouched() {
        let mut a = body(0.0, 0.0, 3.0);
        let mut b = body(6.0, 0.0, 3.0);
        assert!(!resolve_pair(&mut a, &mut b, 1.0));
    }

    #[test]
    fn test_resolution_reaches_contact() {
        let mut a = body(3.0, 4.0, 5.0);
        let mut b = body(0.0, 0.0, 7.0);
        assert!(resolve_pair(&mut a, &mut b, 1.0));

        let dist = a.position.distance_to(b.position);
        assert!((dist - 12.0).abs() < EPSILON, "distance {dist}");
    }

    #[test]
    fn test_half_response_removes_half_overlap() {
        let mut a = body(0.0, 0.0, 3.0);
        let mut b = body(2.0, 0.0, 3.0);
        resolve_pair(&mut a, &mut b, 0.5);

        // Overlap 4, half removed
        assert!((a.position.distance_to(b.position) - 4.0).abs() < EPSILON);
    }

    #[test]
    fn test_mass_ratio_split() {
        // r1 = 2, r2 = 4, overlapping by 2
        let mut small = body(0.0, 0.0, 2.0);
        let mut large = body(4.0, 0.0, 4.0);
        resolve_pair(&mut small, &mut large, 1.0);

        let small_moved = small.position.distance_to(Vec2::new(0.0, 0.0));
        let large_moved = large.position.distance_to(Vec2::new(4.0, 0.0));

        assert!((small_moved - 2.0 * 4.0 / 6.0).abs() < EPSILON);
        assert!((large_moved - 2.0 * 2.0 / 6.0).abs() < EPSILON);
        // Moved apart, along the centre line
        assert!(small.position.x < 0.0 && large.position.x > 4.0);
        assert_eq!(small.position.y, 0.0);
        assert_eq!(large.position.y, 0.0);
    }

    #[test]
    fn test_mass_ratio_split_is_order_independent() {
        let mut small = body(0.0, 0.0, 2.0);
        let mut large = body(4.0, 0.0, 4.0);
        resolve_pair(&mut large, &mut small, 1.0);

        assert!(small.position.approx_eq(Vec2::new(-4.0 / 3.0, 0.0), EPSILON));
        assert!(large.position.approx_eq(Vec2::new(4.0 + 2.0 / 3.0, 0.0), EPSILON));
    }

    #[test]
    fn test_coincident_bodies_use_fixed_axis() {
        let mut a = body(50.0, 50.0, 3.0);
        let mut b = body(50.0, 50.0, 3.0);
        assert!(resolve_pair(&mut a, &mut b, 1.0));

        assert!(a.position.approx_eq(Vec2::new(53.0, 50.0), EPSILON));
        assert!(b.position.approx_eq(Vec2::new(47.0, 50.0), EPSILON));
        assert!(a.position.is_finite() && b.position.is_finite());
    }

    #[test]
    fn test_resolution_leaves_previous_position() {
        let mut a = body(0.0, 0.0, 3.0);
        let mut b = body(2.0, 0.0, 3.0);
        resolve_pair(&mut a, &mut b, 1.0);
        assert_eq!(a.previous_position, Vec2::new(0.0, 0.0));
        assert_eq!(b.previous_position, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_update_separates_cross_cell_pair() {
        let extent = Vec2::new(100.0, 100.0);
        let mut grid = Grid::new(extent, 10.0);
        let mut bodies = vec![body(9.0, 5.0, 3.0), body(11.0, 5.0, 3.0)];
        grid.rebuild(&bodies);

        let contacts = update(&grid, &mut bodies, 1.0);

        assert_eq!(contacts, 1);
        let dist = bodies[0].position.distance_to(bodies[1].position);
        assert!((dist - 6.0).abs() < EPSILON, "distance {dist}");
    }

    #[test]
    fn test_update_ignores_far_pairs() {
        let mut grid = Grid::new(Vec2::new(100.0, 100.0), 10.0);
        let mut bodies = vec![body(5.0, 5.0, 3.0), body(55.0, 55.0, 3.0)];
        grid.rebuild(&bodies);

        assert_eq!(update(&grid, &mut bodies, 1.0), 0);
        assert_eq!(bodies[0].position, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_pair_mut_order() {
        let mut bodies = vec![body(0.0, 0.0, 1.0), body(1.0, 0.0, 2.0), body(2.0, 0.0, 3.0)];
        let (a, b) = pair_mut(&mut bodies, 2, 0);
        assert_eq!(a.radius, 3.0);
        assert_eq!(b.radius, 1.0);
        let (a, b) = pair_mut(&mut bodies, 0, 1);
        assert_eq!(a.radius, 1.0);
        assert_eq!(b.radius, 2.0);
    }
}
