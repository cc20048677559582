//! Arena boundary enforcement
//!
//! Pushes bodies back inside the arena after integration. There is no
//! velocity reflection: the clamped position becomes the reference for the
//! next integration, so boundary contact is inelastic.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::sim::state::Body;
use crate::util::vec2::Vec2;

/// Shape of the arena wall
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Boundary {
    /// Circular wall
    Circle { center: Vec2, radius: f32 },
    /// Axis-aligned wall inset from the edges of `[0, extent]`
    Rect { extent: Vec2, inset: Vec2 },
}

impl Boundary {
    /// Circle of `radius` centred in an arena of `extent`
    pub fn centered_circle(extent: Vec2, radius: f32) -> Self {
        Boundary::Circle {
            center: extent * 0.5,
            radius,
        }
    }

    /// Rectangle covering `extent` minus `inset` on every side
    pub fn inset_rect(extent: Vec2, inset: Vec2) -> Self {
        Boundary::Rect { extent, inset }
    }

    /// Bounding box (min, max) of the space inside the wall
    pub fn interior(&self) -> (Vec2, Vec2) {
        match *self {
            Boundary::Circle { center, radius } => {
                (center - Vec2::splat(radius), center + Vec2::splat(radius))
            }
            Boundary::Rect { extent, inset } => (inset, extent - inset),
        }
    }

    /// Check that the wall is well formed and lies inside an arena of `extent`
    pub fn validate(&self, extent: Vec2) -> Result<(), ConfigError> {
        match *self {
            Boundary::Circle { center, radius } => {
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(ConfigError::InvalidBoundaryRadius(radius));
                }
                let (min, max) = self.interior();
                if !center.is_finite()
                    || min.x < 0.0
                    || min.y < 0.0
                    || max.x > extent.x
                    || max.y > extent.y
                {
                    return Err(ConfigError::BoundaryOutsideArena {
                        x: center.x,
                        y: center.y,
                        radius,
                    });
                }
            }
            Boundary::Rect { extent: wall, inset } => {
                if wall != extent {
                    return Err(ConfigError::BoundaryExtentMismatch {
                        boundary_width: wall.x,
                        boundary_height: wall.y,
                    });
                }
                let invalid = !inset.is_finite()
                    || inset.x < 0.0
                    || inset.y < 0.0
                    || 2.0 * inset.x >= extent.x
                    || 2.0 * inset.y >= extent.y;
                if invalid {
                    return Err(ConfigError::InvalidInset {
                        x: inset.x,
                        y: inset.y,
                    });
                }
            }
        }
        Ok(())
    }

    /// Move `body` back inside the wall. Returns true if it was corrected.
    pub fn enforce(&self, body: &mut Body) -> bool {
        match *self {
            Boundary::Circle { center, radius } => {
                enforce_circle(body, center, radius)
            }
            Boundary::Rect { extent, inset } => enforce_rect(body, extent, inset),
        }
    }
}

/// Place a body that pokes through the circle tangent to it
fn enforce_circle(body: &mut Body, center: Vec2, boundary_radius: f32) -> bool {
    // A body exactly at the centre has no outward direction and cannot be outside
    let Some((dir, dist)) = (body.position - center).try_normalize_with_length() else {
        return false;
    };

    if dist + body.radius > boundary_radius {
        body.position = center + dir * (boundary_radius - body.radius);
        true
    } else {
        false
    }
}

/// Clamp each axis into `[inset + r, extent - inset - r]`.
///
/// At most one correction per axis; the upper bound wins when a body is
/// too large to fit between both.
fn enforce_rect(body: &mut Body, extent: Vec2, inset: Vec2) -> bool {
    let r = body.radius;
    let x = clamp_axis(&mut body.position.x, inset.x + r, extent.x - inset.x - r);
    let y = clamp_axis(&mut body.position.y, inset.y + r, extent.y - inset.y - r);
    x || y
}

#[inline]
fn clamp_axis(value: &mut f32, low: f32, high: f32) -> bool {
    if *value > high {
        *value = high;
        true
    } else if *value < low {
        *value = low;
        true
    } else {
        false
    }
}

/// Enforce the boundary on every body. Returns how many were corrected.
pub fn update(boundary: &Boundary, bodies: &mut [Body]) -> usize {
    bodies
        .iter_mut()
        .map(|body| boundary.enforce(body))
        .filter(|&corrected| corrected)
        .count()
}
