//! Sub-stepped Verlet solver
//!
//! Owns every body and the collision grid. Each frame is split into a fixed
//! number of equal sub-steps, and every sub-step runs the systems in this
//! order:
//!
//! 1. integrate all bodies
//! 2. clamp all bodies to the boundary
//! 3. rebuild the grid from the clamped positions
//! 4. resolve collisions through the grid
//!
//! The grid must see the same positions the collision pass reads, and it
//! can only index positions the boundary has already clamped.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ConfigError;
use crate::sim::constants::{arena, physics};
use crate::sim::spatial::Grid;
use crate::sim::state::{Body, BodyId, Color};
use crate::sim::systems::arena::{self as arena_system, Boundary};
use crate::sim::systems::{collision, physics as physics_system};
use crate::util::vec2::Vec2;

/// Construction-time solver settings, fixed for the run
///
/// `cell_size` must be at least the diameter of the largest body that will
/// be added, otherwise touching bodies two cells apart are never compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Arena size; the grid covers `[0, extent)` on both axes
    pub extent: Vec2,
    pub boundary: Boundary,
    /// Sub-steps per frame
    pub substeps: u32,
    /// Drag coefficient on the implicit velocity
    pub damping: f32,
    /// Grid cell edge length
    pub cell_size: f32,
    /// Fraction of each overlap removed per contact, in (0, 1]
    pub collision_response: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        let extent = Vec2::new(arena::WIDTH, arena::HEIGHT);
        Self {
            extent,
            boundary: Boundary::centered_circle(extent, arena::BOUNDARY_RADIUS),
            substeps: physics::SUBSTEPS,
            damping: physics::DAMPING,
            cell_size: physics::CELL_SIZE,
            collision_response: 1.0,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let extent = self.extent;
        if !(extent.is_finite() && extent.x > 0.0 && extent.y > 0.0) {
            return Err(ConfigError::InvalidArena {
                width: extent.x,
                height: extent.y,
            });
        }
        if self.substeps == 0 {
            return Err(ConfigError::ZeroSubsteps);
        }
        if !(self.damping.is_finite() && self.damping >= 0.0) {
            return Err(ConfigError::InvalidDamping(self.damping));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if !(self.collision_response > 0.0 && self.collision_response <= 1.0) {
            return Err(ConfigError::InvalidCollisionResponse(self.collision_response));
        }
        self.boundary.validate(extent)
    }
}

/// What happened during one `advance` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Sub-steps actually run (0 for a skipped frame)
    pub substeps: u32,
    /// Overlapping pairs resolved, summed over sub-steps
    pub contacts: usize,
    /// Boundary corrections, summed over sub-steps
    pub boundary_contacts: usize,
}

pub struct Solver {
    config: SolverConfig,
    bodies: Vec<Body>,
    grid: Grid,
}

impl Solver {
    /// Build an empty solver
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let grid = Grid::new(config.extent, config.cell_size);
        let (cols, rows) = grid.dimensions();
        info!(
            "Solver ready: {}x{} arena, {}x{} grid of {} unit cells, {} sub-steps",
            config.extent.x, config.extent.y, cols, rows, config.cell_size, config.substeps
        );

        Ok(Self {
            config,
            bodies: Vec::new(),
            grid,
        })
    }

    /// Add a body at rest and return its handle
    pub fn add_body(&mut self, position: Vec2, radius: f32, color: Color) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        self.bodies.push(Body::new(position, radius, color));
        id
    }

    /// Give a body a launch velocity (world units per second).
    ///
    /// `frame_dt` is the frame time passed to `advance`; the implicit
    /// velocity is stored per sub-step. Returns false for an unknown id.
    pub fn set_body_velocity(&mut self, id: BodyId, frame_dt: f32, velocity: Vec2) -> bool {
        let step_dt = self.substep_dt(frame_dt);
        match self.bodies.get_mut(id.index()) {
            Some(body) => {
                body.set_velocity(step_dt, velocity);
                true
            }
            None => false,
        }
    }

    /// Run one frame: `substeps` equal sub-steps covering `frame_dt`.
    ///
    /// A non-positive or non-finite `frame_dt` skips the frame.
    pub fn advance(&mut self, frame_dt: f32, acceleration: Vec2) -> FrameStats {
        if !(frame_dt.is_finite() && frame_dt > 0.0) {
            debug!("Skipping frame with dt {}", frame_dt);
            return FrameStats::default();
        }

        let step_dt = self.substep_dt(frame_dt);
        let mut stats = FrameStats::default();

        for _ in 0..self.config.substeps {
            physics_system::update(&mut self.bodies, step_dt, acceleration, self.config.damping);
            stats.boundary_contacts += arena_system::update(&self.config.boundary, &mut self.bodies);
            self.grid.rebuild(&self.bodies);
            stats.contacts +=
                collision::update(&self.grid, &mut self.bodies, self.config.collision_response);
            stats.substeps += 1;
        }

        stats
    }

    /// Duration of one sub-step for a frame of `frame_dt`
    #[inline]
    pub fn substep_dt(&self, frame_dt: f32) -> f32 {
        frame_dt / self.config.substeps as f32
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn boundary(&self) -> &Boundary {
        &self.config.boundary
    }

    /// Grid as of the last sub-step, for debug overlays
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Total kinetic energy as of the last sub-step of a frame of `frame_dt`
    pub fn kinetic_energy(&self, frame_dt: f32) -> f32 {
        physics_system::kinetic_energy(&self.bodies, self.substep_dt(frame_dt))
    }
}
