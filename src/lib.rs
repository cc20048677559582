//! Verlet Arena Library
//!
//! A 2D circle-collision solver: position Verlet integration, a uniform grid
//! broad phase, fixed sub-stepping and a circular or rectangular wall.
//!
//! The solver is headless. Rendering, input and window handling belong to
//! whatever drives it; `Solver::grid` and `Body::color` are there for
//! debug overlays and drawing.

pub mod config;
pub mod sim;
pub mod util;

pub use config::{ConfigError, SimConfig};
pub use sim::solver::{FrameStats, Solver, SolverConfig};
pub use sim::state::{Body, BodyId, Color};
pub use sim::systems::arena::Boundary;
pub use util::vec2::Vec2;
