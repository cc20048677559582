use std::fmt::Display;
use std::str::FromStr;

use crate::sim::constants::{arena, driver, physics, spawn};
use crate::sim::solver::SolverConfig;
use crate::sim::spawner::SpawnerConfig;
use crate::sim::systems::arena::Boundary;
use crate::util::vec2::Vec2;

/// Configuration errors, reported at construction time
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("arena extent must be positive and finite, got {width}x{height}")]
    InvalidArena { width: f32, height: f32 },
    #[error("sub-step count must be at least 1")]
    ZeroSubsteps,
    #[error("damping must be finite and >= 0, got {0}")]
    InvalidDamping(f32),
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
    #[error("collision response must be in (0, 1], got {0}")]
    InvalidCollisionResponse(f32),
    #[error("boundary radius must be positive and finite, got {0}")]
    InvalidBoundaryRadius(f32),
    #[error("circular boundary at ({x}, {y}) with radius {radius} does not fit in the arena")]
    BoundaryOutsideArena { x: f32, y: f32, radius: f32 },
    #[error("rectangular boundary extent {boundary_width}x{boundary_height} differs from the arena")]
    BoundaryExtentMismatch {
        boundary_width: f32,
        boundary_height: f32,
    },
    #[error("rectangular boundary insets ({x}, {y}) leave no interior")]
    InvalidInset { x: f32, y: f32 },
    #[error("body radius range {min}..={max} is invalid")]
    InvalidRadiusRange { min: f32, max: f32 },
    #[error("cell size {cell_size} is smaller than the largest body diameter {diameter}")]
    CellTooSmall { cell_size: f32, diameter: f32 },
    #[error("spawn interval must be finite and >= 0, got {0}")]
    InvalidSpawnInterval(f32),
    #[error("frame rate must be at least 1")]
    ZeroFrameRate,
}

/// Boundary shape selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Circle,
    Rect,
}

impl FromStr for BoundaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "circle" | "circular" => Ok(BoundaryKind::Circle),
            "rect" | "rectangle" | "rectangular" => Ok(BoundaryKind::Rect),
            other => Err(format!("unknown boundary '{}'", other)),
        }
    }
}

/// Simulation configuration for the headless driver
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Arena width in world units
    pub arena_width: f32,
    /// Arena height in world units
    pub arena_height: f32,
    /// Wall shape
    pub boundary: BoundaryKind,
    /// Radius of the circular wall (centred in the arena)
    pub boundary_radius: f32,
    /// Horizontal inset of the rectangular wall
    pub inset_x: f32,
    /// Vertical inset of the rectangular wall
    pub inset_y: f32,
    /// Sub-steps per frame
    pub substeps: u32,
    /// Drag coefficient
    pub damping: f32,
    /// Grid cell size
    pub cell_size: f32,
    /// Fraction of each overlap removed per contact
    pub collision_response: f32,
    /// Constant acceleration applied to every body
    pub gravity: Vec2,
    /// Bodies to spawn
    pub spawn_count: usize,
    /// Seconds between spawns
    pub spawn_interval: f32,
    /// Launch speed
    pub spawn_speed: f32,
    /// Smallest spawned radius
    pub min_radius: f32,
    /// Largest spawned radius
    pub max_radius: f32,
    /// Frames to simulate
    pub frames: u64,
    /// Simulated frames per second
    pub frame_rate: u32,
    /// RNG seed for the spawner
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_width: arena::WIDTH,
            arena_height: arena::HEIGHT,
            boundary: BoundaryKind::Circle,
            boundary_radius: arena::BOUNDARY_RADIUS,
            inset_x: arena::INSET_X,
            inset_y: arena::INSET_Y,
            substeps: physics::SUBSTEPS,
            damping: physics::DAMPING,
            cell_size: physics::CELL_SIZE,
            collision_response: 1.0,
            gravity: Vec2::new(0.0, physics::GRAVITY_Y),
            spawn_count: spawn::COUNT,
            spawn_interval: spawn::INTERVAL,
            spawn_speed: spawn::SPEED,
            min_radius: spawn::MIN_RADIUS,
            max_radius: spawn::MAX_RADIUS,
            frames: driver::FRAMES,
            frame_rate: physics::FRAME_RATE,
            seed: None,
        }
    }
}

/// Read and parse an environment variable.
///
/// Unset variables yield `None` silently; unparsable or rejected values are
/// logged and also yield `None`, so the caller keeps its default.
fn env_value<T>(name: &str, accept: impl Fn(&T) -> bool, requirement: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) if accept(&value) => Some(value),
        Ok(_) => {
            tracing::warn!("{} must be {}, using default", name, requirement);
            None
        }
        Err(e) => {
            tracing::warn!("Invalid {} '{}' ({}), using default", name, raw, e);
            None
        }
    }
}

fn positive(v: &f32) -> bool {
    v.is_finite() && *v > 0.0
}

fn non_negative(v: &f32) -> bool {
    v.is_finite() && *v >= 0.0
}

impl SimConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_value("ARENA_WIDTH", positive, "> 0") {
            config.arena_width = v;
        }
        if let Some(v) = env_value("ARENA_HEIGHT", positive, "> 0") {
            config.arena_height = v;
        }
        if let Some(v) = env_value("BOUNDARY", |_: &BoundaryKind| true, "circle or rect") {
            config.boundary = v;
        }
        if let Some(v) = env_value("BOUNDARY_RADIUS", positive, "> 0") {
            config.boundary_radius = v;
        }
        if let Some(v) = env_value("BOUNDARY_INSET_X", non_negative, ">= 0") {
            config.inset_x = v;
        }
        if let Some(v) = env_value("BOUNDARY_INSET_Y", non_negative, ">= 0") {
            config.inset_y = v;
        }
        if let Some(v) = env_value("SUBSTEPS", |v: &u32| (1..=64).contains(v), "1-64") {
            config.substeps = v;
        }
        if let Some(v) = env_value("DAMPING", non_negative, ">= 0") {
            config.damping = v;
        }
        if let Some(v) = env_value("CELL_SIZE", positive, "> 0") {
            config.cell_size = v;
        }
        if let Some(v) = env_value(
            "COLLISION_RESPONSE",
            |v: &f32| *v > 0.0 && *v <= 1.0,
            "in (0, 1]",
        ) {
            config.collision_response = v;
        }
        if let Some(v) = env_value("GRAVITY_X", |v: &f32| v.is_finite(), "finite") {
            config.gravity.x = v;
        }
        if let Some(v) = env_value("GRAVITY_Y", |v: &f32| v.is_finite(), "finite") {
            config.gravity.y = v;
        }
        if let Some(v) = env_value("SPAWN_COUNT", |_: &usize| true, "a count") {
            config.spawn_count = v;
        }
        if let Some(v) = env_value("SPAWN_INTERVAL", non_negative, ">= 0") {
            config.spawn_interval = v;
        }
        if let Some(v) = env_value("SPAWN_SPEED", non_negative, ">= 0") {
            config.spawn_speed = v;
        }
        if let Some(v) = env_value("MIN_RADIUS", positive, "> 0") {
            config.min_radius = v;
        }
        if let Some(v) = env_value("MAX_RADIUS", positive, "> 0") {
            config.max_radius = v;
        }
        if let Some(v) = env_value("FRAMES", |_: &u64| true, "a count") {
            config.frames = v;
        }
        if let Some(v) = env_value("FRAME_RATE", |v: &u32| (1..=1000).contains(v), "1-1000") {
            config.frame_rate = v;
        }
        if let Some(v) = env_value("SEED", |_: &u64| true, "an integer") {
            config.seed = Some(v);
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.solver_config().validate()?;

        if !(positive(&self.min_radius) && positive(&self.max_radius))
            || self.min_radius > self.max_radius
        {
            return Err(ConfigError::InvalidRadiusRange {
                min: self.min_radius,
                max: self.max_radius,
            });
        }
        // The grid only compares neighbouring cells
        let diameter = 2.0 * self.max_radius;
        if self.cell_size < diameter {
            return Err(ConfigError::CellTooSmall {
                cell_size: self.cell_size,
                diameter,
            });
        }
        if !non_negative(&self.spawn_interval) {
            return Err(ConfigError::InvalidSpawnInterval(self.spawn_interval));
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        Ok(())
    }

    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.arena_width, self.arena_height)
    }

    /// Duration of one simulated frame
    pub fn frame_dt(&self) -> f32 {
        1.0 / self.frame_rate.max(1) as f32
    }

    pub fn solver_config(&self) -> SolverConfig {
        let extent = self.extent();
        let boundary = match self.boundary {
            BoundaryKind::Circle => Boundary::centered_circle(extent, self.boundary_radius),
            BoundaryKind::Rect => {
                Boundary::inset_rect(extent, Vec2::new(self.inset_x, self.inset_y))
            }
        };

        SolverConfig {
            extent,
            boundary,
            substeps: self.substeps,
            damping: self.damping,
            cell_size: self.cell_size,
            collision_response: self.collision_response,
        }
    }

    pub fn spawner_config(&self) -> SpawnerConfig {
        SpawnerConfig {
            count: self.spawn_count,
            interval: self.spawn_interval,
            speed: self.spawn_speed,
            min_radius: self.min_radius,
            max_radius: self.max_radius,
            seed: self.seed,
            ..SpawnerConfig::for_arena(self.extent())
        }
    }
}
