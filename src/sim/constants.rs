//! Default tuning values
//!
//! These seed the default `SimConfig`, `SolverConfig` and `SpawnerConfig`.

/// Arena (window) extent
pub mod arena {
    /// Arena width in world units
    pub const WIDTH: f32 = 1980.0;
    /// Arena height in world units
    pub const HEIGHT: f32 = 1080.0;
    /// Radius of the default circular boundary, centred in the arena
    pub const BOUNDARY_RADIUS: f32 = 500.0;
    /// Horizontal inset of the rectangular boundary from the arena edges
    pub const INSET_X: f32 = 25.0;
    /// Vertical inset of the rectangular boundary from the arena edges
    pub const INSET_Y: f32 = 25.0;
}

/// Solver tuning
pub mod physics {
    /// Sub-steps per rendered frame
    pub const SUBSTEPS: u32 = 8;
    /// Drag coefficient applied to the implicit velocity
    /// Applied as: position += v + (a - v * DAMPING) * dt^2
    pub const DAMPING: f32 = 50.0;
    /// Downward gravity (y grows downwards)
    pub const GRAVITY_Y: f32 = 1200.0;
    /// Grid cell size, must be at least the largest body diameter
    pub const CELL_SIZE: f32 = 32.0;
    /// Frame rate the driver simulates at
    pub const FRAME_RATE: u32 = 60;
}

/// Fan spawner defaults
pub mod spawn {
    /// Number of bodies to spawn before stopping
    pub const COUNT: usize = 500;
    /// Seconds between spawns
    pub const INTERVAL: f32 = 0.01;
    /// Launch speed in world units per second
    pub const SPEED: f32 = 1500.0;
    /// Smallest body radius
    pub const MIN_RADIUS: f32 = 5.0;
    /// Largest body radius (2 * MAX_RADIUS <= CELL_SIZE)
    pub const MAX_RADIUS: f32 = 16.0;
    /// Launch angle lower bound (degrees)
    pub const MIN_ANGLE_DEG: f32 = 30.0;
    /// Launch angle upper bound (degrees)
    pub const MAX_ANGLE_DEG: f32 = 150.0;
    /// Angle change per spawn (degrees); the sweep starts at MAX_ANGLE_DEG moving down
    pub const ANGLE_STEP_DEG: f32 = 2.0;
    /// Spawn point as a fraction of the arena height
    pub const HEIGHT_FRACTION: f32 = 0.125;
}

/// Driver defaults
pub mod driver {
    /// Frames simulated by the headless driver
    pub const FRAMES: u64 = 1200;
    /// Frames between progress log lines
    pub const LOG_INTERVAL: u64 = 120;
}
