//! Fan spawner
//!
//! Emits bodies from a fixed point at a steady cadence. The launch angle
//! sweeps back and forth across a fan, each body gets a random radius and
//! colour, and all launch at the same speed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::sim::constants::spawn;
use crate::sim::solver::Solver;
use crate::sim::state::{BodyId, Color};
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, PartialEq)]
pub struct SpawnerConfig {
    /// Where bodies appear
    pub origin: Vec2,
    /// Bodies to spawn in total
    pub count: usize,
    /// Seconds between spawns
    pub interval: f32,
    /// Launch speed (world units per second)
    pub speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Fixed seed for reproducible runs; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl SpawnerConfig {
    /// Defaults with the origin placed for an arena of `extent`
    pub fn for_arena(extent: Vec2) -> Self {
        Self {
            origin: Vec2::new(extent.x * 0.5, extent.y * spawn::HEIGHT_FRACTION),
            count: spawn::COUNT,
            interval: spawn::INTERVAL,
            speed: spawn::SPEED,
            min_radius: spawn::MIN_RADIUS,
            max_radius: spawn::MAX_RADIUS,
            seed: None,
        }
    }
}

pub struct FanSpawner {
    config: SpawnerConfig,
    rng: StdRng,
    /// Current launch angle in degrees
    angle_deg: f32,
    /// Signed sweep step in degrees
    step_deg: f32,
    /// Time since the last spawn
    elapsed: f32,
    spawned: usize,
}

impl FanSpawner {
    pub fn new(config: SpawnerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            rng,
            angle_deg: spawn::MAX_ANGLE_DEG,
            step_deg: -spawn::ANGLE_STEP_DEG,
            elapsed: 0.0,
            spawned: 0,
        }
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }

    pub fn is_finished(&self) -> bool {
        self.spawned >= self.config.count
    }

    /// Advance the spawn clock by `frame_dt` and spawn at most one body.
    ///
    /// The launch velocity is handed to the solver with the same `frame_dt`
    /// the next `advance` call will use.
    pub fn update(&mut self, solver: &mut Solver, frame_dt: f32) -> Option<BodyId> {
        if self.is_finished() {
            return None;
        }

        self.elapsed += frame_dt;
        if self.elapsed <= self.config.interval {
            return None;
        }
        self.elapsed = 0.0;

        let radius = self
            .rng
            .gen_range(self.config.min_radius..=self.config.max_radius);
        let color = Color::rgb(self.rng.gen(), self.rng.gen(), self.rng.gen());
        let direction = self.next_direction();

        let id = solver.add_body(self.config.origin, radius, color);
        solver.set_body_velocity(id, frame_dt, direction * self.config.speed);
        self.spawned += 1;

        debug!(
            "Spawned body {} (r={:.1}) at {:.0} degrees",
            id.index(),
            radius,
            self.angle_deg
        );

        Some(id)
    }

    /// Step the sweep and return the launch direction
    fn next_direction(&mut self) -> Vec2 {
        self.angle_deg += self.step_deg;
        if self.angle_deg >= spawn::MAX_ANGLE_DEG || self.angle_deg <= spawn::MIN_ANGLE_DEG {
            self.step_deg = -self.step_deg;
        }
        Vec2::from_angle(self.angle_deg.to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::solver::SolverConfig;

    const FRAME_DT: f32 = 1.0 / 60.0;

    fn seeded_config(count: usize) -> SpawnerConfig {
        SpawnerConfig {
            seed: Some(9),
            count,
            ..SpawnerConfig::for_arena(Vec2::new(1980.0, 1080.0))
        }
    }

    #[test]
    fn test_default_origin() {
        let config = SpawnerConfig::for_arena(Vec2::new(1980.0, 1080.0));
        assert_eq!(config.origin, Vec2::new(990.0, 135.0));
    }

    #[test]
    fn test_spawns_one_per_frame_until_count() {
        let mut solver = Solver::new(SolverConfig::default()).unwrap();
        let mut spawner = FanSpawner::new(seeded_config(5));

        for _ in 0..20 {
            spawner.update(&mut solver, FRAME_DT);
        }

        assert_eq!(spawner.spawned(), 5);
        assert!(spawner.is_finished());
        assert_eq!(solver.body_count(), 5);
        assert!(spawner.update(&mut solver, FRAME_DT).is_none());
    }

    #[test]
    fn test_waits_for_interval() {
        let mut solver = Solver::new(SolverConfig::default()).unwrap();
        let mut spawner = FanSpawner::new(SpawnerConfig {
            interval: 0.06,
            ..seeded_config(10)
        });

        // Three frames stay under the interval; the 4th is past it
        let spawned: Vec<_> = (0..4)
            .map(|_| spawner.update(&mut solver, FRAME_DT).is_some())
            .collect();
        assert_eq!(spawned, vec![false, false, false, true]);
    }

    #[test]
    fn test_radius_and_launch() {
        let mut solver = Solver::new(SolverConfig::default()).unwrap();
        let mut spawner = FanSpawner::new(seeded_config(50));

        for _ in 0..50 {
            spawner.update(&mut solver, FRAME_DT);
        }

        let step_dt = solver.substep_dt(FRAME_DT);
        for body in solver.bodies() {
            assert!(body.radius >= spawn::MIN_RADIUS && body.radius <= spawn::MAX_RADIUS);
            assert_eq!(body.position, Vec2::new(990.0, 135.0));
            let speed = body.velocity(step_dt).length();
            assert!((speed - spawn::SPEED).abs() < 1.0, "speed {speed}");
            // Launch is always downward within the fan
            assert!(body.velocity(step_dt).y > 0.0);
        }
    }

    #[test]
    fn test_angle_sweeps_between_bounds() {
        let mut spawner = FanSpawner::new(seeded_config(0));
        let mut angles = Vec::new();
        for _ in 0..200 {
            spawner.next_direction();
            angles.push(spawner.angle_deg);
        }

        assert_eq!(angles[0], 148.0);
        assert!(angles
            .iter()
            .all(|&a| a >= spawn::MIN_ANGLE_DEG && a <= spawn::MAX_ANGLE_DEG));
        assert!(angles.contains(&spawn::MIN_ANGLE_DEG));
        // Turned around at the bottom of the fan and came back up
        assert!(angles[100] > angles[60]);
    }

    #[test]
    fn test_seeded_runs_match() {
        let mut first = Solver::new(SolverConfig::default()).unwrap();
        let mut second = Solver::new(SolverConfig::default()).unwrap();
        let mut a = FanSpawner::new(seeded_config(20));
        let mut b = FanSpawner::new(seeded_config(20));

        for _ in 0..20 {
            a.update(&mut first, FRAME_DT);
            b.update(&mut second, FRAME_DT);
        }

        assert_eq!(first.bodies(), second.bodies());
    }
}
