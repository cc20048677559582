use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use verlet_arena::config::SimConfig;
use verlet_arena::sim::constants::driver;
use verlet_arena::sim::performance::PerformanceMonitor;
use verlet_arena::sim::solver::{FrameStats, Solver};
use verlet_arena::sim::spawner::FanSpawner;

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Verlet Arena v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = SimConfig::load_or_default();
    config.validate().context("invalid simulation configuration")?;
    info!(
        "Configuration loaded: {:?} boundary, {} bodies, {} frames at {} fps",
        config.boundary, config.spawn_count, config.frames, config.frame_rate
    );

    let mut solver =
        Solver::new(config.solver_config()).context("failed to build solver")?;
    let mut spawner = FanSpawner::new(config.spawner_config());
    let mut monitor = PerformanceMonitor::new(config.frame_rate);

    let frame_dt = config.frame_dt();
    let mut totals = FrameStats::default();
    let mut throttled = false;

    for frame in 1..=config.frames {
        if monitor.can_spawn() {
            spawner.update(&mut solver, frame_dt);
            throttled = false;
        } else if !throttled && !spawner.is_finished() {
            warn!("Spawning paused: {}", monitor.status_message());
            throttled = true;
        }

        monitor.frame_start();
        let stats = solver.advance(frame_dt, config.gravity);
        monitor.frame_end(solver.body_count());

        totals.substeps += stats.substeps;
        totals.contacts += stats.contacts;
        totals.boundary_contacts += stats.boundary_contacts;

        if frame % driver::LOG_INTERVAL == 0 {
            let grid = solver.grid().stats();
            info!(
                "Frame {}: {} bodies, {} contacts, {} wall hits, KE {:.0}, busiest cell {} | {}",
                frame,
                solver.body_count(),
                stats.contacts,
                stats.boundary_contacts,
                solver.kinetic_energy(frame_dt),
                grid.max_per_cell,
                monitor.status_message()
            );
        }
    }

    info!(
        "Done: {} bodies, {} sub-steps, {} contacts, {} wall hits",
        solver.body_count(),
        totals.substeps,
        totals.contacts,
        totals.boundary_contacts
    );

    Ok(())
}
