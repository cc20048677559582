pub mod constants;
pub mod performance;
pub mod solver;
pub mod spatial;
pub mod spawner;
pub mod state;
pub mod systems;
