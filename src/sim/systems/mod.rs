pub mod arena;
pub mod collision;
pub mod physics;
