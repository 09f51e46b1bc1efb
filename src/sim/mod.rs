/// Simulation layer: world state, level content, per-frame stepping.

pub mod event;
pub mod level;
pub mod session;
pub mod step;
pub mod world;
