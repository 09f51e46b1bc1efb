/// Pure game rules: geometry, actors, camera. No I/O, no clocks.

pub mod bbox;
pub mod camera;
pub mod entity;
pub mod physics;
