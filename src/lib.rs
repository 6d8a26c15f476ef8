pub mod ai;
pub mod audio;
pub mod autopilot;
pub mod constants;
pub mod driver;
pub mod engine;
pub mod grid;
pub mod motion;
pub mod profile;
pub mod release;
pub mod render;
pub mod rng;
pub mod types;
