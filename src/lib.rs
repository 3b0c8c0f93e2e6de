pub mod config;
pub mod export;
pub mod geometry;
pub mod projector;
pub mod render;
pub mod rig;
pub mod sequencer;
pub mod sweep;
