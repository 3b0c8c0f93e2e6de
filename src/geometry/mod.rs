//! Geometry utilities: similarity transforms and the perspective camera.

pub mod camera;
pub mod sim3;

pub use camera::{OrbitCamera, PerspectiveCamera, Viewport};
pub use sim3::{Sim3, euler_xyz_deg};
