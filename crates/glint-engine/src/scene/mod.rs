//! Scene data shared by the demos.
//!
//! - `geometry`: static meshes (cube, quad, hexagon)
//! - `transform`: world/view/projection matrices driven by elapsed time

pub mod geometry;
pub mod transform;

pub use geometry::{DEFAULT_FACE_COLORS, cube_mesh, hexagon_mesh, triangle_mesh};
pub use transform::{CameraConfig, RotationSpeed, TransformConfig, TransformPipeline};
