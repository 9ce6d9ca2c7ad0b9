//! The glint demos: a flat quad, a hexagon and a rotating cube.
//!
//! Each demo is written against [`glint_engine::render::RenderBackend`] so its
//! logic runs unchanged on the GPU and on the recording backend used in tests.
//! [`DemoHost`] plugs a demo into the engine runtime.

pub mod color_rng;
pub mod cube;
pub mod flat;
pub mod host;

pub use color_rng::ColorRng;
pub use cube::{CubeConfig, CubeDemo};
pub use flat::FlatDemo;
pub use host::{Demo, DemoHost, run_demo};
