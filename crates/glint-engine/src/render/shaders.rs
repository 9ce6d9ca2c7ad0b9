//! Built-in WGSL sources.
//!
//! Vertex and fragment stages live in separate modules so any vertex stage can be
//! linked against the shared interpolated-colour fragment stage.

/// Passes position straight through to clip space and forwards the colour.
pub const FLAT_VERTEX: &str = include_str!("shaders/flat.vert.wgsl");

/// Transforms position by `proj * view * world` and forwards the colour.
pub const TRANSFORM_VERTEX: &str = include_str!("shaders/transform.vert.wgsl");

/// Writes the interpolated vertex colour with full opacity.
pub const COLOR_FRAGMENT: &str = include_str!("shaders/color.frag.wgsl");
