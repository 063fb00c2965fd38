//! wgpu render backend for the tidewalk demo.
//!
//! Draws the sky background, the terrain mesh, and the water plane, with a
//! first-person walk camera.
//!
//! # Invariants
//! - The renderer never mutates simulation state; it reads camera, sky, and
//!   water parameters and uploads uniforms.
//! - The camera implements the locomotion `Controls` capability; all movement
//!   flows through the integrator, never through the renderer.

mod camera;
mod gpu;
mod shaders;

pub use camera::WalkCamera;
pub use gpu::WgpuRenderer;
