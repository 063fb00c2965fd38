//! Scene parameter state: sun, sky scattering, and the animated water plane.
//!
//! These are CPU-side parameter blocks plus their packed uniform layouts.
//! The renderer uploads the uniforms; nothing here touches the GPU.

pub mod sky;
pub mod water;

pub use sky::{SkyState, SkyUniform};
pub use water::{WaterState, WaterUniform};
