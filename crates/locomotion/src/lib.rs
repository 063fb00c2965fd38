//! First-person locomotion: movement key state and the per-frame integrator.
//!
//! # Invariants
//! - The integrator is a pure per-frame transform over (input, velocity,
//!   position, optional ground height). It owns the velocity; the camera and
//!   the terrain are reached only through the narrow [`Controls`] and
//!   [`GroundProbe`] capabilities, so both can be substituted in tests.
//! - Horizontal velocity decays toward zero without input and never picks up
//!   energy across frames.
//! - A missed ground query is a normal branch, not an error.

pub mod input;
pub mod integrator;

pub use input::{MoveKey, MoveState};
pub use integrator::{Controls, GroundProbe, Integrator, Tuning};
