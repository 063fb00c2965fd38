//! Heightfield terrain for the walk demo.
//!
//! # Invariants
//! - Generation is deterministic: same (size, extent, seed) gives identical
//!   heights on every platform.
//! - Sampling outside the extent returns `None`; callers treat that as the
//!   normal "no ground here" branch.

pub mod heightfield;

pub use heightfield::{Heightfield, TerrainError};
