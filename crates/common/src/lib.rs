//! Shared configuration for the tidewalk demo.
//!
//! # Invariants
//! - Defaults reproduce the reference scene exactly; a missing settings file
//!   never changes behavior, it only skips the override step.
//! - Settings are plain data. No crate below the apps mutates them.

pub mod settings;

pub use settings::{
    MovementSettings, Settings, SettingsError, SkySettings, TerrainSettings, WaterSettings,
};
