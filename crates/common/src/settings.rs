use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from settings file operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Tuning constants for the locomotion integrator.
///
/// The defaults are the reference constants: per-frame multiplicative
/// damping of 10.0, acceleration of 100.0, gravity of 9.8 scaled by 70,
/// a jump impulse of 150, and an eye height of 0.5 above the ground hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    pub damping: f32,
    pub accel: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub eye_offset: f32,
    /// Upper bound on a single frame delta, in seconds. Protects the
    /// explicit-Euler damping step from tab-background sized deltas.
    pub max_frame_delta: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            damping: 10.0,
            accel: 100.0,
            gravity: 9.8 * 70.0,
            jump_impulse: 150.0,
            eye_offset: 0.5,
            max_frame_delta: 0.1,
        }
    }
}

/// Atmosphere parameters for the sky background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkySettings {
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    /// Sun elevation above the horizon, degrees.
    pub elevation_deg: f32,
    /// Sun azimuth, degrees.
    pub azimuth_deg: f32,
}

impl Default for SkySettings {
    fn default() -> Self {
        Self {
            turbidity: 10.0,
            rayleigh: 2.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.8,
            elevation_deg: 15.0,
            azimuth_deg: 150.0,
        }
    }
}

/// Water plane parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterSettings {
    /// Deep-water tint, linear RGB.
    pub color: [f32; 3],
    pub distortion_scale: f32,
    /// Normal-map tiling factor.
    pub uv_size: f32,
    /// World-space height of the water surface.
    pub level: f32,
    /// Half-extent of the square water plane.
    pub half_extent: f32,
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            // #001e0f
            color: [0.0, 30.0 / 255.0, 15.0 / 255.0],
            distortion_scale: 3.7,
            uv_size: 10.0,
            level: 0.26,
            half_extent: 50.0,
        }
    }
}

/// Terrain generation parameters used when no snapshot is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Grid dimension (N x N vertices).
    pub size: usize,
    /// World-space half-extent.
    pub extent: f32,
    pub seed: u32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            size: 129,
            extent: 50.0,
            seed: 7,
        }
    }
}

/// Top-level demo settings, loadable from a YAML file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub movement: MovementSettings,
    pub sky: SkySettings,
    pub water: WaterSettings,
    pub terrain: TerrainSettings,
    pub spawn: Spawn,
}

/// Where the walker starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spawn {
    pub position: [f32; 3],
    /// Initial yaw, degrees.
    pub yaw_deg: f32,
}

impl Default for Spawn {
    fn default() -> Self {
        Self {
            position: [0.0, 1.0, 3.0],
            yaw_deg: 0.0,
        }
    }
}

impl Spawn {
    pub fn position_vec(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&data)?)
    }

    /// Serialize settings to a YAML file (used by `tidewalk-cli info --dump`).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let data = serde_yaml::to_string(self)?;
        std::fs::write(path.as_ref(), data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let s = Settings::default();
        assert_eq!(s.movement.damping, 10.0);
        assert_eq!(s.movement.accel, 100.0);
        assert_eq!(s.movement.gravity, 686.0);
        assert_eq!(s.movement.jump_impulse, 150.0);
        assert_eq!(s.movement.eye_offset, 0.5);
        assert_eq!(s.sky.turbidity, 10.0);
        assert_eq!(s.water.level, 0.26);
        assert_eq!(s.spawn.position, [0.0, 1.0, 3.0]);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let s: Settings = serde_yaml::from_str("movement:\n  accel: 50.0\n").unwrap();
        assert_eq!(s.movement.accel, 50.0);
        assert_eq!(s.movement.damping, 10.0);
        assert_eq!(s.water.distortion_scale, 3.7);
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut s = Settings::default();
        s.terrain.seed = 99;
        s.save(tmp.path()).unwrap();

        let loaded = Settings::load(tmp.path()).unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(Settings::load("/definitely/not/here.yaml").is_err());
    }
}
