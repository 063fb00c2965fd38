use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use tidewalk_common::SkySettings;

/// Packed sky parameters for the background shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SkyUniform {
    /// sun_dir.xyz, .w unused.
    pub sun_dir: [f32; 4],
    /// turbidity, rayleigh, mie coefficient, mie directional g.
    pub scattering: [f32; 4],
}

/// Sun position and atmosphere parameters.
///
/// The sun direction comes from spherical coordinates with a unit radius:
/// polar angle `phi = 90 deg - elevation`, azimuthal angle `theta = azimuth`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyState {
    pub turbidity: f32,
    pub rayleigh: f32,
    pub mie_coefficient: f32,
    pub mie_directional_g: f32,
    pub elevation_deg: f32,
    pub azimuth_deg: f32,
}

impl From<SkySettings> for SkyState {
    fn from(s: SkySettings) -> Self {
        Self {
            turbidity: s.turbidity,
            rayleigh: s.rayleigh,
            mie_coefficient: s.mie_coefficient,
            mie_directional_g: s.mie_directional_g,
            elevation_deg: s.elevation_deg,
            azimuth_deg: s.azimuth_deg,
        }
    }
}

impl Default for SkyState {
    fn default() -> Self {
        SkySettings::default().into()
    }
}

impl SkyState {
    /// Unit vector from the origin toward the sun.
    pub fn sun_direction(&self) -> Vec3 {
        let phi = (90.0 - self.elevation_deg).to_radians();
        let theta = self.azimuth_deg.to_radians();
        Vec3::new(
            phi.sin() * theta.sin(),
            phi.cos(),
            phi.sin() * theta.cos(),
        )
        .normalize_or(Vec3::Y)
    }

    pub fn uniform(&self) -> SkyUniform {
        let sun = self.sun_direction();
        SkyUniform {
            sun_dir: [sun.x, sun.y, sun.z, 0.0],
            scattering: [
                self.turbidity,
                self.rayleigh,
                self.mie_coefficient,
                self.mie_directional_g,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sun_straight_up_at_ninety_degrees_elevation() {
        let sky = SkyState {
            elevation_deg: 90.0,
            ..SkyState::default()
        };
        let sun = sky.sun_direction();
        assert!((sun.y - 1.0).abs() < 1e-5);
        assert!(sun.x.abs() < 1e-5 && sun.z.abs() < 1e-5);
    }

    #[test]
    fn sun_on_horizon_at_zero_elevation() {
        let sky = SkyState {
            elevation_deg: 0.0,
            azimuth_deg: 0.0,
            ..SkyState::default()
        };
        let sun = sky.sun_direction();
        assert!(sun.y.abs() < 1e-5);
        assert!((sun.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn default_sun_matches_reference_angles() {
        let sun = SkyState::default().sun_direction();
        // elevation 15, azimuth 150
        assert!((sun.y - 15f32.to_radians().sin()).abs() < 1e-5);
        assert!(sun.z < 0.0, "azimuth 150 deg puts the sun past -z");
        assert!((sun.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn uniform_packs_scattering_parameters() {
        let u = SkyState::default().uniform();
        assert_eq!(u.scattering, [10.0, 2.0, 0.005, 0.8]);
        assert_eq!(std::mem::size_of::<SkyUniform>(), 32);
    }
}
