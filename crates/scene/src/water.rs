use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use tidewalk_common::WaterSettings;

/// Packed water parameters for the surface shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct WaterUniform {
    /// color.rgb, .w = surface level.
    pub color_level: [f32; 4],
    /// distortion scale, uv tiling, phase, plane half-extent.
    pub params: [f32; 4],
    /// sun_dir.xyz, .w unused.
    pub sun_dir: [f32; 4],
}

/// Animated water-plane state.
///
/// The phase advances by a fixed `0.5 / 60` per rendered frame, not per
/// second. That matches the reference: the ripple speed tracks the display
/// refresh rate rather than wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterState {
    pub color: Vec3,
    pub distortion_scale: f32,
    pub uv_size: f32,
    pub level: f32,
    pub half_extent: f32,
    phase: f32,
}

const PHASE_PER_FRAME: f32 = 0.5 / 60.0;

impl From<WaterSettings> for WaterState {
    fn from(w: WaterSettings) -> Self {
        Self {
            color: Vec3::from_array(w.color),
            distortion_scale: w.distortion_scale,
            uv_size: w.uv_size,
            level: w.level,
            half_extent: w.half_extent,
            phase: 0.0,
        }
    }
}

impl Default for WaterState {
    fn default() -> Self {
        WaterSettings::default().into()
    }
}

impl WaterState {
    /// Advance the ripple phase by one rendered frame.
    pub fn advance(&mut self) {
        self.phase += PHASE_PER_FRAME;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn uniform(&self, sun_dir: Vec3) -> WaterUniform {
        WaterUniform {
            color_level: [self.color.x, self.color.y, self.color.z, self.level],
            params: [self.distortion_scale, self.uv_size, self.phase, self.half_extent],
            sun_dir: [sun_dir.x, sun_dir.y, sun_dir.z, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_advances_per_frame_not_per_second() {
        let mut w = WaterState::default();
        for _ in 0..60 {
            w.advance();
        }
        assert!((w.phase() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn defaults_match_reference_water() {
        let w = WaterState::default();
        assert_eq!(w.level, 0.26);
        assert_eq!(w.distortion_scale, 3.7);
        assert_eq!(w.uv_size, 10.0);
        assert_eq!(w.phase(), 0.0);
    }

    #[test]
    fn uniform_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<WaterUniform>(), 48);
        let u = WaterState::default().uniform(Vec3::Y);
        assert_eq!(u.color_level[3], 0.26);
        assert_eq!(u.sun_dir[1], 1.0);
    }
}
