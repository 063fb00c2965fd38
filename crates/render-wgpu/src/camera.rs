use glam::{Mat4, Vec3};
use tidewalk_locomotion::Controls;

/// First-person walk camera: position, yaw, pitch, projection parameters.
///
/// Horizontal movement (`Controls`) is confined to the yaw plane; pitch only
/// affects where the camera looks, never where it walks.
pub struct WalkCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
}

impl Default for WalkCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 3.0),
            yaw: -90.0_f32.to_radians(),
            pitch: 0.0,
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            sensitivity: 0.002,
        }
    }
}

impl WalkCamera {
    pub fn new(position: Vec3, yaw_deg: f32) -> Self {
        Self {
            position,
            yaw: yaw_deg.to_radians() - 90.0_f32.to_radians(),
            ..Self::default()
        }
    }

    /// Full look direction including pitch.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    /// Facing direction projected onto the horizontal plane.
    pub fn horizontal_forward(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.horizontal_forward().cross(Vec3::Y).normalize()
    }

    /// Mouse-look. Pitch is clamped short of the poles so the view matrix
    /// never degenerates.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch -= dy * self.sensitivity;
        self.pitch = self
            .pitch
            .clamp(-89.0_f32.to_radians(), 89.0_f32.to_radians());
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Controls for WalkCamera {
    fn move_right(&mut self, distance: f32) {
        self.position += self.right() * distance;
    }

    fn move_forward(&mut self, distance: f32) {
        self.position += self.horizontal_forward() * distance;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_height(&mut self, y: f32) {
        self.position.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_faces_negative_z() {
        let cam = WalkCamera::default();
        let fwd = cam.horizontal_forward();
        assert!(fwd.z < -0.99);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn move_forward_stays_in_the_yaw_plane() {
        let mut cam = WalkCamera::default();
        cam.pitch = 45.0_f32.to_radians();
        let y0 = cam.position.y;
        cam.move_forward(2.0);
        assert_eq!(cam.position.y, y0, "walking must not change height");
        assert!(cam.position.z < 3.0 - 1.9);
    }

    #[test]
    fn right_is_perpendicular_to_forward() {
        let mut cam = WalkCamera::default();
        cam.yaw = 0.7;
        let dot = cam.right().dot(cam.horizontal_forward());
        assert!(dot.abs() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = WalkCamera::default();
        cam.rotate(0.0, -1e6);
        assert!(cam.pitch <= 89.0_f32.to_radians() + 1e-6);
        cam.rotate(0.0, 1e6);
        assert!(cam.pitch >= -89.0_f32.to_radians() - 1e-6);
    }

    #[test]
    fn set_height_only_touches_y() {
        let mut cam = WalkCamera::default();
        let before = cam.position;
        cam.set_height(7.5);
        assert_eq!(cam.position.x, before.x);
        assert_eq!(cam.position.z, before.z);
        assert_eq!(cam.position.y, 7.5);
    }
}
