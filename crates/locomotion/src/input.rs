use glam::Vec3;

/// Logical movement keys. The window layer maps physical key codes to these;
/// nothing below the app knows about scancodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKey {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
}

/// Held-key state plus the one-shot grounded flag.
///
/// The four movement booleans are toggled by [`on_key_down`](Self::on_key_down)
/// and [`on_key_up`](Self::on_key_up), which are total and idempotent: repeated
/// key-down events (OS auto-repeat) are no-ops. `grounded` is written by the
/// integrator each step and consumed by jump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub grounded: bool,
}

impl MoveState {
    pub fn on_key_down(&mut self, key: MoveKey) {
        match key {
            MoveKey::Forward => self.forward = true,
            MoveKey::Backward => self.backward = true,
            MoveKey::Left => self.left = true,
            MoveKey::Right => self.right = true,
            // Jump is an edge, not a held state; the app routes it to
            // Integrator::try_jump.
            MoveKey::Jump => {}
        }
    }

    pub fn on_key_up(&mut self, key: MoveKey) {
        match key {
            MoveKey::Forward => self.forward = false,
            MoveKey::Backward => self.backward = false,
            MoveKey::Left => self.left = false,
            MoveKey::Right => self.right = false,
            MoveKey::Jump => {}
        }
    }

    /// Desired movement direction in the camera's yaw-local frame.
    ///
    /// `z = forward - backward`, `x = right - left`, normalized so diagonal
    /// movement is not faster than cardinal movement. All-false and
    /// cancelling combinations give the zero vector, never NaN.
    pub fn direction(&self) -> Vec3 {
        Vec3::new(
            (self.right as i8 - self.left as i8) as f32,
            0.0,
            (self.forward as i8 - self.backward as i8) as f32,
        )
        .normalize_or_zero()
    }

    pub fn any_forward_axis(&self) -> bool {
        self.forward || self.backward
    }

    pub fn any_lateral_axis(&self) -> bool {
        self.left || self.right
    }
}
