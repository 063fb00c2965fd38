use crate::input::MoveState;
use glam::Vec3;
use tidewalk_common::MovementSettings;

/// Camera/controls capability consumed by the integrator.
///
/// Displacements are in the camera's yaw-local horizontal plane:
/// `move_forward` with a positive distance moves along the facing direction
/// projected onto XZ, `move_right` along the horizontal right vector. The
/// integrator never sees the concrete camera type.
pub trait Controls {
    fn move_right(&mut self, distance: f32);
    fn move_forward(&mut self, distance: f32);
    fn position(&self) -> Vec3;
    fn set_height(&mut self, y: f32);
}

/// Terrain collision capability: first ground height under a probe origin,
/// or `None` when there is no terrain there (not loaded, or outside bounds).
pub trait GroundProbe {
    fn probe(&self, origin: Vec3) -> Option<f32>;
}

/// Absent terrain misses every probe, so a walker without loaded ground
/// simply never clamps.
impl<G: GroundProbe> GroundProbe for Option<G> {
    fn probe(&self, origin: Vec3) -> Option<f32> {
        self.as_ref().and_then(|g| g.probe(origin))
    }
}

/// Integrator tuning. Mirrors [`MovementSettings`] so the core crate carries
/// its own parameter block; the apps convert from loaded settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    pub damping: f32,
    pub accel: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub eye_offset: f32,
    pub max_frame_delta: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        MovementSettings::default().into()
    }
}

impl From<MovementSettings> for Tuning {
    fn from(m: MovementSettings) -> Self {
        Self {
            damping: m.damping,
            accel: m.accel,
            gravity: m.gravity,
            jump_impulse: m.jump_impulse,
            eye_offset: m.eye_offset,
            max_frame_delta: m.max_frame_delta,
        }
    }
}

/// Per-frame velocity integrator for the first-person walker.
///
/// Owns the velocity vector exclusively. Each [`step`](Self::step) applies
/// multiplicative damping and gravity, accelerates along the held input
/// direction, displaces the controls horizontally, and clamps the vertical
/// position to the terrain whenever the ground query succeeds.
#[derive(Debug, Clone)]
pub struct Integrator {
    velocity: Vec3,
    tuning: Tuning,
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl Integrator {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            velocity: Vec3::ZERO,
            tuning,
        }
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Advance one frame.
    ///
    /// `raw_dt` is clamped to `[0, max_frame_delta]` before use; with the
    /// reference constants that keeps `damping * dt <= 1`, so the explicit
    /// Euler damping factor stays in `[0, 1]` and can never flip the sign of
    /// a velocity component. The damping formula itself stays one Euler step
    /// of exponential decay, matching the reference behavior frame for frame
    /// at normal frame rates.
    ///
    /// Sets `input.grounded` to whether the ground clamp fired this frame.
    pub fn step<C, G>(&mut self, input: &mut MoveState, raw_dt: f32, controls: &mut C, ground: &G)
    where
        C: Controls,
        G: GroundProbe + ?Sized,
    {
        let t = self.tuning;
        let dt = raw_dt.clamp(0.0, t.max_frame_delta);

        // Ground clamp has precedence over integrated vertical motion: every
        // frame the query hits, the eye sits at a fixed offset above the hit.
        // Downward velocity restarts from rest; upward velocity (a jump
        // impulse) is retained, so it stays in play until the query misses.
        let hit = ground.probe(controls.position());
        if let Some(h) = hit {
            controls.set_height(h + t.eye_offset);
            self.velocity.y = self.velocity.y.max(0.0);
        }

        self.velocity.x -= self.velocity.x * t.damping * dt;
        self.velocity.z -= self.velocity.z * t.damping * dt;
        self.velocity.y -= t.gravity * dt;

        let dir = input.direction();
        if input.any_forward_axis() {
            self.velocity.z -= dir.z * t.accel * dt;
        }
        if input.any_lateral_axis() {
            self.velocity.x -= dir.x * t.accel * dt;
        }

        controls.move_right(-self.velocity.x * dt);
        controls.move_forward(-self.velocity.z * dt);

        if hit.is_none() {
            let y = controls.position().y;
            controls.set_height(y + self.velocity.y * dt);
        }

        input.grounded = hit.is_some();
    }

    /// Apply the one-shot jump impulse if the walker is grounded.
    ///
    /// Grounded is derived from the last step's ground-clamp result, so the
    /// impulse is only reachable while terrain is under the walker. Returns
    /// whether the impulse fired.
    pub fn try_jump(&mut self, input: &mut MoveState) -> bool {
        if !input.grounded {
            return false;
        }
        self.velocity.y += self.tuning.jump_impulse;
        input.grounded = false;
        tracing::debug!(vy = self.velocity.y, "jump impulse applied");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MoveKey;
    use glam::Vec3Swizzles;

    /// Camera double with yaw fixed at 0: forward is -z, right is +x.
    struct TestRig {
        position: Vec3,
    }

    impl TestRig {
        fn at(position: Vec3) -> Self {
            Self { position }
        }
    }

    impl Controls for TestRig {
        fn move_right(&mut self, distance: f32) {
            self.position.x += distance;
        }
        fn move_forward(&mut self, distance: f32) {
            self.position.z -= distance;
        }
        fn position(&self) -> Vec3 {
            self.position
        }
        fn set_height(&mut self, y: f32) {
            self.position.y = y;
        }
    }

    /// Terrain double: a flat plane at a fixed height, or nothing at all.
    struct FlatGround(Option<f32>);

    impl GroundProbe for FlatGround {
        fn probe(&self, _origin: Vec3) -> Option<f32> {
            self.0
        }
    }

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn zero_input_velocity_decays_to_rest() {
        let mut integ = Integrator::default();
        integ.velocity = Vec3::new(5.0, 0.0, -5.0);
        let mut input = MoveState::default();
        let mut rig = TestRig::at(Vec3::new(0.0, 1.0, 0.0));
        let ground = FlatGround(Some(0.5));

        let mut prev = integ.velocity.xz().length();
        for _ in 0..200 {
            integ.step(&mut input, DT, &mut rig, &ground);
            let speed = integ.velocity.xz().length();
            assert!(speed < prev, "horizontal speed must strictly decrease");
            prev = speed;
        }
        assert!(prev < 1e-3, "speed should converge to rest, got {prev}");
    }

    #[test]
    fn step_never_produces_nan_for_any_input_combination() {
        for bits in 0..16u8 {
            let mut input = MoveState {
                forward: bits & 1 != 0,
                backward: bits & 2 != 0,
                left: bits & 4 != 0,
                right: bits & 8 != 0,
                grounded: false,
            };
            let mut integ = Integrator::default();
            let mut rig = TestRig::at(Vec3::new(0.0, 1.0, 0.0));
            let ground = FlatGround(None);
            for _ in 0..10 {
                integ.step(&mut input, DT, &mut rig, &ground);
            }
            assert!(integ.velocity.is_finite(), "velocity NaN for bits {bits:#06b}");
            assert!(rig.position.is_finite(), "position NaN for bits {bits:#06b}");
        }
    }

    #[test]
    fn ground_clamp_takes_precedence_over_vertical_velocity() {
        let mut integ = Integrator::default();
        integ.velocity = Vec3::new(0.0, -300.0, 0.0);
        let mut input = MoveState::default();
        let mut rig = TestRig::at(Vec3::new(0.0, 20.0, 0.0));
        let ground = FlatGround(Some(2.0));

        integ.step(&mut input, DT, &mut rig, &ground);
        assert_eq!(rig.position.y, 2.0 + integ.tuning.eye_offset);
        assert!(input.grounded);
    }

    #[test]
    fn missed_probe_integrates_vertical_velocity() {
        let mut integ = Integrator::default();
        let mut input = MoveState::default();
        let mut rig = TestRig::at(Vec3::new(0.0, 10.0, 0.0));
        let ground = FlatGround(None);

        integ.step(&mut input, DT, &mut rig, &ground);
        // First-order: one frame of gravity, applied over dt.
        let expected = 10.0 + (-686.0 * DT) * DT;
        assert!((rig.position.y - expected).abs() < 1e-4);
        assert!(!input.grounded);
    }

    #[test]
    fn large_delta_is_clamped_and_stable() {
        let mut integ = Integrator::default();
        integ.velocity = Vec3::new(40.0, 0.0, -40.0);
        let mut input = MoveState {
            forward: true,
            ..Default::default()
        };
        let mut rig = TestRig::at(Vec3::new(0.0, 5.0, 0.0));
        let ground = FlatGround(None);

        for _ in 0..20 {
            integ.step(&mut input, 5.0, &mut rig, &ground);
        }
        assert!(integ.velocity.is_finite());
        assert!(integ.velocity.length() < 1e4, "velocity diverged");
        // Clamped dt keeps the damping factor non-negative, so a component
        // can shrink to zero but never flip sign from damping alone.
        assert!(integ.velocity.x >= 0.0 || integ.velocity.x.abs() < 1e-6);
    }

    #[test]
    fn forward_step_matches_pinned_reference_value() {
        let mut integ = Integrator::default();
        let mut input = MoveState::default();
        input.on_key_down(MoveKey::Forward);
        let mut rig = TestRig::at(Vec3::new(0.0, 1.0, 0.0));
        let ground = FlatGround(None);

        integ.step(&mut input, DT, &mut rig, &ground);
        // One frame of acceleration on zero velocity, no damping correction.
        assert_eq!(integ.velocity.z, -100.0 * DT);
        // moveForward(-v.z * dt) with positive distance moves toward -z.
        assert_eq!(rig.position.z, -(100.0 * DT) * DT);
        assert_eq!(rig.position.x, 0.0);
    }

    #[test]
    fn jump_requires_grounded_and_fires_once() {
        let mut integ = Integrator::default();
        let mut input = MoveState::default();
        let mut rig = TestRig::at(Vec3::new(0.0, 1.0, 0.0));

        // Never grounded: the impulse is unreachable.
        assert!(!integ.try_jump(&mut input));
        assert_eq!(integ.velocity.y, 0.0);

        // One grounded step arms the flag.
        integ.step(&mut input, DT, &mut rig, &FlatGround(Some(0.0)));
        assert!(input.grounded);

        assert!(integ.try_jump(&mut input));
        let vy = integ.velocity.y;
        assert!((vy - (150.0 - 686.0 * DT)).abs() < 1e-3);
        assert!(!input.grounded);

        // Flag consumed: a second press does nothing until the next landing.
        assert!(!integ.try_jump(&mut input));
        assert_eq!(integ.velocity.y, vy);
    }

    #[test]
    fn grounded_step_restarts_vertical_velocity_from_rest() {
        let mut integ = Integrator::default();
        integ.velocity = Vec3::new(0.0, -500.0, 0.0);
        let mut input = MoveState::default();
        let mut rig = TestRig::at(Vec3::new(0.0, 3.0, 0.0));

        integ.step(&mut input, DT, &mut rig, &FlatGround(Some(1.0)));
        // Only this frame's gravity remains; the fall did not accumulate.
        assert!((integ.velocity.y + 686.0 * DT).abs() < 1e-4);
    }

    #[test]
    fn jump_impulse_survives_the_clamp_and_releases_on_probe_miss() {
        let mut integ = Integrator::default();
        let mut input = MoveState::default();
        let mut rig = TestRig::at(Vec3::new(0.0, 0.5, 0.0));
        let ground = FlatGround(Some(0.0));

        integ.step(&mut input, DT, &mut rig, &ground);
        assert!(integ.try_jump(&mut input));

        // While the probe keeps hitting, the clamp pins the eye height but
        // the upward velocity is carried, bleeding off only through gravity.
        integ.step(&mut input, DT, &mut rig, &ground);
        assert_eq!(rig.position.y, 0.5);
        assert!(
            integ.velocity.y > 100.0,
            "impulse lost under clamp: vy = {}",
            integ.velocity.y
        );

        // The first missed probe lets the retained impulse lift the walker.
        integ.step(&mut input, DT, &mut rig, &FlatGround(None));
        assert!(rig.position.y > 0.5, "walker should rise, y = {}", rig.position.y);
    }

    #[test]
    fn absent_terrain_probes_as_a_miss() {
        let present: Option<FlatGround> = Some(FlatGround(Some(2.0)));
        let absent: Option<FlatGround> = None;
        assert_eq!(present.probe(Vec3::ZERO), Some(2.0));
        assert_eq!(absent.probe(Vec3::ZERO), None);

        let mut integ = Integrator::default();
        let mut input = MoveState::default();
        let mut rig = TestRig::at(Vec3::new(0.0, 4.0, 0.0));
        integ.step(&mut input, DT, &mut rig, &absent);
        assert!(!input.grounded);
        assert!(rig.position.y < 4.0, "no ground loaded means falling");
    }

    #[test]
    fn strafe_and_forward_are_independent_calls() {
        let mut integ = Integrator::default();
        let mut input = MoveState {
            forward: true,
            right: true,
            ..Default::default()
        };
        let mut rig = TestRig::at(Vec3::ZERO);
        let ground = FlatGround(None);

        integ.step(&mut input, DT, &mut rig, &ground);
        let inv_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;
        assert!((integ.velocity.z - (-100.0 * DT * inv_sqrt2)).abs() < 1e-5);
        assert!((integ.velocity.x - (-100.0 * DT * inv_sqrt2)).abs() < 1e-5);
        assert!(rig.position.z < 0.0, "moved forward");
        assert!(rig.position.x > 0.0, "moved right");
    }
}
