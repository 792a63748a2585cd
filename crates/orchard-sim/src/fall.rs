//! Closed-form fall of a detached apple.
//!
//! The apple keeps its horizontal default position and drops by
//! `0.5 * g * t^2`, tumbling about its local X axis at a fixed rate.

use glam::{Mat4, Vec3};

/// Gravity preset toggled from the keyboard.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum GravityMode {
    #[default]
    Full,
    Half,
}

impl GravityMode {
    #[inline]
    pub fn factor(self) -> f32 {
        match self {
            GravityMode::Full => 1.0,
            GravityMode::Half => 0.5,
        }
    }

    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            GravityMode::Full => GravityMode::Half,
            GravityMode::Half => GravityMode::Full,
        }
    }
}

/// Vertical displacement after `elapsed` seconds of free fall.
///
/// Negative elapsed time (a frame stamped before the pick) counts as zero.
#[inline]
pub fn fall_drop(gravity: f32, elapsed: f32) -> f32 {
    let t = elapsed.max(0.0);
    0.5 * gravity * t * t
}

/// Placement of a falling apple `elapsed` seconds after it left `default_loc`.
pub fn falling_placement(default_loc: Mat4, gravity: f32, tumble_rate: f32, elapsed: f32) -> Mat4 {
    let drop = fall_drop(gravity, elapsed);
    let spin = tumble_rate * elapsed.max(0.0);

    Mat4::from_translation(Vec3::new(0.0, -drop, 0.0))
        * default_loc
        * Mat4::from_rotation_x(spin)
}

/// World-space origin of a placement transform.
#[inline]
pub fn world_position(placement: &Mat4) -> Vec3 {
    placement.w_axis.truncate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_is_closed_form() {
        let g = 9.8_f32;
        let dt = 1.25_f32;
        assert_eq!(fall_drop(g, dt), 0.5 * g * dt * dt);
    }

    #[test]
    fn drop_is_zero_before_start() {
        assert_eq!(fall_drop(9.8, -0.5), 0.0);
        assert_eq!(fall_drop(9.8, 0.0), 0.0);
    }

    #[test]
    fn half_gravity_halves_drop() {
        let full = fall_drop(9.8 * GravityMode::Full.factor(), 2.0);
        let half = fall_drop(9.8 * GravityMode::Half.factor(), 2.0);
        assert_eq!(half * 2.0, full);
    }

    #[test]
    fn toggle_round_trips() {
        assert_eq!(GravityMode::Full.toggled(), GravityMode::Half);
        assert_eq!(GravityMode::Full.toggled().toggled(), GravityMode::Full);
    }

    #[test]
    fn placement_keeps_horizontal_position() {
        let start = Mat4::from_translation(Vec3::new(1.5, 7.0, -0.5)) * Mat4::from_scale(Vec3::splat(0.3));
        let p = falling_placement(start, 9.8, 3.0, 0.5);
        let pos = world_position(&p);
        assert!((pos.x - 1.5).abs() < 1e-5);
        assert!((pos.z + 0.5).abs() < 1e-5);
        assert!((pos.y - (7.0 - fall_drop(9.8, 0.5))).abs() < 1e-5);
    }

    #[test]
    fn placement_at_zero_elapsed_is_default() {
        let start = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(falling_placement(start, 9.8, 3.0, 0.0), start);
    }
}
