use glam::{Mat4, Vec3};

/// Vertical field of view, radians.
pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;

const HOME_EYE: Vec3 = Vec3::new(0.0, 10.0, 30.0);
const HOME_TARGET: Vec3 = Vec3::ZERO;

/// Units per second for free movement.
const MOVE_SPEED: f32 = 10.0;
/// Radians per second for arrow-key look.
const TURN_SPEED: f32 = 1.0;
const PITCH_LIMIT: f32 = 1.5;
/// Units moved along the view direction per wheel line.
const ZOOM_STEP: f32 = 1.0;

/// Angle and distance of the attached views.
const ATTACH_YAW: f32 = -0.4;
const ATTACH_DISTANCE: f32 = 10.0;

/// Which view the camera shows.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CameraMode {
    /// Free camera, starting from the home view.
    Free,
    /// Attached to the desk.
    Desk,
    /// Attached to the tree crown.
    Tree,
}

impl CameraMode {
    pub fn next(self) -> Self {
        match self {
            CameraMode::Free => CameraMode::Desk,
            CameraMode::Desk => CameraMode::Tree,
            CameraMode::Tree => CameraMode::Free,
        }
    }
}

/// Movement requested for one frame, each axis in `-1..=1`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CameraInput {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Wheel lines this frame; positive zooms toward the view direction.
    pub zoom: f32,
}

impl CameraInput {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Scene camera: a free fly camera plus two views attached to scene objects.
#[derive(Debug, Clone)]
pub struct Camera {
    mode: CameraMode,
    eye: Vec3,
    yaw: f32,
    pitch: f32,
    desk_focus: Vec3,
    tree_focus: Vec3,
}

impl Camera {
    pub fn new(desk_focus: Vec3, tree_focus: Vec3) -> Self {
        let mut cam = Self {
            mode: CameraMode::Free,
            eye: HOME_EYE,
            yaw: 0.0,
            pitch: 0.0,
            desk_focus,
            tree_focus,
        };
        cam.home();
        cam
    }

    #[inline]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Switches to the next view and returns it.
    ///
    /// Returning to the free camera puts it back at the home view.
    pub fn cycle(&mut self) -> CameraMode {
        self.mode = self.mode.next();
        if self.mode == CameraMode::Free {
            self.home();
        }
        self.mode
    }

    /// Free camera at the home view: eye `(0, 10, 30)` looking at the origin.
    pub fn home(&mut self) {
        let dir = (HOME_TARGET - HOME_EYE).normalize();
        self.eye = HOME_EYE;
        self.yaw = dir.x.atan2(-dir.z);
        self.pitch = dir.y.asin();
    }

    /// Applies free-camera movement for `dt` seconds. Ignored in attached views.
    pub fn update(&mut self, input: CameraInput, dt: f32) {
        if self.mode != CameraMode::Free || input.is_idle() {
            return;
        }
        self.yaw += input.yaw * TURN_SPEED * dt;
        self.pitch = (self.pitch + input.pitch * TURN_SPEED * dt).clamp(-PITCH_LIMIT, PITCH_LIMIT);

        let flat_forward = Vec3::new(self.yaw.sin(), 0.0, -self.yaw.cos());
        let right = flat_forward.cross(Vec3::Y);
        let step = flat_forward * input.forward + right * input.right + Vec3::Y * input.up;
        self.eye += step * MOVE_SPEED * dt;
        self.eye += self.direction() * input.zoom * ZOOM_STEP;
    }

    fn direction(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// World-to-camera transform for the current mode.
    pub fn view(&self) -> Mat4 {
        match self.mode {
            CameraMode::Free => Mat4::look_to_rh(self.eye, self.direction(), Vec3::Y),
            CameraMode::Desk => attached_view(Mat4::from_translation(self.desk_focus)),
            CameraMode::Tree => attached_view(Mat4::from_translation(self.tree_focus)),
        }
    }
}

/// View that looks at `object` from 10 units away, turned 0.4 rad about +Y.
pub fn attached_view(object: Mat4) -> Mat4 {
    (object * Mat4::from_rotation_y(ATTACH_YAW) * Mat4::from_translation(Vec3::new(0.0, 0.0, ATTACH_DISTANCE)))
        .inverse()
}

/// 45 degree perspective with wgpu's `0..1` depth range.
pub fn projection(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(FOV_Y, aspect.max(1e-3), NEAR, FAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye_of(view: Mat4) -> Vec3 {
        view.inverse().w_axis.truncate()
    }

    #[test]
    fn home_view_matches_look_at() {
        let cam = Camera::new(Vec3::ZERO, Vec3::ZERO);
        let expected = Mat4::look_at_rh(HOME_EYE, HOME_TARGET, Vec3::Y);
        let got = cam.view();
        for (a, b) in got.to_cols_array().iter().zip(expected.to_cols_array()) {
            assert!((a - b).abs() < 1e-4, "{got:?} vs {expected:?}");
        }
    }

    #[test]
    fn attached_view_sits_ten_units_out_and_faces_object() {
        let focus = Vec3::new(7.0, 2.0, 10.0);
        let view = attached_view(Mat4::from_translation(focus));
        let eye = eye_of(view);
        assert!(((eye - focus).length() - ATTACH_DISTANCE).abs() < 1e-4);
        assert!((eye.y - focus.y).abs() < 1e-4);

        // The object lands straight ahead on the -z axis in view space.
        let p = view.transform_point3(focus);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4);
        assert!((p.z + ATTACH_DISTANCE).abs() < 1e-4);
    }

    #[test]
    fn cycle_visits_all_and_returns_home() {
        let mut cam = Camera::new(Vec3::X, Vec3::Y);
        cam.update(CameraInput { forward: 1.0, ..Default::default() }, 1.0);
        assert_ne!(eye_of(cam.view()), HOME_EYE);

        assert_eq!(cam.cycle(), CameraMode::Desk);
        assert_eq!(cam.cycle(), CameraMode::Tree);
        assert_eq!(cam.cycle(), CameraMode::Free);
        assert!((eye_of(cam.view()) - HOME_EYE).length() < 1e-4);
    }

    #[test]
    fn free_movement_follows_heading() {
        let mut cam = Camera::new(Vec3::ZERO, Vec3::ZERO);
        cam.update(CameraInput { forward: 1.0, ..Default::default() }, 0.5);
        let eye = eye_of(cam.view());
        // Home heading is toward -z; forward movement stays level.
        assert!((eye - Vec3::new(0.0, 10.0, 25.0)).length() < 1e-3);

        cam.update(CameraInput { up: 1.0, ..Default::default() }, 0.1);
        assert!((eye_of(cam.view()).y - 11.0).abs() < 1e-3);
    }

    #[test]
    fn wheel_zooms_along_the_view_direction() {
        let mut cam = Camera::new(Vec3::ZERO, Vec3::ZERO);
        let start = eye_of(cam.view());
        let dir = cam.direction();
        // Zoom is per line, independent of frame time.
        cam.update(CameraInput { zoom: 2.0, ..Default::default() }, 0.0);
        let moved = eye_of(cam.view()) - start;
        assert!((moved - dir * 2.0 * ZOOM_STEP).length() < 1e-3);

        cam.update(CameraInput { zoom: -2.0, ..Default::default() }, 0.0);
        assert!((eye_of(cam.view()) - start).length() < 1e-3);
    }

    #[test]
    fn attached_views_ignore_movement() {
        let mut cam = Camera::new(Vec3::new(5.0, 2.0, 5.0), Vec3::ZERO);
        cam.cycle();
        let before = cam.view();
        cam.update(CameraInput { forward: 1.0, yaw: 1.0, ..Default::default() }, 1.0);
        assert_eq!(before, cam.view());
    }

    #[test]
    fn projection_maps_near_plane_to_zero_depth() {
        let p = projection(16.0 / 9.0);
        let clip = p * glam::Vec4::new(0.0, 0.0, -NEAR, 1.0);
        assert!((clip.z / clip.w).abs() < 1e-4);
    }
}
