use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::paint::Color;

/// Most lights a shader evaluates.
pub const MAX_LIGHTS: usize = 2;

/// Point (`w = 1`) or directional (`w = 0`) light.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub position: Vec4,
    pub color: Color,
    /// Falloff `k` in `1 / (1 + k * d^2)`.
    pub attenuation: f32,
}

impl Light {
    /// Point light whose brightness halves at roughly `sqrt(size)` units.
    pub fn point(position: Vec3, color: Color, size: f32) -> Self {
        Self {
            position: position.extend(1.0),
            color,
            attenuation: if size > 0.0 { 1.0 / size } else { 0.0 },
        }
    }
}

/// Camera and lights shared by every draw in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    /// World to camera.
    pub view: Mat4,
    pub projection: Mat4,
    pub lights: Vec<Light>,
}

impl FrameState {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self { view, projection, lights: Vec::new() }
    }

    /// Camera position in world space.
    pub fn camera_center(&self) -> Vec3 {
        self.view.inverse().w_axis.truncate()
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }

    /// GPU layout of this state. Lights beyond [`MAX_LIGHTS`] are dropped.
    pub fn uniform(&self) -> FrameUniform {
        let mut u = FrameUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            camera_center: self.camera_center().extend(1.0).to_array(),
            light_positions: [[0.0; 4]; MAX_LIGHTS],
            light_colors: [[0.0; 4]; MAX_LIGHTS],
            light_attenuation: [0.0; 4],
            light_count: [0; 4],
        };

        let used = self.lights.len().min(MAX_LIGHTS);
        if self.lights.len() > MAX_LIGHTS {
            log::trace!("{} lights requested; shaders take {MAX_LIGHTS}", self.lights.len());
        }
        for (i, light) in self.lights.iter().take(used).enumerate() {
            u.light_positions[i] = light.position.to_array();
            u.light_colors[i] = light.color.to_array();
            u.light_attenuation[i] = light.attenuation;
        }
        u.light_count[0] = used as u32;
        u
    }
}

/// Per-frame uniform block (`FrameUniforms` in the WGSL sources).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_center: [f32; 4],
    pub light_positions: [[f32; 4]; MAX_LIGHTS],
    pub light_colors: [[f32; 4]; MAX_LIGHTS],
    pub light_attenuation: [f32; 4],
    pub light_count: [u32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_center_inverts_look_at() {
        let eye = Vec3::new(0.0, 10.0, 30.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let f = FrameState::new(view, Mat4::IDENTITY);
        assert!((f.camera_center() - eye).length() < 1e-4);
    }

    #[test]
    fn uniform_caps_lights() {
        let mut f = FrameState::new(Mat4::IDENTITY, Mat4::IDENTITY);
        for i in 0..3 {
            f.lights.push(Light::point(Vec3::splat(i as f32), Color::WHITE, 1000.0));
        }
        let u = f.uniform();
        assert_eq!(u.light_count[0], 2);
        assert_eq!(u.light_positions[1], [1.0, 1.0, 1.0, 1.0]);
        assert!((u.light_attenuation[0] - 0.001).abs() < 1e-9);
        assert_eq!(u.light_attenuation[2], 0.0);
    }

    #[test]
    fn uniform_size_is_16_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
    }
}
