use crate::paint::Color;

/// Where the lighting model is evaluated.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Shading {
    /// Per vertex, colors interpolated across the triangle.
    #[default]
    Gouraud,
    /// Per fragment, normals interpolated across the triangle.
    Phong,
}

/// Blinn-Phong surface parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub ambient: f32,
    pub diffusivity: f32,
    pub specularity: f32,
    pub smoothness: f32,
    pub shading: Shading,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            ambient: 0.0,
            diffusivity: 1.0,
            specularity: 1.0,
            smoothness: 40.0,
            shading: Shading::Gouraud,
        }
    }
}

impl Material {
    pub fn gouraud(color: Color) -> Self {
        Self { color, ..Self::default() }
    }

    pub fn phong(color: Color) -> Self {
        Self { color, shading: Shading::Phong, ..Self::default() }
    }

    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    pub fn with_ambient(self, ambient: f32) -> Self {
        Self { ambient, ..self }
    }

    pub fn with_diffusivity(self, diffusivity: f32) -> Self {
        Self { diffusivity, ..self }
    }

    pub fn with_specularity(self, specularity: f32) -> Self {
        Self { specularity, ..self }
    }

    pub fn with_smoothness(self, smoothness: f32) -> Self {
        Self { smoothness, ..self }
    }

    /// `[ambient, diffusivity, specularity, smoothness]` as uploaded to shaders.
    #[inline]
    pub fn params(&self) -> [f32; 4] {
        [self.ambient, self.diffusivity, self.specularity, self.smoothness]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_black_full_diffuse_and_specular() {
        let m = Material::default();
        assert_eq!(m.color, Color::BLACK);
        assert_eq!(m.params(), [0.0, 1.0, 1.0, 40.0]);
        assert_eq!(m.shading, Shading::Gouraud);
    }

    #[test]
    fn builders_override_one_field() {
        let m = Material::phong(Color::WHITE).with_ambient(0.4).with_diffusivity(0.6);
        assert_eq!(m.shading, Shading::Phong);
        assert_eq!(m.params(), [0.4, 0.6, 1.0, 40.0]);
    }
}
