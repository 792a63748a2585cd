/// Drawable size in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height, or 1 for a degenerate viewport.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.is_valid() { self.width / self.height } else { 1.0 }
    }

    /// Physical pixel under a logical-pixel pointer position.
    ///
    /// Texture rows run top to bottom, the same as window coordinates, so no
    /// flip is needed. Returns `None` outside the viewport.
    pub fn pixel_at(self, logical_x: f32, logical_y: f32, scale_factor: f32) -> Option<(u32, u32)> {
        if !self.is_valid() || !(logical_x >= 0.0 && logical_y >= 0.0) {
            return None;
        }
        let px = (logical_x * scale_factor).floor();
        let py = (logical_y * scale_factor).floor();
        if px >= self.width || py >= self.height {
            return None;
        }
        Some((px as u32, py as u32))
    }

    /// Integer extent, at least 1x1.
    #[inline]
    pub fn extent(self) -> (u32, u32) {
        (self.width.max(1.0) as u32, self.height.max(1.0) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_at_scales_and_clips() {
        let vp = Viewport::new(200.0, 100.0);
        assert_eq!(vp.pixel_at(10.4, 20.9, 1.0), Some((10, 20)));
        assert_eq!(vp.pixel_at(10.0, 20.0, 2.0), Some((20, 40)));
        assert_eq!(vp.pixel_at(100.0, 10.0, 2.0), None);
        assert_eq!(vp.pixel_at(-1.0, 10.0, 1.0), None);
        assert_eq!(vp.pixel_at(f32::NAN, 10.0, 1.0), None);
        assert_eq!(Viewport::default().pixel_at(0.0, 0.0, 1.0), None);
    }

    #[test]
    fn aspect_handles_degenerate() {
        assert_eq!(Viewport::new(1600.0, 800.0).aspect(), 2.0);
        assert_eq!(Viewport::new(0.0, 800.0).aspect(), 1.0);
    }
}
