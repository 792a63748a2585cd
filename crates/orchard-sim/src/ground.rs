//! Piecewise-planar ground under the tree.
//!
//! The hill is irregular, so instead of one plane it is approximated by three
//! hand-fit planes `y = slope_x * x + slope_z * z + offset`, one per x-zone.
//! An apple touches the ground once its lowest point is at or below the plane
//! of the zone its x coordinate falls into.

use glam::{Mat4, Quat, Vec3};

use crate::error::{ConfigError, check_range};

/// One hand-fit half-space of the ground.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GroundZone {
    pub slope_x: f32,
    pub slope_z: f32,
    pub offset: f32,
}

impl GroundZone {
    #[inline]
    pub const fn new(slope_x: f32, slope_z: f32, offset: f32) -> Self {
        Self { slope_x, slope_z, offset }
    }

    /// Ground height at `(x, z)`.
    #[inline]
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.slope_x * x + self.slope_z * z + self.offset
    }

    /// Unit normal of the plane, pointing up.
    pub fn normal(&self) -> Vec3 {
        Vec3::new(-self.slope_x, 1.0, -self.slope_z).normalize()
    }
}

/// Three ground zones split at two x boundaries.
///
/// Zone 0 covers `x < split[0]`, zone 1 covers `split[0] <= x < split[1]`,
/// zone 2 covers `x >= split[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundModel {
    pub split: [f32; 2],
    pub zones: [GroundZone; 3],
    /// Extent of the hill along z, used only for drawing the slabs.
    pub z_extent: std::ops::Range<f32>,
    /// Outer x extent of the two side zones, used only for drawing the slabs.
    pub x_extent: std::ops::Range<f32>,
}

impl Default for GroundModel {
    fn default() -> Self {
        Self {
            split: [-2.0, 2.0],
            zones: [
                // West flank falls away toward -x.
                GroundZone::new(0.15, 0.05, 0.9),
                // Plateau under the trunk, tilted slightly toward -z.
                GroundZone::new(0.0, 0.05, 0.6),
                // East flank falls away toward +x.
                GroundZone::new(-0.15, 0.05, 0.9),
            ],
            z_extent: -6.0..6.0,
            x_extent: -6.0..6.0,
        }
    }
}

impl GroundModel {
    /// Index of the zone responsible for `x`.
    #[inline]
    pub fn zone_index(&self, x: f32) -> usize {
        if x < self.split[0] {
            0
        } else if x < self.split[1] {
            1
        } else {
            2
        }
    }

    #[inline]
    pub fn zone_for(&self, x: f32) -> &GroundZone {
        &self.zones[self.zone_index(x)]
    }

    /// Ground height under `(x, z)`.
    #[inline]
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.zone_for(x).height_at(x, z)
    }

    /// True when a sphere of `radius` centered at `pos` touches or crosses the ground.
    ///
    /// Pure function of its inputs.
    #[inline]
    pub fn contact(&self, pos: Vec3, radius: f32) -> bool {
        pos.y - radius <= self.height_at(pos.x, pos.z)
    }

    /// x range of zone `i`, clipped to `x_extent`.
    pub fn zone_x_range(&self, i: usize) -> std::ops::Range<f32> {
        match i {
            0 => self.x_extent.start..self.split[0],
            1 => self.split[0]..self.split[1],
            _ => self.split[1]..self.x_extent.end,
        }
    }

    /// Transform of a unit cube (`[-1, 1]^3`) that draws zone `i` as a thin
    /// slab whose top face lies on the zone plane.
    pub fn slab_transform(&self, i: usize, thickness: f32) -> Mat4 {
        let zone = self.zones[i.min(2)];
        let xr = self.zone_x_range(i);
        let zr = &self.z_extent;

        let cx = 0.5 * (xr.start + xr.end);
        let cz = 0.5 * (zr.start + zr.end);
        let n = zone.normal();
        let top = Vec3::new(cx, zone.height_at(cx, cz), cz);
        let center = top - n * (0.5 * thickness);

        // Stretch the half-extents so the tilted slab still spans the zone footprint.
        let hx = 0.5 * (xr.end - xr.start) * (1.0 + zone.slope_x * zone.slope_x).sqrt();
        let hz = 0.5 * (zr.end - zr.start) * (1.0 + zone.slope_z * zone.slope_z).sqrt();

        Mat4::from_scale_rotation_translation(
            Vec3::new(hx, 0.5 * thickness, hz),
            Quat::from_rotation_arc(Vec3::Y, n),
            center,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.split[0] < self.split[1]) {
            return Err(ConfigError::new("ground.split", "zone splits must be increasing"));
        }
        for z in &self.zones {
            if !(z.slope_x.is_finite() && z.slope_z.is_finite() && z.offset.is_finite()) {
                return Err(ConfigError::new("ground.zones", "plane coefficients must be finite"));
            }
        }
        check_range("ground.z_extent", &self.z_extent)?;
        check_range("ground.x_extent", &self.x_extent)?;
        if self.x_extent.start > self.split[0] || self.x_extent.end < self.split[1] {
            return Err(ConfigError::new("ground.x_extent", "must enclose both zone splits"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zones_selected_by_x() {
        let g = GroundModel::default();
        assert_eq!(g.zone_index(-3.0), 0);
        assert_eq!(g.zone_index(-2.0), 1);
        assert_eq!(g.zone_index(0.0), 1);
        assert_eq!(g.zone_index(1.999), 1);
        assert_eq!(g.zone_index(2.0), 2);
        assert_eq!(g.zone_index(10.0), 2);
    }

    #[test]
    fn default_hill_is_continuous_at_splits() {
        let g = GroundModel::default();
        for z in [-3.0, 0.0, 4.0] {
            let left = g.zones[0].height_at(-2.0, z);
            let mid = g.zones[1].height_at(-2.0, z);
            assert!((left - mid).abs() < 1e-5);
            let mid = g.zones[1].height_at(2.0, z);
            let right = g.zones[2].height_at(2.0, z);
            assert!((mid - right).abs() < 1e-5);
        }
    }

    #[test]
    fn contact_is_repeatable_in_every_zone() {
        let g = GroundModel::default();
        for p in [Vec3::new(-4.0, 0.5, 1.0), Vec3::new(0.0, 0.7, 0.0), Vec3::new(3.0, 3.0, -1.0)] {
            let first = g.contact(p, 0.3);
            for _ in 0..8 {
                assert_eq!(g.contact(p, 0.3), first);
            }
        }
    }

    #[test]
    fn contact_above_and_below_plateau() {
        let g = GroundModel::default();
        assert!(!g.contact(Vec3::new(0.0, 5.0, 0.0), 0.3));
        assert!(g.contact(Vec3::new(0.0, 0.8, 0.0), 0.3));
        assert!(g.contact(Vec3::new(0.0, -1.0, 0.0), 0.3));
    }

    #[test]
    fn slab_top_touches_plane_at_center() {
        let g = GroundModel::default();
        let m = g.slab_transform(0, 0.2);
        let top_center = m.transform_point3(Vec3::new(0.0, 1.0, 0.0));
        let h = g.zones[0].height_at(top_center.x, top_center.z);
        assert!((top_center.y - h).abs() < 1e-4);
    }

    #[test]
    fn validate_rejects_unordered_splits() {
        let g = GroundModel { split: [1.0, -1.0], ..GroundModel::default() };
        assert_eq!(g.validate().unwrap_err().field, "ground.split");
        assert!(GroundModel::default().validate().is_ok());
    }
}
