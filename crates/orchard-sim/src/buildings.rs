//! Procedural skyline around the orchard.
//!
//! Generated once from a seeded random source and never changed afterwards.
//! Buildings may overlap; nothing checks for it.

use std::f32::consts::TAU;
use std::ops::Range;

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::error::{ConfigError, check_range};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BuildingKind {
    Box,
    BoxDome,
    BoxDomeSpire,
    BoxRoof,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::Box,
        BuildingKind::BoxDome,
        BuildingKind::BoxDomeSpire,
        BuildingKind::BoxRoof,
    ];
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Building {
    pub kind: BuildingKind,
    pub width: f32,
    pub height: f32,
    pub x: f32,
    pub z: f32,
}

/// Primitive shape a building part is drawn with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    /// Unit cube spanning `[-1, 1]^3`.
    Cube,
    /// Unit sphere.
    Sphere,
    /// Cone with base radius 1 at `y = 0` and apex at `y = 1`.
    Cone,
    /// Triangular prism: base `[-1, 1]` in x and z at `y = 0`, ridge along z at `y = 1`.
    Prism,
}

/// What to draw for one piece of a building.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BuildingPart {
    pub primitive: Primitive,
    pub transform: Mat4,
}

/// Distributions the generator samples from.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingLayout {
    pub count: usize,
    /// Cumulative probabilities in [`BuildingKind::ALL`] order; last must be 1.
    pub kind_cdf: [f32; 4],
    pub width: Range<f32>,
    pub height: Range<f32>,
    /// Chance that a plain box becomes a wide, low warehouse.
    pub warehouse_chance: f64,
    pub warehouse_width: Range<f32>,
    pub warehouse_height: Range<f32>,
    /// Distance band from the origin.
    pub distance: Range<f32>,
    /// Height of the ground the buildings stand on.
    pub ground_y: f32,
}

impl Default for BuildingLayout {
    fn default() -> Self {
        Self {
            count: 40,
            kind_cdf: [0.40, 0.70, 0.85, 1.00],
            width: 2.0..5.0,
            height: 4.0..14.0,
            warehouse_chance: 0.3,
            warehouse_width: 6.0..10.0,
            warehouse_height: 2.0..4.0,
            distance: 60.0..120.0,
            ground_y: 0.0,
        }
    }
}

impl BuildingLayout {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cdf = &self.kind_cdf;
        if cdf.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(ConfigError::new("buildings.kind_cdf", "probabilities must lie in 0..=1"));
        }
        if cdf.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::new("buildings.kind_cdf", "must be non-decreasing"));
        }
        if (cdf[3] - 1.0).abs() > 1e-6 {
            return Err(ConfigError::new("buildings.kind_cdf", "last entry must be 1.0"));
        }
        if !(0.0..=1.0).contains(&self.warehouse_chance) {
            return Err(ConfigError::new("buildings.warehouse_chance", "must lie in 0..=1"));
        }
        check_range("buildings.width", &self.width)?;
        check_range("buildings.height", &self.height)?;
        check_range("buildings.warehouse_width", &self.warehouse_width)?;
        check_range("buildings.warehouse_height", &self.warehouse_height)?;
        check_range("buildings.distance", &self.distance)?;
        if self.width.start <= 0.0 || self.height.start <= 0.0 || self.distance.start < 0.0 {
            return Err(ConfigError::new("buildings", "sizes and distances must be positive"));
        }
        Ok(())
    }

    /// Maps a uniform sample in `[0, 1)` to a kind through the cumulative table.
    pub fn kind_for(&self, u: f32) -> BuildingKind {
        self.kind_cdf
            .iter()
            .position(|&p| u < p)
            .map_or(BuildingKind::BoxRoof, |i| BuildingKind::ALL[i])
    }

    /// Samples `count` buildings from `rng`.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vec<Building> {
        (0..self.count).map(|_| self.sample_one(rng)).collect()
    }

    fn sample_one<R: Rng>(&self, rng: &mut R) -> Building {
        let kind = self.kind_for(rng.gen_range(0.0..1.0));

        let (width, height) = if kind == BuildingKind::Box && rng.gen_bool(self.warehouse_chance) {
            (
                rng.gen_range(self.warehouse_width.clone()),
                rng.gen_range(self.warehouse_height.clone()),
            )
        } else {
            (rng.gen_range(self.width.clone()), rng.gen_range(self.height.clone()))
        };

        let angle = rng.gen_range(0.0..TAU);
        let dist = rng.gen_range(self.distance.clone());

        Building {
            kind,
            width,
            height,
            x: dist * angle.cos(),
            z: dist * angle.sin(),
        }
    }
}

impl Building {
    /// Primitive pieces in draw order, chained from the building's ground anchor.
    pub fn parts(&self, ground_y: f32) -> Vec<BuildingPart> {
        let anchor = Mat4::from_translation(Vec3::new(self.x, ground_y, self.z));
        let half_w = 0.5 * self.width;
        let half_h = 0.5 * self.height;

        let body = anchor
            * Mat4::from_translation(Vec3::new(0.0, half_h, 0.0))
            * Mat4::from_scale(Vec3::new(half_w, half_h, half_w));

        let mut parts = vec![BuildingPart { primitive: Primitive::Cube, transform: body }];

        let roof_line = anchor * Mat4::from_translation(Vec3::new(0.0, self.height, 0.0));
        let dome = roof_line * Mat4::from_scale(Vec3::splat(half_w * 0.9));

        match self.kind {
            BuildingKind::Box => {}
            BuildingKind::BoxDome => {
                parts.push(BuildingPart { primitive: Primitive::Sphere, transform: dome });
            }
            BuildingKind::BoxDomeSpire => {
                parts.push(BuildingPart { primitive: Primitive::Sphere, transform: dome });
                let spire = roof_line
                    * Mat4::from_translation(Vec3::new(0.0, half_w * 0.8, 0.0))
                    * Mat4::from_scale(Vec3::new(half_w * 0.2, self.width, half_w * 0.2));
                parts.push(BuildingPart { primitive: Primitive::Cone, transform: spire });
            }
            BuildingKind::BoxRoof => {
                let roof = roof_line * Mat4::from_scale(Vec3::new(half_w, half_w * 0.6, half_w));
                parts.push(BuildingPart { primitive: Primitive::Prism, transform: roof });
            }
        }

        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn kind_table_boundaries() {
        let l = BuildingLayout::default();
        assert_eq!(l.kind_for(0.0), BuildingKind::Box);
        assert_eq!(l.kind_for(0.39), BuildingKind::Box);
        assert_eq!(l.kind_for(0.40), BuildingKind::BoxDome);
        assert_eq!(l.kind_for(0.75), BuildingKind::BoxDomeSpire);
        assert_eq!(l.kind_for(0.9), BuildingKind::BoxRoof);
        assert_eq!(l.kind_for(0.999_9), BuildingKind::BoxRoof);
    }

    #[test]
    fn same_seed_same_skyline() {
        let l = BuildingLayout::default();
        let a = l.generate(&mut StdRng::seed_from_u64(7));
        let b = l.generate(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.len(), l.count);
    }

    #[test]
    fn different_seed_different_skyline() {
        let l = BuildingLayout::default();
        let a = l.generate(&mut StdRng::seed_from_u64(1));
        let b = l.generate(&mut StdRng::seed_from_u64(2));
        assert_ne!(a, b);
    }

    #[test]
    fn samples_respect_ranges() {
        let l = BuildingLayout { count: 500, ..BuildingLayout::default() };
        for b in l.generate(&mut StdRng::seed_from_u64(99)) {
            let d = (b.x * b.x + b.z * b.z).sqrt();
            assert!(d >= l.distance.start - 1e-3 && d <= l.distance.end + 1e-3);
            let warehouse = l.warehouse_width.contains(&b.width) && b.width >= l.width.end;
            if warehouse {
                assert_eq!(b.kind, BuildingKind::Box);
                assert!(l.warehouse_height.contains(&b.height));
            } else {
                assert!(l.width.contains(&b.width));
                assert!(l.height.contains(&b.height));
            }
        }
    }

    #[test]
    fn all_kinds_appear_in_large_sample() {
        let l = BuildingLayout { count: 400, ..BuildingLayout::default() };
        let skyline = l.generate(&mut StdRng::seed_from_u64(3));
        for kind in BuildingKind::ALL {
            assert!(skyline.iter().any(|b| b.kind == kind), "missing {kind:?}");
        }
    }

    #[test]
    fn parts_per_kind() {
        let b = |kind| Building { kind, width: 4.0, height: 10.0, x: 70.0, z: 0.0 };
        let prims = |kind| -> Vec<Primitive> {
            b(kind).parts(0.0).iter().map(|p| p.primitive).collect()
        };
        assert_eq!(prims(BuildingKind::Box), vec![Primitive::Cube]);
        assert_eq!(prims(BuildingKind::BoxDome), vec![Primitive::Cube, Primitive::Sphere]);
        assert_eq!(
            prims(BuildingKind::BoxDomeSpire),
            vec![Primitive::Cube, Primitive::Sphere, Primitive::Cone]
        );
        assert_eq!(prims(BuildingKind::BoxRoof), vec![Primitive::Cube, Primitive::Prism]);
    }

    #[test]
    fn body_sits_on_ground() {
        let b = Building { kind: BuildingKind::Box, width: 4.0, height: 10.0, x: 70.0, z: 5.0 };
        let body = b.parts(0.5)[0].transform;
        let bottom = body.transform_point3(Vec3::new(0.0, -1.0, 0.0));
        let top = body.transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!((bottom.y - 0.5).abs() < 1e-5);
        assert!((top.y - 10.5).abs() < 1e-5);
        assert!((bottom.x - 70.0).abs() < 1e-5);
    }

    #[test]
    fn validate_rejects_bad_table() {
        let l = BuildingLayout { kind_cdf: [0.5, 0.4, 0.9, 1.0], ..BuildingLayout::default() };
        assert!(l.validate().is_err());
        let l = BuildingLayout { kind_cdf: [0.1, 0.2, 0.3, 0.9], ..BuildingLayout::default() };
        assert!(l.validate().is_err());
        assert!(BuildingLayout::default().validate().is_ok());
    }
}
