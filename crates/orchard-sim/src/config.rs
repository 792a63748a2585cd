use glam::{Mat4, Vec3};

use crate::apple::{AppleId, Canopy};
use crate::buildings::BuildingLayout;
use crate::error::ConfigError;
use crate::ground::GroundModel;
use crate::pick::PickPolicy;

/// Upper bound on apples per tree.
pub const MAX_APPLES: u8 = 16;

/// Apples per desk row before a new row starts.
pub const DESK_ROW: u8 = 6;

/// Tunables for an [`Orchard`](crate::Orchard) session.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchardConfig {
    /// Apples the tree grows before it stops.
    pub capacity: u8,
    /// Seconds between two apples appearing. Zero grows the whole tree at once.
    pub spawn_interval: f32,
    /// Gravitational acceleration at full gravity.
    pub gravity: f32,
    /// Tumble rate of a falling apple, radians per second.
    pub tumble_rate: f32,
    pub apple_radius: f32,

    pub pick: PickPolicy,
    pub ground: GroundModel,
    pub canopy: Canopy,
    pub buildings: BuildingLayout,

    /// Desk top point where the first picked apple is set down.
    pub desk_anchor: Vec3,
    /// Gap between neighbouring apples on the desk.
    pub desk_spacing: f32,
    pub lamp_bulb: Vec3,
}

impl Default for OrchardConfig {
    fn default() -> Self {
        Self {
            capacity: 12,
            spawn_interval: 0.25,
            gravity: 9.8,
            tumble_rate: 3.0,
            apple_radius: 0.3,
            pick: PickPolicy::default(),
            ground: GroundModel::default(),
            canopy: Canopy::default(),
            buildings: BuildingLayout::default(),
            desk_anchor: Vec3::new(6.0, 1.8, 10.0),
            desk_spacing: 0.7,
            lamp_bulb: Vec3::new(9.2, 3.1, 9.6),
        }
    }
}

impl OrchardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 || self.capacity > MAX_APPLES {
            return Err(ConfigError::new(
                "capacity",
                format!("expected 1..={MAX_APPLES} apples, got {}", self.capacity),
            ));
        }
        if !(self.spawn_interval >= 0.0 && self.spawn_interval.is_finite()) {
            return Err(ConfigError::new("spawn_interval", "must be finite and non-negative"));
        }
        if !(self.gravity > 0.0 && self.gravity.is_finite()) {
            return Err(ConfigError::new("gravity", "must be finite and positive"));
        }
        if !self.tumble_rate.is_finite() {
            return Err(ConfigError::new("tumble_rate", "must be finite"));
        }
        if !(self.apple_radius > 0.0 && self.apple_radius.is_finite()) {
            return Err(ConfigError::new("apple_radius", "must be finite and positive"));
        }
        if !(self.desk_spacing > 0.0) {
            return Err(ConfigError::new("desk_spacing", "must be positive"));
        }

        self.pick.validate()?;
        // One tag for the lamp plus one per apple.
        let needed = self.capacity as usize + 1;
        if needed > self.pick.capacity() {
            return Err(ConfigError::new(
                "pick.spacing",
                format!(
                    "{} tags needed but spacing {} leaves room for {}",
                    needed,
                    self.pick.spacing,
                    self.pick.capacity()
                ),
            ));
        }

        if !(self.canopy.radius > 0.0) {
            return Err(ConfigError::new("canopy.radius", "must be positive"));
        }

        self.ground.validate()?;
        self.buildings.validate()?;
        Ok(())
    }

    /// Desk rows needed to hold every apple, at least one.
    pub fn desk_rows(&self) -> u8 {
        self.capacity.div_ceil(DESK_ROW).max(1)
    }

    /// Transform of apple `id` when it rests on the desk.
    pub fn desk_slot(&self, id: AppleId) -> Mat4 {
        let col = (id.0 % DESK_ROW) as f32;
        let row = (id.0 / DESK_ROW) as f32;
        let center = self.desk_anchor
            + Vec3::new(col * self.desk_spacing, self.apple_radius, -row * self.desk_spacing);
        Mat4::from_translation(center) * Mat4::from_scale(Vec3::splat(self.apple_radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desk_rows_cover_capacity() {
        let mut c = OrchardConfig::default();
        for (capacity, rows) in [(1, 1), (6, 1), (7, 2), (12, 2), (16, 3)] {
            c.capacity = capacity;
            assert_eq!(c.desk_rows(), rows, "capacity {capacity}");
            let last = c.desk_slot(AppleId(capacity - 1)).w_axis;
            let back = c.desk_anchor.z - (rows - 1) as f32 * c.desk_spacing;
            assert!((last.z - back).abs() < 1e-5);
        }
    }

    #[test]
    fn default_is_valid() {
        assert!(OrchardConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let bad = [
            OrchardConfig { capacity: 0, ..Default::default() },
            OrchardConfig { capacity: MAX_APPLES + 1, ..Default::default() },
            OrchardConfig { gravity: 0.0, ..Default::default() },
            OrchardConfig { gravity: f32::NAN, ..Default::default() },
            OrchardConfig { apple_radius: -1.0, ..Default::default() },
            OrchardConfig { spawn_interval: -0.1, ..Default::default() },
            OrchardConfig { pick: PickPolicy { spacing: 4, tolerance: 4 }, ..Default::default() },
        ];
        for cfg in bad {
            assert!(cfg.validate().is_err(), "{cfg:?}");
        }
    }

    #[test]
    fn rejects_spacing_without_room_for_every_tag() {
        let cfg = OrchardConfig {
            pick: PickPolicy { spacing: 64, tolerance: 0 },
            ..Default::default()
        };
        assert_eq!(cfg.validate().unwrap_err().field, "pick.spacing");
    }

    #[test]
    fn desk_slots_do_not_overlap() {
        let cfg = OrchardConfig::default();
        let mut centers: Vec<Vec3> = Vec::new();
        for i in 0..cfg.capacity {
            let c = cfg.desk_slot(AppleId(i)).w_axis.truncate();
            assert!((c.y - (cfg.desk_anchor.y + cfg.apple_radius)).abs() < 1e-5);
            for prev in &centers {
                assert!((c - *prev).length() >= 2.0 * cfg.apple_radius);
            }
            centers.push(c);
        }
    }
}
