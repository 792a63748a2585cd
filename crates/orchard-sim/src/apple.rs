use glam::{Mat4, Vec3};

use crate::pick::PickTag;

/// Apple identity: its slot index on the tree.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct AppleId(pub u8);

impl std::fmt::Display for AppleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "apple#{}", self.0)
    }
}

/// Where an apple is in its life cycle.
///
/// A single enum rather than independent flags, so an apple can never be both
/// on the tree and on the desk.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AppleState {
    OnTree,
    /// Detached and animating; the start time lives in the fall queue.
    Falling,
    /// Came to rest on the ground; placement is frozen.
    Grounded,
    OnDesk,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Apple {
    pub id: AppleId,
    pub tag: PickTag,
    pub state: AppleState,
    /// Current model transform.
    pub placement: Mat4,
    /// Tree-anchored transform; fall origin and regrow target.
    pub default_loc: Mat4,
}

impl Apple {
    pub fn new(id: AppleId, tag: PickTag, default_loc: Mat4) -> Self {
        Self {
            id,
            tag,
            state: AppleState::OnTree,
            placement: default_loc,
            default_loc,
        }
    }

    #[inline]
    pub fn on_tree(&self) -> bool {
        matches!(self.state, AppleState::OnTree)
    }

    #[inline]
    pub fn on_desk(&self) -> bool {
        matches!(self.state, AppleState::OnDesk)
    }

    #[inline]
    pub fn is_falling(&self) -> bool {
        matches!(self.state, AppleState::Falling)
    }

    /// World position of the apple's center.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.placement.w_axis.truncate()
    }

    /// Puts the apple back on its branch.
    pub fn reset(&mut self) {
        self.state = AppleState::OnTree;
        self.placement = self.default_loc;
    }
}

/// Where apples hang: a canopy sphere around the top of the trunk.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Canopy {
    pub center: Vec3,
    pub radius: f32,
}

impl Default for Canopy {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 6.5, 0.0),
            radius: 2.4,
        }
    }
}

const GOLDEN_ANGLE: f32 = 2.399_963;

impl Canopy {
    /// Deterministic anchor point for slot `slot`.
    ///
    /// Slots are spread around the canopy by the golden angle, with the
    /// elevation cycling through a band around the equator so apples hang on
    /// the sides of the crown rather than on top.
    pub fn anchor(&self, slot: u8) -> Vec3 {
        let i = slot as f32;
        let theta = i * GOLDEN_ANGLE;
        let band = (i * 0.618_034).fract(); // 0..1
        let elevation = -0.55 + 0.8 * band; // radians

        let dir = Vec3::new(
            theta.cos() * elevation.cos(),
            elevation.sin(),
            theta.sin() * elevation.cos(),
        );
        self.center + dir * self.radius
    }

    /// Default transform of the apple in `slot`, scaled to `apple_radius`.
    pub fn default_loc(&self, slot: u8, apple_radius: f32) -> Mat4 {
        Mat4::from_translation(self.anchor(slot)) * Mat4::from_scale(Vec3::splat(apple_radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_apple_is_on_tree_at_default() {
        let loc = Mat4::from_translation(Vec3::new(1.0, 6.0, 0.0));
        let a = Apple::new(AppleId(2), PickTag(12), loc);
        assert!(a.on_tree());
        assert!(!a.on_desk());
        assert!(!a.is_falling());
        assert_eq!(a.placement, a.default_loc);
    }

    #[test]
    fn flags_follow_state() {
        let mut a = Apple::new(AppleId(0), PickTag(4), Mat4::IDENTITY);
        a.state = AppleState::Falling;
        assert!(a.is_falling() && !a.on_tree() && !a.on_desk());
        a.state = AppleState::Grounded;
        assert!(!a.is_falling() && !a.on_tree() && !a.on_desk());
        a.state = AppleState::OnDesk;
        assert!(a.on_desk() && !a.on_tree());
    }

    #[test]
    fn anchors_lie_on_canopy_and_differ() {
        let c = Canopy::default();
        let mut prev: Option<Vec3> = None;
        for slot in 0..12 {
            let p = c.anchor(slot);
            assert!(((p - c.center).length() - c.radius).abs() < 1e-4);
            if let Some(q) = prev {
                assert!((p - q).length() > 0.1);
            }
            prev = Some(p);
        }
    }

    #[test]
    fn anchors_are_deterministic() {
        let c = Canopy::default();
        assert_eq!(c.anchor(5), c.anchor(5));
        assert_eq!(c.default_loc(7, 0.3), c.default_loc(7, 0.3));
    }
}
