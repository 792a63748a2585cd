use glam::Vec3;

use crate::pick::PickTag;

/// The desk lamp. Clicking its bulb switches an extra warm light on or off.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Lamp {
    pub tag: PickTag,
    pub is_on: bool,
    /// World position of the bulb.
    pub bulb: Vec3,
}

impl Lamp {
    pub fn new(tag: PickTag, bulb: Vec3) -> Self {
        Self { tag, is_on: false, bulb }
    }

    /// Flips the lamp and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.is_on = !self.is_on;
        self.is_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_off_and_toggles() {
        let mut lamp = Lamp::new(PickTag(4), Vec3::ZERO);
        assert!(!lamp.is_on);
        assert!(lamp.toggle());
        assert!(!lamp.toggle());
    }
}
