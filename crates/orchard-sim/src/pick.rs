//! Pick tags: identity of clickable entities in the ID pass.
//!
//! Every clickable entity owns one opaque [`PickTag`]. The renderer writes the
//! tag byte into the ID pass and hands the byte read back under the cursor to
//! [`PickRegistry::decode`].
//!
//! Tags are allocated `spacing` apart. A decoder `tolerance` of `k` accepts
//! any red value in `tag ..= tag + k`, so windows never overlap as long as
//! `tolerance < spacing`.

use crate::apple::AppleId;
use crate::error::ConfigError;

/// Red-channel value reserved for "nothing drawn here".
pub const BACKGROUND_TAG: u8 = 0;

/// Opaque identity written into the ID pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PickTag(pub u8);

/// Entity a tag resolves to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PickTarget {
    Apple(AppleId),
    Lamp,
}

/// Tag allocation and lookup policy.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PickPolicy {
    /// Distance between consecutive tags.
    pub spacing: u8,
    /// Extra red values above a tag still accepted as that tag.
    pub tolerance: u8,
}

impl Default for PickPolicy {
    fn default() -> Self {
        Self { spacing: 4, tolerance: 0 }
    }
}

impl PickPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spacing == 0 {
            return Err(ConfigError::new("pick.spacing", "must be at least 1"));
        }
        if self.tolerance >= self.spacing {
            return Err(ConfigError::new(
                "pick.tolerance",
                format!(
                    "tolerance {} would overlap neighbouring tags {} apart",
                    self.tolerance, self.spacing
                ),
            ));
        }
        Ok(())
    }

    /// Number of tags that fit in a byte with this policy.
    pub fn capacity(&self) -> usize {
        if self.spacing == 0 {
            return 0;
        }
        // Highest tag plus its tolerance window must stay within u8.
        let usable = 255usize - self.tolerance as usize;
        usable / self.spacing as usize
    }
}

/// Table of live tags, searched linearly on decode.
#[derive(Debug, Clone, Default)]
pub struct PickRegistry {
    policy: PickPolicy,
    entries: Vec<(PickTag, PickTarget)>,
}

impl PickRegistry {
    pub fn new(policy: PickPolicy) -> Self {
        Self { policy, entries: Vec::new() }
    }

    #[inline]
    pub fn policy(&self) -> PickPolicy {
        self.policy
    }

    #[inline]
    pub fn entries(&self) -> &[(PickTag, PickTarget)] {
        &self.entries
    }

    /// Assigns the next free tag to `target`.
    ///
    /// Returns the existing tag if `target` is already registered, and `None`
    /// once the byte range is exhausted.
    pub fn register(&mut self, target: PickTarget) -> Option<PickTag> {
        if let Some(tag) = self.tag_of(target) {
            return Some(tag);
        }
        if self.entries.len() >= self.policy.capacity() {
            return None;
        }
        let raw = (self.entries.len() + 1) * self.policy.spacing as usize;
        let tag = PickTag(u8::try_from(raw).ok()?);
        self.entries.push((tag, target));
        Some(tag)
    }

    pub fn tag_of(&self, target: PickTarget) -> Option<PickTag> {
        self.entries
            .iter()
            .find(|(_, t)| *t == target)
            .map(|(tag, _)| *tag)
    }

    /// Resolves a sampled red value to an entity.
    pub fn decode(&self, red: u8) -> Option<PickTarget> {
        if red == BACKGROUND_TAG {
            return None;
        }
        let tol = self.policy.tolerance;
        self.entries
            .iter()
            .find(|(tag, _)| red >= tag.0 && red - tag.0 <= tol)
            .map(|(_, target)| *target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(tolerance: u8) -> PickRegistry {
        let mut r = PickRegistry::new(PickPolicy { spacing: 4, tolerance });
        r.register(PickTarget::Lamp);
        for i in 0..12 {
            r.register(PickTarget::Apple(AppleId(i)));
        }
        r
    }

    #[test]
    fn tags_are_unique_and_nonzero() {
        let r = registry(0);
        let mut seen = std::collections::HashSet::new();
        for (tag, _) in r.entries() {
            assert_ne!(tag.0, BACKGROUND_TAG);
            assert!(seen.insert(tag.0));
        }
    }

    #[test]
    fn register_is_idempotent() {
        let mut r = registry(0);
        let before = r.entries().len();
        let a = r.tag_of(PickTarget::Apple(AppleId(3)));
        assert_eq!(r.register(PickTarget::Apple(AppleId(3))), a);
        assert_eq!(r.entries().len(), before);
    }

    #[test]
    fn exact_decode() {
        let r = registry(0);
        let tag = r.tag_of(PickTarget::Apple(AppleId(0))).unwrap();
        assert_eq!(r.decode(tag.0), Some(PickTarget::Apple(AppleId(0))));
        assert_eq!(r.decode(tag.0 + 1), None);
        assert_eq!(r.decode(BACKGROUND_TAG), None);
    }

    #[test]
    fn tolerant_decode_accepts_one_above() {
        let r = registry(1);
        let tag = r.tag_of(PickTarget::Lamp).unwrap();
        assert_eq!(r.decode(tag.0 + 1), Some(PickTarget::Lamp));
        assert_eq!(r.decode(tag.0 + 2), None);
        assert_eq!(r.decode(tag.0 - 1), None);
    }

    #[test]
    fn policy_rejects_overlapping_windows() {
        assert!(PickPolicy { spacing: 4, tolerance: 3 }.validate().is_ok());
        assert!(PickPolicy { spacing: 4, tolerance: 4 }.validate().is_err());
        assert!(PickPolicy { spacing: 0, tolerance: 0 }.validate().is_err());
    }

    #[test]
    fn registry_stops_at_capacity() {
        let mut r = PickRegistry::new(PickPolicy { spacing: 128, tolerance: 0 });
        assert_eq!(r.register(PickTarget::Lamp), Some(PickTag(128)));
        assert_eq!(r.register(PickTarget::Apple(AppleId(0))), None);
    }
}
