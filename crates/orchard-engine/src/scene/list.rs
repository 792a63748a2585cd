use glam::Mat4;

use super::{Material, MeshId};

/// One lit draw: a mesh, where it goes, what it looks like.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub transform: Mat4,
    pub material: Material,
}

/// Recorded lit draws for a frame, in submission order.
///
/// Depth testing resolves visibility, so order only matters for equal depth.
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items, keeping capacity for the next frame.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn push(&mut self, mesh: MeshId, transform: Mat4, material: Material) {
        self.items.push(DrawItem { mesh, transform, material });
    }

    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// One ID-pass draw. `tag == 0` draws an occluder that hides what is behind
/// it without being pickable itself.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickItem {
    pub mesh: MeshId,
    pub transform: Mat4,
    pub tag: u8,
}

/// Recorded ID-pass draws for a frame.
#[derive(Debug, Default)]
pub struct PickList {
    items: Vec<PickItem>,
}

impl PickList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Draws `mesh` with `tag` in the red channel.
    #[inline]
    pub fn push(&mut self, mesh: MeshId, transform: Mat4, tag: u8) {
        self.items.push(PickItem { mesh, transform, tag });
    }

    /// Draws `mesh` as background, blocking picks behind it.
    #[inline]
    pub fn push_occluder(&mut self, mesh: MeshId, transform: Mat4) {
        self.push(mesh, transform, 0);
    }

    #[inline]
    pub fn items(&self) -> &[PickItem] {
        &self.items
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_list_keeps_order_and_clears() {
        let mut d = DrawList::new();
        d.push(MeshId(1), Mat4::IDENTITY, Material::default());
        d.push(MeshId(0), Mat4::IDENTITY, Material::default());
        assert_eq!(d.items()[0].mesh, MeshId(1));
        assert_eq!(d.len(), 2);
        d.clear();
        assert!(d.is_empty());
    }

    #[test]
    fn occluders_use_background_tag() {
        let mut p = PickList::new();
        p.push(MeshId(0), Mat4::IDENTITY, 8);
        p.push_occluder(MeshId(1), Mat4::IDENTITY);
        assert_eq!(p.items()[0].tag, 8);
        assert_eq!(p.items()[1].tag, 0);
    }
}
