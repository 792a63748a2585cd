//! Scene (draw stream) types.
//!
//! Renderer-agnostic records of what to draw this frame: lit meshes, ID-pass
//! meshes, and the camera/light state they share.

mod frame;
mod list;
mod material;

pub use frame::{FrameState, FrameUniform, Light, MAX_LIGHTS};
pub use list::{DrawItem, DrawList, PickItem, PickList};
pub use material::{Material, Shading};

/// Handle to a mesh uploaded to a [`MeshStore`](crate::render::MeshStore).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);
