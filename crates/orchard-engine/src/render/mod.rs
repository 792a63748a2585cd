//! GPU rendering subsystem.
//!
//! Renderers consume `scene` draw streams and issue GPU commands via wgpu.
//! Each renderer is responsible for its own GPU resources (pipelines, buffers).
//!
//! Convention:
//! - Geometry is in world units; `FrameState` carries view and projection.
//! - Bind group 0 is the frame block, group 1 the per-draw block at a dynamic
//!   offset, group 2 (sky only) the texture.
//! - Passes load the color and depth the frame clear produced.

mod common;
mod ctx;
mod lit;
pub mod mesh;
mod pick;
mod sky;
pub mod texture;

pub use ctx::{RenderCtx, RenderTarget};
pub use lit::MeshRenderer;
pub use mesh::{GpuMesh, MeshData, MeshStore, MeshVertex};
pub use pick::{encode_tag, PickLatch, PickReadback, PickRenderer, PICK_FORMAT};
pub use sky::{sky_material, sky_transform, SkyRenderer, SKY_PERIOD, SKY_RADIUS, SKY_UV_SCALE};
pub use texture::Texture;
