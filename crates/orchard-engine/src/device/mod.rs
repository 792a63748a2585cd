//! GPU device, surface and depth buffer management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue, configures the swapchain,
//! keeps a depth buffer matching it, and hands out per-frame encoders.

mod context;
mod depth;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use depth::DepthTarget;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
