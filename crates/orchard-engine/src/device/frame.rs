/// A single acquired swapchain frame.
///
/// Holding the surface texture blocks acquisition of the next frame, so
/// finish it promptly with [`Gpu::submit`](super::Gpu::submit).
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
