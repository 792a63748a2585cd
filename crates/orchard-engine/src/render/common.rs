//! Shared GPU types and utilities used by the mesh renderers.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::render::RenderCtx;
use crate::scene::{FrameState, FrameUniform, Material};

// ── Per-draw uniform ──────────────────────────────────────────────────────

/// Per-draw uniform block (`DrawUniforms` in the WGSL sources).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DrawUniform {
    pub model: [[f32; 4]; 4],
    pub squared_scale: [f32; 4],
    pub color: [f32; 4],
    /// ambient, diffusivity, specularity, smoothness
    pub params: [f32; 4],
}

impl DrawUniform {
    pub(super) fn lit(model: Mat4, material: &Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            squared_scale: squared_scale(model).extend(1.0).to_array(),
            color: material.color.to_array(),
            params: material.params(),
        }
    }

    /// Flat tag color for the ID pass, see [`encode_tag`](super::pick::encode_tag).
    pub(super) fn tagged(model: Mat4, tag: u8) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            squared_scale: [1.0; 4],
            color: super::pick::encode_tag(tag),
            params: [0.0; 4],
        }
    }
}

/// Squared length of each model axis.
///
/// Dividing an object-space normal by this before applying the model's 3x3
/// part gives the inverse-transpose result for non-uniform scales.
pub(crate) fn squared_scale(model: Mat4) -> Vec3 {
    Vec3::new(
        model.x_axis.truncate().length_squared(),
        model.y_axis.truncate().length_squared(),
        model.z_axis.truncate().length_squared(),
    )
    .max(Vec3::splat(f32::MIN_POSITIVE))
}

// ── Binding sizes / layouts ───────────────────────────────────────────────

fn min_binding_size<T>() -> NonZeroU64 {
    NonZeroU64::new(std::mem::size_of::<T>() as u64)
        .expect("uniform blocks are never zero-sized")
}

pub(super) fn frame_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(min_binding_size::<FrameUniform>()),
            },
            count: None,
        }],
    })
}

pub(super) fn draw_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: Some(min_binding_size::<DrawUniform>()),
            },
            count: None,
        }],
    })
}

pub(super) fn depth_state(format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

pub(super) fn primitive_state(cull_mode: Option<wgpu::Face>) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

/// Rounds `size` up to a multiple of `align` (a power of two).
pub(crate) fn align_up(size: u64, align: u64) -> u64 {
    let align = align.max(1);
    size.div_ceil(align) * align
}

// ── Frame uniform binding ─────────────────────────────────────────────────

/// Frame UBO and its bind group (group 0).
pub(super) struct FrameBinding {
    ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl FrameBinding {
    pub(super) fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });
        Self { ubo, bind_group }
    }

    pub(super) fn write(&self, ctx: &RenderCtx<'_>, frame: &FrameState) {
        ctx.queue
            .write_buffer(&self.ubo, 0, bytemuck::bytes_of(&frame.uniform()));
    }

    #[inline]
    pub(super) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

// ── Per-draw uniform arena ────────────────────────────────────────────────

/// Growable UBO holding one [`DrawUniform`] per draw, addressed by dynamic
/// offset (group 1).
pub(super) struct DrawUniforms {
    label: &'static str,
    ubo: Option<wgpu::Buffer>,
    bind_group: Option<wgpu::BindGroup>,
    capacity: usize,
    stride: u64,
}

impl DrawUniforms {
    pub(super) fn new(label: &'static str) -> Self {
        Self {
            label,
            ubo: None,
            bind_group: None,
            capacity: 0,
            stride: 0,
        }
    }

    /// Writes `draws` to the GPU, growing the buffer when needed.
    pub(super) fn upload(
        &mut self,
        ctx: &RenderCtx<'_>,
        layout: &wgpu::BindGroupLayout,
        draws: &[DrawUniform],
    ) {
        if draws.is_empty() {
            return;
        }
        self.ensure_capacity(ctx, layout, draws.len());
        let Some(ubo) = self.ubo.as_ref() else { return };

        let stride = self.stride as usize;
        let mut bytes = vec![0u8; stride * draws.len()];
        for (i, d) in draws.iter().enumerate() {
            let raw = bytemuck::bytes_of(d);
            bytes[i * stride..i * stride + raw.len()].copy_from_slice(raw);
        }
        ctx.queue.write_buffer(ubo, 0, &bytes);
    }

    #[inline]
    pub(super) fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    /// Dynamic offset of draw `index`.
    #[inline]
    pub(super) fn offset(&self, index: usize) -> u32 {
        (self.stride * index as u64) as u32
    }

    fn ensure_capacity(
        &mut self,
        ctx: &RenderCtx<'_>,
        layout: &wgpu::BindGroupLayout,
        required: usize,
    ) {
        if required <= self.capacity && self.ubo.is_some() && self.bind_group.is_some() {
            return;
        }

        let align = ctx.device.limits().min_uniform_buffer_offset_alignment as u64;
        self.stride = align_up(std::mem::size_of::<DrawUniform>() as u64, align);

        let new_cap = required.next_power_of_two().max(16);
        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(self.label),
            size: self.stride * new_cap as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: Some(min_binding_size::<DrawUniform>()),
                }),
            }],
        });

        log::debug!("{}: {} draw slots of {} bytes", self.label, new_cap, self.stride);
        self.ubo = Some(ubo);
        self.bind_group = Some(bind_group);
        self.capacity = new_cap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_scale_reads_axis_lengths() {
        let m = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))
            * Mat4::from_rotation_y(0.7)
            * Mat4::from_scale(Vec3::new(2.0, 3.0, 0.5));
        let s = squared_scale(m);
        assert!((s - Vec3::new(4.0, 9.0, 0.25)).length() < 1e-4);
    }

    #[test]
    fn degenerate_scale_stays_positive() {
        let s = squared_scale(Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0)));
        assert!(s.x > 0.0);
    }

    #[test]
    fn align_up_rounds_to_multiple() {
        assert_eq!(align_up(112, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 256), 512);
        assert_eq!(align_up(5, 0), 5);
    }

    #[test]
    fn uniform_blocks_are_16_aligned() {
        assert_eq!(std::mem::size_of::<DrawUniform>(), 112);
        assert_eq!(std::mem::size_of::<DrawUniform>() % 16, 0);
    }

    #[test]
    fn tag_color_is_exact_unorm() {
        let d = DrawUniform::tagged(Mat4::IDENTITY, 12);
        assert_eq!((d.color[0] * 255.0).round() as u8, 12);
        assert_eq!(d.color[3], 1.0);
    }
}
