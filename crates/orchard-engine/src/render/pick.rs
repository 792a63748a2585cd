//! Offscreen ID pass and single-pixel read-back for mouse picking.
//!
//! Each pickable mesh is drawn in a flat color whose red channel carries its
//! tag (`tag / 255` into a linear UNORM target, so the byte reads back
//! exactly). The cleared background is tag 0. The pass is never presented.
//!
//! Timing: the pass and the pixel copy are recorded into frame N's encoder;
//! [`PickReadback::begin_map`] is called after that frame is submitted and
//! [`PickReadback::poll`] yields the byte on a later frame.

use std::sync::mpsc;

use crate::device::DepthTarget;
use crate::render::mesh::{MeshStore, MeshVertex};
use crate::render::RenderCtx;
use crate::scene::{FrameState, PickList};

use super::common::{
    depth_state, draw_bind_group_layout, frame_bind_group_layout, primitive_state, DrawUniform,
    DrawUniforms, FrameBinding,
};

const SHADER_SRC: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/pick.wgsl")
);

/// ID target format; linear so tags are not sRGB-encoded.
pub const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// `copy_texture_to_buffer` requires rows padded to this many bytes.
const ROW_BYTES: u64 = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64;

/// Offscreen color + depth the ID pass renders into.
struct IdTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    depth: DepthTarget,
    size: (u32, u32),
}

impl IdTarget {
    fn new(device: &wgpu::Device, depth_format: wgpu::TextureFormat, size: (u32, u32)) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("orchard pick target"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: PICK_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = DepthTarget::new(device, depth_format, size.0, size.1, "orchard pick depth");

        Self {
            texture,
            view,
            depth,
            size,
        }
    }
}

/// Renders a [`PickList`] into the offscreen ID target.
#[derive(Default)]
pub struct PickRenderer {
    depth_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    draw_layout: Option<wgpu::BindGroupLayout>,
    frame_binding: Option<FrameBinding>,
    draws: Option<DrawUniforms>,

    target: Option<IdTarget>,
}

impl PickRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the ID target to tag 0 and draws `list` into it.
    ///
    /// The target follows the viewport size so pointer pixels map 1:1.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        encoder: &mut wgpu::CommandEncoder,
        frame: &FrameState,
        meshes: &MeshStore,
        list: &PickList,
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_target(ctx);

        let uniforms: Vec<DrawUniform> = list
            .items()
            .iter()
            .map(|item| DrawUniform::tagged(item.transform, item.tag))
            .collect();

        let (Some(draw_layout), Some(frame_binding), Some(draws)) = (
            self.draw_layout.as_ref(),
            self.frame_binding.as_ref(),
            self.draws.as_mut(),
        ) else {
            return;
        };
        frame_binding.write(ctx, frame);
        draws.upload(ctx, draw_layout, &uniforms);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(target) = self.target.as_ref() else { return };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("orchard pick pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth.view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(draw_group) = draws.bind_group() else { return };
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, frame_binding.bind_group(), &[]);

        for (i, item) in list.items().iter().enumerate() {
            let Some(mesh) = meshes.get(item.mesh) else { continue };
            rpass.set_bind_group(1, draw_group, &[draws.offset(i)]);
            mesh.draw(&mut rpass);
        }
    }

    /// Records a copy of pixel `(x, y)` into `readback`.
    ///
    /// Returns `false` when the pixel is outside the target, nothing has been
    /// rendered yet, or a previous read-back is still in flight.
    pub fn copy_pixel(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        readback: &mut PickReadback,
        x: u32,
        y: u32,
    ) -> bool {
        let Some(target) = self.target.as_ref() else { return false };
        if x >= target.size.0 || y >= target.size.1 {
            log::debug!("pick pixel ({x}, {y}) outside {:?}", target.size);
            return false;
        }
        readback.record_copy(encoder, &target.texture, x, y)
    }

    fn ensure_target(&mut self, ctx: &RenderCtx<'_>) {
        let size = ctx.viewport.extent();
        if self.target.as_ref().is_some_and(|t| t.size == size) {
            return;
        }
        log::debug!("pick target resized to {}x{}", size.0, size.1);
        self.target = Some(IdTarget::new(ctx.device, ctx.depth_format, size));
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.depth_format == Some(ctx.depth_format) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("orchard pick shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SRC.into()),
        });

        let frame_layout = frame_bind_group_layout(ctx.device, "orchard pick frame bgl");
        let draw_layout = draw_bind_group_layout(ctx.device, "orchard pick draw bgl");

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("orchard pick pipeline layout"),
                bind_group_layouts: &[&frame_layout, &draw_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("orchard pick pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: PICK_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(Some(wgpu::Face::Back)),
            depth_stencil: Some(depth_state(ctx.depth_format)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.depth_format = Some(ctx.depth_format);
        self.pipeline = Some(pipeline);
        self.frame_binding = Some(FrameBinding::new(ctx.device, &frame_layout, "orchard pick frame ubo"));
        self.draws = Some(DrawUniforms::new("orchard pick draw ubo"));
        self.draw_layout = Some(draw_layout);
        self.target = None;
    }
}

#[derive(Debug, PartialEq)]
enum ReadyState {
    Ready,
    Pending,
    Failed,
}

/// Click latch for the one read-back allowed in flight.
///
/// `Idle -> Copied` when the pixel copy is recorded, `Copied -> Mapping`
/// after submit, `Mapping -> Idle` when the sample is released. Clicks are
/// only accepted while `Idle`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PickLatch {
    #[default]
    Idle,
    /// Copy recorded; the frame has not been submitted yet.
    Copied,
    Mapping,
}

impl PickLatch {
    #[inline]
    pub fn is_busy(self) -> bool {
        self != PickLatch::Idle
    }

    /// Passes `click` through when no read-back is outstanding.
    pub fn try_begin(self, click: Option<(u32, u32)>) -> Option<(u32, u32)> {
        let pixel = click?;
        if self.is_busy() {
            log::debug!("click at {pixel:?} ignored: pick read-back in flight ({self:?})");
            return None;
        }
        Some(pixel)
    }

    /// `Idle -> Copied`. Returns `false` in any other state.
    pub fn copied(&mut self) -> bool {
        self.advance(PickLatch::Idle, PickLatch::Copied)
    }

    /// `Copied -> Mapping`. Returns `false` in any other state.
    pub fn mapped(&mut self) -> bool {
        self.advance(PickLatch::Copied, PickLatch::Mapping)
    }

    /// `Mapping -> Idle`, handing `sample` on. A failed map passes `None`.
    /// Outside `Mapping` nothing is released.
    pub fn finish(&mut self, sample: Option<u8>) -> Option<u8> {
        if self.advance(PickLatch::Mapping, PickLatch::Idle) {
            sample
        } else {
            None
        }
    }

    fn advance(&mut self, from: PickLatch, to: PickLatch) -> bool {
        if *self != from {
            return false;
        }
        *self = to;
        true
    }
}

/// One-pixel staging buffer with async map tracking.
pub struct PickReadback {
    buffer: wgpu::Buffer,
    latch: PickLatch,
    receiver: Option<mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>>,
}

impl PickReadback {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("orchard pick staging"),
                size: ROW_BYTES,
                usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            latch: PickLatch::Idle,
            receiver: None,
        }
    }

    /// Accepts `click` only while no read-back is in flight.
    #[inline]
    pub fn try_begin(&self, click: Option<(u32, u32)>) -> Option<(u32, u32)> {
        self.latch.try_begin(click)
    }

    fn record_copy(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        texture: &wgpu::Texture,
        x: u32,
        y: u32,
    ) -> bool {
        if !self.latch.copied() {
            return false;
        }
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(ROW_BYTES as u32),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        true
    }

    /// Starts mapping the staged pixel. Call after the frame that recorded
    /// the copy has been submitted; does nothing otherwise.
    pub fn begin_map(&mut self) {
        if !self.latch.mapped() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        self.buffer
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let _ = tx.send(result);
            });
        self.receiver = Some(rx);
    }

    /// Returns the red byte once the map completes.
    ///
    /// The device must be polled for the map callback to fire.
    pub fn poll(&mut self) -> Option<u8> {
        match self.check_ready() {
            ReadyState::Pending => None,
            ReadyState::Failed => {
                log::warn!("pick read-back failed; click ignored");
                self.buffer.unmap();
                self.receiver = None;
                self.latch.finish(None)
            }
            ReadyState::Ready => {
                let red = {
                    let data = self.buffer.slice(..).get_mapped_range();
                    decode_red(&data)
                };
                self.buffer.unmap();
                self.receiver = None;
                self.latch.finish(red)
            }
        }
    }

    fn check_ready(&self) -> ReadyState {
        let Some(rx) = self.receiver.as_ref() else {
            return ReadyState::Pending;
        };
        match rx.try_recv() {
            Ok(Ok(())) => ReadyState::Ready,
            Ok(Err(_)) | Err(mpsc::TryRecvError::Disconnected) => ReadyState::Failed,
            Err(mpsc::TryRecvError::Empty) => ReadyState::Pending,
        }
    }
}

/// ID-pass color for `tag`: red = `tag / 255`, opaque.
#[inline]
pub fn encode_tag(tag: u8) -> [f32; 4] {
    [tag as f32 / 255.0, 0.0, 0.0, 1.0]
}

/// Red channel of the first RGBA8 texel.
fn decode_red(texel: &[u8]) -> Option<u8> {
    texel.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_channel_is_first_byte() {
        assert_eq!(decode_red(&[12, 0, 0, 255]), Some(12));
        assert_eq!(decode_red(&[]), None);
    }

    #[test]
    fn tag_survives_unorm_quantization() {
        for tag in 0..=u8::MAX {
            let c = encode_tag(tag);
            assert_eq!((c[0] * 255.0).round() as u8, tag);
            assert_eq!(&c[1..], &[0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn staging_row_is_copy_aligned() {
        assert_eq!(ROW_BYTES, 256);
        assert!(ROW_BYTES >= 4);
    }

    #[test]
    fn idle_latch_accepts_a_click() {
        let latch = PickLatch::default();
        assert!(!latch.is_busy());
        assert_eq!(latch.try_begin(Some((3, 4))), Some((3, 4)));
        assert_eq!(latch.try_begin(None), None);
    }

    #[test]
    fn clicks_in_flight_are_dropped() {
        let mut latch = PickLatch::Idle;
        assert!(latch.copied());
        assert_eq!(latch.try_begin(Some((1, 1))), None);
        assert!(!latch.copied());

        assert!(latch.mapped());
        assert_eq!(latch, PickLatch::Mapping);
        assert_eq!(latch.try_begin(Some((1, 1))), None);
        assert!(!latch.mapped());
    }

    #[test]
    fn map_only_follows_a_copy() {
        let mut latch = PickLatch::Idle;
        assert!(!latch.mapped());
        assert_eq!(latch, PickLatch::Idle);
    }

    #[test]
    fn failed_map_returns_to_idle() {
        let mut latch = PickLatch::Mapping;
        assert_eq!(latch.finish(None), None);
        assert_eq!(latch, PickLatch::Idle);
        assert_eq!(latch.try_begin(Some((0, 0))), Some((0, 0)));
    }

    #[test]
    fn sample_is_released_once() {
        let mut latch = PickLatch::Idle;
        assert!(latch.copied());
        assert!(latch.mapped());
        assert_eq!(latch.finish(Some(8)), Some(8));
        assert_eq!(latch.finish(Some(8)), None);
        assert!(!latch.is_busy());
    }

    #[test]
    fn finish_before_map_releases_nothing() {
        let mut latch = PickLatch::Copied;
        assert_eq!(latch.finish(Some(8)), None);
        assert_eq!(latch, PickLatch::Copied);
    }
}
