use std::f32::consts::TAU;

use glam::{Mat4, Vec3};

use crate::paint::Color;
use crate::render::mesh::{GpuMesh, MeshVertex};
use crate::render::texture::Texture;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{FrameState, Material};

use super::common::{
    depth_state, draw_bind_group_layout, frame_bind_group_layout, primitive_state, DrawUniform,
    DrawUniforms, FrameBinding,
};

const SHADER_SRC: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/sky.wgsl")
);

/// Radius of the dome around the origin.
pub const SKY_RADIUS: f32 = 200.0;
/// Seconds per full turn about +Y.
pub const SKY_PERIOD: f32 = 120.0;
/// Texture repeats across the dome's UV range.
pub const SKY_UV_SCALE: f32 = 4.0;

/// Dome transform at scene time `t` (seconds).
pub fn sky_transform(t: f32) -> Mat4 {
    let angle = (t / SKY_PERIOD).fract() * TAU;
    Mat4::from_rotation_y(angle) * Mat4::from_scale(Vec3::splat(SKY_RADIUS))
}

/// White base under the texture, mostly ambient so the dome reads the same
/// from every side.
pub fn sky_material() -> Material {
    Material::phong(Color::WHITE)
        .with_ambient(0.5)
        .with_diffusivity(0.1)
        .with_specularity(0.1)
}

/// Textured dome renderer.
///
/// The camera sits inside the sphere, so faces are not culled.
#[derive(Default)]
pub struct SkyRenderer {
    pipeline_formats: Option<(wgpu::TextureFormat, wgpu::TextureFormat)>,
    pipeline: Option<wgpu::RenderPipeline>,

    draw_layout: Option<wgpu::BindGroupLayout>,
    texture_layout: Option<wgpu::BindGroupLayout>,
    frame_binding: Option<FrameBinding>,
    draws: Option<DrawUniforms>,

    texture: Option<Texture>,
    texture_bind_group: Option<wgpu::BindGroup>,
}

impl SkyRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the dome texture.
    pub fn set_texture(&mut self, texture: Texture) {
        self.texture = Some(texture);
        self.texture_bind_group = None;
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &FrameState,
        mesh: &GpuMesh,
        transform: Mat4,
        material: &Material,
    ) {
        self.ensure_pipeline(ctx);
        self.ensure_texture_binding(ctx);

        let (Some(draw_layout), Some(frame_binding), Some(draws)) = (
            self.draw_layout.as_ref(),
            self.frame_binding.as_ref(),
            self.draws.as_mut(),
        ) else {
            return;
        };
        frame_binding.write(ctx, frame);
        draws.upload(ctx, draw_layout, &[DrawUniform::lit(transform, material)]);

        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(draw_group) = draws.bind_group() else { return };
        let Some(texture_group) = self.texture_bind_group.as_ref() else { return };

        let mut rpass = target.begin_load_pass("orchard sky pass");
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, frame_binding.bind_group(), &[]);
        rpass.set_bind_group(1, draw_group, &[draws.offset(0)]);
        rpass.set_bind_group(2, texture_group, &[]);
        mesh.draw(&mut rpass);
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let formats = (ctx.surface_format, ctx.depth_format);
        if self.pipeline_formats == Some(formats) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("orchard sky shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SRC.into()),
        });

        let frame_layout = frame_bind_group_layout(ctx.device, "orchard sky frame bgl");
        let draw_layout = draw_bind_group_layout(ctx.device, "orchard sky draw bgl");
        let texture_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("orchard sky texture bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("orchard sky pipeline layout"),
                bind_group_layouts: &[&frame_layout, &draw_layout, &texture_layout],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("orchard sky pipeline"),
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
                    format: ctx.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: primitive_state(None),
            depth_stencil: Some(depth_state(ctx.depth_format)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_formats = Some(formats);
        self.pipeline = Some(pipeline);
        self.frame_binding = Some(FrameBinding::new(ctx.device, &frame_layout, "orchard sky frame ubo"));
        self.draws = Some(DrawUniforms::new("orchard sky draw ubo"));
        self.draw_layout = Some(draw_layout);
        self.texture_layout = Some(texture_layout);
        self.texture_bind_group = None;
    }

    fn ensure_texture_binding(&mut self, ctx: &RenderCtx<'_>) {
        if self.texture_bind_group.is_some() {
            return;
        }
        let Some(layout) = self.texture_layout.as_ref() else { return };
        if self.texture.is_none() {
            log::warn!("SkyRenderer: no texture set; using a 1x1 fallback");
            let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([128, 128, 128, 255]));
            self.texture = Some(Texture::from_image(ctx.device, ctx.queue, &img, "orchard sky fallback"));
        }
        let Some(texture) = self.texture.as_ref() else { return };

        self.texture_bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orchard sky texture bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dome_turns_once_per_period() {
        let p = Vec3::new(1.0, 0.0, 0.0);
        let start = sky_transform(0.0).transform_point3(p);
        let quarter = sky_transform(SKY_PERIOD / 4.0).transform_point3(p);
        let full = sky_transform(SKY_PERIOD).transform_point3(p);

        assert!((start - Vec3::new(SKY_RADIUS, 0.0, 0.0)).length() < 1e-3);
        assert!((quarter - Vec3::new(0.0, 0.0, -SKY_RADIUS)).length() < 1e-2);
        assert!((full - start).length() < 1e-2);
    }

    #[test]
    fn sky_material_is_mostly_ambient() {
        let m = sky_material();
        assert_eq!(m.params(), [0.5, 0.1, 0.1, 40.0]);
        assert_eq!(m.color, Color::WHITE);
    }
}
