use crate::render::mesh::{MeshStore, MeshVertex};
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DrawList, FrameState, Shading};

use super::common::{
    depth_state, draw_bind_group_layout, frame_bind_group_layout, primitive_state, DrawUniform,
    DrawUniforms, FrameBinding,
};

const SHADER_SRC: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/lit.wgsl")
);

/// Lit mesh renderer.
///
/// Draws every [`DrawList`] item with the pipeline its material selects
/// (per-vertex Gouraud or per-fragment Phong), depth tested against the
/// frame's depth buffer. Colors are linear; the sRGB surface encodes them.
#[derive(Default)]
pub struct MeshRenderer {
    pipeline_formats: Option<(wgpu::TextureFormat, wgpu::TextureFormat)>,
    gouraud: Option<wgpu::RenderPipeline>,
    phong: Option<wgpu::RenderPipeline>,

    draw_layout: Option<wgpu::BindGroupLayout>,
    frame_binding: Option<FrameBinding>,
    draws: Option<DrawUniforms>,

    warned_missing_mesh: bool,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `list` into `target` on top of what it already holds.
    ///
    /// Items whose mesh is not in `meshes` are skipped (one-time warning).
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        frame: &FrameState,
        meshes: &MeshStore,
        list: &DrawList,
    ) {
        if list.is_empty() {
            return;
        }
        self.ensure_pipelines(ctx);

        let uniforms: Vec<DrawUniform> = list
            .items()
            .iter()
            .map(|item| DrawUniform::lit(item.transform, &item.material))
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

        let Some(gouraud) = self.gouraud.as_ref() else { return };
        let Some(phong) = self.phong.as_ref() else { return };
        let Some(draw_group) = draws.bind_group() else { return };

        let mut rpass = target.begin_load_pass("orchard lit pass");
        rpass.set_bind_group(0, frame_binding.bind_group(), &[]);

        let mut bound: Option<Shading> = None;
        for (i, item) in list.items().iter().enumerate() {
            let Some(mesh) = meshes.get(item.mesh) else {
                if !self.warned_missing_mesh {
                    log::warn!("MeshRenderer: {:?} is not uploaded; skipped", item.mesh);
                    self.warned_missing_mesh = true;
                }
                continue;
            };

            if bound != Some(item.material.shading) {
                rpass.set_pipeline(match item.material.shading {
                    Shading::Gouraud => gouraud,
                    Shading::Phong => phong,
                });
                bound = Some(item.material.shading);
            }
            rpass.set_bind_group(1, draw_group, &[draws.offset(i)]);
            mesh.draw(&mut rpass);
        }
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        let formats = (ctx.surface_format, ctx.depth_format);
        if self.pipeline_formats == Some(formats) && self.gouraud.is_some() && self.phong.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("orchard lit shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SRC.into()),
        });

        let frame_layout = frame_bind_group_layout(ctx.device, "orchard lit frame bgl");
        let draw_layout = draw_bind_group_layout(ctx.device, "orchard lit draw bgl");

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("orchard lit pipeline layout"),
                bind_group_layouts: &[&frame_layout, &draw_layout],
                immediate_size: 0,
            });

        let build = |label: &str, vs: &str, fs: &str| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(vs),
                    compilation_options: Default::default(),
                    buffers: &[MeshVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.surface_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: primitive_state(Some(wgpu::Face::Back)),
                depth_stencil: Some(depth_state(ctx.depth_format)),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        self.gouraud = Some(build("orchard gouraud pipeline", "vs_gouraud", "fs_gouraud"));
        self.phong = Some(build("orchard phong pipeline", "vs_phong", "fs_phong"));
        self.pipeline_formats = Some(formats);

        self.frame_binding = Some(FrameBinding::new(
            ctx.device,
            &frame_layout,
            "orchard lit frame ubo",
        ));
        self.draws = Some(DrawUniforms::new("orchard lit draw ubo"));
        self.draw_layout = Some(draw_layout);
    }
}
