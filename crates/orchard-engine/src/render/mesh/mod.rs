//! Mesh geometry and GPU mesh storage.

mod geometry;
mod vertex;

pub use geometry::{cone, cube, prism, subdivision_sphere, MeshData};
pub use vertex::MeshVertex;

use wgpu::util::DeviceExt;

use crate::scene::MeshId;

/// Index/vertex buffers of one uploaded mesh.
pub struct GpuMesh {
    pub vbo: wgpu::Buffer,
    pub ibo: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    /// Binds the buffers to `pass` and issues one indexed draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vbo.slice(..));
        pass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Uploaded meshes addressed by [`MeshId`].
///
/// Meshes are uploaded once at scene construction and live for the store's
/// lifetime.
#[derive(Default)]
pub struct MeshStore {
    meshes: Vec<GpuMesh>,
}

impl MeshStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&mut self, device: &wgpu::Device, label: &str, data: &MeshData) -> MeshId {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vbo")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} ibo")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let id = MeshId(self.meshes.len() as u32);
        log::debug!(
            "uploaded mesh {label} as {id:?}: {} vertices, {} triangles",
            data.vertices.len(),
            data.triangle_count()
        );
        self.meshes.push(GpuMesh {
            vbo,
            ibo,
            index_count: data.indices.len() as u32,
        });
        id
    }

    #[inline]
    pub fn get(&self, id: MeshId) -> Option<&GpuMesh> {
        self.meshes.get(id.0 as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
