//! GPU-side mesh geometry

use crate::GpuContext;
use bytemuck::{Pod, Zeroable};
use meshview_core::TriangleMesh;

/// Vertex layout shared by every built-in program
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Convert a triangle mesh into interleaved vertices and 32-bit indices
///
/// Missing normals are computed; missing texture coordinates become zero.
/// The `v` coordinate is flipped since image rows start at the top.
pub fn mesh_to_vertices(mesh: &TriangleMesh) -> (Vec<MeshVertex>, Vec<u32>) {
    let computed;
    let normals = match &mesh.normals {
        Some(normals) => normals,
        None => {
            let mut with_normals = mesh.clone();
            with_normals.compute_vertex_normals();
            computed = with_normals.normals.unwrap_or_default();
            &computed
        }
    };

    let vertices = mesh
        .vertices
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let normal = normals.get(i).map(|n| [n.x, n.y, n.z]).unwrap_or([0.0, 1.0, 0.0]);
            let uv = mesh
                .uvs
                .as_ref()
                .and_then(|uvs| uvs.get(i))
                .map(|[u, v]| [*u, 1.0 - *v])
                .unwrap_or([0.0, 0.0]);
            MeshVertex {
                position: [p.x, p.y, p.z],
                normal,
                uv,
            }
        })
        .collect();

    let indices = mesh
        .faces
        .iter()
        .flat_map(|f| [f[0] as u32, f[1] as u32, f[2] as u32])
        .collect();

    (vertices, indices)
}

/// Vertex and index buffers of one uploaded mesh
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    /// Upload `mesh`; returns `None` for a mesh without faces
    pub fn upload(ctx: &GpuContext, label: &str, mesh: &TriangleMesh) -> Option<Self> {
        let (vertices, indices) = mesh_to_vertices(mesh);
        if indices.is_empty() {
            return None;
        }

        Some(Self {
            vertex_buffer: ctx.create_buffer_init(&format!("{} Vertex Buffer", label), &vertices, wgpu::BufferUsages::VERTEX),
            index_buffer: ctx.create_buffer_init(&format!("{} Index Buffer", label), &indices, wgpu::BufferUsages::INDEX),
            index_count: indices.len() as u32,
        })
    }
}
