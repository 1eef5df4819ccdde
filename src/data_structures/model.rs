//! CPU-side mesh data and vertex layouts.

use std::ops::Range;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Indexed triangle list ready for upload.
///
/// `groups` splits the index range into material groups: group `i` is drawn
/// with the node's `i`-th material. Primitives produce a single group covering
/// every index.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    pub groups: Vec<Range<u32>>,
}

impl MeshData {
    pub fn new(vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        let groups = vec![0..indices.len() as u32];
        Self {
            vertices,
            indices,
            groups,
        }
    }

    pub fn num_elements(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Number of materials a node using this mesh has to own.
    pub fn material_slots(&self) -> usize {
        self.groups.len().max(1)
    }
}
