//! CPU-side stand-in for GPU buffer uploads.

use map_loader::MeshUpload;
use serde::Serialize;
use terrain_mesh::{TerrainMesh, WindMesh, PRIMITIVE_RESTART};

/// Uploaded vertex/index buffers, little-endian encoded.
#[derive(Debug, Clone)]
pub struct CpuBuffers {
    pub stats: BufferStats,
    pub vertex_bytes: Vec<u8>,
    pub index_bytes: Vec<u8>,
}

/// Shape of an uploaded buffer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    /// `triangle_strip`, `triangle_list` or `line_strip`
    pub primitive: &'static str,
    pub vertex_count: usize,
    pub vertex_stride: usize,
    pub index_count: usize,
    /// Primitive restart markers in the index buffer
    pub restarts: usize,
}

/// Uploader that keeps the encoded buffers in memory.
#[derive(Debug, Default)]
pub struct CpuUploader {
    /// Total bytes uploaded so far
    pub uploaded_bytes: usize,
}

impl CpuUploader {
    fn upload<V: bytemuck::Pod>(
        &mut self,
        primitive: &'static str,
        vertices: &[V],
        indices: &[u32],
    ) -> CpuBuffers {
        let vertex_bytes: Vec<u8> = bytemuck::cast_slice::<V, f32>(vertices)
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let index_bytes: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        self.uploaded_bytes += vertex_bytes.len() + index_bytes.len();

        CpuBuffers {
            stats: BufferStats {
                primitive,
                vertex_count: vertices.len(),
                vertex_stride: std::mem::size_of::<V>(),
                index_count: indices.len(),
                restarts: indices.iter().filter(|&&i| i == PRIMITIVE_RESTART).count(),
            },
            vertex_bytes,
            index_bytes,
        }
    }
}

impl MeshUpload for CpuUploader {
    type Handle = CpuBuffers;

    fn upload_terrain(&mut self, mesh: &TerrainMesh) -> CpuBuffers {
        let primitive = match mesh.topology {
            terrain_mesh::MeshTopology::TriangleStrip => "triangle_strip",
            terrain_mesh::MeshTopology::TriangleList => "triangle_list",
        };
        self.upload(primitive, &mesh.vertices, &mesh.indices)
    }

    fn upload_wind(&mut self, mesh: &WindMesh) -> CpuBuffers {
        self.upload("line_strip", &mesh.vertices, &mesh.indices)
    }
}
