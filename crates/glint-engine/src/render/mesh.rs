//! CPU-side geometry: vertex format, indexed meshes and their sanity checks.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Scalar/vector shape of a single vertex attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AttributeFormat {
    Float32,
    Float32x2,
    Float32x3,
    Float32x4,
}

/// Position + colour vertex shared by every demo.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }

    /// `(shader location, format)` for every attribute, in buffer order.
    pub const ATTRIBUTES: [(u32, AttributeFormat); 2] = [
        (0, AttributeFormat::Float32x3),
        (1, AttributeFormat::Float32x3),
    ];

    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // color
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Sets every vertex to `color`, keeping positions.
    pub fn fill_color(&mut self, color: [f32; 3]) {
        for v in &mut self.vertices {
            v.color = color;
        }
    }

    /// True when every index addresses an existing vertex.
    pub fn indices_in_bounds(&self) -> bool {
        let n = self.vertices.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// Triangle corner positions, in index order.
    ///
    /// A trailing partial triangle and out-of-range indices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            let p = |i: u16| self.vertices.get(i as usize).map(|v| Vec3::from(v.position));
            Some([p(tri[0])?, p(tri[1])?, p(tri[2])?])
        })
    }

    /// True when every triangle is counter-clockwise seen from outside a closed
    /// solid centred at `center`, i.e. its right-handed normal points away from
    /// the centre. This is what back-face culling with a CCW front face needs.
    pub fn winding_is_outward(&self, center: Vec3) -> bool {
        self.indices.len() % 3 == 0
            && self.triangles().all(|[a, b, c]| {
                let normal = (b - a).cross(c - a);
                let centroid = (a + b + c) / 3.0;
                normal.dot(centroid - center) > 0.0
            })
    }

    /// True when every triangle is counter-clockwise seen from `toward`
    /// (its normal has a positive component along `toward`).
    pub fn winding_faces(&self, toward: Vec3) -> bool {
        self.indices.len() % 3 == 0
            && self
                .triangles()
                .all(|[a, b, c]| (b - a).cross(c - a).dot(toward) > 0.0)
    }
}
