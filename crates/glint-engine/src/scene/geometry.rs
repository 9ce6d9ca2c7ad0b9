use crate::render::mesh::{Mesh, Vertex};

/// Face colours of the cube, in face order: top, left, right, front, back, bottom.
pub const DEFAULT_FACE_COLORS: [[f32; 3]; 6] = [
    [0.5, 0.5, 0.5],
    [0.75, 0.25, 0.5],
    [0.25, 0.25, 0.75],
    [1.0, 0.0, 0.15],
    [0.0, 1.0, 0.15],
    [0.5, 0.5, 1.0],
];

/// Corner signs per face, four corners each. Face order matches `DEFAULT_FACE_COLORS`.
const CUBE_CORNERS: [[[f32; 3]; 4]; 6] = [
    // top
    [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]],
    // left
    [[-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0]],
    // right
    [[1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0]],
    // front
    [[1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0]],
    // back
    [[1.0, 1.0, -1.0], [1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0]],
    // bottom
    [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0]],
];

/// Counter-clockwise when seen from outside the cube.
const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 0, 2, 3, // top
    5, 4, 6, 6, 4, 7, // left
    8, 9, 10, 8, 10, 11, // right
    13, 12, 14, 15, 14, 12, // front
    16, 17, 18, 16, 18, 19, // back
    21, 20, 22, 22, 20, 23, // bottom
];

/// Axis-aligned cube centred on the origin with one flat colour per face.
///
/// 24 vertices (four per face, so faces do not share colours) and 36 `u16`
/// indices. `half_extent` is the distance from the centre to each face.
pub fn cube_mesh(half_extent: f32, face_colors: [[f32; 3]; 6]) -> Mesh {
    let vertices = CUBE_CORNERS
        .iter()
        .zip(face_colors.iter())
        .flat_map(|(corners, color)| {
            corners.iter().map(move |c| {
                Vertex::new(
                    [c[0] * half_extent, c[1] * half_extent, c[2] * half_extent],
                    *color,
                )
            })
        })
        .collect();

    Mesh::new(vertices, CUBE_INDICES.to_vec())
}

/// The flat "triangle" demo shape: a square built from two triangles with a
/// red/yellow gradient across the diagonal.
pub fn triangle_mesh() -> Mesh {
    const RED: [f32; 3] = [1.0, 0.0, 0.0];
    const YELLOW: [f32; 3] = [1.0, 1.0, 0.0];

    let vertices = vec![
        Vertex::new([-0.5, 0.5, 0.0], RED),
        Vertex::new([-0.5, -0.5, 0.0], RED),
        Vertex::new([0.5, -0.5, 0.0], YELLOW),
        Vertex::new([-0.5, 0.5, 0.0], RED),
        Vertex::new([0.5, -0.5, 0.0], YELLOW),
        Vertex::new([0.5, 0.5, 0.0], YELLOW),
    ];
    let indices = (0..vertices.len() as u16).collect();
    Mesh::new(vertices, indices)
}

/// Regular hexagon with one rainbow colour per corner.
pub fn hexagon_mesh() -> Mesh {
    let vertices = vec![
        Vertex::new([0.0, 0.5, 0.0], [1.0, 0.0, 0.0]),
        Vertex::new([-0.43, 0.25, 0.0], [1.0, 1.0, 0.0]),
        Vertex::new([-0.43, -0.25, 0.0], [0.0, 1.0, 0.0]),
        Vertex::new([0.0, -0.5, 0.0], [0.0, 1.0, 1.0]),
        Vertex::new([0.43, -0.25, 0.0], [0.0, 0.0, 1.0]),
        Vertex::new([0.43, 0.25, 0.0], [1.0, 0.0, 1.0]),
    ];
    let indices = fan_indices(vertices.len() as u16);
    Mesh::new(vertices, indices)
}

/// Triangle-fan order expanded into a triangle list around vertex 0.
fn fan_indices(vertex_count: u16) -> Vec<u16> {
    (1..vertex_count.saturating_sub(1))
        .flat_map(|i| [0, i, i + 1])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    // ── cube ──────────────────────────────────────────────────────────────

    #[test]
    fn cube_has_four_vertices_per_face() {
        let m = cube_mesh(1.0, DEFAULT_FACE_COLORS);
        assert_eq!(m.vertices.len(), 24);
        assert_eq!(m.indices.len(), 36);
        assert_eq!(m.index_count(), 36);
    }

    #[test]
    fn cube_indices_stay_below_vertex_count() {
        let m = cube_mesh(1.0, DEFAULT_FACE_COLORS);
        assert!(m.indices_in_bounds());
        assert!(m.indices.iter().all(|&i| i < 24));
    }

    #[test]
    fn cube_triangles_wind_outward() {
        let m = cube_mesh(1.0, DEFAULT_FACE_COLORS);
        assert!(m.winding_is_outward(Vec3::ZERO));
    }

    #[test]
    fn cube_faces_are_flat_coloured() {
        let m = cube_mesh(1.0, DEFAULT_FACE_COLORS);
        for (face, chunk) in m.vertices.chunks(4).enumerate() {
            assert!(chunk.iter().all(|v| v.color == DEFAULT_FACE_COLORS[face]));
        }
    }

    #[test]
    fn half_extent_scales_positions() {
        let m = cube_mesh(2.5, DEFAULT_FACE_COLORS);
        for v in &m.vertices {
            assert!(v.position.iter().all(|c| c.abs() == 2.5));
        }
        assert!(m.winding_is_outward(Vec3::ZERO));
    }

    // ── flat shapes ───────────────────────────────────────────────────────

    #[test]
    fn triangle_demo_is_two_triangles_facing_viewer() {
        let m = triangle_mesh();
        assert_eq!(m.vertices.len(), 6);
        assert_eq!(m.indices, vec![0, 1, 2, 3, 4, 5]);
        assert!(m.winding_faces(Vec3::Z));
    }

    #[test]
    fn hexagon_is_fan_triangulated() {
        let m = hexagon_mesh();
        assert_eq!(m.vertices.len(), 6);
        assert_eq!(m.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 5]);
        assert!(m.indices_in_bounds());
        assert!(m.winding_faces(Vec3::Z));
    }

    #[test]
    fn fan_of_degenerate_sizes_is_empty() {
        assert!(fan_indices(0).is_empty());
        assert!(fan_indices(2).is_empty());
        assert_eq!(fan_indices(3), vec![0, 1, 2]);
    }
}
