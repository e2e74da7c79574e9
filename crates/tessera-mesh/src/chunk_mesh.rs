//! Per-chunk vertex buffer produced by the mesher.

use crate::face_direction::FaceDirection;

/// How quads are laid out in a [`ChunkMesh`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexMode {
    /// 4 vertices and 6 indices per quad.
    Indexed,
    /// 6 vertices per quad (two independent triangles), no index buffer.
    #[default]
    Triangles,
}

/// Metadata for a single emitted quad, used for statistics and tests.
#[derive(Clone, Copy, Debug)]
pub struct QuadInfo {
    /// Which face direction this quad belongs to.
    pub direction: FaceDirection,
}

/// The mesh output of a chunk meshing pass.
///
/// `indices` is `Some` exactly when the mesh was built in
/// [`IndexMode::Indexed`].
#[derive(Clone, Debug)]
pub struct ChunkMesh<T> {
    pub vertices: Vec<T>,
    pub indices: Option<Vec<u32>>,
    /// One entry per emitted quad.
    pub quads: Vec<QuadInfo>,
}

/// Triangulation of a quad's 4 corners along the `0-2` diagonal.
const QUAD_TRIANGLES: [usize; 6] = [0, 1, 2, 0, 2, 3];
/// Triangulation along the `1-3` diagonal. Same winding.
const QUAD_TRIANGLES_FLIPPED: [usize; 6] = [1, 2, 3, 1, 3, 0];

impl<T: Copy> ChunkMesh<T> {
    /// Creates an empty mesh for the given layout.
    pub fn new(mode: IndexMode) -> Self {
        Self {
            vertices: Vec::new(),
            indices: match mode {
                IndexMode::Indexed => Some(Vec::new()),
                IndexMode::Triangles => None,
            },
            quads: Vec::new(),
        }
    }

    pub fn index_mode(&self) -> IndexMode {
        if self.indices.is_some() {
            IndexMode::Indexed
        } else {
            IndexMode::Triangles
        }
    }

    /// Adds a quad whose corners are wound counter-clockwise from outside.
    ///
    /// If `flip` is true the quad is split along its other diagonal (used for
    /// AO-aware triangulation).
    pub fn push_quad(&mut self, direction: FaceDirection, verts: [T; 4], flip: bool) {
        let order = if flip {
            &QUAD_TRIANGLES_FLIPPED
        } else {
            &QUAD_TRIANGLES
        };
        match &mut self.indices {
            Some(indices) => {
                let base = self.vertices.len() as u32;
                self.vertices.extend_from_slice(&verts);
                indices.extend(order.iter().map(|&i| base + i as u32));
            }
            None => {
                self.vertices.extend(order.iter().map(|&i| verts[i]));
            }
        }
        self.quads.push(QuadInfo { direction });
    }

    /// Returns `true` if the mesh contains no geometry.
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Returns the total number of quads in the mesh.
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Counts the number of quads emitted for a specific face direction.
    pub fn count_quads_for_direction(&self, direction: FaceDirection) -> usize {
        self.quads
            .iter()
            .filter(|q| q.direction == direction)
            .count()
    }

    pub fn triangle_count(&self) -> usize {
        self.quads.len() * 2
    }
}

impl<T: bytemuck::Pod> ChunkMesh<T> {
    /// Vertex data as a byte slice for GPU upload (zero-copy).
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as a byte slice, empty in [`IndexMode::Triangles`].
    pub fn index_bytes(&self) -> &[u8] {
        self.indices
            .as_deref()
            .map_or(&[][..], bytemuck::cast_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mesh() {
        let mesh: ChunkMesh<u32> = ChunkMesh::new(IndexMode::Indexed);
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertices.len(), 0);
        assert_eq!(mesh.indices.as_ref().map(Vec::len), Some(0));
        assert_eq!(mesh.quad_count(), 0);
    }

    #[test]
    fn test_indexed_quad_shares_vertices() {
        let mut mesh = ChunkMesh::new(IndexMode::Indexed);
        mesh.push_quad(FaceDirection::PosY, [10u32, 11, 12, 13], false);
        mesh.push_quad(FaceDirection::PosY, [20u32, 21, 22, 23], false);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(
            mesh.indices.as_deref(),
            Some(&[0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7][..])
        );
        assert_eq!(mesh.index_mode(), IndexMode::Indexed);
    }

    #[test]
    fn test_triangle_mode_duplicates_vertices() {
        let mut mesh = ChunkMesh::new(IndexMode::Triangles);
        mesh.push_quad(FaceDirection::NegX, [0u32, 1, 2, 3], false);
        assert!(mesh.indices.is_none());
        assert_eq!(mesh.vertices, vec![0, 1, 2, 0, 2, 3]);
        assert!(mesh.index_bytes().is_empty());
    }

    #[test]
    fn test_flipped_quad_uses_other_diagonal() {
        let mut mesh = ChunkMesh::new(IndexMode::Triangles);
        mesh.push_quad(FaceDirection::PosZ, [0u32, 1, 2, 3], true);
        assert_eq!(mesh.vertices, vec![1, 2, 3, 1, 3, 0]);

        let mut indexed = ChunkMesh::new(IndexMode::Indexed);
        indexed.push_quad(FaceDirection::PosZ, [0u32, 1, 2, 3], true);
        assert_eq!(indexed.indices, Some(vec![1, 2, 3, 1, 3, 0]));
    }

    #[test]
    fn test_count_quads_by_direction() {
        let mut mesh = ChunkMesh::new(IndexMode::Indexed);
        mesh.push_quad(FaceDirection::PosY, [0u32; 4], false);
        mesh.push_quad(FaceDirection::PosY, [0u32; 4], false);
        mesh.push_quad(FaceDirection::NegY, [0u32; 4], false);
        assert_eq!(mesh.count_quads_for_direction(FaceDirection::PosY), 2);
        assert_eq!(mesh.count_quads_for_direction(FaceDirection::NegY), 1);
        assert_eq!(mesh.count_quads_for_direction(FaceDirection::PosX), 0);
        assert_eq!(mesh.triangle_count(), 6);
        assert_eq!(mesh.vertex_bytes().len(), 12 * 4);
        assert_eq!(mesh.index_bytes().len(), 18 * 4);
    }
}
