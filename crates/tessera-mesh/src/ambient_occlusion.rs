//! Per-vertex voxel ambient occlusion.
//!
//! Each visible face has 4 vertices; for each vertex, three neighboring cells
//! (two sides and one corner, all one step out along the face normal) are
//! checked and the occupied ones counted, giving a darkening value 0–3.

use tessera_voxel::VoxelData;

use crate::face_direction::FaceDirection;
use crate::neighborhood::ChunkNeighborhood;

/// Neighbor offsets for a single vertex's AO calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAoOffsets {
    /// Offset to the first side neighbor (relative to the voxel position).
    pub side1: (i32, i32, i32),
    /// Offset to the second side neighbor.
    pub side2: (i32, i32, i32),
    /// Offset to the diagonal corner neighbor.
    pub corner: (i32, i32, i32),
}

const fn ao(
    side1: (i32, i32, i32),
    side2: (i32, i32, i32),
    corner: (i32, i32, i32),
) -> VertexAoOffsets {
    VertexAoOffsets {
        side1,
        side2,
        corner,
    }
}

/// AO sample offsets per face id, one entry per quad vertex in the order of
/// [`FaceDirection::corners`].
const AO_OFFSETS: [[VertexAoOffsets; 4]; 6] = [
    // PosX: tangents (y, z)
    [
        ao((1, -1, 0), (1, 0, -1), (1, -1, -1)),
        ao((1, 1, 0), (1, 0, -1), (1, 1, -1)),
        ao((1, 1, 0), (1, 0, 1), (1, 1, 1)),
        ao((1, -1, 0), (1, 0, 1), (1, -1, 1)),
    ],
    // NegX
    [
        ao((-1, -1, 0), (-1, 0, -1), (-1, -1, -1)),
        ao((-1, -1, 0), (-1, 0, 1), (-1, -1, 1)),
        ao((-1, 1, 0), (-1, 0, 1), (-1, 1, 1)),
        ao((-1, 1, 0), (-1, 0, -1), (-1, 1, -1)),
    ],
    // PosY: tangents (x, z)
    [
        ao((-1, 1, 0), (0, 1, -1), (-1, 1, -1)),
        ao((-1, 1, 0), (0, 1, 1), (-1, 1, 1)),
        ao((1, 1, 0), (0, 1, 1), (1, 1, 1)),
        ao((1, 1, 0), (0, 1, -1), (1, 1, -1)),
    ],
    // NegY
    [
        ao((-1, -1, 0), (0, -1, -1), (-1, -1, -1)),
        ao((1, -1, 0), (0, -1, -1), (1, -1, -1)),
        ao((1, -1, 0), (0, -1, 1), (1, -1, 1)),
        ao((-1, -1, 0), (0, -1, 1), (-1, -1, 1)),
    ],
    // PosZ: tangents (x, y)
    [
        ao((-1, 0, 1), (0, -1, 1), (-1, -1, 1)),
        ao((1, 0, 1), (0, -1, 1), (1, -1, 1)),
        ao((1, 0, 1), (0, 1, 1), (1, 1, 1)),
        ao((-1, 0, 1), (0, 1, 1), (-1, 1, 1)),
    ],
    // NegZ
    [
        ao((-1, 0, -1), (0, -1, -1), (-1, -1, -1)),
        ao((-1, 0, -1), (0, 1, -1), (-1, 1, -1)),
        ao((1, 0, -1), (0, 1, -1), (1, 1, -1)),
        ao((1, 0, -1), (0, -1, -1), (1, -1, -1)),
    ],
];

/// Returns the 4 sets of AO neighbor offsets for the vertices of a face.
pub fn face_ao_offsets(direction: FaceDirection) -> [VertexAoOffsets; 4] {
    AO_OFFSETS[direction.index()]
}

/// Number of occupied samples among the three, `0..=3`.
pub fn vertex_ao(side1: bool, side2: bool, corner: bool) -> u8 {
    side1 as u8 + side2 as u8 + corner as u8
}

/// Whether to triangulate a quad along its other diagonal so interpolation
/// follows the darker pair of vertices.
pub fn should_flip_ao_diagonal(ao: [u8; 4]) -> bool {
    ao[0] + ao[2] > ao[1] + ao[3]
}

/// AO value for vertex `vertex` (0–3) of `face` on the voxel at `(x, y, z)`.
pub fn sample_ao<V: VoxelData>(
    neighborhood: &ChunkNeighborhood<V>,
    x: i32,
    y: i32,
    z: i32,
    face: FaceDirection,
    vertex: usize,
) -> u8 {
    let offsets = AO_OFFSETS[face.index()][vertex];
    let present = |(dx, dy, dz): (i32, i32, i32)| neighborhood.get(x + dx, y + dy, z + dz).is_valid();
    vertex_ao(
        present(offsets.side1),
        present(offsets.side2),
        present(offsets.corner),
    )
}

/// AO values for all four vertices of `face` on the voxel at `(x, y, z)`.
pub fn compute_face_ao<V: VoxelData>(
    neighborhood: &ChunkNeighborhood<V>,
    x: i32,
    y: i32,
    z: i32,
    face: FaceDirection,
) -> [u8; 4] {
    std::array::from_fn(|vertex| sample_ao(neighborhood, x, y, z, face, vertex))
}
