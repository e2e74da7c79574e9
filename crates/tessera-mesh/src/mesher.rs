//! Face-culling mesher with baked per-vertex ambient occlusion.
//!
//! Every valid voxel of the center chunk emits one quad per face whose
//! neighbor cell is not opaque. Neighbor cells across the chunk boundary are
//! read from the [`ChunkNeighborhood`], so seams between chunks are culled
//! exactly like interior faces.

use tessera_voxel::{Opacity, VoxelData};

use crate::ambient_occlusion::{compute_face_ao, should_flip_ao_diagonal};
use crate::chunk_mesh::{ChunkMesh, IndexMode};
use crate::face_direction::FaceDirection;
use crate::neighborhood::ChunkNeighborhood;
use crate::vertex::MeshVertexFormat;

/// Options shared by every meshing pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshOptions {
    pub index_mode: IndexMode,
    /// When `false` every vertex gets AO 0 and quads are never flipped.
    pub ambient_occlusion: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            index_mode: IndexMode::default(),
            ambient_occlusion: true,
        }
    }
}

/// Builds the mesh for the center chunk of `neighborhood`.
///
/// A chunk without valid voxels yields an empty mesh, which callers publish
/// to replace stale geometry.
pub fn mesh_chunk<V, T, O>(
    neighborhood: &ChunkNeighborhood<V>,
    opacity: &O,
    options: &MeshOptions,
) -> ChunkMesh<T>
where
    V: VoxelData,
    T: MeshVertexFormat<V>,
    O: Opacity<V> + ?Sized,
{
    let mut mesh = ChunkMesh::new(options.index_mode);

    for (local, voxel) in neighborhood.center().iter_valid() {
        let (x, y, z) = (local.x as i32, local.y as i32, local.z as i32);

        for face in FaceDirection::ALL {
            let (nx, ny, nz) = face.offset(x, y, z);
            if opacity.is_opaque(&neighborhood.get(nx, ny, nz)) {
                continue;
            }

            let ao = if options.ambient_occlusion {
                compute_face_ao(neighborhood, x, y, z, face)
            } else {
                [0; 4]
            };
            let corners = face.corners();
            let verts: [T; 4] = std::array::from_fn(|i| {
                let c = corners[i];
                let position = [local.x + c[0], local.y + c[1], local.z + c[2]];
                T::from_face_corner(position, face, ao[i], &voxel)
            });
            mesh.push_quad(face, verts, should_flip_ao_diagonal(ao));
        }
    }

    mesh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
