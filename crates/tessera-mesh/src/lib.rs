//! Meshing: face culling with baked ambient occlusion, neighborhood
//! snapshots, vertex formats, and the background meshing pipeline.

pub mod ambient_occlusion;
pub mod async_mesh;
pub mod chunk_mesh;
pub mod face_direction;
pub mod mesher;
pub mod neighborhood;
pub mod vertex;

pub use ambient_occlusion::{
    VertexAoOffsets, compute_face_ao, face_ao_offsets, sample_ao, should_flip_ao_diagonal,
    vertex_ao,
};
pub use async_mesh::{MeshingPipeline, MeshingResult, MeshingTask};
pub use chunk_mesh::{ChunkMesh, IndexMode, QuadInfo};
pub use face_direction::{CornerDirection, EdgeDirection, FaceDirection};
pub use mesher::{MeshOptions, mesh_chunk};
pub use neighborhood::{
    ChunkBoundaryEdge, ChunkBoundarySlice, ChunkNeighborhood, extract_boundary_slice,
};
pub use vertex::{MeshVertexFormat, VolumeVertex};
