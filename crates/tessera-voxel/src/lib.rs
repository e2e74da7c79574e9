//! Chunked voxel storage: voxel payloads, 16³ chunks, the chunk map, change
//! tracking, texture opacity lookup, and the compressed volume snapshot format.

pub mod atlas;
pub mod change_tracker;
pub mod chunk;
pub mod compression;
pub mod coords;
pub mod snapshot;
pub mod volume_map;
pub mod voxel;

pub use atlas::{Opacity, SolidOpacity, TextureAtlas, TextureInfo};
pub use change_tracker::ChangeTracker;
pub use chunk::Chunk;
pub use compression::{BEST_COMPRESSION, CompressionError, compress, decompress};
pub use coords::{
    CHUNK_SIZE, CHUNK_SIZE_I32, CHUNK_VOLUME, ChunkCoord, LocalPos, chunk_to_world, world_to_chunk,
};
pub use snapshot::{SnapshotError, deserialize, serialize, serialize_with_level};
pub use volume_map::{VolumeMap, WriteOutcome};
pub use voxel::{TEXTURE_SENTINEL, Voxel, VoxelData};
