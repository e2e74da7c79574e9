//! Chunk and chunk-local coordinates, and conversion from volume space.

use glam::IVec3;
use serde::{Deserialize, Serialize};

/// Side length of a chunk in voxels.
pub const CHUNK_SIZE: usize = 16;

/// [`CHUNK_SIZE`] as a signed integer for coordinate math.
pub const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;

/// Total number of voxels in a chunk (16³).
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Identifies a chunk's position in the chunk grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub x: i32,
    /// Chunk-grid Y coordinate.
    pub y: i32,
    /// Chunk-grid Z coordinate.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinate of the chunk offset by `(dx, dy, dz)`.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// Volume-space position of this chunk's local `(0, 0, 0)` cell.
    pub fn origin(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * CHUNK_SIZE_I32
    }
}

/// A cell position inside a chunk, each axis in `[0, 16)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LocalPos {
    /// Local X.
    pub x: u8,
    /// Local Y.
    pub y: u8,
    /// Local Z.
    pub z: u8,
}

impl LocalPos {
    /// Creates a local position. Does not validate the range.
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Returns `true` if every axis is within `[0, 16)`.
    pub fn in_bounds(self) -> bool {
        (self.x as usize) < CHUNK_SIZE && (self.y as usize) < CHUNK_SIZE && (self.z as usize) < CHUNK_SIZE
    }

    /// Linear index into a chunk's voxel array (x varies fastest).
    pub fn index(self) -> usize {
        self.x as usize + self.y as usize * CHUNK_SIZE + self.z as usize * CHUNK_SIZE * CHUNK_SIZE
    }

    /// Inverse of [`index`](Self::index).
    pub fn from_index(index: usize) -> Self {
        debug_assert!(index < CHUNK_VOLUME);
        Self {
            x: (index % CHUNK_SIZE) as u8,
            y: ((index / CHUNK_SIZE) % CHUNK_SIZE) as u8,
            z: (index / (CHUNK_SIZE * CHUNK_SIZE)) as u8,
        }
    }

    /// Returns `true` if the position lies on any face of the chunk.
    pub fn on_boundary(self) -> bool {
        let max = (CHUNK_SIZE - 1) as u8;
        self.x == 0 || self.y == 0 || self.z == 0 || self.x == max || self.y == max || self.z == max
    }
}

/// Splits a volume-space position into its chunk and chunk-local position.
///
/// Uses floor division, so `-1` lands in chunk `-1` at local `15`.
pub fn world_to_chunk(world: IVec3) -> (ChunkCoord, LocalPos) {
    let coord = ChunkCoord::new(
        world.x.div_euclid(CHUNK_SIZE_I32),
        world.y.div_euclid(CHUNK_SIZE_I32),
        world.z.div_euclid(CHUNK_SIZE_I32),
    );
    let local = LocalPos::new(
        world.x.rem_euclid(CHUNK_SIZE_I32) as u8,
        world.y.rem_euclid(CHUNK_SIZE_I32) as u8,
        world.z.rem_euclid(CHUNK_SIZE_I32) as u8,
    );
    (coord, local)
}

/// Inverse of [`world_to_chunk`].
pub fn chunk_to_world(coord: ChunkCoord, local: LocalPos) -> IVec3 {
    coord.origin() + IVec3::new(local.x as i32, local.y as i32, local.z as i32)
}
