//! Voxel payloads.
//!
//! Storage, neighbour lookups and meshing are generic over [`VoxelData`]; the
//! only thing they need to know about a cell is whether it is occupied.
//! [`Voxel`] is the concrete colour + texture payload replicated over the wire.

use serde::{Deserialize, Serialize};

/// Payload stored in every chunk cell.
pub trait VoxelData: Copy + PartialEq + Send + Sync + 'static {
    /// The air value that fills freshly allocated chunks.
    const EMPTY: Self;

    /// Returns `true` if the cell is occupied.
    fn is_valid(&self) -> bool;
}

/// Texture ids at or above this value mark an empty (air) voxel.
pub const TEXTURE_SENTINEL: u16 = u16::MAX;

/// A coloured, textured voxel (5 bytes of payload).
///
/// A voxel is valid when its texture id is below [`TEXTURE_SENTINEL`]. Invalid
/// voxels are air: they are never meshed and never written to snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voxel {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Texture atlas id.
    pub texture: u16,
}

impl Voxel {
    /// Air.
    pub const EMPTY: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        texture: TEXTURE_SENTINEL,
    };

    /// Creates a voxel with the given colour and texture id.
    pub const fn new(r: u8, g: u8, b: u8, texture: u16) -> Self {
        Self { r, g, b, texture }
    }

    /// Returns the colour as `[r, g, b]`.
    pub const fn color(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Returns `true` if the voxel carries an in-range texture id.
    pub const fn is_valid(self) -> bool {
        self.texture < TEXTURE_SENTINEL
    }
}

impl Default for Voxel {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl VoxelData for Voxel {
    const EMPTY: Self = Voxel::EMPTY;

    fn is_valid(&self) -> bool {
        Voxel::is_valid(*self)
    }
}
