//! Texture opacity lookup used by face culling.
//!
//! The texture atlas itself lives with the renderer; the volume only needs to
//! know whether a texture id blocks visibility. Unknown ids are treated as
//! not opaque so a missing entry never hides geometry.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::voxel::{Voxel, VoxelData};

/// Decides whether a voxel hides the faces of its neighbours.
pub trait Opacity<V>: Send + Sync {
    fn is_opaque(&self, voxel: &V) -> bool;
}

/// Treats every valid voxel as opaque.
#[derive(Clone, Copy, Debug, Default)]
pub struct SolidOpacity;

impl<V: VoxelData> Opacity<V> for SolidOpacity {
    fn is_opaque(&self, voxel: &V) -> bool {
        voxel.is_valid()
    }
}

/// Atlas metadata for one texture id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureInfo {
    /// Whether the texture fully blocks visibility.
    pub opaque: bool,
}

/// Maps texture id to [`TextureInfo`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TextureAtlas {
    textures: FxHashMap<u16, TextureInfo>,
}

impl TextureAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the entry for `texture`.
    pub fn register(&mut self, texture: u16, info: TextureInfo) {
        self.textures.insert(texture, info);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, texture: u16, opaque: bool) -> Self {
        self.register(texture, TextureInfo { opaque });
        self
    }

    pub fn get(&self, texture: u16) -> Option<&TextureInfo> {
        self.textures.get(&texture)
    }

    /// Returns `true` if `texture` is registered as opaque. Unknown ids are
    /// not opaque.
    pub fn texture_is_opaque(&self, texture: u16) -> bool {
        self.get(texture).is_some_and(|t| t.opaque)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl Opacity<Voxel> for TextureAtlas {
    fn is_opaque(&self, voxel: &Voxel) -> bool {
        voxel.is_valid() && self.texture_is_opaque(voxel.texture)
    }
}
