//! Owner of every allocated chunk in a volume, keyed by [`ChunkCoord`].
//!
//! Chunks are created lazily on the first valid write into their region and
//! are never removed; a snapshot load replaces the whole map instead.

use glam::IVec3;
use rustc_hash::FxHashMap;

use crate::chunk::Chunk;
use crate::coords::{ChunkCoord, LocalPos, chunk_to_world, world_to_chunk};
use crate::voxel::{Voxel, VoxelData};

/// Result of a write through [`VolumeMap::set_voxel`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WriteOutcome<V = Voxel> {
    /// Chunk that received the write.
    pub coord: ChunkCoord,
    /// Local position inside that chunk.
    pub local: LocalPos,
    /// Value the cell held before the write.
    pub previous: V,
    /// `true` if the chunk was allocated by this write.
    pub allocated: bool,
}

/// Sparse map of chunks. Lookup is O(1) via [`FxHashMap`].
#[derive(Clone, Debug)]
pub struct VolumeMap<V = Voxel> {
    chunks: FxHashMap<ChunkCoord, Chunk<V>>,
}

impl<V: VoxelData> VolumeMap<V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            chunks: FxHashMap::default(),
        }
    }

    /// Number of allocated chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if no chunk is allocated.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns `true` if a chunk exists at `coord`.
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<&Chunk<V>> {
        self.chunks.get(&coord)
    }

    pub fn get_chunk_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk<V>> {
        self.chunks.get_mut(&coord)
    }

    /// Returns the chunk at `coord`, allocating an empty one if needed.
    ///
    /// The second tuple element is `true` when the chunk was just created.
    pub fn chunk_or_insert(&mut self, coord: ChunkCoord) -> (&mut Chunk<V>, bool) {
        let mut allocated = false;
        let chunk = self.chunks.entry(coord).or_insert_with(|| {
            allocated = true;
            tracing::trace!(?coord, "allocated chunk");
            Chunk::new(coord)
        });
        (chunk, allocated)
    }

    /// Inserts a prebuilt chunk, replacing any chunk at the same coordinate.
    pub fn insert_chunk(&mut self, chunk: Chunk<V>) -> Option<Chunk<V>> {
        self.chunks.insert(chunk.coord(), chunk)
    }

    /// Iterates all `(coord, chunk)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &Chunk<V>)> {
        self.chunks.iter()
    }

    /// Iterates allocated chunk coordinates in arbitrary order.
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// Reads the voxel at a volume-space position. Unallocated space is air.
    pub fn get_voxel(&self, world: IVec3) -> V {
        let (coord, local) = world_to_chunk(world);
        self.chunks
            .get(&coord)
            .map_or(V::EMPTY, |chunk| chunk.get_local(local))
    }

    /// Locates the chunk for a write at `world`, allocating it when the write
    /// would store a valid voxel.
    ///
    /// Returns `None` when `voxel` is invalid and no chunk exists there: air
    /// written into unallocated space changes nothing.
    pub fn resolve_for_write(
        &mut self,
        world: IVec3,
        voxel: &V,
    ) -> Option<(&mut Chunk<V>, LocalPos, bool)> {
        let (coord, local) = world_to_chunk(world);
        if !voxel.is_valid() && !self.chunks.contains_key(&coord) {
            return None;
        }
        let (chunk, allocated) = self.chunk_or_insert(coord);
        Some((chunk, local, allocated))
    }

    /// Writes a voxel at a volume-space position.
    ///
    /// Returns `None` for the no-op case described on
    /// [`resolve_for_write`](Self::resolve_for_write).
    pub fn set_voxel(&mut self, world: IVec3, voxel: V) -> Option<WriteOutcome<V>> {
        let (chunk, local, allocated) = self.resolve_for_write(world, &voxel)?;
        let previous = chunk.set_local(local, voxel);
        Some(WriteOutcome {
            coord: chunk.coord(),
            local,
            previous,
            allocated,
        })
    }

    /// Allocated chunks adjacent to `coord` across the face(s) `local` touches.
    ///
    /// See [`Chunk::neighbor_offsets`] for what `include_corners` adds.
    pub fn neighbors(
        &self,
        coord: ChunkCoord,
        local: LocalPos,
        include_corners: bool,
    ) -> Vec<ChunkCoord> {
        Chunk::<V>::neighbor_offsets(local, include_corners)
            .into_iter()
            .map(|(dx, dy, dz)| coord.offset(dx, dy, dz))
            .filter(|c| self.chunks.contains_key(c))
            .collect()
    }

    /// Iterates every valid voxel as `(volume position, voxel)`.
    pub fn valid_voxels(&self) -> impl Iterator<Item = (IVec3, V)> + '_ {
        self.chunks.iter().flat_map(|(coord, chunk)| {
            let coord = *coord;
            chunk
                .iter_valid()
                .map(move |(local, v)| (chunk_to_world(coord, local), v))
        })
    }

    /// Total number of valid voxels across all chunks.
    pub fn valid_voxel_count(&self) -> usize {
        self.chunks.values().map(Chunk::valid_count).sum()
    }
}

impl<V: VoxelData> Default for VolumeMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Voxel = Voxel::new(255, 0, 0, 1);

    #[test]
    fn test_valid_write_allocates_chunk() {
        let mut map = VolumeMap::<Voxel>::new();
        let outcome = map.set_voxel(IVec3::new(-1, 0, 0), RED).expect("valid write");
        assert!(outcome.allocated);
        assert_eq!(outcome.coord, ChunkCoord::new(-1, 0, 0));
        assert_eq!(outcome.local, LocalPos::new(15, 0, 0));
        assert_eq!(outcome.previous, Voxel::EMPTY);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get_voxel(IVec3::new(-1, 0, 0)), RED);
    }

    #[test]
    fn test_air_into_unallocated_space_is_noop() {
        let mut map = VolumeMap::<Voxel>::new();
        assert!(map.set_voxel(IVec3::new(3, 3, 3), Voxel::EMPTY).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_air_into_allocated_chunk_keeps_chunk() {
        let mut map = VolumeMap::<Voxel>::new();
        map.set_voxel(IVec3::ZERO, RED);
        let outcome = map.set_voxel(IVec3::ZERO, Voxel::EMPTY).expect("chunk exists");
        assert!(!outcome.allocated);
        assert_eq!(outcome.previous, RED);
        assert_eq!(map.len(), 1);
        assert_eq!(map.valid_voxel_count(), 0);
    }

    #[test]
    fn test_neighbors_filters_unallocated() {
        let mut map = VolumeMap::<Voxel>::new();
        map.set_voxel(IVec3::ZERO, RED);
        map.set_voxel(IVec3::new(-1, 0, 0), RED);

        let origin = ChunkCoord::new(0, 0, 0);
        let n = map.neighbors(origin, LocalPos::new(0, 0, 0), false);
        assert_eq!(n, vec![ChunkCoord::new(-1, 0, 0)]);

        assert!(map.neighbors(origin, LocalPos::new(15, 5, 5), true).is_empty());
    }

    #[test]
    fn test_valid_voxels_reports_world_positions() {
        let mut map = VolumeMap::<Voxel>::new();
        map.set_voxel(IVec3::new(17, -2, 4), RED);
        map.set_voxel(IVec3::new(0, 0, 0), RED);
        let mut found: Vec<_> = map.valid_voxels().map(|(p, _)| p).collect();
        found.sort_by_key(|p| (p.x, p.y, p.z));
        assert_eq!(found, vec![IVec3::new(0, 0, 0), IVec3::new(17, -2, 4)]);
    }

    #[test]
    fn test_get_voxel_in_unallocated_space_is_air() {
        let map = VolumeMap::<Voxel>::new();
        assert_eq!(map.get_voxel(IVec3::new(100, -100, 5)), Voxel::EMPTY);
    }
}
