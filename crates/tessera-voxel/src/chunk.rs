//! Dense 16×16×16 voxel storage for a single chunk.
//!
//! Unlike palette storage, every cell holds its payload directly: chunks are
//! small and the mesher walks all 4096 cells on every rebuild anyway.

use crate::coords::{CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, LocalPos};
use crate::voxel::{Voxel, VoxelData};

/// A fixed-size cube of voxels identified by its chunk-grid coordinate.
///
/// Local accessors panic on coordinates outside `[0, 16)`: those are caller
/// bugs, not recoverable conditions.
#[derive(Clone, Debug)]
pub struct Chunk<V = Voxel> {
    coord: ChunkCoord,
    voxels: Box<[V]>,
}

impl<V: VoxelData> Chunk<V> {
    /// Creates a chunk at `coord` filled with air.
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            voxels: vec![V::EMPTY; CHUNK_VOLUME].into_boxed_slice(),
        }
    }

    /// Chunk-grid coordinate.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the voxel at `(x, y, z)`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is `>= 16`.
    pub fn get(&self, x: usize, y: usize, z: usize) -> V {
        self.voxels[Self::linear_index(x, y, z)]
    }

    /// Writes the voxel at `(x, y, z)` and returns the previous value.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is `>= 16`.
    pub fn set(&mut self, x: usize, y: usize, z: usize, voxel: V) -> V {
        let index = Self::linear_index(x, y, z);
        std::mem::replace(&mut self.voxels[index], voxel)
    }

    /// [`get`](Self::get) by [`LocalPos`].
    pub fn get_local(&self, local: LocalPos) -> V {
        self.get(local.x as usize, local.y as usize, local.z as usize)
    }

    /// [`set`](Self::set) by [`LocalPos`].
    pub fn set_local(&mut self, local: LocalPos, voxel: V) -> V {
        self.set(local.x as usize, local.y as usize, local.z as usize, voxel)
    }

    /// Number of valid (occupied) voxels.
    pub fn valid_count(&self) -> usize {
        self.voxels.iter().filter(|v| v.is_valid()).count()
    }

    /// Returns `true` if the chunk holds no valid voxels.
    pub fn is_empty(&self) -> bool {
        !self.voxels.iter().any(|v| v.is_valid())
    }

    /// Iterates valid voxels in linear-index order.
    pub fn iter_valid(&self) -> impl Iterator<Item = (LocalPos, V)> + '_ {
        self.voxels
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_valid())
            .map(|(i, v)| (LocalPos::from_index(i), *v))
    }

    /// Chunk-grid offsets of the chunks adjacent across whichever face(s)
    /// `local` touches.
    ///
    /// An interior position returns nothing. A position on one face returns one
    /// offset, on an edge two, on a corner three. With `include_corners` the
    /// diagonal edge/corner chunks between those faces are returned too
    /// (up to seven offsets for a corner cell).
    pub fn neighbor_offsets(local: LocalPos, include_corners: bool) -> Vec<(i32, i32, i32)> {
        let touch = |c: u8| -> i32 {
            if c == 0 {
                -1
            } else if c as usize == CHUNK_SIZE - 1 {
                1
            } else {
                0
            }
        };
        let (tx, ty, tz) = (touch(local.x), touch(local.y), touch(local.z));

        if !include_corners {
            let mut out = Vec::with_capacity(3);
            if tx != 0 {
                out.push((tx, 0, 0));
            }
            if ty != 0 {
                out.push((0, ty, 0));
            }
            if tz != 0 {
                out.push((0, 0, tz));
            }
            return out;
        }

        let steps = |t: i32| if t != 0 { vec![0, t] } else { vec![0] };
        let mut out = Vec::with_capacity(7);
        for &dx in &steps(tx) {
            for &dy in &steps(ty) {
                for &dz in &steps(tz) {
                    if (dx, dy, dz) != (0, 0, 0) {
                        out.push((dx, dy, dz));
                    }
                }
            }
        }
        out
    }

    fn linear_index(x: usize, y: usize, z: usize) -> usize {
        assert!(
            x < CHUNK_SIZE && y < CHUNK_SIZE && z < CHUNK_SIZE,
            "chunk-local coordinate out of range: ({x}, {y}, {z})"
        );
        x + y * CHUNK_SIZE + z * CHUNK_SIZE * CHUNK_SIZE
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Voxel = Voxel::new(255, 0, 0, 1);
    const BLUE: Voxel = Voxel::new(0, 0, 255, 2);

    fn chunk() -> Chunk {
        Chunk::new(ChunkCoord::new(0, 0, 0))
    }

    #[test]
    fn test_new_chunk_is_air() {
        let c = chunk();
        assert!(c.is_empty());
        assert_eq!(c.valid_count(), 0);
        assert_eq!(c.get(0, 0, 0), Voxel::EMPTY);
        assert_eq!(c.get(15, 15, 15), Voxel::EMPTY);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut c = chunk();
        let prev = c.set(5, 10, 15, RED);
        assert_eq!(prev, Voxel::EMPTY);
        assert_eq!(c.get(5, 10, 15), RED);
        assert_eq!(c.get(4, 10, 15), Voxel::EMPTY);
        assert_eq!(c.get(5, 11, 15), Voxel::EMPTY);
    }

    #[test]
    fn test_set_returns_previous() {
        let mut c = chunk();
        c.set(3, 3, 3, RED);
        assert_eq!(c.set(3, 3, 3, BLUE), RED);
        assert_eq!(c.set_local(LocalPos::new(3, 3, 3), Voxel::EMPTY), BLUE);
        assert!(c.is_empty());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        chunk().get(16, 0, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_out_of_range_panics() {
        chunk().set(0, 0, 16, RED);
    }

    #[test]
    fn test_iter_valid_lists_only_occupied() {
        let mut c = chunk();
        c.set(1, 0, 0, RED);
        c.set(0, 2, 0, BLUE);
        let valid: Vec<_> = c.iter_valid().collect();
        assert_eq!(valid, vec![(LocalPos::new(1, 0, 0), RED), (LocalPos::new(0, 2, 0), BLUE)]);
        assert_eq!(c.valid_count(), 2);
    }

    #[test]
    fn test_interior_has_no_neighbors() {
        assert!(Chunk::<Voxel>::neighbor_offsets(LocalPos::new(5, 5, 5), false).is_empty());
        assert!(Chunk::<Voxel>::neighbor_offsets(LocalPos::new(5, 5, 5), true).is_empty());
    }

    #[test]
    fn test_face_cell_has_one_neighbor() {
        let n = Chunk::<Voxel>::neighbor_offsets(LocalPos::new(15, 5, 5), false);
        assert_eq!(n, vec![(1, 0, 0)]);
        let n = Chunk::<Voxel>::neighbor_offsets(LocalPos::new(5, 0, 5), true);
        assert_eq!(n, vec![(0, -1, 0)]);
    }

    #[test]
    fn test_corner_cell_neighbors() {
        let faces = Chunk::<Voxel>::neighbor_offsets(LocalPos::new(0, 0, 0), false);
        assert_eq!(faces.len(), 3);
        assert!(faces.contains(&(-1, 0, 0)));
        assert!(faces.contains(&(0, -1, 0)));
        assert!(faces.contains(&(0, 0, -1)));

        let all = Chunk::<Voxel>::neighbor_offsets(LocalPos::new(15, 0, 15), true);
        assert_eq!(all.len(), 7);
        assert!(all.contains(&(1, -1, 1)));
        assert!(all.contains(&(1, 0, 1)));
    }
}
