//! Per-chunk dirty set drained by the update tick.

use rustc_hash::FxHashMap;

use crate::coords::ChunkCoord;

/// Chunks touched since the last flush.
///
/// The flag is `true` when some voxel in the chunk flipped between air and
/// occupied (a structural change) and `false` for colour/texture-only edits
/// or seam refreshes. Repeated records for the same chunk OR the flag.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    dirty: FxHashMap<ChunkCoord, bool>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `coord` dirty, OR-ing `structural` into any existing flag.
    pub fn record(&mut self, coord: ChunkCoord, structural: bool) {
        *self.dirty.entry(coord).or_insert(false) |= structural;
    }

    /// Current flag for `coord`, or `None` if it is clean.
    pub fn get(&self, coord: ChunkCoord) -> Option<bool> {
        self.dirty.get(&coord).copied()
    }

    pub fn len(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    /// Swaps the dirty set for an empty one and returns the old contents.
    pub fn take(&mut self) -> FxHashMap<ChunkCoord, bool> {
        std::mem::take(&mut self.dirty)
    }

    pub fn clear(&mut self) {
        self.dirty.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_twice_is_idempotent() {
        let mut t = ChangeTracker::new();
        let c = ChunkCoord::new(0, 0, 0);
        t.record(c, true);
        t.record(c, true);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(c), Some(true));
    }

    #[test]
    fn test_flags_or_together() {
        let mut t = ChangeTracker::new();
        let c = ChunkCoord::new(1, 2, 3);
        t.record(c, false);
        assert_eq!(t.get(c), Some(false));
        t.record(c, true);
        assert_eq!(t.get(c), Some(true));
        t.record(c, false);
        assert_eq!(t.get(c), Some(true));
    }

    #[test]
    fn test_take_empties_tracker() {
        let mut t = ChangeTracker::new();
        t.record(ChunkCoord::new(0, 0, 0), false);
        t.record(ChunkCoord::new(1, 0, 0), true);
        let drained = t.take();
        assert_eq!(drained.len(), 2);
        assert!(t.is_empty());
        assert_eq!(t.get(ChunkCoord::new(1, 0, 0)), None);
    }
}
