//! Whole-volume snapshot used to replicate a volume to a joining participant.
//!
//! ## Binary Layout (after inflating, little-endian)
//!
//! | Size | Field |
//! |------|-------|
//! | 4 | Chunk count (`i32`) |
//! | 12 | Per chunk: coordinate `x`, `y`, `z` (`i32` each) |
//! | 2 | Per chunk: voxel count (`u16`) |
//! | 8 | Per voxel: local `x`, `y`, `z` (`u8` each), `r`, `g`, `b`, texture (`u16`) |
//!
//! Only valid voxels are recorded, so an allocated but empty chunk is written
//! with a voxel count of zero. The whole buffer is raw-deflate compressed.

use std::time::Instant;

use crate::compression::{self, BEST_COMPRESSION, CompressionError};
use crate::coords::{CHUNK_SIZE, ChunkCoord, LocalPos};
use crate::volume_map::VolumeMap;
use crate::voxel::Voxel;

/// Bytes per voxel record.
const VOXEL_RECORD_LEN: usize = 8;

/// Bytes per chunk header (coordinate + voxel count).
const CHUNK_HEADER_LEN: usize = 14;

/// Errors that can occur while building or reading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot compression failed")]
    Compress(#[source] CompressionError),
    #[error("snapshot decompression failed")]
    Decompress(#[source] CompressionError),
    /// The inflated buffer ended before a field could be read.
    #[error("snapshot truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Byte count needed to read the field.
        expected: usize,
        /// Actual byte count of the buffer.
        actual: usize,
    },
    #[error("negative chunk count: {0}")]
    InvalidChunkCount(i32),
    /// A voxel record's local coordinate is outside `[0, 16)`.
    #[error("local coordinate out of range in chunk {coord:?}: ({x}, {y}, {z})")]
    LocalOutOfRange {
        coord: ChunkCoord,
        x: u8,
        y: u8,
        z: u8,
    },
}

/// Serializes every allocated chunk at the highest compression level.
pub fn serialize(map: &VolumeMap<Voxel>) -> Result<Vec<u8>, SnapshotError> {
    serialize_with_level(map, BEST_COMPRESSION)
}

/// Serializes every allocated chunk, deflating at `level`.
///
/// Chunks are written in coordinate order so identical volumes produce
/// identical bytes. Each chunk's records are buffered and counted before the
/// header is emitted; the output is produced in one forward pass.
pub fn serialize_with_level(map: &VolumeMap<Voxel>, level: u32) -> Result<Vec<u8>, SnapshotError> {
    let start = Instant::now();

    let mut coords: Vec<ChunkCoord> = map.coords().collect();
    coords.sort_unstable();

    let mut buf = Vec::with_capacity(4 + coords.len() * CHUNK_HEADER_LEN);
    buf.extend_from_slice(&(coords.len() as i32).to_le_bytes());

    let mut records = Vec::new();
    for coord in coords {
        let Some(chunk) = map.get_chunk(coord) else {
            continue;
        };
        records.clear();
        let mut count: u16 = 0;
        for (local, voxel) in chunk.iter_valid() {
            records.extend_from_slice(&[local.x, local.y, local.z, voxel.r, voxel.g, voxel.b]);
            records.extend_from_slice(&voxel.texture.to_le_bytes());
            count += 1;
        }

        buf.extend_from_slice(&coord.x.to_le_bytes());
        buf.extend_from_slice(&coord.y.to_le_bytes());
        buf.extend_from_slice(&coord.z.to_le_bytes());
        buf.extend_from_slice(&count.to_le_bytes());
        buf.extend_from_slice(&records);
    }

    let raw_len = buf.len();
    let packed = compression::compress(&buf, level).map_err(SnapshotError::Compress)?;
    tracing::info!(
        chunks = map.len(),
        raw_bytes = raw_len,
        compressed_bytes = packed.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "serialized volume snapshot"
    );
    Ok(packed)
}

/// Rebuilds a volume from a snapshot produced by [`serialize`].
///
/// The result is a fresh map; nothing is written into any live volume, so a
/// failed read leaves the caller's state untouched. Empty input yields an
/// empty map.
pub fn deserialize(data: &[u8]) -> Result<VolumeMap<Voxel>, SnapshotError> {
    let start = Instant::now();
    let raw = compression::decompress(data).map_err(SnapshotError::Decompress)?;
    let mut map = VolumeMap::new();
    if raw.is_empty() {
        return Ok(map);
    }

    let mut reader = ByteReader::new(&raw);
    let chunk_count = reader.read_i32()?;
    if chunk_count < 0 {
        return Err(SnapshotError::InvalidChunkCount(chunk_count));
    }

    for _ in 0..chunk_count {
        let coord = ChunkCoord::new(reader.read_i32()?, reader.read_i32()?, reader.read_i32()?);
        let voxel_count = reader.read_u16()? as usize;
        reader.ensure(voxel_count * VOXEL_RECORD_LEN)?;

        let (chunk, _) = map.chunk_or_insert(coord);
        for _ in 0..voxel_count {
            let (x, y, z) = (reader.read_u8()?, reader.read_u8()?, reader.read_u8()?);
            let (r, g, b) = (reader.read_u8()?, reader.read_u8()?, reader.read_u8()?);
            let texture = reader.read_u16()?;

            let local = LocalPos::new(x, y, z);
            if !local.in_bounds() {
                return Err(SnapshotError::LocalOutOfRange { coord, x, y, z });
            }
            chunk.set_local(local, Voxel::new(r, g, b, texture));
        }
    }

    if reader.remaining() > 0 {
        tracing::debug!(trailing = reader.remaining(), "ignoring trailing snapshot bytes");
    }
    tracing::info!(
        chunks = map.len(),
        compressed_bytes = data.len(),
        raw_bytes = raw.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "deserialized volume snapshot"
    );
    Ok(map)
}

/// Forward-only little-endian cursor over the inflated buffer.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn ensure(&self, len: usize) -> Result<(), SnapshotError> {
        if self.remaining() < len {
            return Err(SnapshotError::Truncated {
                expected: self.pos + len,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], SnapshotError> {
        self.ensure(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, SnapshotError> {
        Ok(self.take::<1>()?[0])
    }

    fn read_u16(&mut self) -> Result<u16, SnapshotError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn read_i32(&mut self) -> Result<i32, SnapshotError> {
        Ok(i32::from_le_bytes(self.take()?))
    }
}

const _: () = assert!(CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE <= u16::MAX as usize);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use glam::IVec3;

    use super::*;

    fn voxel_set(map: &VolumeMap<Voxel>) -> BTreeSet<(i32, i32, i32, [u8; 3], u16)> {
        map.valid_voxels()
            .map(|(p, v)| (p.x, p.y, p.z, v.color(), v.texture))
            .collect()
    }

    fn sample_map() -> VolumeMap<Voxel> {
        let mut map = VolumeMap::new();
        map.set_voxel(IVec3::new(0, 0, 0), Voxel::new(255, 0, 0, 1));
        map.set_voxel(IVec3::new(15, 15, 15), Voxel::new(0, 255, 0, 2));
        map.set_voxel(IVec3::new(-1, -17, 40), Voxel::new(1, 2, 3, 500));
        map
    }

    #[test]
    fn test_roundtrip_preserves_valid_voxels() {
        let map = sample_map();
        let bytes = serialize(&map).expect("serialize");
        let restored = deserialize(&bytes).expect("deserialize");
        assert_eq!(restored.len(), map.len());
        assert_eq!(voxel_set(&restored), voxel_set(&map));
    }

    #[test]
    fn test_empty_chunk_still_appears_with_zero_count() {
        let mut map = VolumeMap::new();
        map.set_voxel(IVec3::new(4, 4, 4), Voxel::new(9, 9, 9, 3));
        map.set_voxel(IVec3::new(4, 4, 4), Voxel::EMPTY);

        let bytes = serialize(&map).expect("serialize");
        let raw = compression::decompress(&bytes).expect("inflate");
        assert_eq!(raw.len(), 4 + CHUNK_HEADER_LEN);
        assert_eq!(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]), 1);
        assert_eq!(u16::from_le_bytes([raw[16], raw[17]]), 0);

        let restored = deserialize(&bytes).expect("deserialize");
        assert!(restored.contains(ChunkCoord::new(0, 0, 0)));
        assert_eq!(restored.valid_voxel_count(), 0);
    }

    #[test]
    fn test_raw_layout_of_single_voxel() {
        let mut map = VolumeMap::new();
        map.set_voxel(IVec3::new(-15, 2, 3), Voxel::new(10, 20, 30, 0x0102));
        let raw = compression::decompress(&serialize(&map).expect("serialize")).expect("inflate");

        let mut expected = Vec::new();
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(&(-1i32).to_le_bytes());
        expected.extend_from_slice(&0i32.to_le_bytes());
        expected.extend_from_slice(&0i32.to_le_bytes());
        expected.extend_from_slice(&1u16.to_le_bytes());
        expected.extend_from_slice(&[1, 2, 3, 10, 20, 30, 0x02, 0x01]);
        assert_eq!(raw, expected);
    }

    #[test]
    fn test_identical_volumes_serialize_identically() {
        let a = serialize(&sample_map()).expect("serialize");
        let b = serialize(&sample_map()).expect("serialize");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        let map = deserialize(&[]).expect("empty input is valid");
        assert!(map.is_empty());
    }

    #[test]
    fn test_truncated_snapshot_is_rejected() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&2i32.to_le_bytes());
        raw.extend_from_slice(&0i32.to_le_bytes());
        let packed = compression::compress(&raw, BEST_COMPRESSION).expect("compress");
        assert!(matches!(deserialize(&packed), Err(SnapshotError::Truncated { .. })));
    }

    #[test]
    fn test_out_of_range_local_is_rejected() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&1i32.to_le_bytes());
        raw.extend_from_slice(&[0u8; 12]);
        raw.extend_from_slice(&1u16.to_le_bytes());
        raw.extend_from_slice(&[16, 0, 0, 1, 1, 1, 0, 0]);
        let packed = compression::compress(&raw, BEST_COMPRESSION).expect("compress");
        assert!(matches!(
            deserialize(&packed),
            Err(SnapshotError::LocalOutOfRange { x: 16, .. })
        ));
    }

    #[test]
    fn test_negative_chunk_count_is_rejected() {
        let packed = compression::compress(&(-3i32).to_le_bytes(), BEST_COMPRESSION).expect("compress");
        assert!(matches!(
            deserialize(&packed),
            Err(SnapshotError::InvalidChunkCount(-3))
        ));
    }

    #[test]
    fn test_corrupt_bytes_fail_to_decompress() {
        assert!(matches!(
            deserialize(&[0xFF; 8]),
            Err(SnapshotError::Decompress(_))
        ));
    }
}
