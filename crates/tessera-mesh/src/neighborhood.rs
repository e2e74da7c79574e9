//! Cross-chunk neighbor access for face, edge, and corner voxel lookups.
//!
//! [`ChunkNeighborhood`] aggregates a center chunk and boundary data from up
//! to 26 surrounding chunks into a self-contained, owned snapshot suitable
//! for sending to worker threads without touching the live volume.

use tessera_voxel::{CHUNK_SIZE, Chunk, ChunkCoord, VolumeMap, VoxelData};

use crate::face_direction::{CornerDirection, EdgeDirection, FaceDirection};

// ---------------------------------------------------------------------------
// Boundary data types
// ---------------------------------------------------------------------------

/// The `16 × 16` layer of a face neighbor that touches the center chunk.
///
/// `(u, v)` are the two in-plane axes in `x, y, z` order: `(y, z)` for X
/// faces, `(x, z)` for Y faces, `(x, y)` for Z faces.
#[derive(Clone, Debug)]
pub struct ChunkBoundarySlice<V> {
    /// Voxels stored row-major (u varies fastest).
    data: Vec<V>,
}

impl<V: VoxelData> ChunkBoundarySlice<V> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, u: usize, v: usize) -> V {
        self.data[v * CHUNK_SIZE + u]
    }
}

/// The column of `16` voxels an edge neighbor shares with the center chunk,
/// indexed along the one in-bounds axis.
#[derive(Clone, Debug)]
pub struct ChunkBoundaryEdge<V> {
    data: Vec<V>,
}

impl<V: VoxelData> ChunkBoundaryEdge<V> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, index: usize) -> V {
        self.data[index]
    }
}

// ---------------------------------------------------------------------------
// Extraction helpers
// ---------------------------------------------------------------------------

/// Local coordinate of the boundary layer on the side a step points to.
fn boundary(step: i32) -> usize {
    if step > 0 { CHUNK_SIZE - 1 } else { 0 }
}

/// Extracts the outermost layer of `chunk` on the given face.
///
/// For example, `FaceDirection::PosX` extracts the slice at `x = 15`.
pub fn extract_boundary_slice<V: VoxelData>(
    chunk: &Chunk<V>,
    face: FaceDirection,
) -> ChunkBoundarySlice<V> {
    let mut data = Vec::with_capacity(CHUNK_SIZE * CHUNK_SIZE);
    let (dx, dy, dz) = face.normal();
    for v in 0..CHUNK_SIZE {
        for u in 0..CHUNK_SIZE {
            let voxel = if dx != 0 {
                chunk.get(boundary(dx), u, v)
            } else if dy != 0 {
                chunk.get(u, boundary(dy), v)
            } else {
                chunk.get(u, v, boundary(dz))
            };
            data.push(voxel);
        }
    }
    ChunkBoundarySlice { data }
}

/// Extracts the column of `chunk` lying along the given edge.
fn extract_boundary_edge<V: VoxelData>(chunk: &Chunk<V>, edge: EdgeDirection) -> ChunkBoundaryEdge<V> {
    let (dx, dy, dz) = edge.offset();
    let data = (0..CHUNK_SIZE)
        .map(|i| {
            let x = if dx == 0 { i } else { boundary(dx) };
            let y = if dy == 0 { i } else { boundary(dy) };
            let z = if dz == 0 { i } else { boundary(dz) };
            chunk.get(x, y, z)
        })
        .collect();
    ChunkBoundaryEdge { data }
}

/// Extracts the single voxel of `chunk` at the given corner.
fn extract_corner_voxel<V: VoxelData>(chunk: &Chunk<V>, corner: CornerDirection) -> V {
    let (dx, dy, dz) = corner.offset();
    chunk.get(boundary(dx), boundary(dy), boundary(dz))
}

// ---------------------------------------------------------------------------
// ChunkNeighborhood
// ---------------------------------------------------------------------------

/// Provides voxel access one cell beyond the boundaries of a single chunk.
///
/// Contains a copy of the central chunk plus cached boundary data from the
/// allocated chunks among its 26 neighbors:
/// - 6 face neighbors (`16 × 16` slice each)
/// - 12 edge neighbors (`16`-voxel column each)
/// - 8 corner neighbors (single voxel each)
///
/// Missing neighbors read as air.
#[derive(Clone, Debug)]
pub struct ChunkNeighborhood<V> {
    center: Chunk<V>,
    face_neighbors: [Option<ChunkBoundarySlice<V>>; 6],
    edge_neighbors: [Option<ChunkBoundaryEdge<V>>; 12],
    corner_neighbors: [Option<V>; 8],
}

impl<V: VoxelData> ChunkNeighborhood<V> {
    /// Creates a neighborhood from a center chunk with no neighbors loaded.
    pub fn from_center_only(center: Chunk<V>) -> Self {
        Self {
            center,
            face_neighbors: Default::default(),
            edge_neighbors: Default::default(),
            corner_neighbors: Default::default(),
        }
    }

    /// Snapshots the chunk at `coord` and the boundary data of its allocated
    /// neighbors. Returns `None` if `coord` itself is not allocated.
    pub fn capture(map: &VolumeMap<V>, coord: ChunkCoord) -> Option<Self> {
        let center = map.get_chunk(coord)?;
        let mut n = Self::from_center_only(center.clone());

        for face in FaceDirection::ALL {
            let (dx, dy, dz) = face.normal();
            if let Some(chunk) = map.get_chunk(coord.offset(dx, dy, dz)) {
                n.set_face_neighbor(face, chunk);
            }
        }
        for edge in EdgeDirection::ALL {
            let (dx, dy, dz) = edge.offset();
            if let Some(chunk) = map.get_chunk(coord.offset(dx, dy, dz)) {
                n.set_edge_neighbor(edge, chunk);
            }
        }
        for corner in CornerDirection::ALL {
            let (dx, dy, dz) = corner.offset();
            if let Some(chunk) = map.get_chunk(coord.offset(dx, dy, dz)) {
                n.set_corner_neighbor_from_chunk(corner, chunk);
            }
        }
        Some(n)
    }

    /// Sets a face neighbor, keeping only the layer that touches the center.
    pub fn set_face_neighbor(&mut self, direction: FaceDirection, neighbor_chunk: &Chunk<V>) {
        let slice = extract_boundary_slice(neighbor_chunk, direction.opposite());
        self.face_neighbors[direction.index()] = Some(slice);
    }

    /// Sets an edge neighbor, keeping only the shared column.
    pub fn set_edge_neighbor(&mut self, edge: EdgeDirection, neighbor_chunk: &Chunk<V>) {
        let column = extract_boundary_edge(neighbor_chunk, edge.opposite());
        self.edge_neighbors[edge.index()] = Some(column);
    }

    pub fn set_corner_neighbor(&mut self, corner: CornerDirection, voxel: V) {
        self.corner_neighbors[corner.index()] = Some(voxel);
    }

    /// Sets a corner neighbor from the touching corner voxel of `neighbor_chunk`.
    pub fn set_corner_neighbor_from_chunk(
        &mut self,
        corner: CornerDirection,
        neighbor_chunk: &Chunk<V>,
    ) {
        let voxel = extract_corner_voxel(neighbor_chunk, corner.opposite());
        self.set_corner_neighbor(corner, voxel);
    }

    /// Chunk coordinate of the center chunk.
    pub fn coord(&self) -> ChunkCoord {
        self.center.coord()
    }

    pub fn center(&self) -> &Chunk<V> {
        &self.center
    }

    /// Gets a voxel at coordinates relative to the center chunk.
    ///
    /// Coordinates in `[0, 16)` are served from the center chunk; coordinates
    /// one cell beyond a boundary (`-1` or `16`) are served from the matching
    /// neighbor. Anything further out, or a missing neighbor, reads as air.
    pub fn get(&self, x: i32, y: i32, z: i32) -> V {
        let s = CHUNK_SIZE as i32;
        let out = |c: i32| -> Option<i32> {
            match c {
                -1 => Some(-1),
                c if c == s => Some(1),
                c if (0..s).contains(&c) => Some(0),
                _ => None,
            }
        };
        let (Some(ox), Some(oy), Some(oz)) = (out(x), out(y), out(z)) else {
            return V::EMPTY;
        };

        let out_count = (ox != 0) as u8 + (oy != 0) as u8 + (oz != 0) as u8;
        match out_count {
            0 => self.center.get(x as usize, y as usize, z as usize),
            1 => self.lookup_face(x, y, z, ox, oy, oz),
            2 => self.lookup_edge(x, y, z, ox, oy, oz),
            _ => self.lookup_corner(ox, oy, oz),
        }
    }

    // -- private helpers --

    fn lookup_face(&self, x: i32, y: i32, z: i32, ox: i32, oy: i32, oz: i32) -> V {
        let (u, v) = if ox != 0 {
            (y, z)
        } else if oy != 0 {
            (x, z)
        } else {
            (x, y)
        };
        FaceDirection::from_offset(ox, oy, oz)
            .and_then(|dir| self.face_neighbors[dir.index()].as_ref())
            .map_or(V::EMPTY, |slice| slice.get(u as usize, v as usize))
    }

    fn lookup_edge(&self, x: i32, y: i32, z: i32, ox: i32, oy: i32, oz: i32) -> V {
        let along = if ox == 0 {
            x
        } else if oy == 0 {
            y
        } else {
            z
        };
        EdgeDirection::from_offset(ox, oy, oz)
            .and_then(|edge| self.edge_neighbors[edge.index()].as_ref())
            .map_or(V::EMPTY, |column| column.get(along as usize))
    }

    fn lookup_corner(&self, ox: i32, oy: i32, oz: i32) -> V {
        CornerDirection::from_offset(ox, oy, oz)
            .and_then(|corner| self.corner_neighbors[corner.index()])
            .unwrap_or(V::EMPTY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
