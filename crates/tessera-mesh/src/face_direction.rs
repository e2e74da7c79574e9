//! Cardinal directions for voxel geometry: face (6), edge (12), and corner (8).

/// One of the six cardinal directions a voxel face can point.
///
/// The `repr(u8)` discriminant is the face id stored in every vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceDirection {
    /// +X direction.
    PosX = 0,
    /// −X direction.
    NegX = 1,
    /// +Y direction.
    PosY = 2,
    /// −Y direction.
    NegY = 3,
    /// +Z direction.
    PosZ = 4,
    /// −Z direction.
    NegZ = 5,
}

/// Unit-cube corner positions of each face's quad, counter-clockwise when seen
/// from outside the voxel. Indexed by face id.
const FACE_CORNERS: [[[u8; 3]; 4]; 6] = [
    // PosX
    [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]],
    // NegX
    [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]],
    // PosY
    [[0, 1, 0], [0, 1, 1], [1, 1, 1], [1, 1, 0]],
    // NegY
    [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
    // PosZ
    [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]],
    // NegZ
    [[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 0, 0]],
];

impl FaceDirection {
    /// All six directions in order.
    pub const ALL: [FaceDirection; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Decodes a face id. Returns `None` for values `>= 6`.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Returns the unit normal as an integer step `(dx, dy, dz)`.
    pub fn normal(self) -> (i32, i32, i32) {
        match self {
            Self::PosX => (1, 0, 0),
            Self::NegX => (-1, 0, 0),
            Self::PosY => (0, 1, 0),
            Self::NegY => (0, -1, 0),
            Self::PosZ => (0, 0, 1),
            Self::NegZ => (0, 0, -1),
        }
    }

    /// Returns the neighbor coordinate offset for this direction.
    pub fn offset(self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        let (dx, dy, dz) = self.normal();
        (x + dx, y + dy, z + dz)
    }

    /// Returns the opposite face direction.
    pub fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Face whose normal is the given single-axis step, if any.
    pub fn from_offset(dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.normal() == (dx, dy, dz))
    }

    /// The four quad corners relative to the voxel's minimum corner, wound
    /// counter-clockwise as seen from outside.
    pub fn corners(self) -> [[u8; 3]; 4] {
        FACE_CORNERS[self.index()]
    }

    /// Returns the direction index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One of 12 edge-adjacent directions (two axes out of bounds).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EdgeDirection {
    /// +X +Y edge.
    PosXPosY = 0,
    /// +X −Y edge.
    PosXNegY = 1,
    /// +X +Z edge.
    PosXPosZ = 2,
    /// +X −Z edge.
    PosXNegZ = 3,
    /// −X +Y edge.
    NegXPosY = 4,
    /// −X −Y edge.
    NegXNegY = 5,
    /// −X +Z edge.
    NegXPosZ = 6,
    /// −X −Z edge.
    NegXNegZ = 7,
    /// +Y +Z edge.
    PosYPosZ = 8,
    /// +Y −Z edge.
    PosYNegZ = 9,
    /// −Y +Z edge.
    NegYPosZ = 10,
    /// −Y −Z edge.
    NegYNegZ = 11,
}

impl EdgeDirection {
    /// All 12 edge directions.
    pub const ALL: [EdgeDirection; 12] = [
        Self::PosXPosY,
        Self::PosXNegY,
        Self::PosXPosZ,
        Self::PosXNegZ,
        Self::NegXPosY,
        Self::NegXNegY,
        Self::NegXPosZ,
        Self::NegXNegZ,
        Self::PosYPosZ,
        Self::PosYNegZ,
        Self::NegYPosZ,
        Self::NegYNegZ,
    ];

    /// Chunk-grid step toward the edge neighbor; exactly one component is zero.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::PosXPosY => (1, 1, 0),
            Self::PosXNegY => (1, -1, 0),
            Self::PosXPosZ => (1, 0, 1),
            Self::PosXNegZ => (1, 0, -1),
            Self::NegXPosY => (-1, 1, 0),
            Self::NegXNegY => (-1, -1, 0),
            Self::NegXPosZ => (-1, 0, 1),
            Self::NegXNegZ => (-1, 0, -1),
            Self::PosYPosZ => (0, 1, 1),
            Self::PosYNegZ => (0, 1, -1),
            Self::NegYPosZ => (0, -1, 1),
            Self::NegYNegZ => (0, -1, -1),
        }
    }

    pub fn from_offset(dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.offset() == (dx, dy, dz))
    }

    /// The edge pointing the other way along both out-of-bounds axes.
    pub fn opposite(self) -> Self {
        let (dx, dy, dz) = self.offset();
        match Self::from_offset(-dx, -dy, -dz) {
            Some(e) => e,
            None => unreachable!("every edge has an opposite"),
        }
    }

    /// Returns the direction index (0–11).
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One of 8 corner-adjacent directions (all three axes out of bounds).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CornerDirection {
    /// −X −Y −Z corner.
    NegXNegYNegZ = 0,
    /// +X −Y −Z corner.
    PosXNegYNegZ = 1,
    /// −X +Y −Z corner.
    NegXPosYNegZ = 2,
    /// +X +Y −Z corner.
    PosXPosYNegZ = 3,
    /// −X −Y +Z corner.
    NegXNegYPosZ = 4,
    /// +X −Y +Z corner.
    PosXNegYPosZ = 5,
    /// −X +Y +Z corner.
    NegXPosYPosZ = 6,
    /// +X +Y +Z corner.
    PosXPosYPosZ = 7,
}

impl CornerDirection {
    /// All 8 corner directions.
    pub const ALL: [CornerDirection; 8] = [
        Self::NegXNegYNegZ,
        Self::PosXNegYNegZ,
        Self::NegXPosYNegZ,
        Self::PosXPosYNegZ,
        Self::NegXNegYPosZ,
        Self::PosXNegYPosZ,
        Self::NegXPosYPosZ,
        Self::PosXPosYPosZ,
    ];

    /// Chunk-grid step toward the corner neighbor. Bit 0 of the index is X,
    /// bit 1 is Y, bit 2 is Z (set = positive).
    pub fn offset(self) -> (i32, i32, i32) {
        let i = self as u8;
        let sign = |bit: u8| if i & bit != 0 { 1 } else { -1 };
        (sign(1), sign(2), sign(4))
    }

    pub fn from_offset(dx: i32, dy: i32, dz: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.offset() == (dx, dy, dz))
    }

    /// The diagonally opposite corner.
    pub fn opposite(self) -> Self {
        Self::ALL[7 - self.index()]
    }

    /// Returns the direction index (0–7).
    pub fn index(self) -> usize {
        self as usize
    }
}
