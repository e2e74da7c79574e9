//! Vertex formats produced by the mesher.
//!
//! [`VolumeVertex`] is a 12-byte packed vertex carrying everything the
//! renderer needs per corner: chunk-local position, face id, baked AO, and
//! the voxel's colour and texture.

use tessera_voxel::Voxel;

use crate::face_direction::FaceDirection;

/// Builds a vertex for one corner of a visible voxel face.
///
/// The mesher is generic over this so other payloads can choose their own
/// vertex layout.
pub trait MeshVertexFormat<V>: Copy + Send + 'static {
    /// `position` is chunk-local (each component `0..=16`), `ao` is `0..=3`.
    fn from_face_corner(position: [u8; 3], face: FaceDirection, ao: u8, voxel: &V) -> Self;
}

/// Packed vertex for [`Voxel`] meshes.
///
/// Layout (12 bytes total):
///   - `[0..3]`   position `[u8; 3]`, chunk-local (0..=16)
///   - `[3]`      face `u8`, face direction id (0..=5)
///   - `[4]`      ao `u8` (0..=3)
///   - `[5..8]`   color `[u8; 3]`
///   - `[8..10]`  texture `u16`
///   - `[10..12]` padding
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VolumeVertex {
    pub position: [u8; 3],
    /// Face direction id. See [`FaceDirection`].
    pub face: u8,
    /// Ambient occlusion level (0..=3).
    pub ao: u8,
    pub color: [u8; 3],
    /// Texture atlas id.
    pub texture: u16,
    /// Reserved, aligns the struct to 12 bytes.
    pub _pad: u16,
}

static_assertions::assert_eq_size!(VolumeVertex, [u8; 12]);

impl VolumeVertex {
    pub fn new(position: [u8; 3], face: FaceDirection, ao: u8, color: [u8; 3], texture: u16) -> Self {
        debug_assert!(position.iter().all(|&c| c <= 16));
        debug_assert!(ao <= 3);
        Self {
            position,
            face: face as u8,
            ao,
            color,
            texture,
            _pad: 0,
        }
    }

    /// Decodes the face id. Returns `None` if the stored value is out of range.
    pub fn face_direction(&self) -> Option<FaceDirection> {
        FaceDirection::from_u8(self.face)
    }

    /// Position as `[f32; 3]` for rendering or debugging.
    pub fn position_f32(&self) -> [f32; 3] {
        let p = self.position;
        [p[0] as f32, p[1] as f32, p[2] as f32]
    }
}

impl MeshVertexFormat<Voxel> for VolumeVertex {
    fn from_face_corner(position: [u8; 3], face: FaceDirection, ao: u8, voxel: &Voxel) -> Self {
        Self::new(position, face, ao, voxel.color(), voxel.texture)
    }
}
