//! Replicated volume edits.
//!
//! Edits travel as operations rather than voxel lists: every participant
//! receives the same [`VolumeMutation`] and re-executes it locally, so fills
//! must stay deterministic.

use std::collections::VecDeque;

use glam::IVec3;
use serde::{Deserialize, Serialize};
use tessera_voxel::Voxel;

use crate::volume::Volume;

/// Wire format version prepended to every encoded mutation.
pub const MUTATION_PROTOCOL_VERSION: u8 = 1;

/// Half-open extent of a box fill, relative to its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxBounds {
    pub mins: IVec3,
    pub maxs: IVec3,
}

impl BoxBounds {
    pub fn new(mins: IVec3, maxs: IVec3) -> Self {
        Self { mins, maxs }
    }
}

/// A single replicated edit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum VolumeMutation {
    Set {
        position: IVec3,
        voxel: Voxel,
    },
    Sphere {
        center: IVec3,
        radius: f32,
        voxel: Voxel,
    },
    Box {
        origin: IVec3,
        bounds: BoxBounds,
        voxel: Voxel,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("empty mutation payload")]
    EmptyPayload,
    #[error("unsupported mutation protocol version {0}")]
    UnsupportedVersion(u8),
    #[error("failed to encode mutation: {0}")]
    Encode(#[source] postcard::Error),
    #[error("failed to decode mutation: {0}")]
    Decode(#[from] postcard::Error),
}

impl VolumeMutation {
    /// Encodes as a version byte followed by the postcard body.
    pub fn encode(&self) -> Result<Vec<u8>, MutationError> {
        let body = postcard::to_allocvec(self).map_err(MutationError::Encode)?;
        let mut data = Vec::with_capacity(1 + body.len());
        data.push(MUTATION_PROTOCOL_VERSION);
        data.extend_from_slice(&body);
        Ok(data)
    }

    pub fn decode(data: &[u8]) -> Result<Self, MutationError> {
        let (&version, body) = data.split_first().ok_or(MutationError::EmptyPayload)?;
        if version != MUTATION_PROTOCOL_VERSION {
            return Err(MutationError::UnsupportedVersion(version));
        }
        Ok(postcard::from_bytes(body)?)
    }

    /// Re-executes the edit on `volume`. Returns the number of writes that
    /// took effect.
    pub fn apply(&self, volume: &mut Volume) -> usize {
        match *self {
            Self::Set { position, voxel } => usize::from(volume.set(position, voxel)),
            Self::Sphere {
                center,
                radius,
                voxel,
            } => volume.set_sphere(center, radius, voxel),
            Self::Box {
                origin,
                bounds,
                voxel,
            } => volume.set_box(origin, bounds, voxel),
        }
    }
}

/// Offsets filled by a sphere of the given radius, produced lazily.
///
/// Scans a cube of half-extent `ceil(radius / 2 + 0.5)` and keeps offsets
/// strictly closer than `radius / 2`, so `radius` behaves as a diameter.
/// A NaN or non-positive radius fills nothing.
pub fn sphere_offsets(radius: f32) -> impl Iterator<Item = IVec3> {
    let half = radius / 2.0;
    let h = (half + 0.5).ceil();
    // Saturates to `i32::MAX` for huge radii; NaN becomes 0.
    let h = if h > 0.0 { h as i32 } else { 0 };
    (-h..h)
        .flat_map(move |x| (-h..h).flat_map(move |y| (-h..h).map(move |z| IVec3::new(x, y, z))))
        .filter(move |offset| offset.as_vec3().length() < half)
}

/// Positions filled by a box fill, produced lazily.
///
/// x and z span `[mins, maxs)`. The y range ends at `maxs.x`, not `maxs.y`;
/// replicated peers depend on this exact footprint. Positions that would
/// overflow `i32` are skipped.
pub fn box_positions(origin: IVec3, bounds: BoxBounds) -> impl Iterator<Item = IVec3> {
    let BoxBounds { mins, maxs } = bounds;
    (mins.x..maxs.x)
        .flat_map(move |x| {
            (mins.y..maxs.x).flat_map(move |y| (mins.z..maxs.z).map(move |z| IVec3::new(x, y, z)))
        })
        .filter_map(move |offset| offset_position(origin, offset))
}

/// `base + offset`, or `None` if any axis overflows.
fn offset_position(base: IVec3, offset: IVec3) -> Option<IVec3> {
    Some(IVec3::new(
        base.x.checked_add(offset.x)?,
        base.y.checked_add(offset.y)?,
        base.z.checked_add(offset.z)?,
    ))
}

impl Volume {
    /// Single tracked voxel write.
    pub fn set(&mut self, position: IVec3, voxel: Voxel) -> bool {
        self.set_tracked_voxel(position, voxel)
    }

    pub fn set_sphere(&mut self, center: IVec3, radius: f32, voxel: Voxel) -> usize {
        let writes = sphere_offsets(radius)
            .filter_map(move |offset| offset_position(center, offset))
            .map(move |position| (position, voxel));
        self.set_tracked_voxels(writes)
    }

    pub fn set_box(&mut self, origin: IVec3, bounds: BoxBounds, voxel: Voxel) -> usize {
        let writes = box_positions(origin, bounds).map(move |position| (position, voxel));
        self.set_tracked_voxels(writes)
    }
}

/// Broadcast transport for mutations.
///
/// Accepted mutations reach every participant, the submitter included, which
/// then applies them with [`VolumeMutation::apply`].
pub trait MutationSink {
    fn submit(&mut self, mutation: &VolumeMutation) -> Result<(), MutationError>;
}

/// In-process sink: queues encoded mutations and delivers them to local
/// participants in submission order.
#[derive(Debug, Default)]
pub struct LoopbackSink {
    pending: VecDeque<Vec<u8>>,
    delivered: u64,
}

impl LoopbackSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Total mutations delivered so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Decodes every queued mutation and applies it to each participant.
    /// Returns the number of mutations delivered.
    pub fn deliver(&mut self, participants: &mut [&mut Volume]) -> Result<usize, MutationError> {
        let mut count = 0;
        while let Some(payload) = self.pending.pop_front() {
            let mutation = VolumeMutation::decode(&payload)?;
            for volume in participants.iter_mut() {
                mutation.apply(volume);
            }
            count += 1;
        }
        self.delivered += count as u64;
        tracing::trace!(count, participants = participants.len(), "delivered mutations");
        Ok(count)
    }
}

impl MutationSink for LoopbackSink {
    fn submit(&mut self, mutation: &VolumeMutation) -> Result<(), MutationError> {
        self.pending.push_back(mutation.encode()?);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
