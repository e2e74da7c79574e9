//! A chunked, mutable voxel volume with change-driven background remeshing,
//! whole-volume snapshots, and replicated mutation operations.

pub mod mutation;
pub mod scheduler;
pub mod volume;

pub use mutation::{
    BoxBounds, LoopbackSink, MUTATION_PROTOCOL_VERSION, MutationError, MutationSink,
    VolumeMutation, box_positions, sphere_offsets,
};
pub use scheduler::UpdateScheduler;
pub use volume::{DispatchOutcome, TickReport, Volume, VolumeSettings, VolumeStats};
