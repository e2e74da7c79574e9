//! The live volume: chunk storage, change tracking, background remeshing
//! and snapshot load/save, all owned by a single thread.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::IVec3;
use rustc_hash::FxHashMap;
use tessera_config::Config;
use tessera_mesh::{
    ChunkMesh, ChunkNeighborhood, IndexMode, MeshOptions, MeshingPipeline, MeshingTask,
    VolumeVertex,
};
use tessera_voxel::{
    BEST_COMPRESSION, ChangeTracker, ChunkCoord, Opacity, SnapshotError, TextureAtlas, VolumeMap,
    Voxel, snapshot,
};

use crate::scheduler::{DEFAULT_UPDATE_HZ, UpdateScheduler};

/// Runtime settings for a [`Volume`].
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeSettings {
    /// Update ticks per second. `0` disables change tracking.
    pub update_frequency_hz: f64,
    /// Also dirty diagonal neighbor chunks after a boundary write.
    ///
    /// Off by default: only face neighbors are remeshed. Ambient occlusion
    /// samples reach across edges and corners, so a write on a chunk edge or
    /// corner leaves the diagonal chunk's baked AO stale until that chunk is
    /// remeshed for another reason. Turning this on remeshes up to 26 chunks
    /// per write instead of up to 3.
    pub seam_corner_neighbors: bool,
    /// Mesh worker threads, already resolved (never `0`).
    pub worker_count: usize,
    /// Maximum queued plus running meshing tasks.
    pub task_budget: usize,
    pub mesh_options: MeshOptions,
    /// Deflate level used by [`Volume::serialize_snapshot`].
    pub compression_level: u32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            update_frequency_hz: DEFAULT_UPDATE_HZ,
            seam_corner_neighbors: false,
            worker_count: num_cpus::get(),
            task_budget: 256,
            mesh_options: MeshOptions::default(),
            compression_level: BEST_COMPRESSION,
        }
    }
}

impl From<&Config> for VolumeSettings {
    fn from(config: &Config) -> Self {
        let worker_count = match config.meshing.worker_count {
            0 => num_cpus::get(),
            n => n,
        };
        let index_mode = if config.meshing.indexed_vertices {
            IndexMode::Indexed
        } else {
            IndexMode::Triangles
        };
        Self {
            update_frequency_hz: config.volume.update_frequency_hz,
            seam_corner_neighbors: config.volume.seam_corner_neighbors,
            worker_count,
            task_budget: config.meshing.task_budget,
            mesh_options: MeshOptions {
                index_mode,
                ambient_occlusion: config.meshing.ambient_occlusion,
            },
            compression_level: config.snapshot.compression_level,
        }
    }
}

/// What happened to a single chunk handed to the meshing pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Submitted,
    /// Budget exhausted; the chunk stays tracked for a later tick.
    Rejected,
    /// The chunk is not allocated.
    Missing,
}

/// Counts for one [`Volume::tick_update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub submitted: usize,
    pub rejected: usize,
    pub missing: usize,
}

/// Point-in-time counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VolumeStats {
    pub chunks: usize,
    pub valid_voxels: usize,
    pub pending_chunks: usize,
    pub in_flight: usize,
    pub meshes: usize,
    pub generation: u64,
}

struct PublishedMesh {
    mesh: ChunkMesh<VolumeVertex>,
    structural: bool,
    seq: u64,
}

/// A mutable voxel volume whose chunk meshes are rebuilt in the background.
///
/// Not `Sync`: every method runs on the owning thread. Meshing workers only
/// ever see owned [`ChunkNeighborhood`] snapshots.
pub struct Volume {
    map: VolumeMap<Voxel>,
    tracker: ChangeTracker,
    scheduler: UpdateScheduler,
    pipeline: MeshingPipeline<Voxel, VolumeVertex>,
    meshes: FxHashMap<ChunkCoord, PublishedMesh>,
    /// Bumped whenever the map is replaced wholesale.
    generation: u64,
    next_seq: u64,
    settings: VolumeSettings,
}

impl Volume {
    pub fn new(settings: VolumeSettings, opacity: Arc<dyn Opacity<Voxel>>) -> Self {
        let pipeline = MeshingPipeline::new(
            settings.worker_count,
            settings.task_budget,
            opacity,
            settings.mesh_options,
        );
        tracing::debug!(
            update_hz = settings.update_frequency_hz,
            workers = pipeline.worker_count(),
            budget = pipeline.budget(),
            "volume created"
        );
        Self {
            map: VolumeMap::new(),
            tracker: ChangeTracker::new(),
            scheduler: UpdateScheduler::new(settings.update_frequency_hz),
            pipeline,
            meshes: FxHashMap::default(),
            generation: 0,
            next_seq: 0,
            settings,
        }
    }

    /// Creates a volume whose face culling follows `atlas`.
    pub fn with_atlas(settings: VolumeSettings, atlas: TextureAtlas) -> Self {
        Self::new(settings, Arc::new(atlas))
    }

    pub fn settings(&self) -> &VolumeSettings {
        &self.settings
    }

    pub fn map(&self) -> &VolumeMap<Voxel> {
        &self.map
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// `false` when the update frequency is zero.
    pub fn is_tracking_enabled(&self) -> bool {
        self.scheduler.is_enabled()
    }

    pub fn get_voxel(&self, position: IVec3) -> Voxel {
        self.map.get_voxel(position)
    }

    /// Chunks waiting for the next tick, with their structural flag.
    pub fn pending_change(&self, coord: ChunkCoord) -> Option<bool> {
        self.tracker.get(coord)
    }

    // -- Mutation --

    /// Writes `voxel` at `position` and marks the affected chunks dirty.
    ///
    /// Returns `false` if nothing was written (air into unallocated space).
    pub fn set_tracked_voxel(&mut self, position: IVec3, voxel: Voxel) -> bool {
        let Some(outcome) = self.map.set_voxel(position, voxel) else {
            return false;
        };
        if !self.is_tracking_enabled() {
            return true;
        }

        let changed = outcome.previous.is_valid() != voxel.is_valid();
        self.tracker.record(outcome.coord, changed);
        if outcome.local.on_boundary() {
            for neighbor in
                self.map
                    .neighbors(outcome.coord, outcome.local, self.settings.seam_corner_neighbors)
            {
                self.tracker.record(neighbor, false);
            }
        }
        true
    }

    /// Applies every write in order. Returns how many took effect.
    pub fn set_tracked_voxels<I>(&mut self, writes: I) -> usize
    where
        I: IntoIterator<Item = (IVec3, Voxel)>,
    {
        writes
            .into_iter()
            .filter(|&(position, voxel)| self.set_tracked_voxel(position, voxel))
            .count()
    }

    // -- Update tick --

    /// Publishes finished meshes and runs the update tick if one is due.
    ///
    /// In manual mode only chunks whose regeneration was previously rejected
    /// are dispatched. Returns `true` if a tick ran.
    pub fn update(&mut self, now: Instant) -> bool {
        self.collect_meshes();
        let due = if self.scheduler.is_enabled() {
            self.scheduler.try_tick(now)
        } else {
            !self.tracker.is_empty()
        };
        if due {
            self.tick_update();
        }
        due
    }

    /// Dispatches a meshing task for every tracked chunk.
    ///
    /// The tracked set is swapped for an empty one first; chunks the pipeline
    /// cannot accept are tracked again with their flag intact.
    pub fn tick_update(&mut self) -> TickReport {
        let dirty = self.tracker.take();
        let mut report = TickReport::default();
        if dirty.is_empty() {
            return report;
        }

        for (coord, structural) in dirty {
            match self.dispatch(coord, structural) {
                DispatchOutcome::Submitted => report.submitted += 1,
                DispatchOutcome::Rejected => {
                    self.tracker.record(coord, structural);
                    report.rejected += 1;
                }
                DispatchOutcome::Missing => report.missing += 1,
            }
        }

        tracing::debug!(
            submitted = report.submitted,
            rejected = report.rejected,
            missing = report.missing,
            in_flight = self.pipeline.in_flight_count(),
            "dispatched mesh regeneration"
        );
        if report.rejected > 0 {
            tracing::warn!(
                rejected = report.rejected,
                budget = self.pipeline.budget(),
                "meshing budget exhausted, deferring chunks"
            );
        }
        report
    }

    /// Queues a structural remesh of `coord`. A rejected request is kept and
    /// retried by [`update`](Self::update).
    pub fn regenerate_mesh(&mut self, coord: ChunkCoord) -> DispatchOutcome {
        let outcome = self.dispatch(coord, true);
        if outcome == DispatchOutcome::Rejected {
            self.tracker.record(coord, true);
        }
        outcome
    }

    /// Queues a remesh of every allocated chunk. Returns how many were
    /// submitted immediately.
    pub fn regenerate_all_meshes(&mut self) -> usize {
        let mut coords: Vec<ChunkCoord> = self.map.coords().collect();
        coords.sort();
        coords
            .into_iter()
            .filter(|&coord| self.regenerate_mesh(coord) == DispatchOutcome::Submitted)
            .count()
    }

    fn dispatch(&mut self, coord: ChunkCoord, structural: bool) -> DispatchOutcome {
        if !self.pipeline.has_capacity() {
            return DispatchOutcome::Rejected;
        }
        let Some(neighborhood) = ChunkNeighborhood::capture(&self.map, coord) else {
            return DispatchOutcome::Missing;
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        let task = MeshingTask {
            coord,
            neighborhood,
            structural,
            generation: self.generation,
            seq,
        };
        if self.pipeline.submit(task) {
            DispatchOutcome::Submitted
        } else {
            DispatchOutcome::Rejected
        }
    }

    // -- Mesh results --

    /// Publishes every finished mesh. Results dispatched before the last
    /// snapshot load, or older than the mesh already published for the same
    /// chunk, are dropped. Returns the number published.
    pub fn collect_meshes(&mut self) -> usize {
        let mut published = 0;
        for result in self.pipeline.drain_results() {
            if result.generation != self.generation {
                tracing::warn!(
                    coord = ?result.coord,
                    result_generation = result.generation,
                    generation = self.generation,
                    "discarding stale mesh result"
                );
                continue;
            }
            if self
                .meshes
                .get(&result.coord)
                .is_some_and(|current| current.seq > result.seq)
            {
                continue;
            }
            self.meshes.insert(
                result.coord,
                PublishedMesh {
                    mesh: result.mesh,
                    structural: result.structural,
                    seq: result.seq,
                },
            );
            published += 1;
        }
        published
    }

    /// Blocks until every tracked chunk has been meshed and published.
    /// Returns `false` if `timeout` elapsed first.
    pub fn wait_for_meshes(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.collect_meshes();
            if self.pipeline.in_flight_count() == 0 {
                if self.tracker.is_empty() {
                    self.collect_meshes();
                    return true;
                }
                self.tick_update();
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    in_flight = self.pipeline.in_flight_count(),
                    pending = self.tracker.len(),
                    "timed out waiting for meshes"
                );
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn mesh(&self, coord: ChunkCoord) -> Option<&ChunkMesh<VolumeVertex>> {
        self.meshes.get(&coord).map(|published| &published.mesh)
    }

    /// Whether the last published mesh for `coord` came from a structural
    /// change.
    pub fn mesh_was_structural(&self, coord: ChunkCoord) -> Option<bool> {
        self.meshes.get(&coord).map(|published| published.structural)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (ChunkCoord, &ChunkMesh<VolumeVertex>)> {
        self.meshes.iter().map(|(coord, published)| (*coord, &published.mesh))
    }

    pub fn stats(&self) -> VolumeStats {
        VolumeStats {
            chunks: self.map.len(),
            valid_voxels: self.map.valid_voxel_count(),
            pending_chunks: self.tracker.len(),
            in_flight: self.pipeline.in_flight_count(),
            meshes: self.meshes.len(),
            generation: self.generation,
        }
    }

    // -- Snapshots --

    /// Encodes the whole volume at the configured compression level.
    pub fn serialize_snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        snapshot::serialize_with_level(&self.map, self.settings.compression_level)
    }

    /// Replaces the volume with a decoded snapshot and remeshes every chunk.
    ///
    /// An empty payload leaves the volume untouched. On error the live volume
    /// is unchanged.
    pub fn load_snapshot(&mut self, data: &[u8]) -> Result<(), SnapshotError> {
        if data.is_empty() {
            tracing::debug!("empty snapshot, volume left untouched");
            return Ok(());
        }
        let map = snapshot::deserialize(data)?;

        self.map = map;
        self.tracker.clear();
        self.meshes.clear();
        self.generation += 1;
        let submitted = self.regenerate_all_meshes();
        tracing::info!(
            chunks = self.map.len(),
            voxels = self.map.valid_voxel_count(),
            generation = self.generation,
            submitted,
            "loaded volume snapshot"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
