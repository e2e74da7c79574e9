//! Asynchronous meshing pipeline: offloads chunk meshing to a thread pool
//! using snapshot-based tasks and channels for result delivery.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;

use tessera_voxel::{ChunkCoord, Opacity, VoxelData};

use crate::chunk_mesh::ChunkMesh;
use crate::mesher::{MeshOptions, mesh_chunk};
use crate::neighborhood::ChunkNeighborhood;
use crate::vertex::MeshVertexFormat;

/// A self-contained meshing task that can run on any thread.
///
/// Owns a snapshot of the chunk and its neighborhood so workers never read
/// the live volume.
pub struct MeshingTask<V> {
    pub coord: ChunkCoord,
    pub neighborhood: ChunkNeighborhood<V>,
    /// Whether the triggering change added or removed voxels.
    pub structural: bool,
    /// Volume generation at dispatch time.
    pub generation: u64,
    /// Monotonic dispatch sequence number.
    pub seq: u64,
}

/// The result of a completed meshing task.
pub struct MeshingResult<T> {
    pub coord: ChunkCoord,
    pub mesh: ChunkMesh<T>,
    pub structural: bool,
    pub generation: u64,
    pub seq: u64,
}

/// Asynchronous meshing pipeline backed by a thread pool.
///
/// The owning thread builds [`MeshingTask`]s, submits them via
/// [`submit`](Self::submit), and collects [`MeshingResult`]s via
/// [`drain_results`](Self::drain_results). Meshing never blocks the owner.
pub struct MeshingPipeline<V, T> {
    task_sender: Option<crossbeam_channel::Sender<MeshingTask<V>>>,
    result_receiver: crossbeam_channel::Receiver<MeshingResult<T>>,
    worker_handles: Vec<JoinHandle<()>>,
    /// Maximum number of tasks that can be in-flight simultaneously.
    budget: usize,
    in_flight: Arc<AtomicUsize>,
}

impl<V, T> MeshingPipeline<V, T>
where
    V: VoxelData,
    T: MeshVertexFormat<V>,
{
    /// Spawns `worker_count` meshing threads (at least one).
    ///
    /// `budget` caps the number of queued plus running tasks, which bounds the
    /// memory held by neighborhood snapshots.
    pub fn new(
        worker_count: usize,
        budget: usize,
        opacity: Arc<dyn Opacity<V>>,
        options: MeshOptions,
    ) -> Self {
        let worker_count = worker_count.max(1);
        let budget = budget.max(1);
        let (task_tx, task_rx) = crossbeam_channel::bounded::<MeshingTask<V>>(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let opacity = Arc::clone(&opacity);
            let flight = Arc::clone(&in_flight);

            let spawned = std::thread::Builder::new()
                .name(format!("mesh-worker-{index}"))
                .spawn(move || {
                    while let Ok(task) = rx.recv() {
                        let mesh = mesh_chunk(&task.neighborhood, opacity.as_ref(), &options);
                        let _ = tx.send(MeshingResult {
                            coord: task.coord,
                            mesh,
                            structural: task.structural,
                            generation: task.generation,
                            seq: task.seq,
                        });
                        flight.fetch_sub(1, Ordering::AcqRel);
                    }
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => tracing::error!(%err, index, "failed to spawn mesh worker"),
            }
        }
        tracing::debug!(workers = handles.len(), budget, "meshing pipeline started");

        Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            budget,
            in_flight,
        }
    }

    /// Returns `true` if a call to [`submit`](Self::submit) would currently
    /// be accepted.
    pub fn has_capacity(&self) -> bool {
        self.task_sender.is_some()
            && !self.worker_handles.is_empty()
            && self.in_flight.load(Ordering::Acquire) < self.budget
    }

    /// Submit a meshing task. Returns `false` if the budget is exhausted
    /// or the pipeline has been shut down.
    pub fn submit(&self, task: MeshingTask<V>) -> bool {
        let Some(sender) = &self.task_sender else {
            return false;
        };
        if !self.has_capacity() {
            return false;
        }
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        if sender.send(task).is_err() {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            return false;
        }
        true
    }

    /// Drains all completed results without blocking.
    pub fn drain_results(&self) -> Vec<MeshingResult<T>> {
        self.result_receiver.try_iter().collect()
    }

    /// Number of tasks queued or running.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }
}

impl<V, T> MeshingPipeline<V, T> {
    /// Shuts down all worker threads.
    ///
    /// Dropping the sender closes the channel; workers finish queued tasks and
    /// exit, then are joined.
    pub fn shutdown(&mut self) {
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl<V, T> Drop for MeshingPipeline<V, T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use tessera_voxel::{Chunk, SolidOpacity, Voxel};

    use super::*;
    use crate::chunk_mesh::IndexMode;
    use crate::vertex::VolumeVertex;

    const STONE: Voxel = Voxel::new(128, 128, 128, 1);

    fn pipeline(workers: usize, budget: usize) -> MeshingPipeline<Voxel, VolumeVertex> {
        MeshingPipeline::new(
            workers,
            budget,
            Arc::new(SolidOpacity),
            MeshOptions {
                index_mode: IndexMode::Indexed,
                ambient_occlusion: true,
            },
        )
    }

    fn task(coord: ChunkCoord, filled: bool, generation: u64) -> MeshingTask<Voxel> {
        let mut chunk = Chunk::new(coord);
        if filled {
            chunk.set(8, 8, 8, STONE);
        }
        MeshingTask {
            coord,
            neighborhood: ChunkNeighborhood::from_center_only(chunk),
            structural: true,
            generation,
            seq: 0,
        }
    }

    fn wait_for(
        pipeline: &MeshingPipeline<Voxel, VolumeVertex>,
        count: usize,
    ) -> Vec<MeshingResult<VolumeVertex>> {
        let mut received = Vec::new();
        let start = Instant::now();
        while received.len() < count {
            received.extend(pipeline.drain_results());
            assert!(start.elapsed().as_secs() < 5, "Timed out waiting for mesh results");
            std::thread::sleep(Duration::from_millis(1));
        }
        received
    }

    #[test]
    fn test_meshing_task_produces_valid_mesh() {
        let pipeline = pipeline(2, 8);
        assert!(pipeline.submit(task(ChunkCoord::new(0, 0, 0), true, 1)));

        let results = wait_for(&pipeline, 1);
        assert_eq!(results[0].coord, ChunkCoord::new(0, 0, 0));
        assert_eq!(results[0].mesh.quad_count(), 6);
        assert_eq!(results[0].generation, 1);
        assert!(results[0].structural);
    }

    #[test]
    fn test_concurrent_tasks_do_not_interfere() {
        let pipeline = pipeline(4, 16);
        let coords: Vec<ChunkCoord> = (0..8).map(|i| ChunkCoord::new(i, 0, 0)).collect();
        for &coord in &coords {
            assert!(pipeline.submit(task(coord, true, 1)));
        }

        let received = wait_for(&pipeline, 8);
        let mut got: Vec<_> = received.iter().map(|r| r.coord).collect();
        got.sort();
        assert_eq!(got, coords);
    }

    #[test]
    fn test_empty_chunk_yields_empty_mesh() {
        let pipeline = pipeline(1, 4);
        assert!(pipeline.submit(task(ChunkCoord::new(0, 0, 0), false, 42)));
        let results = wait_for(&pipeline, 1);
        assert!(results[0].mesh.is_empty());
        assert_eq!(results[0].generation, 42);
    }

    /// Opacity lookup slow enough that no task completes during a submit burst.
    struct SlowOpacity;

    impl Opacity<Voxel> for SlowOpacity {
        fn is_opaque(&self, _voxel: &Voxel) -> bool {
            std::thread::sleep(Duration::from_millis(20));
            false
        }
    }

    #[test]
    fn test_budget_limits_active_tasks() {
        let pipeline: MeshingPipeline<Voxel, VolumeVertex> =
            MeshingPipeline::new(1, 2, Arc::new(SlowOpacity), MeshOptions::default());
        let mut submitted = 0;
        for i in 0..10 {
            if pipeline.submit(task(ChunkCoord::new(i, 0, 0), true, 1)) {
                submitted += 1;
            }
        }
        assert_eq!(submitted, 2, "budget should limit submissions, got {submitted}");
        assert!(!pipeline.has_capacity());

        let _ = wait_for(&pipeline, 2);
    }

    #[test]
    fn test_in_flight_returns_to_zero() {
        let pipeline = pipeline(2, 4);
        for i in 0..4 {
            assert!(pipeline.submit(task(ChunkCoord::new(i, 0, 0), true, 1)));
        }
        let _ = wait_for(&pipeline, 4);
        let start = Instant::now();
        while pipeline.in_flight_count() > 0 {
            assert!(start.elapsed().as_secs() < 5, "in-flight count never drained");
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(pipeline.has_capacity());
    }

    #[test]
    fn test_shutdown_rejects_new_tasks() {
        let mut pipeline = pipeline(1, 2);
        pipeline.shutdown();
        assert!(!pipeline.has_capacity());
        assert!(!pipeline.submit(task(ChunkCoord::new(0, 0, 0), true, 1)));
    }
}
