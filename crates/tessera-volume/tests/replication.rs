//! Join by snapshot, then converge through replicated mutations.

use std::sync::Arc;
use std::time::Duration;

use glam::IVec3;
use tessera_voxel::{ChunkCoord, SolidOpacity, Voxel};
use tessera_volume::{
    BoxBounds, LoopbackSink, MutationSink, Volume, VolumeMutation, VolumeSettings,
};

const STONE: Voxel = Voxel::new(100, 100, 100, 1);
const GRASS: Voxel = Voxel::new(40, 160, 40, 2);
const TIMEOUT: Duration = Duration::from_secs(5);

fn volume() -> Volume {
    let settings = VolumeSettings {
        worker_count: 2,
        ..Default::default()
    };
    Volume::new(settings, Arc::new(SolidOpacity))
}

fn sorted_voxels(volume: &Volume) -> Vec<([i32; 3], Voxel)> {
    let mut voxels: Vec<_> = volume
        .map()
        .valid_voxels()
        .map(|(p, v)| (p.to_array(), v))
        .collect();
    voxels.sort_by_key(|(p, _)| *p);
    voxels
}

fn build_host(sink: &mut LoopbackSink, host: &mut Volume) {
    let edits = [
        VolumeMutation::Box {
            origin: IVec3::new(-8, 0, -8),
            bounds: BoxBounds::new(IVec3::ZERO, IVec3::new(20, 2, 20)),
            voxel: STONE,
        },
        VolumeMutation::Sphere {
            center: IVec3::new(3, 6, 3),
            radius: 7.0,
            voxel: GRASS,
        },
        VolumeMutation::Set {
            position: IVec3::new(40, 40, 40),
            voxel: GRASS,
        },
    ];
    for edit in &edits {
        sink.submit(edit).unwrap();
    }
    sink.deliver(&mut [host]).unwrap();
}

#[test]
fn test_join_from_snapshot() {
    let mut sink = LoopbackSink::new();
    let mut host = volume();
    build_host(&mut sink, &mut host);
    host.tick_update();
    assert!(host.wait_for_meshes(TIMEOUT));

    let bytes = host.serialize_snapshot().unwrap();
    let mut joiner = volume();
    joiner.load_snapshot(&bytes).unwrap();
    assert!(joiner.wait_for_meshes(TIMEOUT));

    assert_eq!(sorted_voxels(&host), sorted_voxels(&joiner));
    assert_eq!(joiner.stats().chunks, host.stats().chunks);
    assert_eq!(joiner.stats().meshes, joiner.stats().chunks);
    for (coord, mesh) in host.meshes() {
        let joined = joiner.mesh(coord).expect("joiner meshed chunk");
        assert_eq!(joined.quad_count(), mesh.quad_count(), "{coord:?}");
    }
}

#[test]
fn test_broadcast_after_join_converges() {
    let mut sink = LoopbackSink::new();
    let mut host = volume();
    build_host(&mut sink, &mut host);

    let mut joiner = volume();
    joiner.load_snapshot(&host.serialize_snapshot().unwrap()).unwrap();

    sink.submit(&VolumeMutation::Sphere {
        center: IVec3::new(3, 6, 3),
        radius: 4.0,
        voxel: Voxel::EMPTY,
    })
    .unwrap();
    sink.submit(&VolumeMutation::Set {
        position: IVec3::new(-100, 5, 7),
        voxel: STONE,
    })
    .unwrap();
    assert_eq!(sink.deliver(&mut [&mut host, &mut joiner]).unwrap(), 2);

    host.tick_update();
    joiner.tick_update();
    assert!(host.wait_for_meshes(TIMEOUT));
    assert!(joiner.wait_for_meshes(TIMEOUT));

    assert_eq!(sorted_voxels(&host), sorted_voxels(&joiner));
    assert_eq!(joiner.get_voxel(IVec3::new(3, 6, 3)), Voxel::EMPTY);
    let far = ChunkCoord::new(-7, 0, 0);
    assert_eq!(
        host.mesh(far).map(|m| m.quad_count()),
        joiner.mesh(far).map(|m| m.quad_count())
    );
}

#[test]
fn test_empty_chunk_survives_join() {
    let mut host = volume();
    host.set(IVec3::new(20, 0, 0), STONE);
    host.set(IVec3::new(20, 0, 0), Voxel::EMPTY);
    assert_eq!(host.stats().chunks, 1);

    let mut joiner = volume();
    joiner.load_snapshot(&host.serialize_snapshot().unwrap()).unwrap();
    assert_eq!(joiner.stats().chunks, 1);
    assert_eq!(joiner.stats().valid_voxels, 0);
    assert!(joiner.wait_for_meshes(TIMEOUT));
    assert!(joiner.mesh(ChunkCoord::new(1, 0, 0)).unwrap().is_empty());
}
