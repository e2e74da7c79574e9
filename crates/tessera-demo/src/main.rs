//! Headless demo: a host builds terrain through broadcast mutations, a
//! second participant joins from a snapshot, and both converge on further
//! edits.
//!
//! Run with `cargo run -p tessera-demo -- --update-hz 60 --workers 4`.

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::IVec3;
use tessera_config::{CliArgs, Config, default_config_dir};
use tessera_voxel::{TextureAtlas, Voxel};
use tessera_volume::{
    BoxBounds, LoopbackSink, MutationError, MutationSink, Volume, VolumeMutation, VolumeSettings,
};
use tracing::{error, info, warn};

const STONE: Voxel = Voxel::new(110, 110, 115, 0);
const GRASS: Voxel = Voxel::new(60, 170, 60, 1);
const WATER: Voxel = Voxel::new(40, 90, 200, 2);

const MESH_TIMEOUT: Duration = Duration::from_secs(10);

fn atlas() -> TextureAtlas {
    TextureAtlas::new()
        .with(STONE.texture, true)
        .with(GRASS.texture, true)
        .with(WATER.texture, false)
}

fn terrain_edits() -> Vec<VolumeMutation> {
    let mut edits = vec![VolumeMutation::Box {
        origin: IVec3::new(-24, -4, -24),
        bounds: BoxBounds::new(IVec3::ZERO, IVec3::new(48, 4, 48)),
        voxel: STONE,
    }];
    for (i, center) in [IVec3::new(-10, 2, -10), IVec3::new(12, 4, 6), IVec3::new(0, 1, 18)]
        .into_iter()
        .enumerate()
    {
        edits.push(VolumeMutation::Sphere {
            center,
            radius: 10.0 + 4.0 * i as f32,
            voxel: GRASS,
        });
    }
    edits
}

fn later_edits() -> Vec<VolumeMutation> {
    vec![
        VolumeMutation::Sphere {
            center: IVec3::new(12, 4, 6),
            radius: 8.0,
            voxel: Voxel::EMPTY,
        },
        VolumeMutation::Box {
            origin: IVec3::new(8, 0, 2),
            bounds: BoxBounds::new(IVec3::ZERO, IVec3::new(4, 2, 4)),
            voxel: WATER,
        },
        VolumeMutation::Set {
            position: IVec3::new(0, 30, 0),
            voxel: GRASS,
        },
    ]
}

fn broadcast(
    sink: &mut LoopbackSink,
    edits: &[VolumeMutation],
    participants: &mut [&mut Volume],
) -> Result<usize, MutationError> {
    for edit in edits {
        sink.submit(edit)?;
    }
    sink.deliver(participants)
}

fn settle(name: &str, volume: &mut Volume) {
    volume.update(Instant::now());
    if !volume.wait_for_meshes(MESH_TIMEOUT) {
        warn!(participant = name, "meshing did not settle in time");
    }
    let stats = volume.stats();
    let quads: usize = volume.meshes().map(|(_, mesh)| mesh.quad_count()).sum();
    info!(
        participant = name,
        chunks = stats.chunks,
        voxels = stats.valid_voxels,
        meshes = stats.meshes,
        quads,
        generation = stats.generation,
        "volume settled"
    );
}

fn converged(a: &Volume, b: &Volume) -> bool {
    let mut left: Vec<_> = a.map().valid_voxels().map(|(p, v)| (p.to_array(), v)).collect();
    let mut right: Vec<_> = b.map().valid_voxels().map(|(p, v)| (p.to_array(), v)).collect();
    left.sort_by_key(|(p, _)| *p);
    right.sort_by_key(|(p, _)| *p);
    left == right
}

fn run(config: &Config) -> Result<bool, Box<dyn std::error::Error>> {
    let settings = VolumeSettings::from(config);
    info!(
        update_hz = settings.update_frequency_hz,
        workers = settings.worker_count,
        index_mode = ?settings.mesh_options.index_mode,
        "starting volume demo"
    );

    let mut sink = LoopbackSink::new();
    let mut host = Volume::with_atlas(settings.clone(), atlas());
    let applied = broadcast(&mut sink, &terrain_edits(), &mut [&mut host])?;
    info!(applied, "host built terrain");
    if !host.is_tracking_enabled() {
        host.regenerate_all_meshes();
    }
    settle("host", &mut host);

    let snapshot = host.serialize_snapshot()?;
    info!(bytes = snapshot.len(), "host serialized snapshot");

    let mut joiner = Volume::with_atlas(settings, atlas());
    joiner.load_snapshot(&snapshot)?;
    settle("joiner", &mut joiner);

    broadcast(&mut sink, &later_edits(), &mut [&mut host, &mut joiner])?;
    if !host.is_tracking_enabled() {
        host.regenerate_all_meshes();
        joiner.regenerate_all_meshes();
    }
    settle("host", &mut host);
    settle("joiner", &mut joiner);

    Ok(converged(&host, &joiner))
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    tessera_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(true) => {
            info!("host and joiner converged");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            error!("host and joiner diverged");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "demo failed");
            ExitCode::FAILURE
        }
    }
}
