//! Configuration for Tessera volumes.
//!
//! Settings persist to disk as `config.ron`. Supports CLI overrides via clap,
//! hot-reload detection, and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, MeshingConfig, SnapshotConfig, VolumeConfig,
    default_config_dir,
};
pub use error::ConfigError;
