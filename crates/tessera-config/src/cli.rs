//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Tessera command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tessera", about = "Tessera voxel volume demo")]
pub struct CliArgs {
    /// Change-tracking update frequency in Hz (0 disables tracking).
    #[arg(long)]
    pub update_hz: Option<f64>,

    /// Mesh worker threads (0 = one per CPU).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Emit indexed meshes.
    #[arg(long)]
    pub indexed: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(hz) = args.update_hz {
            self.volume.update_frequency_hz = hz;
        }
        if let Some(workers) = args.workers {
            self.meshing.worker_count = workers;
        }
        if let Some(indexed) = args.indexed {
            self.meshing.indexed_vertices = indexed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            update_hz: Some(0.0),
            workers: Some(2),
            log_level: Some("trace".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.volume.update_frequency_hz, 0.0);
        assert_eq!(config.meshing.worker_count, 2);
        assert_eq!(config.debug.log_level, "trace");
        // Non-overridden fields retain defaults
        assert!(!config.meshing.indexed_vertices);
        assert_eq!(config.snapshot.compression_level, 9);
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_from_args() {
        let args = CliArgs::parse_from(["tessera", "--update-hz", "60", "--indexed", "true"]);
        assert_eq!(args.update_hz, Some(60.0));
        assert_eq!(args.indexed, Some(true));
        assert!(args.config.is_none());
    }
}
