//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "lattice", about = "Voxel chunk runtime")]
pub struct CliArgs {
    /// Chunk side length in voxels.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Chunks remeshed per tick.
    #[arg(long)]
    pub remesh_budget: Option<usize>,

    /// Radius of the startup chunk cube.
    #[arg(long)]
    pub preload_radius: Option<i64>,

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
        if let Some(size) = args.chunk_size {
            self.chunk.size = size;
        }
        if let Some(budget) = args.remesh_budget {
            self.chunk.remesh_budget = budget;
        }
        if let Some(radius) = args.preload_radius {
            self.chunk.preload_radius = radius;
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
            chunk_size: Some(16),
            log_level: Some("trace".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.chunk.size, 16);
        assert_eq!(config.debug.log_level, "trace");
        // Non-overridden fields retain defaults
        assert_eq!(config.chunk.remesh_budget, 8);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from(["lattice", "--remesh-budget", "3", "--preload-radius", "2"])
            .unwrap();
        assert_eq!(args.remesh_budget, Some(3));
        assert_eq!(args.preload_radius, Some(2));
        assert!(args.config.is_none());
    }
}
