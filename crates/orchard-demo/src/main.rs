//! Orchard: click apples off the tree, then onto the desk.

mod camera;
mod controls;
mod project;
mod props;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use orchard_engine::device::GpuInit;
use orchard_engine::logging::{init_logging, LoggingConfig};
use orchard_engine::window::{Runtime, RuntimeConfig};
use orchard_sim::{Orchard, OrchardConfig};

use crate::project::Project;

#[derive(Debug, Parser)]
#[command(name = "orchard", about = "Interactive apple-picking scene")]
struct Cli {
    /// Seed for the skyline layout.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Number of buildings around the orchard.
    #[arg(long)]
    buildings: Option<usize>,

    /// Apples the tree grows.
    #[arg(long)]
    apples: Option<u8>,

    /// Sky dome texture.
    #[arg(long, default_value = "assets/sky.png")]
    sky: PathBuf,

    /// Log filter, env_logger syntax (overrides RUST_LOG).
    #[arg(long)]
    log: Option<String>,
}

impl Cli {
    fn orchard_config(&self) -> OrchardConfig {
        let mut config = OrchardConfig::default();
        if let Some(n) = self.buildings {
            config.buildings.count = n;
        }
        if let Some(n) = self.apples {
            config.capacity = n;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(match &cli.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    let orchard = Orchard::new(cli.orchard_config(), cli.seed).context("invalid orchard configuration")?;
    let app = Project::new(orchard, cli.sky.clone());

    log::info!("orchard: seed {}, sky texture {}", cli.seed, cli.sky.display());
    Runtime::run(RuntimeConfig::default(), GpuInit::default(), app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["orchard"]);
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.sky, PathBuf::from("assets/sky.png"));
        assert_eq!(cli.orchard_config(), OrchardConfig::default());
    }

    #[test]
    fn cli_overrides_reach_the_config() {
        let cli = Cli::parse_from(["orchard", "--seed", "3", "--buildings", "10", "--apples", "5"]);
        let config = cli.orchard_config();
        assert_eq!(cli.seed, 3);
        assert_eq!(config.buildings.count, 10);
        assert_eq!(config.capacity, 5);
    }

    #[test]
    fn zero_apples_is_rejected_at_construction() {
        let cli = Cli::parse_from(["orchard", "--apples", "0"]);
        assert!(Orchard::new(cli.orchard_config(), cli.seed).is_err());
    }
}
