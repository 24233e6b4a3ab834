use std::path::PathBuf;

use clap::Parser;

use crate::data::aggregate::ViewLimits;

/// File name of the bundled open-data extract.
pub const DATA_FILE: &str = "bev353od3530.csv";

/// Bundled dataset location: `data/` next to the crate manifest.
pub fn default_data_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("data")
        .join(DATA_FILE)
}

/// Explore residential moves into Zurich.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// CSV file to open instead of the bundled dataset
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,
}

/// Startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub limits: ViewLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            limits: ViewLimits::default(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process arguments.
    pub fn from_args() -> Self {
        Self::from_cli(Cli::parse())
    }

    fn from_cli(cli: Cli) -> Self {
        let mut config = AppConfig::default();
        if let Some(path) = cli.data {
            config.data_path = path;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_bundled_file() {
        let config = AppConfig::from_cli(Cli::parse_from(["zurich-arrivals"]));
        assert!(config.data_path.ends_with("data/bev353od3530.csv"));
        assert_eq!(config.limits, ViewLimits::default());
    }

    #[test]
    fn data_flag_overrides_path() {
        let config =
            AppConfig::from_cli(Cli::parse_from(["zurich-arrivals", "--data", "/tmp/moves.csv"]));
        assert_eq!(config.data_path, PathBuf::from("/tmp/moves.csv"));
    }
}
