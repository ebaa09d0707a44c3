//! CLI command implementations.

pub mod build;
pub mod context;
pub mod resolve;
pub mod sentiment;
pub mod view;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use coursegraph::Config;
use coursegraph::resolver::PrerequisiteResolver;

/// Load configuration and apply the global `--data-dir` override.
pub fn load_config(path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::discover(path).context("Failed to load configuration")?;
    if let Some(dir) = data_dir {
        config.data.dir = dir;
    }
    tracing::debug!(data_dir = %config.data.dir.display(), "Configuration loaded");
    Ok(config)
}

/// Resolver for the configured backend, or pattern-only when asked.
fn resolver(config: &Config, no_completion: bool) -> PrerequisiteResolver {
    if no_completion {
        PrerequisiteResolver::regex_only()
    } else {
        PrerequisiteResolver::from_config(&config.completion)
    }
}
