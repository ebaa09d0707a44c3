//! `coursegraph view` command implementation.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use coursegraph::Config;
use coursegraph::overlay::OverlayMergeEngine;
use coursegraph::persist::write_json_atomic;

/// File overrides for the view command.
pub struct ViewArgs {
    /// Base graph file
    pub graph: Option<PathBuf>,
    /// Rating overlay file
    pub ratings: Option<PathBuf>,
    /// Prerequisite overlay file
    pub prerequisites: Option<PathBuf>,
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
}

/// Run the view command.
pub fn run(config: &Config, args: &ViewArgs) -> Result<()> {
    let data = &config.data;
    let mut engine = OverlayMergeEngine::new(
        args.graph.clone().unwrap_or_else(|| data.graph_path()),
    )
    .with_ratings(args.ratings.clone().unwrap_or_else(|| data.ratings_path()))
    .with_prerequisites(
        args.prerequisites
            .clone()
            .unwrap_or_else(|| data.prerequisites_path()),
    );

    let served = engine.serve()?;
    for warning in &served.warnings {
        eprintln!("{}: {warning}", "warning".yellow().bold());
    }

    match &args.output {
        Some(path) => {
            write_json_atomic(path, &served.document)
                .with_context(|| format!("Failed to write served graph to {}", path.display()))?;
            tracing::info!(path = %path.display(), nodes = served.document.nodes.len(), "Served graph written");
        }
        None => {
            let json = serde_json::to_string_pretty(&served.document)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }

    Ok(())
}
