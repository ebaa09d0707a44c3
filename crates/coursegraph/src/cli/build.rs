//! `coursegraph build` command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use coursegraph::Config;
use coursegraph::graph::{GraphBuilder, load_catalog, load_sentiment};

/// File overrides for the build command.
pub struct BuildArgs {
    /// Catalog file
    pub catalog: Option<PathBuf>,
    /// Sentiment scores file
    pub sentiment: Option<PathBuf>,
    /// Output graph file
    pub output: Option<PathBuf>,
    /// Skip the text-completion backend
    pub no_completion: bool,
}

/// Run the build command.
pub fn run(config: &Config, args: &BuildArgs) -> Result<()> {
    let catalog_path = args
        .catalog
        .clone()
        .unwrap_or_else(|| config.data.catalog_path());
    let sentiment_path = args
        .sentiment
        .clone()
        .unwrap_or_else(|| config.data.sentiment_path());
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| config.data.graph_path());

    let courses = load_catalog(&catalog_path)?;
    let sentiment = load_sentiment(&sentiment_path);

    let builder = GraphBuilder::new(
        super::resolver(config, args.no_completion),
        config.centrality,
    );
    let graph = builder.build(&courses, &sentiment);
    graph
        .save(&output_path)
        .with_context(|| format!("Failed to write graph to {}", output_path.display()))?;

    let summary = graph.summary();
    println!("{}", "Course graph built".cyan().bold());
    println!();
    println!(
        "  {}: {}",
        "Courses".white().bold(),
        summary.nodes.to_string().green()
    );
    println!(
        "  {}: {}",
        "Prerequisite edges".white().bold(),
        summary.edges.to_string().green()
    );
    println!(
        "  {}: {:.2} in, {:.2} out",
        "Average degree".white().bold(),
        summary.avg_in_degree,
        summary.avg_out_degree
    );
    println!(
        "  {}: {}",
        "Sentiment coverage".white().bold(),
        format!("{} courses", sentiment.len()).dimmed()
    );
    println!();
    println!("  {}: {}", "Saved".white().bold(), output_path.display());

    Ok(())
}
