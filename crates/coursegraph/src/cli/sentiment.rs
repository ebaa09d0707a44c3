//! `coursegraph sentiment` command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use coursegraph::Config;
use coursegraph::persist::write_json_atomic;
use coursegraph::sentiment::{load_comments, score_all};
use coursegraph::types::Confidence;

/// Run the sentiment command.
pub fn run(config: &Config, comments: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let comments_path = comments.unwrap_or_else(|| config.data.comments_path());
    let output_path = output.unwrap_or_else(|| config.data.sentiment_path());

    let scores = score_all(&load_comments(&comments_path));
    write_json_atomic(&output_path, &scores)
        .with_context(|| format!("Failed to write scores to {}", output_path.display()))?;

    println!("{}", "Forum sentiment scored".cyan().bold());
    println!();
    println!(
        "  {}: {}",
        "Courses".white().bold(),
        scores.len().to_string().green()
    );
    for tier in [Confidence::High, Confidence::Medium, Confidence::Low] {
        let count = scores.values().filter(|s| s.confidence == tier).count();
        println!("    {}: {count}", tier.as_str().dimmed());
    }
    println!();
    println!("  {}: {}", "Saved".white().bold(), output_path.display());

    Ok(())
}
