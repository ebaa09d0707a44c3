//! `coursegraph context` command implementation.

use anyhow::Result;
use colored::Colorize;
use coursegraph::Config;
use coursegraph::lookup::CourseLookup;
use coursegraph::overlay::OverlayMergeEngine;

/// Run the context command.
pub fn run(config: &Config, codes: &[String]) -> Result<()> {
    let mut engine = OverlayMergeEngine::from_config(&config.data);
    let base = engine.base()?;
    let ratings = engine.ratings();

    let lookup = CourseLookup::new(&base, ratings.as_deref());
    let context = lookup.format_context(codes);

    if context.is_empty() {
        println!("{}", "No review or rating data for these courses.".dimmed());
    } else {
        println!("{context}");
    }
    Ok(())
}
