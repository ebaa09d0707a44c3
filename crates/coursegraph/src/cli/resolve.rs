//! `coursegraph resolve` command implementation.

use anyhow::Result;
use coursegraph::Config;

/// Run the resolve command, printing the codes as a JSON array.
pub fn run(config: &Config, text: &str, no_completion: bool) -> Result<()> {
    let codes = super::resolver(config, no_completion).resolve(text);
    println!("{}", serde_json::to_string(&codes)?);
    Ok(())
}
