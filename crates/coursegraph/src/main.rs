//! coursegraph CLI - build and serve the course prerequisite graph.
//!
//! `build` runs the offline pipeline that writes the base graph; `view` serves
//! it with overlays merged in. The remaining commands expose individual
//! pipeline stages.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// coursegraph: course prerequisite graph builder and overlay server.
#[derive(Parser)]
#[command(name = "coursegraph")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to ./coursegraph.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory, overriding the configured one
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the base graph from the course catalog
    Build {
        /// Catalog file (defaults to the configured one)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Sentiment scores file (defaults to the configured one)
        #[arg(long)]
        sentiment: Option<PathBuf>,

        /// Output graph file (defaults to the configured one)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Resolve prerequisites with the pattern scan only
        #[arg(long)]
        no_completion: bool,
    },

    /// Print the served graph with overlays merged in
    View {
        /// Base graph file (defaults to the configured one)
        #[arg(long)]
        graph: Option<PathBuf>,

        /// Rating overlay file (defaults to the configured one)
        #[arg(long)]
        ratings: Option<PathBuf>,

        /// Prerequisite overlay file (defaults to the configured one)
        #[arg(long)]
        prerequisites: Option<PathBuf>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract course codes from a prerequisite clause
    Resolve {
        /// Free-text prerequisite clause
        text: String,

        /// Use the pattern scan only
        #[arg(long)]
        no_completion: bool,
    },

    /// Score forum comments into base sentiment
    Sentiment {
        /// Comments file (defaults to the configured one)
        #[arg(long)]
        comments: Option<PathBuf>,

        /// Output scores file (defaults to the configured sentiment file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print review and rating context for courses
    Context {
        /// Course codes (e.g., "CS 3110")
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = cli::load_config(cli.config.as_deref(), cli.data_dir).and_then(|config| {
        match cli.command {
            Commands::Build {
                catalog,
                sentiment,
                output,
                no_completion,
            } => cli::build::run(
                &config,
                &cli::build::BuildArgs {
                    catalog,
                    sentiment,
                    output,
                    no_completion,
                },
            ),
            Commands::View {
                graph,
                ratings,
                prerequisites,
                output,
            } => cli::view::run(
                &config,
                &cli::view::ViewArgs {
                    graph,
                    ratings,
                    prerequisites,
                    output,
                },
            ),
            Commands::Resolve {
                text,
                no_completion,
            } => cli::resolve::run(&config, &text, no_completion),
            Commands::Sentiment { comments, output } => {
                cli::sentiment::run(&config, comments, output)
            }
            Commands::Context { codes } => cli::context::run(&config, &codes),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {cause}", "caused by".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}
