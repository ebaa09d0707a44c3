//! # coursegraph: course prerequisite graph construction and overlay merging
//!
//! Turns a scraped course catalog into a directed prerequisite graph annotated
//! with difficulty and enjoyment signals, and serves it with independently
//! updated overlays merged in at read time.
//!
//! ## Pipeline
//!
//! ```text
//! catalog -> PrerequisiteResolver -> GraphBuilder -> CourseGraph -> graph_data.json
//!                                                                        |
//!                        rating overlay, prerequisite overlay --> OverlayMergeEngine -> served graph
//! ```
//!
//! - [`resolver`] extracts course codes from free-text prerequisite clauses,
//!   trying a text-completion backend first and a pattern scan last.
//! - [`graph`] builds the graph, computes degrees and PageRank centrality, and
//!   converts to and from the node-link document.
//! - [`overlay`] merges optional overlays onto the persisted base graph without
//!   ever modifying it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use coursegraph::graph::{GraphBuilder, load_catalog, load_sentiment};
//! use coursegraph::overlay::OverlayMergeEngine;
//! use coursegraph::Config;
//!
//! let config = Config::default();
//! let courses = load_catalog(&config.data.catalog_path())?;
//! let sentiment = load_sentiment(&config.data.sentiment_path());
//!
//! let graph = GraphBuilder::default().build(&courses, &sentiment);
//! graph.save(&config.data.graph_path())?;
//!
//! let mut engine = OverlayMergeEngine::from_config(&config.data);
//! let served = engine.serve()?;
//! println!("{} courses, {} links", served.document.nodes.len(), served.document.links.len());
//! # Ok::<(), coursegraph::Error>(())
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod graph;
pub mod lookup;
pub mod overlay;
pub mod persist;
pub mod resolver;
pub mod sentiment;
pub mod types;

mod error;

pub use config::Config;
pub use error::{Error, OverlayKind, OverlayWarning, Result};
pub use graph::{CourseGraph, GraphSummary};
