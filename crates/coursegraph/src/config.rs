//! Configuration management for coursegraph.
//!
//! Configuration lives in a YAML file (`coursegraph.yaml` by default). Every
//! field has a default, so an empty or absent file is a valid configuration.
//! CLI flags override values loaded from the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "coursegraph.yaml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output file locations
    pub data: DataConfig,
    /// Text-completion backend used for prerequisite extraction
    pub completion: CompletionConfig,
    /// PageRank parameters
    pub centrality: CentralityConfig,
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from `path` if given, otherwise from
    /// `coursegraph.yaml` in the working directory if it exists, otherwise
    /// the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file cannot be loaded, or the
    /// implicit file exists but is invalid.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let implicit = Path::new(CONFIG_FILE_NAME);
                if implicit.is_file() {
                    Self::load(implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration to a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Data file locations. File names are relative to `dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Data directory
    pub dir: PathBuf,
    /// Scraped course catalog
    pub catalog: String,
    /// Base sentiment map
    pub sentiment: String,
    /// Persisted base graph
    pub graph: String,
    /// Rating overlay
    pub ratings: String,
    /// Prerequisite-edge overlay
    pub prerequisites: String,
    /// Forum comments feeding the sentiment scorer
    pub comments: String,
}

impl DataConfig {
    /// Path of the course catalog.
    #[must_use]
    pub fn catalog_path(&self) -> PathBuf {
        self.dir.join(&self.catalog)
    }

    /// Path of the base sentiment map.
    #[must_use]
    pub fn sentiment_path(&self) -> PathBuf {
        self.dir.join(&self.sentiment)
    }

    /// Path of the persisted base graph.
    #[must_use]
    pub fn graph_path(&self) -> PathBuf {
        self.dir.join(&self.graph)
    }

    /// Path of the rating overlay.
    #[must_use]
    pub fn ratings_path(&self) -> PathBuf {
        self.dir.join(&self.ratings)
    }

    /// Path of the prerequisite-edge overlay.
    #[must_use]
    pub fn prerequisites_path(&self) -> PathBuf {
        self.dir.join(&self.prerequisites)
    }

    /// Path of the forum comments file.
    #[must_use]
    pub fn comments_path(&self) -> PathBuf {
        self.dir.join(&self.comments)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            catalog: "raw_courses.json".to_string(),
            sentiment: "sentiment_scores.json".to_string(),
            graph: "graph_data.json".to_string(),
            ratings: "rmp_data.json".to_string(),
            prerequisites: "prerequisites.json".to_string(),
            comments: "reddit_comments.json".to_string(),
        }
    }
}

/// Text-completion backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Whether to try the completion backend at all
    pub enabled: bool,
    /// API base URL
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Upper bound on a single request, in seconds
    pub timeout_secs: u64,
}

impl CompletionConfig {
    /// The API key, if the configured environment variable is set and non-empty.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 20,
        }
    }
}

/// PageRank parameters. Pinned so centrality values are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralityConfig {
    /// Probability of following an edge instead of teleporting
    pub damping: f64,
    /// Power iteration cap
    pub max_iterations: usize,
    /// Per-node convergence tolerance
    pub tolerance: f64,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1.0e-6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "data:\n  dir: /srv/courses\ncompletion:\n  enabled: false\n")
            .unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.data.dir, PathBuf::from("/srv/courses"));
        assert_eq!(config.data.graph, "graph_data.json");
        assert!(!config.completion.enabled);
        assert_eq!(config.completion.model, "gemini-2.5-flash");
        assert_eq!(config.centrality, CentralityConfig::default());
    }

    #[test]
    fn empty_file_is_default_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "").unwrap();

        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "data: [unclosed").unwrap();

        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = Config::default();
        config.centrality.damping = 0.9;
        config.data.ratings = "ratings.json".to_string();

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn data_paths_are_joined_onto_data_dir() {
        let data = DataConfig {
            dir: PathBuf::from("/tmp/cg"),
            ..DataConfig::default()
        };

        assert_eq!(data.graph_path(), PathBuf::from("/tmp/cg/graph_data.json"));
        assert_eq!(data.ratings_path(), PathBuf::from("/tmp/cg/rmp_data.json"));
    }
}
