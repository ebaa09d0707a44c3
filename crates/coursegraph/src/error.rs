//! Error types for coursegraph operations.
//!
//! Errors fall into three groups:
//!
//! - **Fatal to the batch**: the course catalog is the only mandatory input of a
//!   build. [`Error::Catalog`] aborts the build.
//! - **Surfaced to the caller**: the persisted base graph is the ground truth the
//!   overlays depend on. [`Error::BaseDocument`] is returned instead of a partial view.
//! - **Recoverable and silent**: missing or malformed overlays, missing sentiment
//!   entries, completion failures. These never become an `Error` outside the
//!   component that observed them. Overlay problems are reported as
//!   [`OverlayWarning`] values next to the served document.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for coursegraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for coursegraph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration file or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// The course catalog is missing or unreadable
    #[error("course catalog {}: {reason}", path.display())]
    Catalog {
        /// Path the catalog was read from
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The persisted base graph is missing or malformed
    #[error("base graph document {}: {reason}", path.display())]
    BaseDocument {
        /// Path the document was read from
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The text-completion backend failed or returned garbage
    #[error("text completion failed: {0}")]
    Completion(String),
}

impl Error {
    /// Create a catalog error.
    #[must_use]
    pub fn catalog(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Catalog {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a base document error.
    #[must_use]
    pub fn base_document(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::BaseDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Which optional overlay a warning is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// Per-course instructor rating aggregates
    Ratings,
    /// Per-course prerequisite lists
    Prerequisites,
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ratings => write!(f, "rating overlay"),
            Self::Prerequisites => write!(f, "prerequisite overlay"),
        }
    }
}

/// A non-fatal problem with an overlay document.
///
/// The overlay is treated as absent and the merge continues with the base graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayWarning {
    /// Overlay the problem belongs to
    pub kind: OverlayKind,
    /// Path of the overlay file
    pub path: PathBuf,
    /// Human-readable description
    pub message: String,
}

impl OverlayWarning {
    /// Create a new overlay warning.
    #[must_use]
    pub fn new(kind: OverlayKind, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for OverlayWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.path.display(), self.message)
    }
}
