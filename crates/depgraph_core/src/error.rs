//! Error types for depgraph_core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the analyzer error
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Errors that can occur while building a dependency graph.
///
/// Configuration errors are fatal before any processing starts. File access
/// errors are recovered per file and surfaced as [`SkippedFile`] records.
/// A malformed graph is an internal consistency failure and stops the run
/// before anything is written.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Project root is missing or not a directory
    #[error("Invalid project root {0}")]
    InvalidRoot(PathBuf),

    /// Source directory is missing under the project root
    #[error("Source directory not found: {0}")]
    MissingSourceDir(PathBuf),

    /// No root was given and no enclosing git repository exists
    #[error("Could not find .git directory in any parent folder")]
    GitRootNotFound,

    /// A candidate file or directory could not be read
    #[error("Failed to read {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The finished graph violates its own invariants
    #[error("Malformed graph document: {0}")]
    MalformedGraph(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A file or directory excluded from analysis because it could not be read.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

impl SkippedFile {
    pub fn new(path: impl Into<String>, reason: impl ToString) -> Self {
        Self { path: path.into(), reason: reason.to_string() }
    }
}
