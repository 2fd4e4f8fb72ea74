//! Error kinds surfaced by the documentation pipeline.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DocsError>;

#[derive(Error, Debug)]
pub enum DocsError {
    /// A node calls an id that is not part of the graph.
    #[error("Malformed call graph: node '{node}' calls unknown node '{missing}'")]
    MalformedGraph { node: String, missing: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Documentation generation failed for {file}: {source}")]
    Generation {
        file: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("{0}")]
    Config(String),
}

impl DocsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn generation(file: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Generation { file: file.into(), source: source.into() }
    }
}
