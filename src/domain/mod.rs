//! Core data types shared across the crate.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Sentinel file name marking definitions outside the analyzed repository.
pub const EXTERNAL: &str = "EXTERNAL";

pub const DEFAULT_OUTPUT_DIR: &str = "docs_output";
pub const DEFAULT_GRAPH_FILE: &str = "call_graph.json";
pub const DEFAULT_CACHE_FILE: &str = "cache.json";
pub const REPORT_FILE: &str = "run-report.json";
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// A function or class definition in the call graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub file_name: String,
    pub content: String,
    /// Ids this node calls, first occurrence order, no duplicates.
    pub callees: Vec<String>,
}

impl Node {
    pub fn is_external(&self) -> bool {
        self.file_name == EXTERNAL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    #[default]
    Ollama,
    Offline,
}

/// Run configuration after file, environment and CLI layers are merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub root_folder: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub graph_path: Option<PathBuf>,
    pub cache_file: String,
    pub generator: GeneratorKind,
    pub model: String,
    pub endpoint: String,
    pub request_timeout_secs: u64,
    pub dedupe_context: bool,
    /// 0 disables the budget.
    pub max_context_tokens: usize,
    pub save_debug: bool,
    /// 0 persists the cache once at the end of the run.
    pub flush_every: usize,
    pub fail_fast: bool,
    #[serde(deserialize_with = "deserialize_csv_list")]
    pub exclude_globs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_folder: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            graph_path: None,
            cache_file: DEFAULT_CACHE_FILE.to_string(),
            generator: GeneratorKind::Ollama,
            model: "llama3".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            request_timeout_secs: 300,
            dedupe_context: true,
            max_context_tokens: 16_000,
            save_debug: false,
            flush_every: 1,
            fail_fast: false,
            exclude_globs: Vec::new(),
        }
    }
}

impl Config {
    /// Graph location, defaulting to `{output_dir}/call_graph.json`.
    pub fn graph_path(&self) -> PathBuf {
        self.graph_path.clone().unwrap_or_else(|| self.output_dir.join(DEFAULT_GRAPH_FILE))
    }

    pub fn cache_path(&self) -> PathBuf {
        self.output_dir.join(&self.cache_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE)
    }
}

/// Accept either a list of strings or a single comma-separated string.
fn deserialize_csv_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum CsvOrList {
        Csv(String),
        List(Vec<String>),
    }

    let items = match CsvOrList::deserialize(deserializer)? {
        CsvOrList::Csv(value) => value.split(',').map(str::to_string).collect::<Vec<_>>(),
        CsvOrList::List(values) => values,
    };
    Ok(items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}
