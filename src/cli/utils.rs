//! Shared CLI utilities.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::config::{apply_env_overrides, load_config, merge_cli_with_config, CliOverrides};
use crate::domain::Config;

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Repository root and the fully layered configuration.
pub struct Resolved {
    pub root: PathBuf,
    pub config: Config,
}

/// Layer file, environment and command-line settings for a repository at
/// `root` (the current directory when not given).
pub fn resolve_config(
    root: Option<&Path>,
    config_path: Option<&Path>,
    overrides: CliOverrides,
) -> Result<Resolved> {
    let anchor = match root {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Cannot determine current directory")?,
    };
    if !anchor.is_dir() {
        anyhow::bail!("Root folder is not a directory: {}", anchor.display());
    }

    let file_config = load_config(&anchor, config_path)?;
    let env_config = apply_env_overrides(file_config)?;
    let config = merge_cli_with_config(env_config, overrides);
    let root = config.root_folder.clone().unwrap_or(anchor);
    Ok(Resolved { root, config })
}

/// Per-file progress on stderr; hidden when stderr is not a terminal or when
/// verbose logging would interleave with it.
pub fn progress_bar(len: usize, verbose: bool) -> ProgressBar {
    if verbose || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}
