//! Path normalization and source/artifact path mapping

use std::path::{Component, Path, PathBuf};

pub fn normalize_path(path: &str) -> String {
    // Convert backslashes to forward slashes and normalize
    path.replace('\\', "/")
}

/// Location of `source` relative to `root`, reduced to plain components so
/// that joining it under an output directory can never escape it.
pub fn relative_to_root(source: &Path, root: &Path) -> PathBuf {
    if let Ok(rel) = source.strip_prefix(root) {
        return plain_components(rel);
    }
    if source.is_absolute() {
        if let Ok(canonical_root) = root.canonicalize() {
            if let Ok(rel) = source.strip_prefix(&canonical_root) {
                return plain_components(rel);
            }
        }
    }
    plain_components(source)
}

/// Where to read `source` from: graph paths are either absolute, already
/// prefixed with the root folder, or relative to it.
pub fn resolve_source(source: &Path, root: &Path) -> PathBuf {
    if source.is_absolute() || source.starts_with(root) {
        source.to_path_buf()
    } else {
        root.join(source)
    }
}

/// `{output_dir}/{relative}.md`
pub fn artifact_path(output_dir: &Path, relative: &Path) -> PathBuf {
    let mut name = output_dir.join(relative).into_os_string();
    name.push(".md");
    PathBuf::from(name)
}

fn plain_components(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}
