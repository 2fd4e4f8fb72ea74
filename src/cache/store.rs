//! Loading and atomically saving the cache file.

use super::{CacheRecord, DocumentationCache};
use crate::error::{DocsError, Result};
use std::path::Path;

/// Load the cache at `path`; a missing file yields an empty cache.
pub fn load_cache(path: &Path) -> Result<DocumentationCache> {
    if !path.exists() {
        tracing::debug!("No cache at {}, starting empty", path.display());
        return Ok(DocumentationCache::new());
    }
    let text = std::fs::read_to_string(path).map_err(|e| DocsError::io(path, e))?;
    let record: CacheRecord = serde_json::from_str(&text)?;
    DocumentationCache::from_record(record)
}

/// Write the cache as pretty JSON via a temp file and rename, so readers
/// only ever observe a complete record.
pub fn save_cache(cache: &DocumentationCache, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocsError::io(parent, e))?;
    }

    let bytes = serde_json::to_vec_pretty(&cache.to_record())?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes).map_err(|e| DocsError::io(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| DocsError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheEntry;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_cache_file_loads_empty() {
        let tmp = TempDir::new().expect("tmp");
        let cache = load_cache(&tmp.path().join("cache.json")).expect("load");
        assert!(cache.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("nested").join("cache.json");

        let mut cache = DocumentationCache::new();
        cache.add("main.py", "out/main.py.md").expect("add");
        cache
            .insert(
                "lib/a.py",
                CacheEntry {
                    artifact_path: "out/lib/a.py.md".to_string(),
                    fingerprint: Some("abc123".to_string()),
                    previous_doc: Some("# a.py\n".to_string()),
                },
            )
            .expect("insert");

        save_cache(&cache, &path).expect("save");
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(load_cache(&path).expect("load"), cache);
    }

    #[test]
    fn loads_legacy_flat_record() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("cache.json");
        fs::write(&path, r#"{"src/main.py": "out/src/main.py.md"}"#).expect("write");

        let cache = load_cache(&path).expect("load");
        assert_eq!(cache.lookup("src/main.py"), Some(&CacheEntry::new("out/src/main.py.md")));
    }

    #[test]
    fn corrupt_cache_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("cache.json");
        fs::write(&path, "{not json").expect("write");
        assert!(matches!(load_cache(&path), Err(DocsError::Json(_))));
    }
}
