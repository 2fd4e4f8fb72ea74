//! Per-file change information driving incremental updates.

use crate::error::{DocsError, Result};
use crate::utils::encoding::decode_source;
use crate::utils::{normalize_path, read_source};
use git2::{Delta, DiffOptions, Oid, Patch, Repository};
use std::collections::BTreeMap;
use std::path::Path;

/// What changed in one source file since it was last documented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub old_content: String,
    pub new_content: String,
    /// Unified diff between old and new content.
    pub diff: String,
    /// Human-readable description of the change.
    pub changes: String,
}

/// Root-relative source path to its change.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    files: BTreeMap<String, FileChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, relative_path: &str, change: FileChange) {
        self.files.insert(normalize_path(relative_path), change);
    }

    pub fn get(&self, relative_path: &str) -> Option<&FileChange> {
        self.files.get(relative_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Diff `base_ref` against the working tree (staged changes included) of
    /// the repository containing `root`. Paths outside `root` and deleted
    /// files are ignored. Every change shares one description built from the
    /// subjects of the commits in `base_ref..HEAD`.
    pub fn from_git(root: &Path, base_ref: &str) -> Result<Self> {
        let repo = Repository::discover(root)?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| DocsError::Config("Repository has no working tree".to_string()))?;
        let workdir = workdir.canonicalize().map_err(|e| DocsError::io(workdir, e))?;
        let root_abs = root.canonicalize().map_err(|e| DocsError::io(root, e))?;

        let base = repo.revparse_single(base_ref)?;
        let base_tree = base.peel_to_tree()?;
        let base_commit = base.peel_to_commit()?;
        let description = describe_commits(&repo, base_commit.id())?;

        let mut opts = DiffOptions::new();
        opts.include_untracked(false);
        let diff = repo.diff_tree_to_workdir_with_index(Some(&base_tree), Some(&mut opts))?;

        let mut set = ChangeSet::new();
        for idx in 0..diff.deltas().len() {
            let Some(delta) = diff.get_delta(idx) else {
                continue;
            };
            if delta.status() == Delta::Deleted {
                continue;
            }
            let Some(repo_path) = delta.new_file().path() else {
                continue;
            };
            let absolute = workdir.join(repo_path);
            let Ok(relative) = absolute.strip_prefix(&root_abs) else {
                continue;
            };

            let old_content = if delta.status() == Delta::Added {
                String::new()
            } else {
                let blob = repo.find_blob(delta.old_file().id())?;
                decode_source(blob.content())
            };
            let new_content = match read_source(&absolute) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!("Skipping change for {}: {}", absolute.display(), e);
                    continue;
                }
            };
            let patch_text = match Patch::from_diff(&diff, idx)? {
                Some(mut patch) => String::from_utf8_lossy(&patch.to_buf()?).into_owned(),
                None => String::new(),
            };

            set.insert(
                &relative.to_string_lossy(),
                FileChange {
                    old_content,
                    new_content,
                    diff: patch_text,
                    changes: description.clone(),
                },
            );
        }

        tracing::debug!("Collected {} changed file(s) since {}", set.len(), base_ref);
        Ok(set)
    }
}

fn describe_commits(repo: &Repository, base: Oid) -> Result<String> {
    let mut walk = repo.revwalk()?;
    walk.push_head()?;
    walk.hide(base)?;

    let mut lines = Vec::new();
    for oid in walk {
        let commit = repo.find_commit(oid?)?;
        if let Some(summary) = commit.summary() {
            lines.push(format!("- {summary}"));
        }
    }
    if lines.is_empty() {
        lines.push("- Uncommitted working tree changes".to_string());
    }
    Ok(lines.join("\n"))
}
