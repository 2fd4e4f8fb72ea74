//! Documentation generation pipeline.
//!
//! Files are processed one at a time in file-group order. Each file walks
//! `Pending -> ContextAssembled -> Generated -> Written -> Cached`; a failure
//! leaves the file out of both the artifacts and the cache.

use crate::cache::{save_cache, CacheEntry, DocumentationCache};
use crate::changes::{ChangeSet, FileChange};
use crate::context::{AssemblyOptions, ContextAssembler};
use crate::domain::Config;
use crate::error::{DocsError, Result};
use crate::generate::{documentation_request, update_request, Generator, PromptRequest};
use crate::graph::{CallGraphExplorer, GraphIndex, Reachability};
use crate::utils::{
    artifact_path, content_fingerprint, normalize_path, read_source, relative_to_root,
    resolve_source, retry_once,
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// How files are selected and prompted.
#[derive(Debug, Clone, Copy)]
pub enum RunMode<'a> {
    /// Document every file from scratch.
    Full,
    /// Update previously documented files from their recorded changes.
    Update(&'a ChangeSet),
}

impl RunMode<'_> {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Update(_) => "update",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStage {
    Pending,
    ContextAssembled,
    Generated,
    Written,
    Cached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Generated,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedFile {
    pub source_path: String,
    /// Last stage the file completed before failing.
    pub stage: FileStage,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub generated: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub excluded: usize,
    pub failed: Vec<FailedFile>,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub root_folder: PathBuf,
    pub output_dir: PathBuf,
    pub cache_path: PathBuf,
    pub assembly: AssemblyOptions,
    /// Persist the cache after this many processed files; 0 only at the end.
    pub flush_every: usize,
    pub save_debug: bool,
    pub fail_fast: bool,
    pub exclude: GlobSet,
}

impl PipelineOptions {
    pub fn new(root_folder: &Path, output_dir: &Path) -> Self {
        Self {
            root_folder: root_folder.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            cache_path: output_dir.join(crate::domain::DEFAULT_CACHE_FILE),
            assembly: AssemblyOptions::default(),
            flush_every: 1,
            save_debug: false,
            fail_fast: false,
            exclude: GlobSet::empty(),
        }
    }

    pub fn from_config(config: &Config, root_folder: &Path) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude_globs {
            let glob = Glob::new(pattern).map_err(|e| {
                DocsError::Config(format!("Invalid exclude glob '{pattern}': {e}"))
            })?;
            builder.add(glob);
        }
        let exclude = builder
            .build()
            .map_err(|e| DocsError::Config(format!("Invalid exclude globs: {e}")))?;

        Ok(Self {
            root_folder: root_folder.to_path_buf(),
            output_dir: config.output_dir.clone(),
            cache_path: config.cache_path(),
            assembly: AssemblyOptions {
                dedupe: config.dedupe_context,
                max_tokens: config.max_context_tokens,
            },
            flush_every: config.flush_every,
            save_debug: config.save_debug,
            fail_fast: config.fail_fast,
            exclude,
        })
    }
}

/// Planned work for one file after the cache lookup.
enum Plan<'c> {
    Create,
    Update { entry: CacheEntry, change: &'c FileChange },
    Skip,
}

pub struct GenerationPipeline<'a> {
    graph: &'a GraphIndex,
    reachable: Reachability,
    generator: &'a dyn Generator,
    options: PipelineOptions,
    progress: Option<ProgressBar>,
}

impl<'a> GenerationPipeline<'a> {
    /// Explores the whole graph once; the reachable sets are reused for
    /// every file of every run made with this pipeline.
    pub fn new(graph: &'a GraphIndex, generator: &'a dyn Generator, options: PipelineOptions) -> Self {
        let reachable = CallGraphExplorer::new(graph).explore();
        Self { graph, reachable, generator, options, progress: None }
    }

    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    pub fn run(&self, cache: &mut DocumentationCache, mode: RunMode<'_>) -> Result<RunSummary> {
        let started = Instant::now();
        let assembler = ContextAssembler::new(self.graph, &self.reachable, self.options.assembly);
        let mut summary = RunSummary::default();
        let mut since_flush = 0usize;

        tracing::info!(
            "Starting {} documentation run over {} file(s) with {}",
            mode.as_str(),
            self.graph.file_groups().len(),
            self.generator.name()
        );

        for source_path in self.graph.file_groups().keys() {
            if let Some(bar) = &self.progress {
                bar.set_message(source_path.clone());
                bar.inc(1);
            }
            let span = tracing::info_span!("file", path = %source_path);
            let _guard = span.enter();

            let relative = relative_to_root(Path::new(source_path), &self.options.root_folder);
            if self.options.exclude.is_match(&relative) {
                tracing::debug!("Excluded by glob");
                summary.excluded += 1;
                continue;
            }

            let mut stage = FileStage::Pending;
            match self.process_file(source_path, &relative, &assembler, cache, mode, &mut stage) {
                Ok(FileOutcome::Generated) => summary.generated += 1,
                Ok(FileOutcome::Updated) => summary.updated += 1,
                Ok(FileOutcome::Unchanged) => {
                    summary.unchanged += 1;
                    continue;
                }
                Err(err) => {
                    if self.options.fail_fast {
                        return Err(err);
                    }
                    tracing::warn!("Skipping {} after {:?}: {}", source_path, stage, err);
                    summary.failed.push(FailedFile {
                        source_path: source_path.clone(),
                        stage,
                        error: err.to_string(),
                    });
                    continue;
                }
            }

            since_flush += 1;
            if self.options.flush_every > 0 && since_flush >= self.options.flush_every {
                self.persist(cache)?;
                since_flush = 0;
            }
        }

        self.persist(cache)?;
        summary.elapsed_secs = started.elapsed().as_secs_f64();
        tracing::info!(
            "Documentation run finished in {:.3}s: {} generated, {} updated, {} unchanged, {} failed",
            summary.elapsed_secs,
            summary.generated,
            summary.updated,
            summary.unchanged,
            summary.failed.len()
        );
        Ok(summary)
    }

    fn process_file(
        &self,
        source_path: &str,
        relative: &Path,
        assembler: &ContextAssembler<'_>,
        cache: &mut DocumentationCache,
        mode: RunMode<'_>,
        stage: &mut FileStage,
    ) -> Result<FileOutcome> {
        let absolute = resolve_source(Path::new(source_path), &self.options.root_folder);
        let content = read_source(&absolute).map_err(|e| DocsError::io(&absolute, e))?;
        let fingerprint = content_fingerprint(&content);
        let relative_key = normalize_path(&relative.to_string_lossy());
        let file_name = Path::new(source_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_path.to_string());

        let plan = match mode {
            RunMode::Full => Plan::Create,
            RunMode::Update(changes) => plan_update(cache, source_path, &relative_key, &fingerprint, changes),
        };

        let (request, artifact, outcome) = match plan {
            Plan::Skip => {
                tracing::debug!("Unchanged since last run");
                return Ok(FileOutcome::Unchanged);
            }
            Plan::Create => {
                tracing::info!("Generating documentation for file={}", source_path);
                let context = assembler.assemble(source_path);
                *stage = FileStage::ContextAssembled;
                tracing::debug!("Assembled {} context block(s), ~{} tokens", context.blocks, context.tokens);
                let request = documentation_request(
                    &file_name,
                    &content,
                    &self.options.root_folder.to_string_lossy(),
                    &context.text,
                );
                (request, artifact_path(&self.options.output_dir, relative), FileOutcome::Generated)
            }
            Plan::Update { entry, change } => {
                tracing::info!("Updating documentation for file={}", source_path);
                let old_docs = match entry.previous_doc {
                    Some(doc) => doc,
                    None => std::fs::read_to_string(&entry.artifact_path)
                        .map_err(|e| DocsError::io(&entry.artifact_path, e))?,
                };
                *stage = FileStage::ContextAssembled;
                let request = update_request(
                    &file_name,
                    &old_docs,
                    &change.old_content,
                    &change.new_content,
                    &change.diff,
                    &change.changes,
                );
                (request, PathBuf::from(&entry.artifact_path), FileOutcome::Updated)
            }
        };

        if self.options.save_debug {
            self.save_prompt_debug(relative, &request);
        }

        let docs = self
            .generator
            .complete(&request)
            .map_err(|e| DocsError::generation(source_path, e))?;
        *stage = FileStage::Generated;

        retry_once("Writing documentation", || write_artifact(&artifact, &docs))?;
        *stage = FileStage::Written;

        cache.insert(
            source_path,
            CacheEntry {
                artifact_path: normalize_path(&artifact.to_string_lossy()),
                fingerprint: Some(fingerprint),
                previous_doc: Some(docs),
            },
        )?;
        *stage = FileStage::Cached;
        Ok(outcome)
    }

    fn persist(&self, cache: &DocumentationCache) -> Result<()> {
        retry_once("Persisting cache", || save_cache(cache, &self.options.cache_path))
    }

    /// Diagnostic side file; a failure here never fails the file.
    fn save_prompt_debug(&self, relative: &Path, request: &PromptRequest) {
        let mut name = self.options.output_dir.join(".prompts").join(relative).into_os_string();
        name.push(format!(".{}.txt", request.mode.as_str()));
        let path = PathBuf::from(name);
        if let Err(e) = write_artifact(&path, &request.transcript()) {
            tracing::warn!("Could not save prompt debug file: {}", e);
        }
    }
}

fn plan_update<'c>(
    cache: &DocumentationCache,
    source_path: &str,
    relative_key: &str,
    fingerprint: &str,
    changes: &'c ChangeSet,
) -> Plan<'c> {
    let Some(entry) = cache.lookup(source_path) else {
        return Plan::Create;
    };
    let artifact_exists = Path::new(&entry.artifact_path).exists();
    if artifact_exists && entry.fingerprint.as_deref() == Some(fingerprint) {
        tracing::debug!("Documentation already matches current content");
        return Plan::Skip;
    }
    if let Some(change) = changes.get(relative_key) {
        if entry.previous_doc.is_none() && !artifact_exists {
            tracing::warn!(
                "No previous documentation for {} ({} is missing), regenerating",
                source_path,
                entry.artifact_path
            );
            return Plan::Create;
        }
        return Plan::Update { entry: entry.clone(), change };
    }
    // Entries without a fingerprint predate fingerprinting; trust the artifact.
    if artifact_exists && entry.fingerprint.is_none() {
        Plan::Skip
    } else {
        tracing::debug!("Content changed without a recorded diff, regenerating");
        Plan::Create
    }
}

fn write_artifact(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DocsError::io(parent, e))?;
    }
    std::fs::write(path, text).map_err(|e| DocsError::io(path, e))
}
