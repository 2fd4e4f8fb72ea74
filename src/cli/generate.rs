//! Generate command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use super::utils::{parse_csv, progress_bar, resolve_config, Resolved};
use crate::cache::{load_cache, DocumentationCache};
use crate::changes::ChangeSet;
use crate::config::CliOverrides;
use crate::domain::GeneratorKind;
use crate::generate::build_generator;
use crate::graph::GraphIndex;
use crate::pipeline::{GenerationPipeline, PipelineOptions, RunMode, RunSummary};
use crate::render::write_report;

/// Options shared by `generate` and `update`.
#[derive(Args)]
pub struct RunArgs {
    /// Repository root the graph's source paths refer to
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Directory receiving documentation, cache and report
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Call-graph JSON (default: <output-dir>/call_graph.json)
    #[arg(short, long, value_name = "FILE")]
    pub graph: Option<PathBuf>,

    /// Path to config file (repo-docs.toml or .repo-docs.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use the offline generator instead of a model
    #[arg(long)]
    pub offline: bool,

    /// Model name passed to the generator
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Base URL of the Ollama server
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Keep duplicate definitions in a file's context
    #[arg(long)]
    pub no_dedupe: bool,

    /// Context budget per file in estimated tokens (0 = unbounded)
    #[arg(long, value_name = "TOKENS")]
    pub max_context_tokens: Option<usize>,

    /// Persist the cache every N documented files (0 = only at the end)
    #[arg(long, value_name = "N")]
    pub flush_every: Option<usize>,

    /// Save every prompt under <output-dir>/.prompts
    #[arg(long)]
    pub save_debug: bool,

    /// Abort on the first file that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Skip source files matching these globs (comma-separated)
    #[arg(short = 'e', long, value_name = "GLOBS")]
    pub exclude_glob: Option<String>,

    /// Omit generated_at from the run report
    #[arg(long)]
    pub no_timestamp: bool,
}

impl RunArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            root_folder: self.root.clone(),
            output_dir: self.output_dir.clone(),
            graph_path: self.graph.clone(),
            generator: self.offline.then_some(GeneratorKind::Offline),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            dedupe_context: self.no_dedupe.then_some(false),
            max_context_tokens: self.max_context_tokens,
            flush_every: self.flush_every,
            save_debug: self.save_debug.then_some(true),
            fail_fast: self.fail_fast.then_some(true),
            exclude_globs: parse_csv(&self.exclude_glob),
        }
    }
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub run: RunArgs,
}

pub fn run(args: GenerateArgs, verbose: bool) -> Result<()> {
    execute(&args.run, verbose, None)
}

/// Shared driver: resolve settings, run the pipeline, persist the report
/// and fail the process when any file failed. With `base` set, the run is
/// incremental against the git revision `base`.
pub(super) fn execute(args: &RunArgs, verbose: bool, base: Option<&str>) -> Result<()> {
    let Resolved { root, config } =
        resolve_config(args.root.as_deref(), args.config.as_deref(), args.overrides())?;

    let graph_path = config.graph_path();
    let graph = GraphIndex::load(&graph_path)
        .with_context(|| format!("Failed loading call graph {}", graph_path.display()))?;
    let generator = build_generator(&config)?;
    let options = PipelineOptions::from_config(&config, &root)?;

    let changes = match base {
        Some(base) => {
            let changes = ChangeSet::from_git(&root, base)
                .with_context(|| format!("Failed collecting changes since {base}"))?;
            tracing::info!("{} changed file(s) since {}", changes.len(), base);
            Some(changes)
        }
        None => None,
    };
    let (mode, mut cache) = match &changes {
        Some(changes) => (RunMode::Update(changes), existing_cache(&config.cache_path())?),
        None => (RunMode::Full, DocumentationCache::new()),
    };

    let bar = progress_bar(graph.file_groups().len(), verbose);
    let pipeline =
        GenerationPipeline::new(&graph, generator.as_ref(), options).with_progress(bar.clone());
    let summary = pipeline.run(&mut cache, mode);
    bar.finish_and_clear();
    let summary = summary?;

    let report_path = config.report_path();
    write_report(&report_path, mode.as_str(), generator.name(), &summary, !args.no_timestamp)
        .with_context(|| format!("Failed writing run report {}", report_path.display()))?;

    print_summary(&summary, &config.output_dir);

    if !summary.failed.is_empty() {
        anyhow::bail!(
            "{} file(s) failed; see {} for details",
            summary.failed.len(),
            report_path.display()
        );
    }
    Ok(())
}

/// Cache of a previous run; `update` needs it to find the old documentation.
fn existing_cache(path: &Path) -> Result<DocumentationCache> {
    let cache = load_cache(path).with_context(|| format!("Failed loading cache {}", path.display()))?;
    if cache.is_empty() {
        tracing::warn!("No cached documentation at {}; every file will be generated", path.display());
    }
    Ok(cache)
}

fn print_summary(summary: &RunSummary, output_dir: &Path) {
    println!();
    println!("Documentation complete!");
    println!();
    println!("Statistics:");
    println!("  Output directory: {}", output_dir.display());
    println!("  Generated:        {}", summary.generated);
    println!("  Updated:          {}", summary.updated);
    println!("  Unchanged:        {}", summary.unchanged);
    if summary.excluded > 0 {
        println!("  Excluded:         {}", summary.excluded);
    }
    println!("  Failed:           {}", summary.failed.len());
    for failed in &summary.failed {
        println!("    {} ({:?}): {}", failed.source_path, failed.stage, failed.error);
    }
    println!("  Elapsed:          {:.2}s", summary.elapsed_secs);
}
