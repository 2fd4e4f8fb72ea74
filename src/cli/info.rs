//! Info command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::utils::{resolve_config, Resolved};
use crate::config::CliOverrides;
use crate::context::{AssemblyOptions, ContextAssembler};
use crate::graph::{CallGraphExplorer, GraphIndex};

#[derive(Args)]
pub struct InfoArgs {
    /// Repository root the graph's source paths refer to
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Directory holding the default call graph
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Call-graph JSON (default: <output-dir>/call_graph.json)
    #[arg(short, long, value_name = "FILE")]
    pub graph: Option<PathBuf>,

    /// Path to config file (repo-docs.toml or .repo-docs.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keep duplicate definitions in a file's context
    #[arg(long)]
    pub no_dedupe: bool,

    /// Context budget per file in estimated tokens (0 = unbounded)
    #[arg(long, value_name = "TOKENS")]
    pub max_context_tokens: Option<usize>,
}

pub fn run(args: InfoArgs) -> Result<()> {
    let overrides = CliOverrides {
        root_folder: args.root.clone(),
        output_dir: args.output_dir,
        graph_path: args.graph,
        dedupe_context: args.no_dedupe.then_some(false),
        max_context_tokens: args.max_context_tokens,
        ..CliOverrides::default()
    };
    let Resolved { root, config } =
        resolve_config(args.root.as_deref(), args.config.as_deref(), overrides)?;

    let graph_path = config.graph_path();
    let graph = GraphIndex::load(&graph_path)
        .with_context(|| format!("Failed loading call graph {}", graph_path.display()))?;
    let reachable = CallGraphExplorer::new(&graph).explore();
    let options = AssemblyOptions { dedupe: config.dedupe_context, max_tokens: config.max_context_tokens };
    let assembler = ContextAssembler::new(&graph, &reachable, options);

    println!("Root folder: {}", root.display());
    println!("Call graph: {}", graph_path.display());
    println!("Statistics:");
    println!("  Nodes:          {}", graph.nodes().len());
    println!("  External nodes: {}", graph.external_count());
    println!("  Call edges:     {}", graph.edge_count());
    println!("  Source files:   {}", graph.file_groups().len());

    println!("Context per file:");
    for (file, ids) in graph.file_groups() {
        let context = assembler.assemble(file);
        let dropped = if context.dropped > 0 {
            format!(", {} dropped", context.dropped)
        } else {
            String::new()
        };
        println!(
            "  {} ({} definitions): {} blocks, ~{} tokens{}",
            file,
            ids.len(),
            context.blocks,
            context.tokens,
            dropped
        );
    }

    Ok(())
}
