//! Turns a file's call set into the dependency text handed to the generator.

use crate::graph::{GraphIndex, Reachability};
use crate::utils::estimate_tokens;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblyOptions {
    /// Emit each reachable definition at most once per file.
    pub dedupe: bool,
    /// Token budget for the whole blob; 0 means unbounded.
    pub max_tokens: usize,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self { dedupe: true, max_tokens: 0 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledContext {
    pub text: String,
    pub blocks: usize,
    /// Blocks left out because the token budget was exhausted.
    pub dropped: usize,
    pub tokens: usize,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub struct ContextAssembler<'a> {
    graph: &'a GraphIndex,
    reachable: &'a Reachability,
    options: AssemblyOptions,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(graph: &'a GraphIndex, reachable: &'a Reachability, options: AssemblyOptions) -> Self {
        Self { graph, reachable, options }
    }

    /// Concatenate a block for every definition reachable from the nodes of
    /// `file_path`, walking local nodes in file-group order and each
    /// reachable set in discovery order. Definitions living in `file_path`
    /// itself and external definitions are never emitted.
    pub fn assemble(&self, file_path: &str) -> AssembledContext {
        let mut out = AssembledContext::default();
        let Some(local_ids) = self.graph.file_groups().get(file_path) else {
            return out;
        };

        let mut emitted: HashSet<&str> = HashSet::new();
        let mut budget_hit = false;

        for local_id in local_ids {
            let Some(local) = self.graph.node(local_id) else {
                continue;
            };
            if local.is_external() {
                continue;
            }

            for reachable_id in self.reachable.get(local_id) {
                let Some(callee) = self.graph.node(reachable_id) else {
                    continue;
                };
                if callee.is_external() || callee.file_name == file_path {
                    continue;
                }
                if self.options.dedupe && !emitted.insert(reachable_id.as_str()) {
                    continue;
                }
                if budget_hit {
                    out.dropped += 1;
                    continue;
                }

                let block = format!("\nFunction/Class {}:\n{}\n", callee.name, callee.content);
                let block_tokens = estimate_tokens(&block);
                if self.options.max_tokens > 0 && out.tokens + block_tokens > self.options.max_tokens {
                    budget_hit = true;
                    out.dropped += 1;
                    continue;
                }
                out.text.push_str(&block);
                out.tokens += block_tokens;
                out.blocks += 1;
            }
        }

        if out.dropped > 0 {
            tracing::debug!(
                "Context for {} truncated at {} tokens: {} block(s) dropped",
                file_path,
                out.tokens,
                out.dropped
            );
        }
        out
    }
}
