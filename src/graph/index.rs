//! Typed view over the upstream call graph.

use crate::domain::{Node, EXTERNAL};
use crate::error::{DocsError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Node as it appears in the upstream JSON, keyed by id in the outer object.
#[derive(Debug, Deserialize)]
struct RawNode {
    name: String,
    file_name: String,
    #[serde(default)]
    content: String,
    #[serde(default, alias = "calls", alias = "children")]
    callees: Vec<String>,
}

/// Validated, immutable call graph.
///
/// Nodes are kept in an id-sorted map and every file group lists its node
/// ids in id order, so two runs over the same graph iterate identically.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    nodes: BTreeMap<String, Node>,
    file_groups: BTreeMap<String, Vec<String>>,
}

impl GraphIndex {
    /// Build an index from nodes, collapsing duplicate callees and checking
    /// that every callee id resolves.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for mut node in nodes {
            let mut seen = HashSet::new();
            node.callees.retain(|callee| seen.insert(callee.clone()));
            by_id.insert(node.id.clone(), node);
        }

        for node in by_id.values() {
            if let Some(missing) = node.callees.iter().find(|c| !by_id.contains_key(*c)) {
                return Err(DocsError::MalformedGraph {
                    node: node.id.clone(),
                    missing: missing.clone(),
                });
            }
        }

        let mut file_groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for node in by_id.values().filter(|n| !n.is_external()) {
            file_groups.entry(node.file_name.clone()).or_default().push(node.id.clone());
        }

        Ok(Self { nodes: by_id, file_groups })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawNode> = serde_json::from_str(text)?;
        Self::from_nodes(raw.into_iter().map(|(id, raw)| Node {
            id,
            name: raw.name,
            file_name: raw.file_name,
            content: raw.content,
            callees: raw.callees,
        }))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DocsError::io(path, e))?;
        let index = Self::from_json(&text)?;
        tracing::debug!(
            "Loaded call graph from {}: {} nodes, {} files",
            path.display(),
            index.nodes.len(),
            index.file_groups.len()
        );
        Ok(index)
    }

    pub fn nodes(&self) -> &BTreeMap<String, Node> {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// File path to the ids defined in that file. `EXTERNAL` is never a key.
    pub fn file_groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.file_groups
    }

    pub fn is_external(&self, node: &Node) -> bool {
        node.file_name == EXTERNAL
    }

    pub fn external_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_external()).count()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.callees.len()).sum()
    }
}
