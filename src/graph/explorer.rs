//! Breadth-first reachability over the call graph.

use crate::graph::GraphIndex;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Reachable non-external ids for every node, in first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachability {
    sets: BTreeMap<String, Vec<String>>,
}

impl Reachability {
    /// Reachable ids for `id`; empty for unknown ids.
    pub fn get(&self, id: &str) -> &[String] {
        self.sets.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

pub struct CallGraphExplorer<'g> {
    graph: &'g GraphIndex,
}

impl<'g> CallGraphExplorer<'g> {
    pub fn new(graph: &'g GraphIndex) -> Self {
        Self { graph }
    }

    /// Compute the reachable set of every node once. Starting nodes are
    /// independent, so they are explored in parallel over the shared graph.
    pub fn explore(&self) -> Reachability {
        let sets: BTreeMap<String, Vec<String>> = self
            .graph
            .nodes()
            .par_iter()
            .map(|(id, _)| (id.clone(), self.reachable_from(id)))
            .collect();
        tracing::debug!("Explored {} call graph nodes", sets.len());
        Reachability { sets }
    }

    /// Transitive non-external callees of `start`, excluding `start` itself.
    ///
    /// External nodes are discovered but never expanded, and the visited set
    /// stops cycles from being expanded twice.
    pub fn reachable_from(&self, start: &str) -> Vec<String> {
        let Some(start_node) = self.graph.node(start) else {
            return Vec::new();
        };

        let mut visited: HashSet<&str> = HashSet::new();
        let mut discovered: Vec<&str> = Vec::new();
        let mut queue: VecDeque<&str> = start_node.callees.iter().map(String::as_str).collect();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            discovered.push(current);
            let Some(node) = self.graph.node(current) else {
                continue;
            };
            if !node.is_external() {
                queue.extend(node.callees.iter().map(String::as_str));
            }
        }

        discovered
            .into_iter()
            .filter(|id| *id != start)
            .filter(|id| self.graph.node(id).is_some_and(|n| !n.is_external()))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EXTERNAL;
    use crate::graph::index::tests::node;

    fn graph(nodes: Vec<crate::domain::Node>) -> GraphIndex {
        GraphIndex::from_nodes(nodes).expect("index")
    }

    #[test]
    fn terminates_on_mutual_recursion() {
        let g = graph(vec![node("a", "x.py", &["b"]), node("b", "y.py", &["a"])]);
        let reach = CallGraphExplorer::new(&g).explore();
        assert_eq!(reach.get("a"), ["b".to_string()]);
        assert_eq!(reach.get("b"), ["a".to_string()]);
    }

    #[test]
    fn self_recursion_yields_empty_set() {
        let g = graph(vec![node("a", "x.py", &["a"])]);
        assert!(CallGraphExplorer::new(&g).reachable_from("a").is_empty());
    }

    #[test]
    fn externals_are_neither_included_nor_expanded() {
        let g = graph(vec![
            node("f", "main.py", &["ext", "g"]),
            node("g", "a.py", &["ext"]),
            node("ext", EXTERNAL, &["hidden"]),
            node("hidden", "b.py", &[]),
        ]);
        let reach = CallGraphExplorer::new(&g).explore();
        assert_eq!(reach.get("f"), ["g".to_string()]);
        assert!(reach.get("g").is_empty());
    }

    #[test]
    fn result_follows_breadth_first_discovery_order() {
        let g = graph(vec![
            node("root", "main.py", &["b", "a"]),
            node("b", "x.py", &["d"]),
            node("a", "x.py", &["c", "d"]),
            node("c", "y.py", &[]),
            node("d", "y.py", &[]),
        ]);
        let reach = CallGraphExplorer::new(&g).reachable_from("root");
        assert_eq!(reach, vec!["b", "a", "d", "c"]);
    }

    #[test]
    fn leaf_and_unknown_nodes_have_empty_sets() {
        let g = graph(vec![node("leaf", "x.py", &[])]);
        let reach = CallGraphExplorer::new(&g).explore();
        assert!(reach.get("leaf").is_empty());
        assert!(reach.get("missing").is_empty());
        assert_eq!(reach.len(), 1);
    }
}
