// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Graph
//!
//! The graph exclusively owns its nodes and is created fresh per composer
//! run; nothing about it persists between runs, because the external state
//! backend is the only source of truth for existing infrastructure.

use crate::domain::node::{ResourceKind, ResourceNode};
use crate::errors::{ComposerError, ComposerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// In-memory model of the resources to provision and their creation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGraph {
    pub(crate) nodes: BTreeMap<String, ResourceNode>,
}

impl ResourceGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, rejecting duplicate ids
    pub fn insert(&mut self, node: ResourceNode) -> ComposerResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(ComposerError::DuplicateNode(node.id));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Fold another graph's nodes into this one
    pub fn merge(&mut self, other: ResourceGraph) -> ComposerResult<()> {
        for (_, node) in other.nodes {
            self.insert(node)?;
        }
        Ok(())
    }

    /// Look up a node by id
    pub fn get(&self, id: &str) -> Option<&ResourceNode> {
        self.nodes.get(id)
    }

    /// Whether a node with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values()
    }

    /// Iterate nodes of one kind, in id order
    pub fn nodes_of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values().filter(move |n| n.kind == kind)
    }

    /// Stable topological sort over `depends_on` edges.
    ///
    /// Kahn's algorithm with the ready set kept in id order, so ties are
    /// broken by id ascending and the result is reproducible for identical
    /// graphs. Dependencies on ids absent from the graph are ignored here;
    /// the validator reports those as dangling references. On a cycle the
    /// ids of the nodes still waiting on each other are returned.
    pub fn topo_sort(&self) -> Result<Vec<&ResourceNode>, Vec<String>> {
        let mut pending: BTreeMap<&str, usize> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for node in self.nodes.values() {
            let in_graph = node
                .depends_on
                .iter()
                .filter(|dep| self.nodes.contains_key(dep.as_str()))
                .count();
            pending.insert(node.id.as_str(), in_graph);
            for dep in &node.depends_on {
                if self.nodes.contains_key(dep.as_str()) {
                    dependents.entry(dep.as_str()).or_default().push(node.id.as_str());
                }
            }
        }

        let mut ready: std::collections::BTreeSet<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut sorted = Vec::with_capacity(self.nodes.len());

        while let Some(id) = ready.iter().next().copied() {
            ready.remove(id);
            pending.remove(id);
            sorted.push(&self.nodes[id]);
            if let Some(next) = dependents.get(id) {
                for dependent in next {
                    if let Some(count) = pending.get_mut(dependent) {
                        *count -= 1;
                        if *count == 0 {
                            ready.insert(dependent);
                        }
                    }
                }
            }
        }

        if sorted.len() == self.nodes.len() {
            Ok(sorted)
        } else {
            Err(pending.keys().map(|id| id.to_string()).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::Region;

    fn node(id: &str, deps: &[&str]) -> ResourceNode {
        let mut n = ResourceNode::new(id, ResourceKind::Network, Region::Global);
        for dep in deps {
            n = n.with_dependency(*dep);
        }
        n
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut graph = ResourceGraph::new();
        graph.insert(node("a", &[])).unwrap();
        assert_eq!(
            graph.insert(node("a", &[])),
            Err(ComposerError::DuplicateNode("a".to_string()))
        );
    }

    #[test]
    fn test_merge_rejects_colliding_subgraphs() {
        let mut left = ResourceGraph::new();
        left.insert(node("a", &[])).unwrap();
        let mut right = ResourceGraph::new();
        right.insert(node("a", &[])).unwrap();
        assert!(left.merge(right).is_err());
    }

    #[test]
    fn test_topo_sort_orders_dependencies_first() {
        let mut graph = ResourceGraph::new();
        graph.insert(node("c", &["b"])).unwrap();
        graph.insert(node("b", &["a"])).unwrap();
        graph.insert(node("a", &[])).unwrap();

        let order: Vec<&str> = graph.topo_sort().unwrap().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_topo_sort_ties_broken_by_id() {
        let mut graph = ResourceGraph::new();
        graph.insert(node("z", &[])).unwrap();
        graph.insert(node("m", &[])).unwrap();
        graph.insert(node("a", &[])).unwrap();

        let order: Vec<&str> = graph.topo_sort().unwrap().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_topo_sort_reports_cycle_members() {
        let mut graph = ResourceGraph::new();
        graph.insert(node("a", &["b"])).unwrap();
        graph.insert(node("b", &["a"])).unwrap();
        graph.insert(node("free", &[])).unwrap();

        let members = graph.topo_sort().unwrap_err();
        assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_topo_sort_ignores_missing_dependencies() {
        // Dangling deps are the validator's concern, not the sorter's
        let mut graph = ResourceGraph::new();
        graph.insert(node("a", &["not-here"])).unwrap();
        assert_eq!(graph.topo_sort().unwrap().len(), 1);
    }
}
