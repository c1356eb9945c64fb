//! Decomposition tree: a forest of nodes linked by `parentId`.
//!
//! `parentId` is the single source of truth for the hierarchy. The edge list
//! required by the snapshot wire format is a derived projection, rebuilt from
//! the nodes on every structural mutation and never hand-maintained.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{DecompositionEdge, DecompositionNode, Evidence, NodeType, Position};

/// Partial update applied to a node in place. Fields left as `None` are
/// untouched. Updates never recompute `depth` or move a node in the
/// hierarchy.
#[derive(Debug, Clone, Default)]
pub struct NodeUpdate {
    pub label: Option<String>,
    pub description: Option<String>,
    pub node_type: Option<NodeType>,
    pub is_fundamental: Option<bool>,
    pub collapsed: Option<bool>,
    pub position: Option<Position>,
}

impl NodeUpdate {
    fn apply(self, node: &mut DecompositionNode) {
        if let Some(label) = self.label {
            node.label = label;
        }
        if let Some(description) = self.description {
            node.description = description;
        }
        if let Some(node_type) = self.node_type {
            node.node_type = node_type;
        }
        if let Some(is_fundamental) = self.is_fundamental {
            node.is_fundamental = is_fundamental;
        }
        if let Some(collapsed) = self.collapsed {
            node.collapsed = collapsed;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
    }
}

/// The decomposition forest with its derived edge projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecompositionTree {
    /// All nodes, in insertion order.
    #[serde(default)]
    pub nodes: Vec<DecompositionNode>,
    /// Derived parent-child edges; rebuilt from `parentId` on every
    /// structural mutation.
    #[serde(default)]
    pub edges: Vec<DecompositionEdge>,
}

impl DecompositionTree {
    /// Insert a node. The caller supplies the full node including
    /// `parent_id` and `depth`; nodes only ever attach as new leaves, which
    /// keeps every tree acyclic by construction.
    pub fn insert(&mut self, node: DecompositionNode) {
        if let Some(parent_id) = node.parent_id.clone() {
            self.edges
                .push(DecompositionEdge::derived(parent_id, node.id.clone()));
        }
        self.nodes.push(node);
    }

    /// Merge a partial update into a node in place. Returns false if the
    /// node does not exist.
    pub fn update(&mut self, id: &str, update: NodeUpdate) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                update.apply(node);
                true
            }
            None => false,
        }
    }

    /// Remove a node and its entire subtree.
    ///
    /// Collects the transitive closure of descendants by following
    /// `parentId` equality to a fixed point, removes every collected node,
    /// and rebuilds the edge projection (which drops every edge touching the
    /// collected set). Returns the number of nodes removed.
    pub fn remove(&mut self, id: &str) -> usize {
        let mut doomed: HashSet<String> = HashSet::new();
        let mut frontier = vec![id.to_string()];

        while let Some(current) = frontier.pop() {
            if !doomed.insert(current.clone()) {
                continue;
            }
            for node in &self.nodes {
                if node.parent_id.as_deref() == Some(current.as_str()) {
                    frontier.push(node.id.clone());
                }
            }
        }

        let before = self.nodes.len();
        self.nodes.retain(|n| !doomed.contains(&n.id));
        self.rebuild_edges();
        before - self.nodes.len()
    }

    /// Attach evidence directly to a node. Returns false if the node does
    /// not exist.
    pub fn attach_evidence(&mut self, node_id: &str, evidence: Evidence) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == node_id) {
            Some(node) => {
                node.evidence.push(evidence);
                true
            }
            None => false,
        }
    }

    /// Look up a node by id.
    pub fn get(&self, id: &str) -> Option<&DecompositionNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All root nodes (nodes without a parent).
    pub fn roots(&self) -> Vec<&DecompositionNode> {
        self.nodes.iter().filter(|n| n.parent_id.is_none()).collect()
    }

    /// Children of a node, computed from `parentId` on read.
    pub fn children_of(&self, parent_id: &str) -> Vec<&DecompositionNode> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.as_deref() == Some(parent_id))
            .collect()
    }

    /// All fundamental truths in the forest.
    pub fn fundamental_nodes(&self) -> Vec<&DecompositionNode> {
        self.nodes.iter().filter(|n| n.is_fundamental()).collect()
    }

    /// Number of nodes that are not roots.
    pub fn non_root_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.parent_id.is_some()).count()
    }

    /// Total node count.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rebuild the derived edge projection from the nodes' `parentId`
    /// fields. Called after any mutation that can remove nodes; also the
    /// repair path after an import whose edge list disagrees with the
    /// nodes.
    pub fn rebuild_edges(&mut self) {
        self.edges = self
            .nodes
            .iter()
            .filter_map(|n| {
                n.parent_id
                    .as_ref()
                    .map(|p| DecompositionEdge::derived(p.clone(), n.id.clone()))
            })
            .collect();
    }
}
