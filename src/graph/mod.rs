//! Canvas Graph
//! Flat node/edge mirror of the editor canvas and the tree walks over it.
//!
//! Nesting is expressed only through `parent_id`, so every walk has to cope
//! with malformed input: ancestor walks fail on cycles instead of looping.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::csm::{ElementKind, Transition};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasNode {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    pub kind: ElementKind,
    pub name: String,
}

impl CanvasNode {
    pub fn new(id: NodeId, kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            id,
            parent_id: None,
            kind,
            name: name.into(),
        }
    }

    pub fn with_parent(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn is_state_machine(&self) -> bool {
        self.kind == ElementKind::StateMachine
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgeKind {
    /// A transition owned by the edge; source and target are state nodes.
    Transition(Transition),
    /// Inferred link between two machines exchanging `event`.
    EventLink { event: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

impl CanvasEdge {
    pub fn transition(&self) -> Option<&Transition> {
        match &self.kind {
            EdgeKind::Transition(transition) => Some(transition),
            EdgeKind::EventLink { .. } => None,
        }
    }

    pub fn transition_mut(&mut self) -> Option<&mut Transition> {
        match &mut self.kind {
            EdgeKind::Transition(transition) => Some(transition),
            EdgeKind::EventLink { .. } => None,
        }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Cycle in parent links at {node}")]
    Cycle { node: NodeId },
}

// ============================================================================
// TREE WALKS
// ============================================================================

pub fn get_parent_node<'a>(node: &CanvasNode, all_nodes: &'a [CanvasNode]) -> Option<&'a CanvasNode> {
    let parent_id = node.parent_id?;
    all_nodes.iter().find(|candidate| candidate.id == parent_id)
}

/// Walk `parent_id` links up to the root. A node without a parent is its own root.
pub fn get_most_distant_ancestor_node<'a>(
    node: &'a CanvasNode,
    all_nodes: &'a [CanvasNode],
) -> Result<&'a CanvasNode, TreeError> {
    let mut visited = HashSet::from([node.id]);
    let mut current = node;

    while let Some(parent_id) = current.parent_id {
        let Some(parent) = get_parent_node(current, all_nodes) else {
            warn!("{} points at missing parent {}", current.id, parent_id);
            break;
        };
        if !visited.insert(parent.id) {
            return Err(TreeError::Cycle { node: parent.id });
        }
        current = parent;
    }

    Ok(current)
}

/// Direct children of `node`, in canvas order.
pub fn get_child_nodes<'a>(node: &CanvasNode, all_nodes: &'a [CanvasNode]) -> Vec<&'a CanvasNode> {
    all_nodes
        .iter()
        .filter(|candidate| candidate.parent_id == Some(node.id) && candidate.id != node.id)
        .collect()
}

/// Every state-machine node nested under `node`, each before its own descendants.
pub fn get_all_statemachine_descendants<'a>(
    node: &CanvasNode,
    all_nodes: &'a [CanvasNode],
) -> Vec<&'a CanvasNode> {
    let mut descendants = Vec::new();
    let mut visited = HashSet::from([node.id]);
    collect_machine_descendants(node, all_nodes, &mut visited, &mut descendants);
    descendants
}

fn collect_machine_descendants<'a>(
    node: &CanvasNode,
    all_nodes: &'a [CanvasNode],
    visited: &mut HashSet<NodeId>,
    out: &mut Vec<&'a CanvasNode>,
) {
    for child in get_child_nodes(node, all_nodes) {
        if !child.is_state_machine() || !visited.insert(child.id) {
            continue;
        }
        out.push(child);
        collect_machine_descendants(child, all_nodes, visited, out);
    }
}

/// Names of all states and machines transitively inside `node`, excluding its own.
pub fn get_all_state_names_in_extent(node: &CanvasNode, all_nodes: &[CanvasNode]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut visited = HashSet::from([node.id]);
    let mut stack = get_child_nodes(node, all_nodes);

    while let Some(child) = stack.pop() {
        if !visited.insert(child.id) {
            continue;
        }
        names.insert(child.name.clone());
        if child.is_state_machine() {
            stack.extend(get_child_nodes(child, all_nodes));
        }
    }

    names
}

/// `true` when `ancestor` appears on the parent chain of `node` (or is `node`).
pub fn is_within(node: &CanvasNode, ancestor: NodeId, all_nodes: &[CanvasNode]) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(node);

    while let Some(candidate) = current {
        if candidate.id == ancestor {
            return true;
        }
        if !visited.insert(candidate.id) {
            return false;
        }
        current = get_parent_node(candidate, all_nodes);
    }

    false
}
