//! Unit tests for canvas tree walks

use crate::csm::ElementKind;
use crate::graph::{
    get_all_state_names_in_extent, get_all_statemachine_descendants, get_child_nodes,
    get_most_distant_ancestor_node, get_parent_node, is_within, CanvasNode, NodeId, TreeError,
};

fn machine(id: u64, name: &str) -> CanvasNode {
    CanvasNode::new(NodeId(id), ElementKind::StateMachine, name)
}

fn state(id: u64, name: &str) -> CanvasNode {
    CanvasNode::new(NodeId(id), ElementKind::State, name)
}

/// A -> B -> C -> D, each machine also holding one state.
fn chain() -> Vec<CanvasNode> {
    vec![
        machine(1, "A"),
        machine(2, "B").with_parent(NodeId(1)),
        state(5, "InA").with_parent(NodeId(1)),
        machine(3, "C").with_parent(NodeId(2)),
        state(6, "InC").with_parent(NodeId(3)),
        machine(4, "D").with_parent(NodeId(3)),
    ]
}

fn names(nodes: &[&CanvasNode]) -> Vec<String> {
    nodes.iter().map(|node| node.name.clone()).collect()
}

#[test]
fn test_get_parent_node() {
    let nodes = chain();
    assert_eq!(get_parent_node(&nodes[3], &nodes).map(|n| n.name.as_str()), Some("B"));
    assert!(get_parent_node(&nodes[0], &nodes).is_none());
}

#[test]
fn test_most_distant_ancestor() {
    let nodes = chain();
    let root = get_most_distant_ancestor_node(&nodes[5], &nodes).expect("Should find root");
    assert_eq!(root.name, "A");

    let own = get_most_distant_ancestor_node(&nodes[0], &nodes).expect("root of itself");
    assert_eq!(own.id, NodeId(1));
}

#[test]
fn test_most_distant_ancestor_detects_cycle() {
    let nodes = vec![
        machine(1, "A").with_parent(NodeId(2)),
        machine(2, "B").with_parent(NodeId(1)),
    ];
    let err = get_most_distant_ancestor_node(&nodes[0], &nodes).unwrap_err();
    assert_eq!(err, TreeError::Cycle { node: NodeId(1) });
}

#[test]
fn test_self_parent_is_a_cycle() {
    let nodes = vec![machine(1, "A").with_parent(NodeId(1))];
    assert!(get_most_distant_ancestor_node(&nodes[0], &nodes).is_err());
}

#[test]
fn test_missing_parent_ends_walk() {
    let nodes = vec![machine(1, "A").with_parent(NodeId(42))];
    let root = get_most_distant_ancestor_node(&nodes[0], &nodes).expect("root");
    assert_eq!(root.id, NodeId(1));
}

#[test]
fn test_descendants_are_pre_order() {
    let nodes = chain();
    let descendants = get_all_statemachine_descendants(&nodes[0], &nodes);
    assert_eq!(names(&descendants), vec!["B", "C", "D"]);
}

#[test]
fn test_descendants_of_siblings_follow_their_parent() {
    let nodes = vec![
        machine(1, "A"),
        machine(2, "B").with_parent(NodeId(1)),
        machine(3, "C").with_parent(NodeId(1)),
        machine(4, "B1").with_parent(NodeId(2)),
    ];
    let descendants = get_all_statemachine_descendants(&nodes[0], &nodes);
    assert_eq!(names(&descendants), vec!["B", "B1", "C"]);
}

#[test]
fn test_descendants_terminate_on_cycle() {
    let nodes = vec![
        machine(1, "A").with_parent(NodeId(2)),
        machine(2, "B").with_parent(NodeId(1)),
    ];
    let descendants = get_all_statemachine_descendants(&nodes[0], &nodes);
    assert_eq!(names(&descendants), vec!["B"]);
}

#[test]
fn test_state_names_in_extent() {
    let nodes = chain();
    let extent = get_all_state_names_in_extent(&nodes[1], &nodes);
    assert_eq!(
        extent.into_iter().collect::<Vec<_>>(),
        vec!["C", "D", "InC"]
    );

    let leaf = get_all_state_names_in_extent(&nodes[5], &nodes);
    assert!(leaf.is_empty());
}

#[test]
fn test_children_and_within() {
    let nodes = chain();
    assert_eq!(names(&get_child_nodes(&nodes[0], &nodes)), vec!["B", "InA"]);
    assert!(is_within(&nodes[5], NodeId(1), &nodes));
    assert!(is_within(&nodes[0], NodeId(1), &nodes));
    assert!(!is_within(&nodes[0], NodeId(2), &nodes));
}
