//! Unit tests for link and index services

use crate::csm::{ContextType, ContextVariable, State, StateMachine, StateOrStateMachine};
use crate::graph::NodeId;
use crate::links::{ContextLinks, ContextOwner, ContextStore, NodeLinks, Scope, ScopeIndex};

fn linked_state_with_context() -> (NodeLinks, ContextLinks) {
    let mut nodes = NodeLinks::default();
    nodes.link_node(
        NodeId(1),
        State::new("A")
            .with_context(ContextType::Local, ContextVariable::new("counter", "0"))
            .with_context(ContextType::Static, ContextVariable::new("limit", "10")),
    );

    let mut contexts = ContextLinks::default();
    for name in ["counter", "limit"] {
        assert!(contexts.register_context(name));
        contexts.link_context_to_state(name, ContextOwner::Node(NodeId(1)));
    }
    (nodes, contexts)
}

fn stored_names(nodes: &NodeLinks, context_type: ContextType) -> Vec<String> {
    nodes
        .context_list(ContextOwner::Node(NodeId(1)), context_type)
        .expect("state has every list")
        .iter()
        .map(|variable| variable.name.clone())
        .collect()
}

#[test]
fn test_node_links() {
    let mut nodes = NodeLinks::default();
    assert!(nodes.link_node(NodeId(7), StateMachine::new("M")).is_none());
    assert_eq!(nodes.get_linked_entity(NodeId(7)).map(StateOrStateMachine::name), Some("M"));

    let previous = nodes.link_node(NodeId(7), State::new("S"));
    assert_eq!(previous.map(|entity| entity.name().to_string()), Some("M".to_string()));

    assert!(nodes.unlink_node(NodeId(7)).is_some());
    assert!(nodes.get_linked_entity(NodeId(7)).is_none());
    assert!(nodes.unlink_node(NodeId(7)).is_none());
}

#[test]
fn test_scope_link_rejects_new_duplicate() {
    let mut index = ScopeIndex::default();
    let scope = Scope::StateMachine(NodeId(1));

    assert!(index.link_state_name_to_statemachine("A", scope, true));
    assert!(!index.link_state_name_to_statemachine("A", scope, true));
    assert!(index.link_state_name_to_statemachine("A", scope, false));
    assert!(index.link_state_name_to_statemachine("A", Scope::Root, true));
    assert_eq!(index.names(scope).collect::<Vec<_>>(), vec!["A"]);
}

#[test]
fn test_scope_unlink() {
    let mut index = ScopeIndex::default();
    index.link_state_name_to_statemachine("A", Scope::Root, true);

    assert!(index.unlink_state_name_from_statemachine("A", Scope::Root));
    assert!(!index.contains(Scope::Root, "A"));
    assert!(!index.unlink_state_name_from_statemachine("A", Scope::Root));
    assert!(!index.unlink_state_name_from_statemachine("A", Scope::StateMachine(NodeId(3))));
}

#[test]
fn test_context_register_is_unique() {
    let mut contexts = ContextLinks::default();
    assert!(contexts.register_context("x"));
    assert!(!contexts.register_context("x"));
    assert!(contexts.deregister_context("x"));
    assert!(contexts.register_context("x"));
}

#[test]
fn test_context_relink_replaces_owner() {
    let mut contexts = ContextLinks::default();
    contexts.register_context("x");
    contexts.link_context_to_state("x", ContextOwner::Node(NodeId(1)));
    contexts.link_context_to_state("x", ContextOwner::Node(NodeId(2)));

    assert_eq!(contexts.get_linked_state("x"), Some(ContextOwner::Node(NodeId(2))));
    assert!(contexts.contexts_of(ContextOwner::Node(NodeId(1))).is_empty());
    assert_eq!(contexts.contexts_of(ContextOwner::Node(NodeId(2))), vec!["x"]);
}

#[test]
fn test_context_type_follows_storage() {
    let (nodes, contexts) = linked_state_with_context();
    assert_eq!(contexts.get_context_type("counter", &nodes), Some(ContextType::Local));
    assert_eq!(contexts.get_context_type("limit", &nodes), Some(ContextType::Static));
}

#[test]
fn test_context_type_is_none_when_not_stored() {
    let (nodes, mut contexts) = linked_state_with_context();
    contexts.register_context("ghost");
    assert_eq!(contexts.get_context_type("ghost", &nodes), None);

    contexts.link_context_to_state("ghost", ContextOwner::Node(NodeId(1)));
    assert_eq!(contexts.get_context_type("ghost", &nodes), None);
}

#[test]
fn test_rename_context_updates_everything() {
    let (mut nodes, mut contexts) = linked_state_with_context();

    assert!(contexts.rename_context("counter", "total", &mut nodes));

    assert!(contexts.is_context_registered("total"));
    assert!(!contexts.is_context_registered("counter"));
    assert_eq!(contexts.get_linked_state("total"), Some(ContextOwner::Node(NodeId(1))));
    assert_eq!(contexts.get_linked_state("counter"), None);
    assert_eq!(stored_names(&nodes, ContextType::Local), vec!["total"]);
    assert_eq!(contexts.get_context_type("total", &nodes), Some(ContextType::Local));
}

#[test]
fn test_rename_context_collision_changes_nothing() {
    let (mut nodes, mut contexts) = linked_state_with_context();

    assert!(!contexts.rename_context("counter", "limit", &mut nodes));

    assert!(contexts.is_context_registered("counter"));
    assert!(contexts.is_context_registered("limit"));
    assert_eq!(contexts.get_linked_state("counter"), Some(ContextOwner::Node(NodeId(1))));
    assert_eq!(stored_names(&nodes, ContextType::Local), vec!["counter"]);
    assert_eq!(stored_names(&nodes, ContextType::Static), vec!["limit"]);
}

#[test]
fn test_rename_unregistered_context_fails() {
    let (mut nodes, mut contexts) = linked_state_with_context();
    assert!(!contexts.rename_context("missing", "other", &mut nodes));
    assert!(!contexts.is_context_registered("other"));
}
