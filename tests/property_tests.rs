//! Property-based tests for registries, tree walks, contexts and the PKL format.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use std::collections::BTreeSet;

use csm_editor::graph::{
    get_all_statemachine_descendants, get_most_distant_ancestor_node, CanvasNode, NodeId, TreeError,
};
use csm_editor::links::ContextOwner;
use csm_editor::parser::{DescriptionLoader, JsonLoader};
use csm_editor::registry::{NameCategory, NameRegistry};
use csm_editor::{
    generate_pkl, parse_pkl, Action, CollaborativeStateMachine, ContextType, ContextVariable,
    EditorSession, ElementKind, Event, EventChannel, Guard, State, StateMachine, Transition,
};
use proptest::prelude::*;

prop_compose! {
    fn arbitrary_text()(text in "[ -~\n\t]{0,12}") -> String {
        text
    }
}

prop_compose! {
    fn arbitrary_name()(name in "[A-Za-z_][A-Za-z0-9_ ]{0,8}") -> String {
        name
    }
}

prop_compose! {
    fn arbitrary_channel()(variant in 0..4u8) -> EventChannel {
        match variant {
            0 => EventChannel::Internal,
            1 => EventChannel::External,
            2 => EventChannel::Global,
            _ => EventChannel::Peripheral,
        }
    }
}

prop_compose! {
    fn arbitrary_transition(source: String)(
        target in arbitrary_name(),
        event in proptest::option::of(arbitrary_text()),
        guard in proptest::option::of(arbitrary_text()),
        else_target in proptest::option::of(arbitrary_name()),
    ) -> Transition {
        let mut transition = Transition::new(source.clone(), target);
        transition.event = event;
        transition.else_target = else_target;
        if let Some(expression) = guard {
            transition = transition.with_guard(Guard::new(expression));
        }
        transition
    }
}

prop_compose! {
    fn arbitrary_state()(name in arbitrary_name())(
        transitions in prop::collection::vec(arbitrary_transition(name.clone()), 0..3),
        raised in proptest::option::of((arbitrary_text(), arbitrary_channel())),
        context in prop::collection::vec((arbitrary_name(), arbitrary_text()), 0..3),
        initial in any::<bool>(),
        name in Just(name),
    ) -> State {
        let mut state = State::new(name);
        state.initial = initial;
        for transition in transitions {
            state.add_transition(transition);
        }
        if let Some((event, channel)) = raised {
            state = state.with_entry(Action::raise(Event::new(event, channel)));
        }
        for (variable, value) in context {
            state = state.with_context(ContextType::Static, ContextVariable::new(variable, value));
        }
        state
    }
}

prop_compose! {
    fn arbitrary_machine()(
        name in arbitrary_name(),
        states in prop::collection::vec(arbitrary_state(), 0..4),
        nested in prop::collection::vec(arbitrary_state(), 0..2),
    ) -> StateMachine {
        let mut machine = StateMachine::new(name.clone());
        for state in states {
            machine = machine.with_state(state);
        }
        if !nested.is_empty() {
            let mut inner = StateMachine::new(format!("{name}Inner"));
            for state in nested {
                inner = inner.with_state(state);
            }
            machine = machine.with_state_machine(inner);
        }
        machine
    }
}

prop_compose! {
    fn arbitrary_csm()(
        name in arbitrary_text(),
        version in arbitrary_text(),
        machines in prop::collection::vec(arbitrary_machine(), 0..3),
        shared in prop::collection::vec((arbitrary_name(), arbitrary_text()), 0..3),
    ) -> CollaborativeStateMachine {
        let mut csm = CollaborativeStateMachine::new(name, version);
        for machine in machines {
            csm = csm.with_state_machine(machine);
        }
        for (variable, value) in shared {
            csm = csm.with_context(ContextType::Persistent, ContextVariable::new(variable, value));
        }
        csm
    }
}

fn machine_node(id: u64, parent: Option<u64>) -> CanvasNode {
    let node = CanvasNode::new(NodeId(id), ElementKind::StateMachine, format!("M{id}"));
    match parent {
        Some(parent) => node.with_parent(NodeId(parent)),
        None => node,
    }
}

proptest! {
    #[test]
    fn pkl_round_trip_preserves_description(csm in arbitrary_csm()) {
        let description = csm.to_description();
        let pkl = generate_pkl(&description).expect("Should generate");
        let parsed = parse_pkl(&pkl).expect("Should parse generated PKL");
        prop_assert_eq!(parsed, description);
    }

    #[test]
    fn json_round_trip_preserves_description(csm in arbitrary_csm()) {
        let description = csm.to_description();
        let json = serde_json::to_string(&description).expect("Should serialize");
        let loaded = JsonLoader.load(&json).expect("Should load");
        prop_assert_eq!(loaded, description);
    }

    #[test]
    fn generation_is_pure(csm in arbitrary_csm()) {
        let description = csm.to_description();
        prop_assert_eq!(generate_pkl(&description), generate_pkl(&description));
    }

    #[test]
    fn register_is_exclusive(names in prop::collection::vec(arbitrary_name(), 1..20)) {
        let mut registry = NameRegistry::new(NameCategory::Event);
        let distinct = names.iter().cloned().collect::<BTreeSet<_>>();

        for name in &names {
            let was_unique = registry.is_name_unique(name);
            prop_assert_eq!(registry.register_name(name), was_unique);
            prop_assert!(!registry.register_name(name));
        }
        prop_assert_eq!(registry.len(), distinct.len());

        for name in &distinct {
            prop_assert!(registry.unregister_name(name));
            prop_assert!(registry.is_name_unique(name));
        }
        prop_assert!(registry.is_empty());
    }

    #[test]
    fn generated_names_never_collide(
        taken in prop::collection::btree_set(1..40u32, 0..20),
        count in 1..30usize,
    ) {
        let mut registry = NameRegistry::new(NameCategory::StateOrStateMachine);
        for n in &taken {
            registry.register_name(&format!("State{n}"));
        }

        let mut generated = BTreeSet::new();
        for _ in 0..count {
            let name = registry.generate_unique_name("State");
            prop_assert!(registry.register_name(&name));
            prop_assert!(generated.insert(name));
        }
        prop_assert_eq!(registry.len(), taken.len() + count);
    }

    #[test]
    fn deleting_a_machine_frees_every_name(count in 0..12usize) {
        let mut session = EditorSession::default();
        let machine = session.add_state_machine(None, None).expect("machine");
        for _ in 0..count {
            session.add_state(None, Some(machine)).expect("state");
        }
        prop_assert_eq!(
            session.registries().get(NameCategory::StateOrStateMachine).len(),
            count + 1
        );

        let removed = session.delete_node(machine).expect("delete");
        prop_assert_eq!(removed.len(), count + 1);
        prop_assert!(session.registries().get(NameCategory::StateOrStateMachine).is_empty());
        prop_assert!(session.nodes().is_empty());
    }

    #[test]
    fn context_rename_is_atomic(
        names in prop::collection::btree_set("[a-z][a-z0-9]{0,6}", 2..6),
        pick in any::<prop::sample::Index>(),
    ) {
        let names = names.into_iter().collect::<Vec<_>>();
        let mut session = EditorSession::default();
        let machine = session.add_state_machine(Some("M"), None).expect("machine");
        let state = session.add_state(Some("S"), Some(machine)).expect("state");
        for (i, name) in names.iter().enumerate() {
            let (owner, context_type) = if i % 2 == 0 {
                (ContextOwner::Node(state), ContextType::Static)
            } else {
                (ContextOwner::Node(machine), ContextType::Local)
            };
            session
                .add_context(owner, context_type, ContextVariable::new(name.clone(), "0"))
                .expect("context");
        }

        let old = pick.get(&names);
        let taken = names.iter().find(|name| *name != old).expect("two names");
        let before = session.context_type(old);

        prop_assert!(!session.rename_context(old, taken));
        prop_assert_eq!(session.context_type(old), before);
        prop_assert!(session.context_links().is_context_registered(taken));

        let fresh = format!("{old}_renamed");
        prop_assert!(session.rename_context(old, &fresh));
        prop_assert_eq!(session.context_type(&fresh), before);
        prop_assert_eq!(session.context_type(old), None);
    }

    #[test]
    fn descendants_follow_nesting_order(depth in 1..12u64) {
        let nodes = (1..=depth)
            .map(|id| machine_node(id, (id > 1).then(|| id - 1)))
            .collect::<Vec<_>>();

        let descendants = get_all_statemachine_descendants(&nodes[0], &nodes)
            .into_iter()
            .map(|node| node.id.0)
            .collect::<Vec<_>>();
        prop_assert_eq!(descendants, (2..=depth).collect::<Vec<_>>());

        let last = &nodes[nodes.len() - 1];
        let root = get_most_distant_ancestor_node(last, &nodes).expect("no cycle");
        prop_assert_eq!(root.id, NodeId(1));
    }

    #[test]
    fn parent_cycles_are_detected(size in 1..10u64, start in any::<prop::sample::Index>()) {
        let nodes = (1..=size)
            .map(|id| machine_node(id, Some(if id == 1 { size } else { id - 1 })))
            .collect::<Vec<_>>();

        let node = start.get(&nodes);
        let is_cycle = matches!(
            get_most_distant_ancestor_node(node, &nodes),
            Err(TreeError::Cycle { .. })
        );
        prop_assert!(is_cycle);
        prop_assert!(get_all_statemachine_descendants(node, &nodes).len() < nodes.len());
    }
}
