//! Export and import of a session: assembling the domain tree from the canvas
//! mirror, and replaying a loaded description through the same bookkeeping
//! as interactive editing.

use std::mem;

use log::{debug, warn};

use super::{EditorSession, SessionError, SessionResult};
use crate::codegen::generate_pkl;
use crate::csm::{
    Action, ActionKind, CollaborativeStateMachine, ContextType, ContextVariable, ElementKind, State,
    StateMachine, StateOrStateMachine, Transition,
};
use crate::description::CollaborativeStateMachineDescription;
use crate::graph::{get_child_nodes, EdgeKind, NodeId};
use crate::links::ContextOwner;
use crate::registry::NameCategory;

impl EditorSession {
    // ========================================================================
    // EXPORT
    // ========================================================================

    /// Assemble the domain tree. Fails when a state sits outside every machine.
    pub fn to_collaborative_state_machine(&self) -> SessionResult<CollaborativeStateMachine> {
        let mut csm = CollaborativeStateMachine::new(&self.name, &self.version);
        csm.memory_mode = self.memory_mode;
        csm.local_context = self.root_context.local.clone();
        csm.persistent_context = self.root_context.persistent.clone();

        for node in self.nodes.iter().filter(|node| node.parent_id.is_none()) {
            match node.kind {
                ElementKind::StateMachine => csm.state_machines.push(self.assemble_machine(node.id)?),
                ElementKind::State => {
                    return Err(SessionError::StateOutsideMachine(node.name.clone()));
                }
            }
        }
        Ok(csm)
    }

    pub fn to_description(&self) -> SessionResult<CollaborativeStateMachineDescription> {
        Ok(self.to_collaborative_state_machine()?.to_description())
    }

    pub fn to_pkl(&self) -> SessionResult<String> {
        Ok(generate_pkl(&self.to_description()?)?)
    }

    pub(super) fn assemble_machine(&self, id: NodeId) -> SessionResult<StateMachine> {
        let node = self.node(id)?;
        let mut machine = self
            .node_links
            .get_linked_entity(id)
            .and_then(StateOrStateMachine::as_state_machine)
            .cloned()
            .ok_or(SessionError::NotAStateMachine(id))?;
        machine.children.clear();

        for child in get_child_nodes(node, &self.nodes) {
            let assembled = match child.kind {
                ElementKind::State => self.assemble_state(child.id)?.into(),
                ElementKind::StateMachine => self.assemble_machine(child.id)?.into(),
            };
            machine.children.push(assembled);
        }
        Ok(machine)
    }

    fn assemble_state(&self, id: NodeId) -> SessionResult<State> {
        let mut state = self
            .node_links
            .get_linked_entity(id)
            .and_then(StateOrStateMachine::as_state)
            .cloned()
            .ok_or(SessionError::NotAState(id))?;
        state.on.clear();
        state.always.clear();

        for edge in self.edges.iter().filter(|edge| edge.source == id) {
            if let Some(transition) = edge.transition() {
                state.add_transition(transition.clone());
            }
        }
        Ok(state)
    }

    // ========================================================================
    // IMPORT
    // ========================================================================

    /// Reset the session and rebuild it from `description`, registering names,
    /// scopes, contexts and transitions as interactive editing would.
    /// Returns the reconstructed top-level machines.
    pub fn from_collaborative_statemachine_description(
        &mut self,
        description: &CollaborativeStateMachineDescription,
    ) -> SessionResult<Vec<StateMachine>> {
        let csm = CollaborativeStateMachine::from_description(description)?;

        self.reset_service();
        self.name = csm.name.clone();
        self.version = csm.version.clone();

        for (context_type, variables) in [
            (ContextType::Local, &csm.local_context),
            (ContextType::Persistent, &csm.persistent_context),
        ] {
            for variable in variables {
                self.import_context(ContextOwner::Root, context_type, variable.clone());
            }
        }

        let mut pending = Vec::new();
        for machine in &csm.state_machines {
            self.import_machine(machine, None, &mut pending)?;
        }
        for (source, transition) in pending {
            self.import_transition(source, transition)?;
        }

        debug!(
            "Imported '{}' with {} node(s) and {} transition(s)",
            self.name,
            self.nodes.len(),
            self.edges.len()
        );
        Ok(csm.state_machines)
    }

    fn import_machine(
        &mut self,
        machine: &StateMachine,
        parent: Option<NodeId>,
        pending: &mut Vec<(NodeId, Transition)>,
    ) -> SessionResult<NodeId> {
        let mut entity = machine.clone();
        let children = mem::take(&mut entity.children);
        let mut wrapped = StateOrStateMachine::StateMachine(entity);
        let contexts = take_contexts(&mut wrapped);

        for action in machine.actions.iter().filter_map(|action| action.name()) {
            self.register_if_new(NameCategory::Action, action);
        }
        for guard in machine.guards.iter().filter_map(|guard| guard.name()) {
            self.register_if_new(NameCategory::Guard, guard);
        }

        let id = self.insert_node(wrapped, parent, false)?;
        self.restore_contexts(id, contexts);

        for child in &children {
            match child {
                StateOrStateMachine::State(state) => {
                    self.import_state(state, id, pending)?;
                }
                StateOrStateMachine::StateMachine(nested) => {
                    self.import_machine(nested, Some(id), pending)?;
                }
            }
        }
        Ok(id)
    }

    fn import_state(
        &mut self,
        state: &State,
        parent: NodeId,
        pending: &mut Vec<(NodeId, Transition)>,
    ) -> SessionResult<NodeId> {
        let mut entity = state.clone();
        let on = mem::take(&mut entity.on);
        let always = mem::take(&mut entity.always);
        let mut wrapped = StateOrStateMachine::State(entity);
        let contexts = take_contexts(&mut wrapped);

        for action in state.actions().flat_map(|action| action.flatten()) {
            if let Some(name) = action.name() {
                self.register_if_new(NameCategory::Action, name);
            }
            self.register_action_references(action);
        }

        let id = self.insert_node(wrapped, Some(parent), false)?;
        self.restore_contexts(id, contexts);
        pending.extend(on.into_iter().chain(always).map(|transition| (id, transition)));
        Ok(id)
    }

    fn import_transition(&mut self, source: NodeId, transition: Transition) -> SessionResult<()> {
        let target = self
            .resolve_target(source, &transition.target)
            .ok_or_else(|| SessionError::UnknownTarget {
                source_state: transition.source.clone(),
                target: transition.target.clone(),
            })?;

        if let Some(event) = &transition.event {
            self.register_if_new(NameCategory::Event, event);
        }
        for guard in transition.guards().iter().filter_map(|guard| guard.name()) {
            self.register_if_new(NameCategory::Guard, guard);
        }
        for action in transition.actions.iter().flat_map(|action| action.flatten()) {
            if let Some(name) = action.name() {
                self.register_if_new(NameCategory::Action, name);
            }
            self.register_action_references(action);
        }

        self.push_edge(source, target, EdgeKind::Transition(transition));
        Ok(())
    }

    /// Events and service types an action introduces.
    fn register_action_references(&mut self, action: &Action) {
        for event in action.raised_events() {
            self.register_if_new(NameCategory::Event, &event.name);
        }
        if let ActionKind::Invoke(invoke) = &action.kind {
            self.register_if_new(NameCategory::ServiceType, &invoke.service_type);
        }
    }

    /// A sibling of `source` named `name`, else any node of that name.
    fn resolve_target(&self, source: NodeId, name: &str) -> Option<NodeId> {
        let parent = self.node(source).ok()?.parent_id;
        self.nodes
            .iter()
            .find(|node| node.name == name && node.parent_id == parent)
            .or_else(|| self.nodes.iter().find(|node| node.name == name))
            .map(|node| node.id)
    }

    fn import_context(&mut self, owner: ContextOwner, context_type: ContextType, variable: ContextVariable) {
        let name = variable.name.clone();
        let result = self.add_context(owner, context_type, variable.clone());
        if let Err(err) = result {
            warn!("Importing context '{}': {}", name, err);
            let list = match owner {
                ContextOwner::Root => self.root_context.list_mut(context_type),
                ContextOwner::Node(id) => self
                    .node_links
                    .get_linked_entity_mut(id)
                    .and_then(|entity| entity.context_mut(context_type)),
            };
            if let Some(list) = list {
                list.push(variable);
            }
        }
    }

    fn restore_contexts(&mut self, id: NodeId, contexts: Vec<(ContextType, ContextVariable)>) {
        for (context_type, variable) in contexts {
            self.import_context(ContextOwner::Node(id), context_type, variable);
        }
    }
}

/// Move every context variable out of `entity`, remembering its list.
fn take_contexts(entity: &mut StateOrStateMachine) -> Vec<(ContextType, ContextVariable)> {
    let mut out = Vec::new();
    for context_type in ContextType::ALL {
        if let Some(list) = entity.context_mut(context_type) {
            out.extend(mem::take(list).into_iter().map(|variable| (context_type, variable)));
        }
    }
    out
}
