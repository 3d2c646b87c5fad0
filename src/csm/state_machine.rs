use serde::{Deserialize, Serialize};

use super::action::Action;
use super::context::{ContextType, ContextVariable};
use super::event::Event;
use super::guard::Guard;
use super::state::State;

/// Discriminant of [`StateOrStateMachine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementKind {
    State,
    StateMachine,
}

/// A child of a state machine: either a plain state or a nested state machine.
#[derive(Debug, Clone)]
pub enum StateOrStateMachine {
    State(State),
    StateMachine(StateMachine),
}

impl StateOrStateMachine {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::State(_) => ElementKind::State,
            Self::StateMachine(_) => ElementKind::StateMachine,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::State(state) => &state.name,
            Self::StateMachine(machine) => &machine.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        match self {
            Self::State(state) => state.name = name.into(),
            Self::StateMachine(machine) => machine.name = name.into(),
        }
    }

    pub fn named_actions(&self) -> Vec<&Action> {
        match self {
            Self::State(state) => state.named_actions(),
            Self::StateMachine(machine) => machine.named_actions(),
        }
    }

    pub fn named_guards(&self) -> Vec<&Guard> {
        match self {
            Self::State(state) => state.named_guards(),
            Self::StateMachine(machine) => machine.named_guards(),
        }
    }

    pub fn as_state(&self) -> Option<&State> {
        match self {
            Self::State(state) => Some(state),
            Self::StateMachine(_) => None,
        }
    }

    pub fn as_state_mut(&mut self) -> Option<&mut State> {
        match self {
            Self::State(state) => Some(state),
            Self::StateMachine(_) => None,
        }
    }

    pub fn as_state_machine(&self) -> Option<&StateMachine> {
        match self {
            Self::StateMachine(machine) => Some(machine),
            Self::State(_) => None,
        }
    }

    pub fn as_state_machine_mut(&mut self) -> Option<&mut StateMachine> {
        match self {
            Self::StateMachine(machine) => Some(machine),
            Self::State(_) => None,
        }
    }

    /// Local, persistent (and for states, static) context lists.
    pub fn context(&self, context_type: ContextType) -> Option<&Vec<ContextVariable>> {
        match self {
            Self::State(state) => Some(state.context(context_type)),
            Self::StateMachine(machine) => machine.context(context_type),
        }
    }

    pub fn context_mut(&mut self, context_type: ContextType) -> Option<&mut Vec<ContextVariable>> {
        match self {
            Self::State(state) => Some(state.context_mut(context_type)),
            Self::StateMachine(machine) => machine.context_mut(context_type),
        }
    }
}

impl From<State> for StateOrStateMachine {
    fn from(state: State) -> Self {
        Self::State(state)
    }
}

impl From<StateMachine> for StateOrStateMachine {
    fn from(machine: StateMachine) -> Self {
        Self::StateMachine(machine)
    }
}

/// A (possibly nested) state machine.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    /// Unique name
    pub name: String,
    /// States and nested state machines, in authoring order
    pub children: Vec<StateOrStateMachine>,
    pub local_context: Vec<ContextVariable>,
    pub persistent_context: Vec<ContextVariable>,
    /// Reusable named guards
    pub guards: Vec<Guard>,
    /// Reusable named actions
    pub actions: Vec<Action>,
    /// Name of the base state machine this one inherits from
    pub inherit: Option<String>,
    pub is_abstract: bool,
}

impl StateMachine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.children.push(StateOrStateMachine::State(state));
        self
    }

    pub fn with_state_machine(mut self, machine: StateMachine) -> Self {
        self.children.push(StateOrStateMachine::StateMachine(machine));
        self
    }

    pub fn with_context(mut self, context_type: ContextType, variable: ContextVariable) -> Self {
        if let Some(list) = self.context_mut(context_type) {
            list.push(variable);
        }
        self
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.children.iter().filter_map(StateOrStateMachine::as_state)
    }

    pub fn states_mut(&mut self) -> impl Iterator<Item = &mut State> {
        self.children
            .iter_mut()
            .filter_map(StateOrStateMachine::as_state_mut)
    }

    pub fn state_machines(&self) -> impl Iterator<Item = &StateMachine> {
        self.children
            .iter()
            .filter_map(StateOrStateMachine::as_state_machine)
    }

    pub fn state_machines_mut(&mut self) -> impl Iterator<Item = &mut StateMachine> {
        self.children
            .iter_mut()
            .filter_map(StateOrStateMachine::as_state_machine_mut)
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states().find(|s| s.name == name)
    }

    pub fn state_mut(&mut self, name: &str) -> Option<&mut State> {
        self.states_mut().find(|s| s.name == name)
    }

    pub fn initial_state(&self) -> Option<&State> {
        self.states().find(|s| s.initial)
    }

    /// Every state in this machine and its nested machines, depth-first.
    pub fn all_states(&self) -> Vec<&State> {
        let mut out = Vec::new();
        for child in &self.children {
            match child {
                StateOrStateMachine::State(state) => out.push(state),
                StateOrStateMachine::StateMachine(machine) => out.extend(machine.all_states()),
            }
        }
        out
    }

    /// Every nested state machine, each emitted before its own descendants.
    pub fn all_state_machines(&self) -> Vec<&StateMachine> {
        let mut out = Vec::new();
        for machine in self.state_machines() {
            out.push(machine);
            out.extend(machine.all_state_machines());
        }
        out
    }

    pub fn contains_state_transitively(&self) -> bool {
        self.children.iter().any(|child| match child {
            StateOrStateMachine::State(_) => true,
            StateOrStateMachine::StateMachine(machine) => machine.contains_state_transitively(),
        })
    }

    /// Find a direct or nested child by name.
    pub fn find(&self, name: &str) -> Option<&StateOrStateMachine> {
        for child in &self.children {
            if child.name() == name {
                return Some(child);
            }
            if let StateOrStateMachine::StateMachine(machine) = child {
                if let Some(found) = machine.find(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn named_actions(&self) -> Vec<&Action> {
        let mut out = self
            .actions
            .iter()
            .filter(|a| a.name().is_some())
            .collect::<Vec<_>>();
        for child in &self.children {
            out.extend(child.named_actions());
        }
        out
    }

    pub fn named_guards(&self) -> Vec<&Guard> {
        let mut out = self
            .guards
            .iter()
            .filter(|g| g.name().is_some())
            .collect::<Vec<_>>();
        for child in &self.children {
            out.extend(child.named_guards());
        }
        out
    }

    /// Events raised anywhere inside this machine, nested machines included.
    pub fn raised_events(&self) -> Vec<&Event> {
        let mut out = Vec::new();
        for action in &self.actions {
            out.extend(action.raised_events());
        }
        for state in self.all_states() {
            out.extend(state.raised_events());
        }
        out
    }

    /// Events consumed by `on` transitions anywhere inside this machine.
    pub fn consumed_events(&self) -> Vec<&str> {
        self.all_states()
            .into_iter()
            .flat_map(|s| s.on.iter())
            .filter_map(|t| t.event.as_deref())
            .collect()
    }

    /// Local or persistent context; machines have no static context.
    pub fn context(&self, context_type: ContextType) -> Option<&Vec<ContextVariable>> {
        match context_type {
            ContextType::Local => Some(&self.local_context),
            ContextType::Persistent => Some(&self.persistent_context),
            ContextType::Static => None,
        }
    }

    pub fn context_mut(&mut self, context_type: ContextType) -> Option<&mut Vec<ContextVariable>> {
        match context_type {
            ContextType::Local => Some(&mut self.local_context),
            ContextType::Persistent => Some(&mut self.persistent_context),
            ContextType::Static => None,
        }
    }

    pub fn context_type_of(&self, name: &str) -> Option<ContextType> {
        [ContextType::Local, ContextType::Persistent]
            .into_iter()
            .find(|ty| {
                self.context(*ty)
                    .is_some_and(|list| list.iter().any(|v| v.name == name))
            })
    }
}
