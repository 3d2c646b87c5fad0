//! Builders for states, state machines and collaborative state machines.
//!
//! Builders keep a working object between calls. `build` validates it and hands it
//! out (resetting the builder); a failed `build` keeps the working object so the
//! caller can fix it, and `reset` discards it.

use thiserror::Error;

use super::action::Action;
use super::collaborative::{CollaborativeStateMachine, MemoryMode};
use super::context::{ContextType, ContextVariable};
use super::guard::Guard;
use super::state::State;
use super::state_machine::StateMachine;
use super::transition::Transition;

/// Errors that can occur when building CSM entities.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("{0} name not specified. Call .name(name) before .build()")]
    MissingName(&'static str),

    #[error("State machine '{0}' has no states. Add at least one state or mark it abstract")]
    NoStates(String),

    #[error("Version not specified. Call .version(version) before .build()")]
    MissingVersion,

    #[error("Memory mode not specified. Call .memory_mode(mode) before .build()")]
    MissingMemoryMode,
}

/// Builder for [`State`].
#[derive(Debug, Default)]
pub struct StateBuilder {
    state: State,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.state.name = name.into();
        self
    }

    pub fn initial(&mut self, initial: bool) -> &mut Self {
        self.state.initial = initial;
        self
    }

    pub fn terminal(&mut self, terminal: bool) -> &mut Self {
        self.state.terminal = terminal;
        self
    }

    pub fn is_virtual(&mut self, is_virtual: bool) -> &mut Self {
        self.state.is_virtual = is_virtual;
        self
    }

    pub fn is_abstract(&mut self, is_abstract: bool) -> &mut Self {
        self.state.is_abstract = is_abstract;
        self
    }

    pub fn entry(&mut self, action: Action) -> &mut Self {
        self.state.entry.push(action);
        self
    }

    pub fn exit(&mut self, action: Action) -> &mut Self {
        self.state.exit.push(action);
        self
    }

    pub fn while_action(&mut self, action: Action) -> &mut Self {
        self.state.while_actions.push(action);
        self
    }

    pub fn after(&mut self, action: Action) -> &mut Self {
        self.state.after.push(action);
        self
    }

    pub fn transition(&mut self, transition: Transition) -> &mut Self {
        self.state.add_transition(transition);
        self
    }

    pub fn context(&mut self, context_type: ContextType, variable: ContextVariable) -> &mut Self {
        self.state.context_mut(context_type).push(variable);
        self
    }

    pub fn build(&mut self) -> Result<State, BuildError> {
        if self.state.name.trim().is_empty() {
            return Err(BuildError::MissingName("State"));
        }
        Ok(std::mem::take(&mut self.state))
    }

    pub fn reset(&mut self) {
        self.state = State::default();
    }
}

/// Builder for [`StateMachine`].
#[derive(Debug, Default)]
pub struct StateMachineBuilder {
    machine: StateMachine,
}

impl StateMachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.machine.name = name.into();
        self
    }

    pub fn state(&mut self, state: State) -> &mut Self {
        self.machine.children.push(state.into());
        self
    }

    pub fn state_machine(&mut self, machine: StateMachine) -> &mut Self {
        self.machine.children.push(machine.into());
        self
    }

    pub fn context(&mut self, context_type: ContextType, variable: ContextVariable) -> &mut Self {
        match self.machine.context_mut(context_type) {
            Some(list) => list.push(variable),
            None => log::warn!(
                "state machine '{}' has no {} context, dropping '{}'",
                self.machine.name,
                context_type,
                variable.name
            ),
        }
        self
    }

    pub fn guard(&mut self, guard: Guard) -> &mut Self {
        self.machine.guards.push(guard);
        self
    }

    pub fn action(&mut self, action: Action) -> &mut Self {
        self.machine.actions.push(action);
        self
    }

    pub fn inherit(&mut self, base: impl Into<String>) -> &mut Self {
        self.machine.inherit = Some(base.into());
        self
    }

    pub fn is_abstract(&mut self, is_abstract: bool) -> &mut Self {
        self.machine.is_abstract = is_abstract;
        self
    }

    pub fn build(&mut self) -> Result<StateMachine, BuildError> {
        if self.machine.name.trim().is_empty() {
            return Err(BuildError::MissingName("State machine"));
        }
        if !self.machine.is_abstract && !self.machine.contains_state_transitively() {
            return Err(BuildError::NoStates(self.machine.name.clone()));
        }
        Ok(std::mem::take(&mut self.machine))
    }

    pub fn reset(&mut self) {
        self.machine = StateMachine::default();
    }
}

/// Builder for [`CollaborativeStateMachine`].
#[derive(Debug, Default)]
pub struct CollaborativeStateMachineBuilder {
    name: Option<String>,
    version: Option<String>,
    memory_mode: Option<MemoryMode>,
    state_machines: Vec<StateMachine>,
    local_context: Vec<ContextVariable>,
    persistent_context: Vec<ContextVariable>,
}

impl CollaborativeStateMachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = Some(version.into());
        self
    }

    pub fn memory_mode(&mut self, memory_mode: MemoryMode) -> &mut Self {
        self.memory_mode = Some(memory_mode);
        self
    }

    pub fn state_machine(&mut self, machine: StateMachine) -> &mut Self {
        self.state_machines.push(machine);
        self
    }

    pub fn context(&mut self, context_type: ContextType, variable: ContextVariable) -> &mut Self {
        match context_type {
            ContextType::Local => self.local_context.push(variable),
            ContextType::Persistent => self.persistent_context.push(variable),
            ContextType::Static => log::warn!(
                "collaborative state machine has no static context, dropping '{}'",
                variable.name
            ),
        }
        self
    }

    pub fn build(&mut self) -> Result<CollaborativeStateMachine, BuildError> {
        let name = match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_owned(),
            _ => return Err(BuildError::MissingName("Collaborative state machine")),
        };
        let version = match self.version.as_deref() {
            Some(version) if !version.trim().is_empty() => version.to_owned(),
            _ => return Err(BuildError::MissingVersion),
        };
        let memory_mode = self.memory_mode.ok_or(BuildError::MissingMemoryMode)?;

        let csm = CollaborativeStateMachine {
            name,
            version,
            memory_mode,
            state_machines: std::mem::take(&mut self.state_machines),
            local_context: std::mem::take(&mut self.local_context),
            persistent_context: std::mem::take(&mut self.persistent_context),
        };
        self.reset();
        Ok(csm)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
