use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::{ContextType, ContextVariable};
use super::state_machine::StateMachine;

/// How the runtime places context memory for the state machines of a CSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryMode {
    /// Every state machine keeps its own memory
    #[default]
    Distributed,
    /// State machines share one memory
    Shared,
}

impl fmt::Display for MemoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distributed => f.write_str("distributed"),
            Self::Shared => f.write_str("shared"),
        }
    }
}

/// Top-level container and serialization root.
#[derive(Debug, Clone)]
pub struct CollaborativeStateMachine {
    pub name: String,
    pub version: String,
    pub memory_mode: MemoryMode,
    pub state_machines: Vec<StateMachine>,
    pub local_context: Vec<ContextVariable>,
    pub persistent_context: Vec<ContextVariable>,
}

impl CollaborativeStateMachine {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            memory_mode: MemoryMode::default(),
            state_machines: Vec::new(),
            local_context: Vec::new(),
            persistent_context: Vec::new(),
        }
    }

    pub fn with_state_machine(mut self, machine: StateMachine) -> Self {
        self.state_machines.push(machine);
        self
    }

    pub fn with_context(mut self, context_type: ContextType, variable: ContextVariable) -> Self {
        match context_type {
            ContextType::Local => self.local_context.push(variable),
            ContextType::Persistent => self.persistent_context.push(variable),
            ContextType::Static => {
                log::warn!(
                    "collaborative state machine has no static context, dropping '{}'",
                    variable.name
                );
            }
        }
        self
    }

    /// Top-level machines followed by their nested machines, pre-order.
    pub fn all_state_machines(&self) -> Vec<&StateMachine> {
        let mut out = Vec::new();
        for machine in &self.state_machines {
            out.push(machine);
            out.extend(machine.all_state_machines());
        }
        out
    }

    pub fn find_state_machine(&self, name: &str) -> Option<&StateMachine> {
        self.all_state_machines().into_iter().find(|m| m.name == name)
    }

    /// Validate the CSM definition
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Collaborative state machine has no name".to_string());
        }
        if self.version.trim().is_empty() {
            errors.push("Collaborative state machine has no version".to_string());
        }

        let mut names = BTreeSet::new();
        for machine in self.all_state_machines() {
            if !names.insert(machine.name.as_str()) {
                errors.push(format!("Duplicate name '{}'", machine.name));
            }
            for state in machine.states() {
                if !names.insert(state.name.as_str()) {
                    errors.push(format!("Duplicate name '{}'", state.name));
                }
            }

            if !machine.is_abstract && !machine.contains_state_transitively() {
                errors.push(format!("State machine '{}' has no states", machine.name));
            }

            let initial = machine.states().filter(|s| s.initial).count();
            if initial > 1 {
                errors.push(format!(
                    "State machine '{}' has {} initial states",
                    machine.name, initial
                ));
            }
        }

        for machine in &self.state_machines {
            for state in machine.all_states() {
                for transition in state.transitions() {
                    let targets = std::iter::once(&transition.target)
                        .chain(transition.else_target.as_ref());
                    for target in targets {
                        if !names.contains(target.as_str()) {
                            errors.push(format!(
                                "Transition target '{}' from state '{}' not found",
                                target, state.name
                            ));
                        }
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
