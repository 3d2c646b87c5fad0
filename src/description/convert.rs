//! Conversion between domain entities and description records.

use thiserror::Error;

use super::{
    ActionDescription, AssignActionDescription, CollaborativeStateMachineDescription,
    ContextVariableDescription, ContextVariableReferenceDescription, CreateActionDescription,
    EventDescription, GuardDescription, InvokeActionDescription, MatchActionDescription,
    MatchCaseDescription, OnTransitionDescription, RaiseActionDescription, StateDescription,
    StateMachineDescription, TimeoutActionDescription, TimeoutResetActionDescription,
};
use crate::csm::{
    Action, ActionKind, AssignAction, CollaborativeStateMachine, ContextVariable, CreateAction,
    Event, Guard, InvokeAction, MatchAction, MatchCase, MemoryMode, RaiseAction, State,
    StateMachine, StateOrStateMachine, TimeoutAction, TimeoutResetAction, Transition,
};

/// A description that cannot be turned into entities.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("{entity} is missing required field '{field}'")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },
    #[error("transition from '{source_state}' is missing its target")]
    MissingTarget { source_state: String },
}

fn require(value: &str, entity: &'static str, field: &'static str) -> Result<(), DescriptionError> {
    if value.trim().is_empty() {
        return Err(DescriptionError::MissingField { entity, field });
    }
    Ok(())
}

// ============================================================================
// CONTEXT, EVENTS, GUARDS
// ============================================================================

impl ContextVariable {
    pub fn to_description(&self) -> ContextVariableDescription {
        ContextVariableDescription {
            name: self.name.clone(),
            value: self.value.clone(),
        }
    }

    pub fn from_description(description: &ContextVariableDescription) -> Self {
        Self::new(&description.name, &description.value)
    }
}

fn contexts_to_description(variables: &[ContextVariable]) -> Vec<ContextVariableDescription> {
    variables.iter().map(ContextVariable::to_description).collect()
}

fn contexts_from_description(variables: &[ContextVariableDescription]) -> Vec<ContextVariable> {
    variables.iter().map(ContextVariable::from_description).collect()
}

impl Event {
    pub fn to_description(&self) -> EventDescription {
        EventDescription {
            name: self.name.clone(),
            channel: self.channel,
            data: contexts_to_description(&self.data),
        }
    }

    pub fn from_description(description: &EventDescription) -> Self {
        Self {
            name: description.name.clone(),
            channel: description.channel,
            data: contexts_from_description(&description.data),
        }
    }
}

impl Guard {
    pub fn to_description(&self) -> GuardDescription {
        GuardDescription {
            expression: self.expression.clone(),
        }
    }

    pub fn from_description(description: &GuardDescription) -> Self {
        Self::new(&description.expression)
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

impl RaiseAction {
    pub fn to_description(&self) -> RaiseActionDescription {
        RaiseActionDescription {
            event: self.event.to_description(),
        }
    }

    pub fn from_description(description: &RaiseActionDescription) -> Self {
        Self {
            event: Event::from_description(&description.event),
        }
    }
}

impl Action {
    pub fn to_description(&self) -> ActionDescription {
        match &self.kind {
            ActionKind::Invoke(invoke) => ActionDescription::Invoke(InvokeActionDescription {
                service_type: invoke.service_type.clone(),
                is_local: invoke.is_local,
                input: contexts_to_description(&invoke.input),
                output: invoke
                    .output
                    .iter()
                    .map(|reference| ContextVariableReferenceDescription {
                        reference: reference.clone(),
                    })
                    .collect(),
                done: invoke.done.iter().map(Event::to_description).collect(),
            }),
            ActionKind::Create(create) => ActionDescription::Create(CreateActionDescription {
                variable: create.variable.to_description(),
                is_persistent: create.is_persistent,
            }),
            ActionKind::Assign(assign) => ActionDescription::Assign(AssignActionDescription {
                variable: ContextVariableReferenceDescription {
                    reference: assign.variable.clone(),
                },
                value: assign.value.clone(),
            }),
            ActionKind::Raise(raise) => ActionDescription::Raise(raise.to_description()),
            ActionKind::Timeout(timeout) => ActionDescription::Timeout(TimeoutActionDescription {
                name: self.name.clone().unwrap_or_default(),
                delay: timeout.delay.clone(),
                action: timeout.action.to_description(),
            }),
            ActionKind::TimeoutReset(reset) => {
                ActionDescription::TimeoutReset(TimeoutResetActionDescription {
                    action: reset.action.clone(),
                })
            }
            ActionKind::Match(matching) => ActionDescription::Match(MatchActionDescription {
                expression: matching.expression.clone(),
                cases: matching
                    .cases
                    .iter()
                    .map(|case| MatchCaseDescription {
                        case: case.case.clone(),
                        action: case.action.to_description(),
                    })
                    .collect(),
            }),
        }
    }

    /// Rebuild an action; an unrecognized `type` is logged and yields `None`.
    pub fn from_description(description: &ActionDescription) -> Option<Self> {
        let action = match description {
            ActionDescription::Invoke(invoke) => Action::new(ActionKind::Invoke(InvokeAction {
                service_type: invoke.service_type.clone(),
                is_local: invoke.is_local,
                input: contexts_from_description(&invoke.input),
                output: invoke.output.iter().map(|r| r.reference.clone()).collect(),
                done: invoke.done.iter().map(Event::from_description).collect(),
            })),
            ActionDescription::Create(create) => Action::new(ActionKind::Create(CreateAction {
                variable: ContextVariable::from_description(&create.variable),
                is_persistent: create.is_persistent,
            })),
            ActionDescription::Assign(assign) => Action::new(ActionKind::Assign(AssignAction {
                variable: assign.variable.reference.clone(),
                value: assign.value.clone(),
            })),
            ActionDescription::Raise(raise) => {
                Action::new(ActionKind::Raise(RaiseAction::from_description(raise)))
            }
            ActionDescription::Timeout(timeout) => Action::named(
                &timeout.name,
                ActionKind::Timeout(TimeoutAction {
                    delay: timeout.delay.clone(),
                    action: RaiseAction::from_description(&timeout.action),
                }),
            ),
            ActionDescription::TimeoutReset(reset) => {
                Action::new(ActionKind::TimeoutReset(TimeoutResetAction {
                    action: reset.action.clone(),
                }))
            }
            ActionDescription::Match(matching) => Action::new(ActionKind::Match(MatchAction {
                expression: matching.expression.clone(),
                cases: matching
                    .cases
                    .iter()
                    .filter_map(|case| {
                        Action::from_description(&case.action)
                            .map(|action| MatchCase::new(&case.case, action))
                    })
                    .collect(),
            })),
            ActionDescription::Unknown => {
                log::error!("cannot rebuild action: unknown action type");
                return None;
            }
        };
        Some(action)
    }
}

fn actions_to_description(actions: &[Action]) -> Vec<ActionDescription> {
    actions.iter().map(Action::to_description).collect()
}

fn actions_from_description(actions: &[ActionDescription]) -> Vec<Action> {
    actions.iter().filter_map(Action::from_description).collect()
}

// ============================================================================
// TRANSITIONS AND STATES
// ============================================================================

impl Transition {
    pub fn to_description(&self) -> OnTransitionDescription {
        OnTransitionDescription {
            target: self.target.clone(),
            event: self.event.clone(),
            guards: self.guards().iter().map(Guard::to_description).collect(),
            actions: actions_to_description(&self.actions),
            else_target: self.else_target.clone(),
        }
    }

    /// Rebuild a transition leaving the state called `source`.
    pub fn from_description(
        source: &str,
        description: &OnTransitionDescription,
    ) -> Result<Self, DescriptionError> {
        if description.target.trim().is_empty() {
            return Err(DescriptionError::MissingTarget {
                source_state: source.to_owned(),
            });
        }

        let mut transition = Transition::new(source, &description.target);
        transition.event = description.event.clone();
        for guard in &description.guards {
            transition.add_guard(Guard::from_description(guard));
        }
        transition.actions = actions_from_description(&description.actions);
        transition.else_target = description.else_target.clone();
        Ok(transition)
    }
}

impl State {
    pub fn to_description(&self) -> StateDescription {
        StateDescription {
            name: self.name.clone(),
            initial: self.initial,
            terminal: self.terminal,
            is_virtual: self.is_virtual,
            is_abstract: self.is_abstract,
            entry: actions_to_description(&self.entry),
            exit: actions_to_description(&self.exit),
            while_actions: actions_to_description(&self.while_actions),
            after: actions_to_description(&self.after),
            on: self.on.iter().map(Transition::to_description).collect(),
            always: self.always.iter().map(Transition::to_description).collect(),
            local_context: contexts_to_description(&self.local_context),
            persistent_context: contexts_to_description(&self.persistent_context),
            static_context: contexts_to_description(&self.static_context),
        }
    }

    pub fn from_description(description: &StateDescription) -> Result<Self, DescriptionError> {
        require(&description.name, "state", "name")?;

        let name = description.name.as_str();
        let on = description
            .on
            .iter()
            .map(|t| Transition::from_description(name, t))
            .collect::<Result<Vec<_>, _>>()?;
        let always = description
            .always
            .iter()
            .map(|t| Transition::from_description(name, t))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(State {
            name: name.to_owned(),
            initial: description.initial,
            terminal: description.terminal,
            is_virtual: description.is_virtual,
            is_abstract: description.is_abstract,
            entry: actions_from_description(&description.entry),
            exit: actions_from_description(&description.exit),
            while_actions: actions_from_description(&description.while_actions),
            after: actions_from_description(&description.after),
            on,
            always,
            local_context: contexts_from_description(&description.local_context),
            persistent_context: contexts_from_description(&description.persistent_context),
            static_context: contexts_from_description(&description.static_context),
        })
    }
}

// ============================================================================
// STATE MACHINES
// ============================================================================

impl StateMachine {
    /// Partitions the children into `states` and `stateMachines`, recursing into both.
    pub fn to_description(&self) -> StateMachineDescription {
        let mut states = Vec::new();
        let mut state_machines = Vec::new();
        for child in &self.children {
            match child {
                StateOrStateMachine::State(state) => states.push(state.to_description()),
                StateOrStateMachine::StateMachine(machine) => {
                    state_machines.push(machine.to_description())
                }
            }
        }

        StateMachineDescription {
            name: self.name.clone(),
            states,
            state_machines,
            local_context: contexts_to_description(&self.local_context),
            persistent_context: contexts_to_description(&self.persistent_context),
            inherit: self.inherit.clone(),
            is_abstract: self.is_abstract,
        }
    }

    /// Children are rebuilt states first, then nested machines. The record
    /// keeps two separate lists, so interleaved authoring order is not recoverable.
    pub fn from_description(
        description: &StateMachineDescription,
    ) -> Result<Self, DescriptionError> {
        require(&description.name, "state machine", "name")?;

        let mut machine = StateMachine::new(&description.name);
        for state in &description.states {
            machine.children.push(State::from_description(state)?.into());
        }
        for nested in &description.state_machines {
            machine
                .children
                .push(StateMachine::from_description(nested)?.into());
        }
        machine.local_context = contexts_from_description(&description.local_context);
        machine.persistent_context = contexts_from_description(&description.persistent_context);
        machine.inherit = description.inherit.clone();
        machine.is_abstract = description.is_abstract;
        Ok(machine)
    }
}

impl CollaborativeStateMachine {
    pub fn to_description(&self) -> CollaborativeStateMachineDescription {
        CollaborativeStateMachineDescription {
            name: self.name.clone(),
            version: self.version.clone(),
            state_machines: self
                .state_machines
                .iter()
                .map(StateMachine::to_description)
                .collect(),
            local_context: contexts_to_description(&self.local_context),
            persistent_context: contexts_to_description(&self.persistent_context),
        }
    }

    /// The memory mode is not part of the description and falls back to the default.
    pub fn from_description(
        description: &CollaborativeStateMachineDescription,
    ) -> Result<Self, DescriptionError> {
        require(&description.name, "collaborative state machine", "name")?;
        require(&description.version, "collaborative state machine", "version")?;

        let state_machines = description
            .state_machines
            .iter()
            .map(StateMachine::from_description)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CollaborativeStateMachine {
            name: description.name.clone(),
            version: description.version.clone(),
            memory_mode: MemoryMode::default(),
            state_machines,
            local_context: contexts_from_description(&description.local_context),
            persistent_context: contexts_from_description(&description.persistent_context),
        })
    }
}
