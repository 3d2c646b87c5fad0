//! Description records
//! Flat, serialization-ready shapes mirroring the persisted CSM schema. Field
//! names are fixed by the external format; every list is always present.

use serde::{Deserialize, Serialize};

use crate::csm::EventChannel;

mod convert;


pub use convert::DescriptionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborativeStateMachineDescription {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub state_machines: Vec<StateMachineDescription>,
    #[serde(default)]
    pub local_context: Vec<ContextVariableDescription>,
    #[serde(default)]
    pub persistent_context: Vec<ContextVariableDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateMachineDescription {
    pub name: String,
    #[serde(default)]
    pub states: Vec<StateDescription>,
    #[serde(default)]
    pub state_machines: Vec<StateMachineDescription>,
    #[serde(default)]
    pub local_context: Vec<ContextVariableDescription>,
    #[serde(default)]
    pub persistent_context: Vec<ContextVariableDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit: Option<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "is_false")]
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDescription {
    pub name: String,
    #[serde(default)]
    pub initial: bool,
    #[serde(default)]
    pub terminal: bool,
    #[serde(default, rename = "virtual", skip_serializing_if = "is_false")]
    pub is_virtual: bool,
    #[serde(default, rename = "abstract", skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    #[serde(default)]
    pub entry: Vec<ActionDescription>,
    #[serde(default)]
    pub exit: Vec<ActionDescription>,
    #[serde(default, rename = "while")]
    pub while_actions: Vec<ActionDescription>,
    #[serde(default)]
    pub after: Vec<ActionDescription>,
    #[serde(default)]
    pub on: Vec<OnTransitionDescription>,
    #[serde(default)]
    pub always: Vec<OnTransitionDescription>,
    #[serde(default)]
    pub local_context: Vec<ContextVariableDescription>,
    #[serde(default)]
    pub persistent_context: Vec<ContextVariableDescription>,
    #[serde(default)]
    pub static_context: Vec<ContextVariableDescription>,
}

/// Transition record; `always` transitions carry no `event`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnTransitionDescription {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default)]
    pub guards: Vec<GuardDescription>,
    #[serde(default)]
    pub actions: Vec<ActionDescription>,
    #[serde(default, rename = "else", skip_serializing_if = "Option::is_none")]
    pub else_target: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardDescription {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextVariableDescription {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextVariableReferenceDescription {
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDescription {
    pub name: String,
    #[serde(default)]
    pub channel: EventChannel,
    #[serde(default)]
    pub data: Vec<ContextVariableDescription>,
}

/// Action record, tagged by `type`. Unrecognized tags deserialize to `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActionDescription {
    Invoke(InvokeActionDescription),
    Create(CreateActionDescription),
    Assign(AssignActionDescription),
    Raise(RaiseActionDescription),
    Timeout(TimeoutActionDescription),
    TimeoutReset(TimeoutResetActionDescription),
    Match(MatchActionDescription),
    #[serde(other)]
    Unknown,
}

impl ActionDescription {
    /// The `type` tag, `None` for an unrecognized one.
    pub fn type_tag(&self) -> Option<&'static str> {
        match self {
            Self::Invoke(_) => Some("invoke"),
            Self::Create(_) => Some("create"),
            Self::Assign(_) => Some("assign"),
            Self::Raise(_) => Some("raise"),
            Self::Timeout(_) => Some("timeout"),
            Self::TimeoutReset(_) => Some("timeoutReset"),
            Self::Match(_) => Some("match"),
            Self::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeActionDescription {
    pub service_type: String,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub input: Vec<ContextVariableDescription>,
    #[serde(default)]
    pub output: Vec<ContextVariableReferenceDescription>,
    #[serde(default)]
    pub done: Vec<EventDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionDescription {
    pub variable: ContextVariableDescription,
    #[serde(default)]
    pub is_persistent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignActionDescription {
    pub variable: ContextVariableReferenceDescription,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaiseActionDescription {
    pub event: EventDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutActionDescription {
    pub name: String,
    pub delay: String,
    pub action: RaiseActionDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutResetActionDescription {
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchActionDescription {
    pub expression: String,
    #[serde(default)]
    pub cases: Vec<MatchCaseDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCaseDescription {
    pub case: String,
    pub action: ActionDescription,
}

fn is_false(value: &bool) -> bool {
    !*value
}
