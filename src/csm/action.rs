use std::fmt;
use std::str::FromStr;

use super::context::ContextVariable;
use super::event::Event;
use super::Uid;

/// Discriminant of an [`ActionKind`], matching the `type` tag of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    Invoke,
    Create,
    Assign,
    Raise,
    Timeout,
    TimeoutReset,
    Match,
}

impl ActionType {
    pub const ALL: [ActionType; 7] = [
        Self::Invoke,
        Self::Create,
        Self::Assign,
        Self::Raise,
        Self::Timeout,
        Self::TimeoutReset,
        Self::Match,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Invoke => "invoke",
            Self::Create => "create",
            Self::Assign => "assign",
            Self::Raise => "raise",
            Self::Timeout => "timeout",
            Self::TimeoutReset => "timeoutReset",
            Self::Match => "match",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionTypeError(pub String);

impl fmt::Display for ParseActionTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action type: {:?}", self.0)
    }
}

impl std::error::Error for ParseActionTypeError {}

impl FromStr for ActionType {
    type Err = ParseActionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| ParseActionTypeError(s.to_owned()))
    }
}

/// Invoke a service, optionally locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeAction {
    pub service_type: String,
    pub is_local: bool,
    pub input: Vec<ContextVariable>,
    /// Names of the context variables receiving the service output
    pub output: Vec<String>,
    /// Events raised when the invocation completes
    pub done: Vec<Event>,
}

impl InvokeAction {
    pub fn new(service_type: impl Into<String>) -> Self {
        Self {
            service_type: service_type.into(),
            is_local: false,
            input: Vec::new(),
            output: Vec::new(),
            done: Vec::new(),
        }
    }
}

/// Create a context variable at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAction {
    pub variable: ContextVariable,
    pub is_persistent: bool,
}

/// Assign an expression to an existing context variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignAction {
    /// Name of the assigned variable
    pub variable: String,
    pub value: String,
}

/// Raise an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaiseAction {
    pub event: Event,
}

/// Raise an event once `delay` has elapsed. The timeout is addressed by the
/// name of its enclosing [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutAction {
    pub delay: String,
    pub action: RaiseAction,
}

/// Restart the timeout action named `action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutResetAction {
    pub action: String,
}

/// One arm of a [`MatchAction`].
#[derive(Debug, Clone)]
pub struct MatchCase {
    pub case: String,
    pub action: Action,
}

impl MatchCase {
    pub fn new(case: impl Into<String>, action: Action) -> Self {
        Self {
            case: case.into(),
            action,
        }
    }
}

/// Run the action of the first case matching `expression`.
#[derive(Debug, Clone)]
pub struct MatchAction {
    pub expression: String,
    pub cases: Vec<MatchCase>,
}

/// Type-specific payload of an action.
#[derive(Debug, Clone)]
pub enum ActionKind {
    Invoke(InvokeAction),
    Create(CreateAction),
    Assign(AssignAction),
    Raise(RaiseAction),
    Timeout(TimeoutAction),
    TimeoutReset(TimeoutResetAction),
    Match(MatchAction),
}

impl ActionKind {
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::Invoke(_) => ActionType::Invoke,
            Self::Create(_) => ActionType::Create,
            Self::Assign(_) => ActionType::Assign,
            Self::Raise(_) => ActionType::Raise,
            Self::Timeout(_) => ActionType::Timeout,
            Self::TimeoutReset(_) => ActionType::TimeoutReset,
            Self::Match(_) => ActionType::Match,
        }
    }
}

/// An action executed on entry, exit, while in a state, after a delay, or on a transition.
#[derive(Debug, Clone)]
pub struct Action {
    uid: Uid,
    /// Optional name; named actions compare by name
    pub name: Option<String>,
    pub kind: ActionKind,
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            uid: Uid::fresh(),
            name: None,
            kind,
        }
    }

    pub fn named(name: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            uid: Uid::fresh(),
            name: Some(name.into()),
            kind,
        }
    }

    pub fn invoke(service_type: impl Into<String>) -> Self {
        Self::new(ActionKind::Invoke(InvokeAction::new(service_type)))
    }

    pub fn create(variable: ContextVariable, is_persistent: bool) -> Self {
        Self::new(ActionKind::Create(CreateAction {
            variable,
            is_persistent,
        }))
    }

    pub fn assign(variable: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(ActionKind::Assign(AssignAction {
            variable: variable.into(),
            value: value.into(),
        }))
    }

    pub fn raise(event: Event) -> Self {
        Self::new(ActionKind::Raise(RaiseAction { event }))
    }

    pub fn timeout(name: impl Into<String>, delay: impl Into<String>, event: Event) -> Self {
        Self::named(
            name,
            ActionKind::Timeout(TimeoutAction {
                delay: delay.into(),
                action: RaiseAction { event },
            }),
        )
    }

    pub fn timeout_reset(timeout_name: impl Into<String>) -> Self {
        Self::new(ActionKind::TimeoutReset(TimeoutResetAction {
            action: timeout_name.into(),
        }))
    }

    pub fn matching(expression: impl Into<String>, cases: Vec<MatchCase>) -> Self {
        Self::new(ActionKind::Match(MatchAction {
            expression: expression.into(),
            cases,
        }))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// The name, if one is set and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn action_type(&self) -> ActionType {
        self.kind.action_type()
    }

    /// Events this action raises, including those raised by nested actions
    /// (timeout payloads, match arms) and invocation completion events.
    pub fn raised_events(&self) -> Vec<&Event> {
        let mut events = Vec::new();
        self.collect_raised_events(&mut events);
        events
    }

    fn collect_raised_events<'a>(&'a self, events: &mut Vec<&'a Event>) {
        match &self.kind {
            ActionKind::Raise(raise) => events.push(&raise.event),
            ActionKind::Timeout(timeout) => events.push(&timeout.action.event),
            ActionKind::Invoke(invoke) => events.extend(invoke.done.iter()),
            ActionKind::Match(matching) => {
                for case in &matching.cases {
                    case.action.collect_raised_events(events);
                }
            }
            ActionKind::Create(_) | ActionKind::Assign(_) | ActionKind::TimeoutReset(_) => {}
        }
    }

    /// This action followed by every action nested inside it (match arms), pre-order.
    pub fn flatten(&self) -> Vec<&Action> {
        let mut out = vec![self];
        if let ActionKind::Match(matching) = &self.kind {
            for case in &matching.cases {
                out.extend(case.action.flatten());
            }
        }
        out
    }
}

/// Named actions compare by name, nameless ones by identity.
impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        match (self.name(), other.name()) {
            (Some(a), Some(b)) => a == b,
            _ => self.uid == other.uid,
        }
    }
}
