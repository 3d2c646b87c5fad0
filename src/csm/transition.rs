use super::action::Action;
use super::guard::Guard;
use super::Uid;

/// A transition between states (or state machines), referenced by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Source state or state machine name
    pub source: String,
    /// Target state or state machine name
    pub target: String,
    /// Triggering event; `None` for an `always` transition
    pub event: Option<String>,
    /// Guards, deduplicated by identity
    guards: Vec<Guard>,
    /// Actions to execute
    pub actions: Vec<Action>,
    /// Target taken when the guards do not hold
    pub else_target: Option<String>,
}

impl Transition {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            event: None,
            guards: Vec::new(),
            actions: Vec::new(),
            else_target: None,
        }
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.add_guard(guard);
        self
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_else(mut self, target: impl Into<String>) -> Self {
        self.else_target = Some(target.into());
        self
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    /// Append a guard. Returns `false` (no-op) when this very guard is already attached.
    pub fn add_guard(&mut self, guard: Guard) -> bool {
        if self.guards.iter().any(|g| g.uid() == guard.uid()) {
            return false;
        }
        self.guards.push(guard);
        true
    }

    pub fn remove_guard(&mut self, uid: Uid) -> Option<Guard> {
        let index = self.guards.iter().position(|g| g.uid() == uid)?;
        Some(self.guards.remove(index))
    }

    pub fn guard_mut(&mut self, uid: Uid) -> Option<&mut Guard> {
        self.guards.iter_mut().find(|g| g.uid() == uid)
    }

    /// Eventless transitions are evaluated continuously.
    pub fn is_always(&self) -> bool {
        self.event.is_none()
    }

    /// Format transition label for display
    pub fn label(&self) -> String {
        let mut parts = Vec::new();

        if let Some(ref event) = self.event {
            parts.push(event.clone());
        }

        if !self.guards.is_empty() {
            let guards = self
                .guards
                .iter()
                .map(|g| g.name().unwrap_or(&g.expression).to_owned())
                .collect::<Vec<_>>();
            parts.push(format!("[{}]", guards.join(" && ")));
        }

        if !self.actions.is_empty() {
            let actions = self
                .actions
                .iter()
                .map(|a| a.name().unwrap_or(a.action_type().as_str()).to_owned())
                .collect::<Vec<_>>();
            parts.push(format!("/ {}", actions.join(", ")));
        }

        parts.join(" ")
    }
}
