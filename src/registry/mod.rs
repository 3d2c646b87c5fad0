//! Name Registries
//! Per-session uniqueness ledgers, one per entity category.
//!
//! States and state machines share a registry; actions, events, guards and
//! service types each have their own, so equal names across categories never
//! conflict.

use std::collections::BTreeSet;
use std::fmt;

use log::{debug, warn};

#[cfg(test)]
mod tests;

/// Entity category owning a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameCategory {
    StateOrStateMachine,
    Action,
    Event,
    Guard,
    ServiceType,
}

impl NameCategory {
    pub const ALL: [NameCategory; 5] = [
        NameCategory::StateOrStateMachine,
        NameCategory::Action,
        NameCategory::Event,
        NameCategory::Guard,
        NameCategory::ServiceType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NameCategory::StateOrStateMachine => "state or state machine",
            NameCategory::Action => "action",
            NameCategory::Event => "event",
            NameCategory::Guard => "guard",
            NameCategory::ServiceType => "service type",
        }
    }
}

impl fmt::Display for NameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of taken names plus a monotonic counter for generated names.
#[derive(Debug, Clone)]
pub struct NameRegistry {
    category: NameCategory,
    names: BTreeSet<String>,
    counter: u64,
}

impl NameRegistry {
    pub fn new(category: NameCategory) -> Self {
        Self {
            category,
            names: BTreeSet::new(),
            counter: 0,
        }
    }

    pub fn category(&self) -> NameCategory {
        self.category
    }

    /// Record `name`. Returns `false` when it is already taken.
    pub fn register_name(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            warn!("{} name '{}' is already registered", self.category, name);
            return false;
        }
        debug!("Registered {} name '{}'", self.category, name);
        self.names.insert(name.to_string());
        true
    }

    /// Returns `true` when the name was registered.
    pub fn unregister_name(&mut self, name: &str) -> bool {
        let removed = self.names.remove(name);
        if removed {
            debug!("Unregistered {} name '{}'", self.category, name);
        }
        removed
    }

    pub fn is_name_unique(&self, name: &str) -> bool {
        !self.names.contains(name)
    }

    /// `prefix` followed by the next free counter value. The counter never
    /// goes back, even after names are unregistered. The result is not
    /// registered.
    pub fn generate_unique_name(&mut self, prefix: &str) -> String {
        loop {
            self.counter += 1;
            let candidate = format!("{prefix}{}", self.counter);
            if self.is_name_unique(&candidate) {
                return candidate;
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Forget every name and restart the counter.
    pub fn reset(&mut self) {
        self.names.clear();
        self.counter = 0;
    }
}

/// All registries of one editing session.
#[derive(Debug, Clone)]
pub struct Registries {
    state_or_state_machine: NameRegistry,
    action: NameRegistry,
    event: NameRegistry,
    guard: NameRegistry,
    service_type: NameRegistry,
}

impl Default for Registries {
    fn default() -> Self {
        Self {
            state_or_state_machine: NameRegistry::new(NameCategory::StateOrStateMachine),
            action: NameRegistry::new(NameCategory::Action),
            event: NameRegistry::new(NameCategory::Event),
            guard: NameRegistry::new(NameCategory::Guard),
            service_type: NameRegistry::new(NameCategory::ServiceType),
        }
    }
}

impl Registries {
    pub fn get(&self, category: NameCategory) -> &NameRegistry {
        match category {
            NameCategory::StateOrStateMachine => &self.state_or_state_machine,
            NameCategory::Action => &self.action,
            NameCategory::Event => &self.event,
            NameCategory::Guard => &self.guard,
            NameCategory::ServiceType => &self.service_type,
        }
    }

    pub fn get_mut(&mut self, category: NameCategory) -> &mut NameRegistry {
        match category {
            NameCategory::StateOrStateMachine => &mut self.state_or_state_machine,
            NameCategory::Action => &mut self.action,
            NameCategory::Event => &mut self.event,
            NameCategory::Guard => &mut self.guard,
            NameCategory::ServiceType => &mut self.service_type,
        }
    }

    pub fn reset(&mut self) {
        for category in NameCategory::ALL {
            self.get_mut(category).reset();
        }
    }
}
