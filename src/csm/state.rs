use super::action::Action;
use super::context::{ContextType, ContextVariable};
use super::event::Event;
use super::guard::Guard;
use super::transition::Transition;

/// A state in a state machine
#[derive(Debug, Clone, Default)]
pub struct State {
    /// State name, unique within its enclosing scope
    pub name: String,
    pub initial: bool,
    pub terminal: bool,
    pub is_virtual: bool,
    pub is_abstract: bool,
    /// Executed on entry
    pub entry: Vec<Action>,
    /// Executed on exit
    pub exit: Vec<Action>,
    /// Executed while the state is active
    pub while_actions: Vec<Action>,
    /// Executed after a delay (timeouts)
    pub after: Vec<Action>,
    /// Event-triggered transitions
    pub on: Vec<Transition>,
    /// Eventless transitions
    pub always: Vec<Transition>,
    pub local_context: Vec<ContextVariable>,
    pub persistent_context: Vec<ContextVariable>,
    pub static_context: Vec<ContextVariable>,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn initial(mut self) -> Self {
        self.initial = true;
        self
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn with_entry(mut self, action: Action) -> Self {
        self.entry.push(action);
        self
    }

    pub fn with_exit(mut self, action: Action) -> Self {
        self.exit.push(action);
        self
    }

    /// Add a transition, routing it to `on` or `always` by whether it has an event.
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.add_transition(transition);
        self
    }

    pub fn add_transition(&mut self, transition: Transition) {
        if transition.is_always() {
            self.always.push(transition);
        } else {
            self.on.push(transition);
        }
    }

    pub fn with_context(mut self, context_type: ContextType, variable: ContextVariable) -> Self {
        self.context_mut(context_type).push(variable);
        self
    }

    /// All action lists in `entry`, `exit`, `while`, `after` order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.entry
            .iter()
            .chain(&self.exit)
            .chain(&self.while_actions)
            .chain(&self.after)
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.on.iter().chain(&self.always)
    }

    pub fn transitions_mut(&mut self) -> impl Iterator<Item = &mut Transition> {
        self.on.iter_mut().chain(self.always.iter_mut())
    }

    /// Named actions of this state and of its transitions, nested match arms included.
    pub fn named_actions(&self) -> Vec<&Action> {
        self.actions()
            .chain(self.transitions().flat_map(|t| t.actions.iter()))
            .flat_map(Action::flatten)
            .filter(|a| a.name().is_some())
            .collect()
    }

    pub fn named_guards(&self) -> Vec<&Guard> {
        self.transitions()
            .flat_map(|t| t.guards().iter())
            .filter(|g| g.name().is_some())
            .collect()
    }

    /// Events raised by any action of this state or its transitions.
    pub fn raised_events(&self) -> Vec<&Event> {
        self.actions()
            .chain(self.transitions().flat_map(|t| t.actions.iter()))
            .flat_map(Action::raised_events)
            .collect()
    }

    pub fn context(&self, context_type: ContextType) -> &Vec<ContextVariable> {
        match context_type {
            ContextType::Local => &self.local_context,
            ContextType::Persistent => &self.persistent_context,
            ContextType::Static => &self.static_context,
        }
    }

    pub fn context_mut(&mut self, context_type: ContextType) -> &mut Vec<ContextVariable> {
        match context_type {
            ContextType::Local => &mut self.local_context,
            ContextType::Persistent => &mut self.persistent_context,
            ContextType::Static => &mut self.static_context,
        }
    }

    /// Which context list stores a variable called `name`, if any.
    pub fn context_type_of(&self, name: &str) -> Option<ContextType> {
        ContextType::ALL
            .into_iter()
            .find(|ty| self.context(*ty).iter().any(|v| v.name == name))
    }
}
