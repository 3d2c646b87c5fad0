//! CSM Data Structures
//! Core types representing collaborative state machines: states, nested state
//! machines, transitions, guards, actions, events and context variables.
//!
//! Entities are plain value holders. Uniqueness of names is enforced by the
//! registries in [`crate::registry`], never by the entities themselves.

use std::sync::atomic::{AtomicU64, Ordering};

mod action;
mod builder;
mod collaborative;
mod context;
mod event;
mod guard;
mod state;
mod state_machine;
mod transition;


pub use action::{
    Action, ActionKind, ActionType, AssignAction, CreateAction, InvokeAction, MatchAction,
    MatchCase, ParseActionTypeError, RaiseAction, TimeoutAction, TimeoutResetAction,
};
pub use builder::{
    BuildError, CollaborativeStateMachineBuilder, StateBuilder, StateMachineBuilder,
};
pub use collaborative::{CollaborativeStateMachine, MemoryMode};
pub use context::{ContextType, ContextVariable};
pub use event::{Event, EventChannel, ParseEventChannelError};
pub use guard::Guard;
pub use state::State;
pub use state_machine::{ElementKind, StateMachine, StateOrStateMachine};
pub use transition::Transition;

static NEXT_UID: AtomicU64 = AtomicU64::new(1);

/// Identity token standing in for reference equality.
///
/// Every freshly constructed [`Action`] or [`Guard`] receives a new token; a clone
/// keeps the token of its original, so "same reference" means "same token".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uid(u64);

impl Uid {
    pub fn fresh() -> Self {
        Self(NEXT_UID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}
