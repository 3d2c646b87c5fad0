//! Link and Index Services
//! Bookkeeping that keeps the canvas and the domain tree consistent: which
//! entity a node represents, which names live inside which scope, and which
//! entity owns each context variable.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::csm::{ContextType, ContextVariable, StateOrStateMachine};
use crate::graph::NodeId;

#[cfg(test)]
mod tests;

// ============================================================================
// NODE LINKS
// ============================================================================

/// Canvas node id to the entity it currently represents.
///
/// Machines are stored without their children; the tree is reassembled from
/// the canvas parent links on export.
#[derive(Debug, Clone, Default)]
pub struct NodeLinks {
    entities: BTreeMap<NodeId, StateOrStateMachine>,
}

impl NodeLinks {
    /// Link `node` to `entity`, returning the entity it replaces.
    pub fn link_node(
        &mut self,
        node: NodeId,
        entity: impl Into<StateOrStateMachine>,
    ) -> Option<StateOrStateMachine> {
        let entity = entity.into();
        debug!("Linked {} to '{}'", node, entity.name());
        self.entities.insert(node, entity)
    }

    pub fn unlink_node(&mut self, node: NodeId) -> Option<StateOrStateMachine> {
        let removed = self.entities.remove(&node);
        if removed.is_none() {
            warn!("Cannot unlink {}: no linked entity", node);
        }
        removed
    }

    pub fn get_linked_entity(&self, node: NodeId) -> Option<&StateOrStateMachine> {
        let entity = self.entities.get(&node);
        if entity.is_none() {
            warn!("No entity linked to {}", node);
        }
        entity
    }

    pub fn get_linked_entity_mut(&mut self, node: NodeId) -> Option<&mut StateOrStateMachine> {
        let entity = self.entities.get_mut(&node);
        if entity.is_none() {
            warn!("No entity linked to {}", node);
        }
        entity
    }

    pub fn is_linked(&self, node: NodeId) -> bool {
        self.entities.contains_key(&node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &StateOrStateMachine)> {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut StateOrStateMachine)> {
        self.entities.iter_mut().map(|(id, entity)| (*id, entity))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn reset(&mut self) {
        self.entities.clear();
    }
}

// ============================================================================
// SCOPE INDEX
// ============================================================================

/// A name scope: a state-machine node, or the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Root,
    StateMachine(NodeId),
}

/// Per scope, the names of states and machines nested in it at any depth.
#[derive(Debug, Clone, Default)]
pub struct ScopeIndex {
    scopes: BTreeMap<Scope, BTreeSet<String>>,
}

impl ScopeIndex {
    /// Record `name` inside `scope`.
    ///
    /// With `is_new` the name must not be present yet; returns `false` on a
    /// collision. Without it, relinking an existing name is accepted.
    pub fn link_state_name_to_statemachine(&mut self, name: &str, scope: Scope, is_new: bool) -> bool {
        let names = self.scopes.entry(scope).or_default();
        if names.contains(name) {
            if is_new {
                warn!("Name '{}' already exists in {:?}", name, scope);
                return false;
            }
            return true;
        }
        names.insert(name.to_string());
        true
    }

    pub fn unlink_state_name_from_statemachine(&mut self, name: &str, scope: Scope) -> bool {
        let removed = self
            .scopes
            .get_mut(&scope)
            .is_some_and(|names| names.remove(name));
        if !removed {
            warn!("Name '{}' is not linked to {:?}", name, scope);
        }
        removed
    }

    pub fn contains(&self, scope: Scope, name: &str) -> bool {
        self.scopes
            .get(&scope)
            .is_some_and(|names| names.contains(name))
    }

    pub fn names(&self, scope: Scope) -> impl Iterator<Item = &str> {
        self.scopes
            .get(&scope)
            .into_iter()
            .flat_map(|names| names.iter().map(String::as_str))
    }

    pub fn remove_scope(&mut self, scope: Scope) {
        self.scopes.remove(&scope);
    }

    pub fn reset(&mut self) {
        self.scopes.clear();
    }
}

// ============================================================================
// CONTEXT LINKS
// ============================================================================

/// Owner of a context variable: a canvas entity or the CSM root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextOwner {
    Root,
    Node(NodeId),
}

/// Read/write access to the context lists of owners.
pub trait ContextStore {
    fn context_list(&self, owner: ContextOwner, context_type: ContextType) -> Option<&Vec<ContextVariable>>;

    fn context_list_mut(
        &mut self,
        owner: ContextOwner,
        context_type: ContextType,
    ) -> Option<&mut Vec<ContextVariable>>;
}

impl ContextStore for NodeLinks {
    fn context_list(&self, owner: ContextOwner, context_type: ContextType) -> Option<&Vec<ContextVariable>> {
        match owner {
            ContextOwner::Node(node) => self.entities.get(&node)?.context(context_type),
            ContextOwner::Root => None,
        }
    }

    fn context_list_mut(
        &mut self,
        owner: ContextOwner,
        context_type: ContextType,
    ) -> Option<&mut Vec<ContextVariable>> {
        match owner {
            ContextOwner::Node(node) => self.entities.get_mut(&node)?.context_mut(context_type),
            ContextOwner::Root => None,
        }
    }
}

/// Context variable names and the single owner each one is linked to.
#[derive(Debug, Clone, Default)]
pub struct ContextLinks {
    names: BTreeSet<String>,
    owners: BTreeMap<String, ContextOwner>,
    counter: u64,
}

impl ContextLinks {
    /// Returns `false` when a context variable with this name already exists.
    pub fn register_context(&mut self, name: &str) -> bool {
        if self.names.contains(name) {
            warn!("Context variable '{}' is already registered", name);
            return false;
        }
        self.names.insert(name.to_string());
        true
    }

    /// Drop the name and its owner link.
    pub fn deregister_context(&mut self, name: &str) -> bool {
        self.owners.remove(name);
        self.names.remove(name)
    }

    pub fn is_context_registered(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// `prefix` plus the next free counter value; the name is not registered.
    pub fn generate_unique_name(&mut self, prefix: &str) -> String {
        loop {
            self.counter += 1;
            let candidate = format!("{prefix}{}", self.counter);
            if !self.names.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Link `name` to `owner`, replacing any previous owner.
    pub fn link_context_to_state(&mut self, name: &str, owner: ContextOwner) {
        if let Some(previous) = self.owners.insert(name.to_string(), owner) {
            if previous != owner {
                debug!("Context '{}' relinked from {:?} to {:?}", name, previous, owner);
            }
        }
    }

    pub fn get_linked_state(&self, name: &str) -> Option<ContextOwner> {
        self.owners.get(name).copied()
    }

    /// Names of every context variable linked to `owner`.
    pub fn contexts_of(&self, owner: ContextOwner) -> Vec<String> {
        self.owners
            .iter()
            .filter(|(_, linked)| **linked == owner)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Which list of its linked owner stores `name`; `None` when unlinked
    /// or present in none of them.
    pub fn get_context_type(&self, name: &str, store: &impl ContextStore) -> Option<ContextType> {
        let owner = self.get_linked_state(name)?;
        stored_context_type(name, owner, store)
    }

    /// Rename a context variable in the name index, the owner link and the
    /// owner's stored variable. Nothing changes when `old` is unknown or
    /// `new` is taken.
    pub fn rename_context(&mut self, old: &str, new: &str, store: &mut impl ContextStore) -> bool {
        if !self.names.contains(old) {
            warn!("Cannot rename context '{}': not registered", old);
            return false;
        }
        if old == new {
            return true;
        }
        if self.names.contains(new) {
            warn!("Cannot rename context '{}' to '{}': name taken", old, new);
            return false;
        }

        let owner = self.owners.remove(old);
        if let Some(owner) = owner {
            if let Some(context_type) = stored_context_type(old, owner, &*store) {
                if let Some(list) = store.context_list_mut(owner, context_type) {
                    for variable in list.iter_mut().filter(|variable| variable.name == old) {
                        variable.name = new.to_string();
                    }
                }
            }
            self.owners.insert(new.to_string(), owner);
        }
        self.names.remove(old);
        self.names.insert(new.to_string());
        debug!("Renamed context '{}' to '{}'", old, new);
        true
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn reset(&mut self) {
        self.names.clear();
        self.owners.clear();
        self.counter = 0;
    }
}

fn stored_context_type(name: &str, owner: ContextOwner, store: &impl ContextStore) -> Option<ContextType> {
    ContextType::ALL.into_iter().find(|context_type| {
        store
            .context_list(owner, *context_type)
            .is_some_and(|list| list.iter().any(|variable| variable.name == name))
    })
}
