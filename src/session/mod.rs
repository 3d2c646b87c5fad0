//! Editing Session
//! The service surface the canvas calls on drop, connect, rename and delete.
//!
//! A session owns every registry and index plus a flat mirror of the canvas
//! (nodes with parent ids, edges owning transitions). Each operation updates
//! all of them before returning, so the registries stay the single source of
//! truth for uniqueness. The domain tree is assembled from the mirror on
//! export.

use std::collections::HashSet;

use log::{debug, warn};
use thiserror::Error;

use crate::codegen::CodegenError;
use crate::config::EditorConfig;
use crate::csm::{
    ContextType, ContextVariable, ElementKind, Guard, MemoryMode, State, StateMachine,
    StateOrStateMachine, Transition,
};
use crate::description::DescriptionError;
use crate::events::{collect_events, derive_event_links};
use crate::graph::{
    get_all_state_names_in_extent, get_all_statemachine_descendants, get_child_nodes,
    get_most_distant_ancestor_node, is_within, CanvasEdge, CanvasNode, EdgeId, EdgeKind, NodeId,
    TreeError,
};
use crate::links::{ContextLinks, ContextOwner, ContextStore, NodeLinks, Scope, ScopeIndex};
use crate::registry::{NameCategory, Registries};

mod export;


#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("{category} name '{name}' is already taken")]
    DuplicateName { category: NameCategory, name: String },
    #[error("Context variable '{0}' already exists")]
    DuplicateContext(String),
    #[error("Context variable '{0}' not found")]
    ContextNotFound(String),
    #[error("No node {0}")]
    NodeNotFound(NodeId),
    #[error("No transition {0}")]
    EdgeNotFound(EdgeId),
    #[error("{0} is not a state machine")]
    NotAStateMachine(NodeId),
    #[error("{0} is not a state")]
    NotAState(NodeId),
    #[error("Cannot move {node} into its own subtree at {target}")]
    InvalidMove { node: NodeId, target: NodeId },
    #[error("{owner:?} has no {context_type} context")]
    InvalidContextType {
        owner: ContextOwner,
        context_type: ContextType,
    },
    #[error("State '{0}' is not inside a state machine")]
    StateOutsideMachine(String),
    #[error("Transition target '{target}' from state '{source_state}' not found")]
    UnknownTarget { source_state: String, target: String },
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Description(#[from] DescriptionError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Context lists of the collaborative state machine itself.
#[derive(Debug, Clone, Default)]
struct RootContext {
    local: Vec<ContextVariable>,
    persistent: Vec<ContextVariable>,
}

impl RootContext {
    fn list(&self, context_type: ContextType) -> Option<&Vec<ContextVariable>> {
        match context_type {
            ContextType::Local => Some(&self.local),
            ContextType::Persistent => Some(&self.persistent),
            ContextType::Static => None,
        }
    }

    fn list_mut(&mut self, context_type: ContextType) -> Option<&mut Vec<ContextVariable>> {
        match context_type {
            ContextType::Local => Some(&mut self.local),
            ContextType::Persistent => Some(&mut self.persistent),
            ContextType::Static => None,
        }
    }
}

/// Every context list of the session, root included.
struct SessionContexts<'a> {
    nodes: &'a mut NodeLinks,
    root: &'a mut RootContext,
}

impl ContextStore for SessionContexts<'_> {
    fn context_list(&self, owner: ContextOwner, context_type: ContextType) -> Option<&Vec<ContextVariable>> {
        match owner {
            ContextOwner::Root => self.root.list(context_type),
            ContextOwner::Node(_) => self.nodes.context_list(owner, context_type),
        }
    }

    fn context_list_mut(
        &mut self,
        owner: ContextOwner,
        context_type: ContextType,
    ) -> Option<&mut Vec<ContextVariable>> {
        match owner {
            ContextOwner::Root => self.root.list_mut(context_type),
            ContextOwner::Node(_) => self.nodes.context_list_mut(owner, context_type),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    pub name: String,
    pub version: String,
    pub memory_mode: MemoryMode,
    root_context: RootContext,
    registries: Registries,
    node_links: NodeLinks,
    scopes: ScopeIndex,
    contexts: ContextLinks,
    nodes: Vec<CanvasNode>,
    edges: Vec<CanvasEdge>,
    next_node: u64,
    next_edge: u64,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            name: config.default_name.clone(),
            version: config.default_version.clone(),
            memory_mode: config.memory_mode,
            config,
            root_context: RootContext::default(),
            registries: Registries::default(),
            node_links: NodeLinks::default(),
            scopes: ScopeIndex::default(),
            contexts: ContextLinks::default(),
            nodes: Vec::new(),
            edges: Vec::new(),
            next_node: 1,
            next_edge: 1,
        }
    }

    /// Drop every registry, index and canvas element at once.
    pub fn reset_service(&mut self) {
        self.registries.reset();
        self.node_links.reset();
        self.scopes.reset();
        self.contexts.reset();
        self.root_context = RootContext::default();
        self.nodes.clear();
        self.edges.clear();
        self.next_node = 1;
        self.next_edge = 1;
        self.name = self.config.default_name.clone();
        self.version = self.config.default_version.clone();
        self.memory_mode = self.config.memory_mode;
        debug!("Session reset");
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn scope_index(&self) -> &ScopeIndex {
        &self.scopes
    }

    pub fn context_links(&self) -> &ContextLinks {
        &self.contexts
    }

    pub fn nodes(&self) -> &[CanvasNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[CanvasEdge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> SessionResult<&CanvasNode> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .ok_or(SessionError::NodeNotFound(id))
    }

    pub fn entity(&self, id: NodeId) -> Option<&StateOrStateMachine> {
        self.node_links.get_linked_entity(id)
    }

    /// First node carrying `name`.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|node| node.name == name).map(|node| node.id)
    }

    pub fn root_context(&self, context_type: ContextType) -> Option<&Vec<ContextVariable>> {
        self.root_context.list(context_type)
    }

    /// Generated name for `category` using the configured prefix; not registered.
    pub fn generate_unique_name(&mut self, category: NameCategory) -> String {
        let prefixes = &self.config.prefixes;
        let prefix = match category {
            NameCategory::StateOrStateMachine => &prefixes.state,
            NameCategory::Action => &prefixes.action,
            NameCategory::Event => &prefixes.event,
            NameCategory::Guard => &prefixes.guard,
            NameCategory::ServiceType => &prefixes.service_type,
        };
        self.registries.get_mut(category).generate_unique_name(prefix)
    }

    pub fn generate_context_name(&mut self) -> String {
        self.contexts.generate_unique_name(&self.config.prefixes.context)
    }

    // ========================================================================
    // TREE QUERIES
    // ========================================================================

    pub fn most_distant_ancestor(&self, id: NodeId) -> SessionResult<NodeId> {
        let node = self.node(id)?;
        Ok(get_most_distant_ancestor_node(node, &self.nodes)?.id)
    }

    pub fn statemachine_descendants(&self, id: NodeId) -> SessionResult<Vec<NodeId>> {
        let node = self.node(id)?;
        Ok(get_all_statemachine_descendants(node, &self.nodes)
            .into_iter()
            .map(|descendant| descendant.id)
            .collect())
    }

    /// Scopes a child of `parent` is visible in: every enclosing machine, then the root.
    fn scope_chain(&self, parent: Option<NodeId>) -> Vec<Scope> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut current = parent;
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            chain.push(Scope::StateMachine(id));
            current = self
                .nodes
                .iter()
                .find(|node| node.id == id)
                .and_then(|node| node.parent_id);
        }
        chain.push(Scope::Root);
        chain
    }

    /// `id` followed by every node nested under it, pre-order.
    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            out.push(current);
            if let Some(node) = self.nodes.iter().find(|node| node.id == current) {
                let children = get_child_nodes(node, &self.nodes);
                stack.extend(children.into_iter().rev().map(|child| child.id));
            }
        }
        out
    }

    fn require_kind(&self, id: NodeId, kind: ElementKind) -> SessionResult<&CanvasNode> {
        let node = self.node(id)?;
        if node.kind != kind {
            return Err(match kind {
                ElementKind::State => SessionError::NotAState(id),
                ElementKind::StateMachine => SessionError::NotAStateMachine(id),
            });
        }
        Ok(node)
    }

    fn node_mut(&mut self, id: NodeId) -> SessionResult<&mut CanvasNode> {
        self.nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or(SessionError::NodeNotFound(id))
    }

    fn state_mut(&mut self, id: NodeId) -> SessionResult<&mut State> {
        self.node_links
            .get_linked_entity_mut(id)
            .and_then(StateOrStateMachine::as_state_mut)
            .ok_or(SessionError::NotAState(id))
    }

    // ========================================================================
    // NODES
    // ========================================================================

    /// Drop a state, optionally inside the machine `parent`. Without a name
    /// one is generated.
    pub fn add_state(&mut self, name: Option<&str>, parent: Option<NodeId>) -> SessionResult<NodeId> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.generate_unique_name(NameCategory::StateOrStateMachine),
        };
        self.insert_node(State::new(name).into(), parent, true)
    }

    pub fn add_state_machine(
        &mut self,
        name: Option<&str>,
        parent: Option<NodeId>,
    ) -> SessionResult<NodeId> {
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let prefix = self.config.prefixes.state_machine.clone();
                self.registries
                    .get_mut(NameCategory::StateOrStateMachine)
                    .generate_unique_name(&prefix)
            }
        };
        self.insert_node(StateMachine::new(name).into(), parent, true)
    }

    /// Register, scope and link a new node. With `strict` a taken name is an
    /// error; otherwise it is only reported.
    fn insert_node(
        &mut self,
        entity: StateOrStateMachine,
        parent: Option<NodeId>,
        strict: bool,
    ) -> SessionResult<NodeId> {
        if let Some(parent) = parent {
            self.require_kind(parent, ElementKind::StateMachine)?;
        }

        let name = entity.name().to_string();
        let registry = self.registries.get_mut(NameCategory::StateOrStateMachine);
        if !registry.register_name(&name) && strict {
            return Err(SessionError::DuplicateName {
                category: NameCategory::StateOrStateMachine,
                name,
            });
        }

        let id = NodeId(self.next_node);
        self.next_node += 1;

        for scope in self.scope_chain(parent) {
            self.scopes.link_state_name_to_statemachine(&name, scope, true);
        }

        let mut node = CanvasNode::new(id, entity.kind(), name);
        node.parent_id = parent;
        self.nodes.push(node);
        self.node_links.link_node(id, entity);
        Ok(id)
    }

    /// Delete a node and everything nested in it. Returns the removed ids.
    pub fn delete_node(&mut self, id: NodeId) -> SessionResult<Vec<NodeId>> {
        let parent = self.node(id)?.parent_id;
        let removed = self.subtree(id);
        let outer_scopes = self.scope_chain(parent);
        let mut released_actions = Vec::new();

        for node_id in &removed {
            let Some(node) = self.nodes.iter().find(|node| node.id == *node_id).cloned() else {
                continue;
            };

            self.registries
                .get_mut(NameCategory::StateOrStateMachine)
                .unregister_name(&node.name);
            for scope in &outer_scopes {
                self.scopes.unlink_state_name_from_statemachine(&node.name, *scope);
            }
            if node.is_state_machine() {
                self.scopes.remove_scope(Scope::StateMachine(node.id));
            }
            for context in self.contexts.contexts_of(ContextOwner::Node(node.id)) {
                self.contexts.deregister_context(&context);
            }
            if let Some(entity) = self.node_links.unlink_node(node.id) {
                released_actions.extend(
                    entity
                        .named_actions()
                        .into_iter()
                        .filter_map(|action| action.name().map(str::to_string)),
                );
            }
        }

        let removed_set = removed.iter().copied().collect::<HashSet<_>>();
        let (dropped, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|edge| removed_set.contains(&edge.source) || removed_set.contains(&edge.target));
        self.edges = kept;
        self.nodes.retain(|node| !removed_set.contains(&node.id));
        for edge in dropped {
            if let EdgeKind::Transition(transition) = edge.kind {
                self.release_transition_names(&transition);
            }
        }
        self.release_action_names(released_actions);

        debug!("Deleted {} node(s) under {}", removed.len(), id);
        Ok(removed)
    }

    /// Rename a state or machine in the registry, the scope index, the
    /// entity and every transition pointing at it.
    pub fn rename_node(&mut self, id: NodeId, new_name: &str) -> SessionResult<()> {
        let node = self.node(id)?.clone();
        if node.name == new_name {
            return Ok(());
        }

        let registry = self.registries.get_mut(NameCategory::StateOrStateMachine);
        if !registry.is_name_unique(new_name) {
            warn!("Cannot rename '{}' to '{}': name taken", node.name, new_name);
            return Err(SessionError::DuplicateName {
                category: NameCategory::StateOrStateMachine,
                name: new_name.to_string(),
            });
        }
        registry.register_name(new_name);
        registry.unregister_name(&node.name);

        for scope in self.scope_chain(node.parent_id) {
            self.scopes.unlink_state_name_from_statemachine(&node.name, scope);
            self.scopes.link_state_name_to_statemachine(new_name, scope, false);
        }
        if let Some(entity) = self.node_links.get_linked_entity_mut(id) {
            entity.set_name(new_name);
        }
        self.node_mut(id)?.name = new_name.to_string();

        for edge in &mut self.edges {
            let (source, target) = (edge.source, edge.target);
            let Some(transition) = edge.transition_mut() else {
                continue;
            };
            if source == id {
                transition.source = new_name.to_string();
            }
            if target == id {
                transition.target = new_name.to_string();
            }
            if transition.else_target.as_deref() == Some(node.name.as_str()) {
                transition.else_target = Some(new_name.to_string());
            }
        }
        for (_, entity) in self.node_links.iter_mut() {
            if let Some(machine) = entity.as_state_machine_mut() {
                if machine.inherit.as_deref() == Some(node.name.as_str()) {
                    machine.inherit = Some(new_name.to_string());
                }
            }
        }

        debug!("Renamed '{}' to '{}'", node.name, new_name);
        Ok(())
    }

    /// Reparent `id` under `new_parent` (or the top level). Returns `false`
    /// when the node is already inside the target's extent.
    pub fn move_node(&mut self, id: NodeId, new_parent: Option<NodeId>) -> SessionResult<bool> {
        let node = self.node(id)?.clone();

        match new_parent {
            Some(target) => {
                let target_node = self.require_kind(target, ElementKind::StateMachine)?;
                if is_within(target_node, id, &self.nodes) {
                    return Err(SessionError::InvalidMove { node: id, target });
                }
                if self.scopes.contains(Scope::StateMachine(target), &node.name) {
                    debug!("'{}' is already inside {}", node.name, target);
                    return Ok(false);
                }
            }
            None if node.parent_id.is_none() => return Ok(false),
            None => {}
        }

        let mut names = get_all_state_names_in_extent(&node, &self.nodes);
        names.insert(node.name.clone());
        let old_chain = self.scope_chain(node.parent_id);
        let new_chain = self.scope_chain(new_parent);

        for name in &names {
            for scope in &old_chain {
                self.scopes.unlink_state_name_from_statemachine(name, *scope);
            }
            for scope in &new_chain {
                self.scopes.link_state_name_to_statemachine(name, *scope, false);
            }
        }
        self.node_mut(id)?.parent_id = new_parent;

        let moved_initial = self
            .entity(id)
            .and_then(StateOrStateMachine::as_state)
            .is_some_and(|state| state.initial);
        if moved_initial && self.has_other_initial(new_parent, id) {
            warn!("'{}' is no longer initial: its new machine already has one", node.name);
            self.state_mut(id)?.initial = false;
        }
        Ok(true)
    }

    /// Whether a sibling state under `parent`, other than `id`, is initial.
    fn has_other_initial(&self, parent: Option<NodeId>, id: NodeId) -> bool {
        self.nodes
            .iter()
            .filter(|node| node.parent_id == parent && node.id != id)
            .filter_map(|node| self.entity(node.id).and_then(StateOrStateMachine::as_state))
            .any(|state| state.initial)
    }

    /// Mark a state initial, clearing the flag on its sibling states.
    pub fn set_initial(&mut self, id: NodeId, initial: bool) -> SessionResult<()> {
        let parent = self.require_kind(id, ElementKind::State)?.parent_id;

        if initial {
            let siblings = self
                .nodes
                .iter()
                .filter(|node| node.parent_id == parent && node.id != id && !node.is_state_machine())
                .map(|node| node.id)
                .collect::<Vec<_>>();
            for sibling in siblings {
                if let Ok(state) = self.state_mut(sibling) {
                    state.initial = false;
                }
            }
        }
        self.state_mut(id)?.initial = initial;
        Ok(())
    }

    pub fn set_terminal(&mut self, id: NodeId, terminal: bool) -> SessionResult<()> {
        self.require_kind(id, ElementKind::State)?;
        self.state_mut(id)?.terminal = terminal;
        Ok(())
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Connect two nodes. The source must be a state.
    pub fn add_transition(
        &mut self,
        source: NodeId,
        target: NodeId,
        event: Option<&str>,
    ) -> SessionResult<EdgeId> {
        let source_name = self.require_kind(source, ElementKind::State)?.name.clone();
        let target_name = self.node(target)?.name.clone();

        let mut transition = Transition::new(source_name, target_name);
        if let Some(event) = event {
            self.register_if_new(NameCategory::Event, event);
            transition = transition.with_event(event);
        }
        Ok(self.push_edge(source, target, EdgeKind::Transition(transition)))
    }

    pub fn remove_transition(&mut self, id: EdgeId) -> SessionResult<Transition> {
        let index = self
            .edges
            .iter()
            .position(|edge| edge.id == id && edge.transition().is_some())
            .ok_or(SessionError::EdgeNotFound(id))?;
        let edge = self.edges.remove(index);
        match edge.kind {
            EdgeKind::Transition(transition) => {
                self.release_transition_names(&transition);
                Ok(transition)
            }
            EdgeKind::EventLink { .. } => Err(SessionError::EdgeNotFound(id)),
        }
    }

    pub fn transition(&self, id: EdgeId) -> SessionResult<&Transition> {
        self.edges
            .iter()
            .find(|edge| edge.id == id)
            .and_then(CanvasEdge::transition)
            .ok_or(SessionError::EdgeNotFound(id))
    }

    /// Direct access for form edits. Name changes made here bypass the registries.
    pub fn transition_mut(&mut self, id: EdgeId) -> SessionResult<&mut Transition> {
        self.edges
            .iter_mut()
            .find(|edge| edge.id == id)
            .and_then(CanvasEdge::transition_mut)
            .ok_or(SessionError::EdgeNotFound(id))
    }

    /// Attach a guard. Returns `false` when this very guard is already attached.
    /// A taken guard name is accepted only with the same expression.
    pub fn add_guard(&mut self, id: EdgeId, guard: Guard) -> SessionResult<bool> {
        let transition = self.transition(id)?;
        if transition.guards().iter().any(|g| g.uid() == guard.uid()) {
            return Ok(false);
        }

        let name = guard.name().map(str::to_string);
        if let Some(name) = &name {
            if !self.registries.get(NameCategory::Guard).is_name_unique(name) {
                match self.guard_named(name) {
                    Some(existing) if existing.expression == guard.expression => {}
                    _ => {
                        return Err(SessionError::DuplicateName {
                            category: NameCategory::Guard,
                            name: name.clone(),
                        })
                    }
                }
            }
        }

        let added = self.transition_mut(id)?.add_guard(guard);
        if let (true, Some(name)) = (added, name) {
            self.register_if_new(NameCategory::Guard, &name);
        }
        Ok(added)
    }

    /// A guard named `name` on any transition or state machine.
    fn guard_named(&self, name: &str) -> Option<&Guard> {
        let on_edges = self
            .edges
            .iter()
            .filter_map(CanvasEdge::transition)
            .flat_map(|transition| transition.guards());
        let on_nodes = self
            .node_links
            .iter()
            .filter_map(|(_, entity)| entity.as_state_machine())
            .flat_map(|machine| machine.guards.iter());
        on_edges.chain(on_nodes).find(|guard| guard.name() == Some(name))
    }

    /// Replace every inferred event link with freshly derived ones.
    pub fn infer_event_edges(&mut self) -> SessionResult<Vec<EdgeId>> {
        self.edges
            .retain(|edge| !matches!(edge.kind, EdgeKind::EventLink { .. }));

        let roots = self
            .nodes
            .iter()
            .filter(|node| node.parent_id.is_none() && node.is_state_machine())
            .map(|node| node.id)
            .collect::<Vec<_>>();
        let machines = roots
            .iter()
            .map(|id| self.assemble_machine(*id))
            .collect::<SessionResult<Vec<_>>>()?;

        let events = collect_events(&machines);
        let mut created = Vec::new();
        for link in derive_event_links(&events) {
            let source = machines.iter().position(|m| m.name == link.source);
            let target = machines.iter().position(|m| m.name == link.target);
            if let (Some(source), Some(target)) = (source, target) {
                let kind = EdgeKind::EventLink { event: link.event };
                created.push(self.push_edge(roots[source], roots[target], kind));
            }
        }
        Ok(created)
    }

    fn push_edge(&mut self, source: NodeId, target: NodeId, kind: EdgeKind) -> EdgeId {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.push(CanvasEdge {
            id,
            source,
            target,
            kind,
        });
        id
    }

    fn register_if_new(&mut self, category: NameCategory, name: &str) {
        let registry = self.registries.get_mut(category);
        if registry.is_name_unique(name) {
            registry.register_name(name);
        }
    }

    /// Unregister guard and action names no remaining transition uses.
    fn release_transition_names(&mut self, transition: &Transition) {
        for guard in transition.guards() {
            let Some(name) = guard.name() else { continue };
            let in_use = self
                .edges
                .iter()
                .filter_map(CanvasEdge::transition)
                .any(|t| t.guards().iter().any(|g| g.name() == Some(name)));
            if !in_use {
                self.registries.get_mut(NameCategory::Guard).unregister_name(name);
            }
        }
        let actions = transition
            .actions
            .iter()
            .flat_map(|a| a.flatten())
            .filter_map(|action| action.name().map(str::to_string))
            .collect();
        self.release_action_names(actions);
    }

    /// Unregister each action name that no remaining node or transition uses.
    fn release_action_names(&mut self, names: Vec<String>) {
        for name in names {
            if !self.action_in_use(&name) {
                self.registries.get_mut(NameCategory::Action).unregister_name(&name);
            }
        }
    }

    fn action_in_use(&self, name: &str) -> bool {
        let on_nodes = self
            .node_links
            .iter()
            .any(|(_, entity)| entity.named_actions().iter().any(|a| a.name() == Some(name)));
        on_nodes
            || self
                .edges
                .iter()
                .filter_map(CanvasEdge::transition)
                .flat_map(|transition| transition.actions.iter().flat_map(|a| a.flatten()))
                .any(|action| action.name() == Some(name))
    }

    // ========================================================================
    // CONTEXT
    // ========================================================================

    pub fn add_context(
        &mut self,
        owner: ContextOwner,
        context_type: ContextType,
        variable: ContextVariable,
    ) -> SessionResult<()> {
        if let ContextOwner::Node(id) = owner {
            self.node(id)?;
        }
        let mut store = SessionContexts {
            nodes: &mut self.node_links,
            root: &mut self.root_context,
        };
        if store.context_list(owner, context_type).is_none() {
            return Err(SessionError::InvalidContextType {
                owner,
                context_type,
            });
        }
        if !self.contexts.register_context(&variable.name) {
            return Err(SessionError::DuplicateContext(variable.name));
        }

        self.contexts.link_context_to_state(&variable.name, owner);
        if let Some(list) = store.context_list_mut(owner, context_type) {
            list.push(variable);
        }
        Ok(())
    }

    pub fn remove_context(&mut self, name: &str) -> SessionResult<ContextVariable> {
        if !self.contexts.is_context_registered(name) {
            return Err(SessionError::ContextNotFound(name.to_string()));
        }

        let mut removed = None;
        if let Some(owner) = self.contexts.get_linked_state(name) {
            let mut store = SessionContexts {
                nodes: &mut self.node_links,
                root: &mut self.root_context,
            };
            for context_type in ContextType::ALL {
                let Some(list) = store.context_list_mut(owner, context_type) else {
                    continue;
                };
                if let Some(index) = list.iter().position(|variable| variable.name == name) {
                    removed = Some(list.remove(index));
                    break;
                }
            }
        }
        self.contexts.deregister_context(name);
        removed.ok_or_else(|| SessionError::ContextNotFound(name.to_string()))
    }

    /// Returns `false` and changes nothing when `old` is unknown or `new` is taken.
    pub fn rename_context(&mut self, old: &str, new: &str) -> bool {
        let mut store = SessionContexts {
            nodes: &mut self.node_links,
            root: &mut self.root_context,
        };
        self.contexts.rename_context(old, new, &mut store)
    }

    /// Visibility category of a context variable; `None` when it is unlinked
    /// or stored in none of its owner's lists.
    pub fn context_type(&self, name: &str) -> Option<ContextType> {
        match self.contexts.get_linked_state(name)? {
            ContextOwner::Root => ContextType::ALL.into_iter().find(|context_type| {
                self.root_context
                    .list(*context_type)
                    .is_some_and(|list| list.iter().any(|variable| variable.name == name))
            }),
            ContextOwner::Node(_) => self.contexts.get_context_type(name, &self.node_links),
        }
    }
}
