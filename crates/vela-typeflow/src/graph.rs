//! The type-flow graph: node arena, transitions, consumers, and queries.
//!
//! The graph owns every piece of engine state (the type registry, the filter
//! table, the node arena, the worklist) behind a single `&mut self`, which
//! serialises construction and dispatch. The scheduler module holds the
//! dispatch loop itself.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace};
use vela_core::{MethodRef, NodeId, TypeId};

use crate::descriptor::ValueType;
use crate::diagnostics::{Diagnostic, TypeFlowConfig};
use crate::error::{FlowError, Result};
use crate::filter::{FilterId, FilterTable};
use crate::hierarchy::ClassHierarchy;
use crate::node::{ConsumerId, FlowNode, ResolvedFilter, TransitionId};
use crate::registry::TypeRegistry;
use crate::scheduler::Task;

/// Upper bound on satellite nesting depth. Nodes deeper than this neither
/// accept nor propagate new types, which caps array-of-array-of-... inference.
pub const MAX_DEGREE: u32 = 2;

/// A callback invoked with batches of types newly observed at a node.
///
/// Consumers run inside the scheduler's dispatch loop and get mutable access
/// to the graph, so they can create nodes, wire transitions, and seed types.
/// This is how the reachability driver grows the graph on demand. They must
/// not add types once the graph is locked.
pub trait TypeConsumer {
    fn consume(&mut self, graph: &mut TypeFlowGraph, types: &[TypeId]);
}

impl<F> TypeConsumer for F
where
    F: FnMut(&mut TypeFlowGraph, &[TypeId]),
{
    fn consume(&mut self, graph: &mut TypeFlowGraph, types: &[TypeId]) {
        self(graph, types)
    }
}

/// Shared handle to a registered consumer. Identity (not value) decides
/// whether two registrations are the same consumer.
pub type SharedConsumer = Rc<RefCell<dyn TypeConsumer>>;

/// A directed edge. Types flow from `source` to `target`, narrowed by the
/// optional edge filter and then by the target's own bound.
pub(crate) struct Transition {
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
    pub(crate) filter: Option<FilterId>,
}

pub struct TypeFlowGraph {
    registry: TypeRegistry,
    hierarchy: Box<dyn ClassHierarchy>,
    filters: FilterTable,
    nodes: Vec<FlowNode>,
    transitions: Vec<Transition>,
    consumers: Vec<SharedConsumer>,
    worklist: VecDeque<Task>,
    diagnostics: Vec<Diagnostic>,
    config: TypeFlowConfig,
    locked: bool,
}

impl TypeFlowGraph {
    pub fn new(hierarchy: Box<dyn ClassHierarchy>) -> Self {
        Self::with_config(hierarchy, TypeFlowConfig::default())
    }

    pub fn with_config(hierarchy: Box<dyn ClassHierarchy>, config: TypeFlowConfig) -> Self {
        Self {
            registry: TypeRegistry::new(),
            hierarchy,
            filters: FilterTable::default(),
            nodes: Vec::new(),
            transitions: Vec::new(),
            consumers: Vec::new(),
            worklist: VecDeque::new(),
            diagnostics: Vec::new(),
            config,
            locked: false,
        }
    }

    // === Types ==============================================================

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn intern_type(&mut self, name: &str) -> TypeId {
        self.registry.intern(name)
    }

    pub fn get_type(&self, name: &str) -> Option<TypeId> {
        self.registry.lookup(name)
    }

    // === Node construction ==================================================

    /// Creates a node with an optional declared upper bound.
    ///
    /// The caller is expected to set degree, method, and tag afterwards where
    /// they matter.
    pub fn create_node(&mut self, bound: Option<ValueType>) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        let mut node = FlowNode::new(bound);
        node.locked = self.locked;
        self.nodes.push(node);
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn set_degree(&mut self, node: NodeId, degree: u32) {
        self.nodes[node.index()].degree = degree;
    }

    pub fn degree(&self, node: NodeId) -> u32 {
        self.nodes[node.index()].degree
    }

    pub fn set_method(&mut self, node: NodeId, method: MethodRef) {
        self.nodes[node.index()].method = Some(method);
    }

    pub fn method(&self, node: NodeId) -> Option<&MethodRef> {
        self.nodes[node.index()].method.as_ref()
    }

    pub fn set_tag(&mut self, node: NodeId, tag: impl Into<String>) {
        self.nodes[node.index()].tag = Some(tag.into());
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.index()].tag.as_deref()
    }

    // === Satellites =========================================================

    /// The unique satellite representing this node's array element values.
    ///
    /// Created on first request; later calls return the same handle. When the
    /// node's bound is an array type, the item type is projected onto the
    /// satellite as its bound.
    pub fn array_item(&mut self, node: NodeId) -> NodeId {
        if let Some(existing) = self.nodes[node.index()].array_item {
            return existing;
        }

        let item_bound = match &self.nodes[node.index()].bound {
            Some(ValueType::Array(item)) => Some((**item).clone()),
            _ => None,
        };
        let satellite = self.create_node(item_bound);

        let degree = self.nodes[node.index()].degree;
        let method = self.nodes[node.index()].method.clone();
        let tag = self.nodes[node.index()].tag.clone();
        {
            let s = &mut self.nodes[satellite.index()];
            s.degree = degree + 1;
            s.method = method;
            if self.config.tag_satellites {
                s.tag = tag.map(|t| format!("{t}["));
            }
        }
        self.nodes[node.index()].array_item = Some(satellite);
        satellite
    }

    /// The unique satellite representing the boxed type referred to by a
    /// class-literal value flowing through this node.
    ///
    /// Its degree equals the parent's, and its own class-value satellite is
    /// itself.
    pub fn class_value(&mut self, node: NodeId) -> NodeId {
        if let Some(existing) = self.nodes[node.index()].class_value {
            return existing;
        }

        let satellite = self.create_node(None);
        let degree = self.nodes[node.index()].degree;
        let tag = self.nodes[node.index()].tag.clone();
        {
            let s = &mut self.nodes[satellite.index()];
            s.degree = degree;
            s.class_value = Some(satellite);
            if self.config.tag_satellites {
                s.tag = tag.map(|t| format!("{t}@"));
            }
        }
        self.nodes[node.index()].class_value = Some(satellite);
        satellite
    }

    // === Wiring =============================================================

    /// Connects `from` to `to` so types flow forward along the edge.
    ///
    /// Self-connections are silently ignored. Connecting the same ordered
    /// pair twice is a no-op regardless of edge filter. The source's current
    /// types are scheduled through the new edge as a catch-up batch.
    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        self.connect_inner(from, to, None);
    }

    /// Like [`connect`](Self::connect), but the edge only passes types
    /// admitted by `bound`. Non-object bounds do not narrow the edge.
    pub fn connect_filtered(&mut self, from: NodeId, to: NodeId, bound: &ValueType) {
        let filter = match bound {
            ValueType::Object(name) => Some(self.filters.filter_for(
                name,
                self.hierarchy.as_ref(),
                &mut self.diagnostics,
            )),
            _ => None,
        };
        self.connect_inner(from, to, filter);
    }

    fn connect_inner(&mut self, from: NodeId, to: NodeId, filter: Option<FilterId>) {
        if from == to {
            return;
        }
        let duplicate = self.nodes[from.index()]
            .out_transitions
            .iter()
            .any(|t| self.transitions[t.0].target == to);
        if duplicate {
            return;
        }

        let id = TransitionId(self.transitions.len());
        self.transitions.push(Transition {
            source: from,
            target: to,
            filter,
        });
        self.nodes[from.index()].out_transitions.push(id);
        self.nodes[to.index()].in_transitions.push(id);

        if self.config.log_propagation {
            debug!("connecting {} to {}", self.node_label(from), self.node_label(to));
        }

        let current: Vec<TypeId> = self.nodes[from.index()].types.iter().collect();
        if !current.is_empty() {
            self.schedule(Task::Forward {
                transition: id,
                types: current,
            });
        }
    }

    /// Registers a consumer on `node`. Registering the same callback twice is
    /// a no-op. If the node already has types, the consumer is scheduled a
    /// catch-up batch of the current set.
    pub fn add_consumer(&mut self, node: NodeId, consumer: SharedConsumer) {
        let duplicate = self.nodes[node.index()]
            .consumers
            .iter()
            .any(|c| Rc::ptr_eq(&self.consumers[c.0], &consumer));
        if duplicate {
            return;
        }

        let id = ConsumerId(self.consumers.len());
        self.consumers.push(consumer);
        self.nodes[node.index()].consumers.push(id);

        let current: Vec<TypeId> = self.nodes[node.index()].types.iter().collect();
        if !current.is_empty() {
            self.schedule(Task::Notify {
                consumer: id,
                types: current,
            });
        }
    }

    /// Convenience wrapper around [`add_consumer`](Self::add_consumer) for
    /// closures. Returns the shared handle so callers can re-register or keep
    /// identity.
    pub fn add_consumer_fn<F>(&mut self, node: NodeId, callback: F) -> SharedConsumer
    where
        F: FnMut(&mut TypeFlowGraph, &[TypeId]) + 'static,
    {
        let consumer: SharedConsumer = Rc::new(RefCell::new(callback));
        self.add_consumer(node, Rc::clone(&consumer));
        consumer
    }

    // === Type ingress =======================================================

    /// Buffers `ty` into the node's pending set.
    ///
    /// Ignored when the node is past the degree bound, already has the type,
    /// or its bound rejects it. The authoritative set is only mutated later,
    /// by the scheduler's apply-pending sweep.
    pub fn propagate(&mut self, node: NodeId, ty: TypeId) {
        {
            let n = &self.nodes[node.index()];
            if n.degree > MAX_DEGREE || n.types.contains(ty) {
                return;
            }
        }
        if !self.node_admits(node, ty) {
            return;
        }
        let universe = self.registry.len();
        self.nodes[node.index()].pending.insert(ty, universe);
    }

    /// Batch form of [`propagate`](Self::propagate) with identical
    /// per-element semantics, including the degree check.
    pub fn propagate_all(&mut self, node: NodeId, types: &[TypeId]) {
        for &ty in types {
            self.propagate(node, ty);
        }
    }

    /// Drains the node's pending set into its accepted set and schedules the
    /// delta to every consumer and forward transition.
    pub(crate) fn apply_pending(&mut self, id: NodeId) -> Result<()> {
        let pending = std::mem::take(&mut self.nodes[id.index()].pending);
        if pending.is_empty() {
            return Ok(());
        }

        let mut delta = Vec::with_capacity(pending.len());
        for ty in pending.iter() {
            if self.add_type(id, ty)? {
                delta.push(ty);
            }
        }
        if delta.is_empty() {
            return Ok(());
        }

        if self.config.log_propagation {
            for &ty in &delta {
                trace!("{} -> {}", self.node_label(id), self.registry.get(ty));
            }
        }

        let consumers = self.nodes[id.index()].consumers.clone();
        let transitions = self.nodes[id.index()].out_transitions.clone();
        for consumer in consumers {
            self.schedule(Task::Notify {
                consumer,
                types: delta.clone(),
            });
        }
        for transition in transitions {
            self.schedule(Task::Forward {
                transition,
                types: delta.clone(),
            });
        }
        Ok(())
    }

    fn add_type(&mut self, id: NodeId, ty: TypeId) -> Result<bool> {
        if self.nodes[id.index()].types.contains(ty) {
            return Ok(false);
        }
        if self.nodes[id.index()].locked {
            let node = &self.nodes[id.index()];
            return Err(FlowError::LockViolation {
                type_name: self.registry.get(ty).to_string(),
                method: node.method.clone(),
                tag: node.tag.clone(),
            });
        }
        let universe = self.registry.len();
        self.nodes[id.index()].types.insert(ty, universe);
        Ok(true)
    }

    // === Filters ============================================================

    fn node_admits(&mut self, id: NodeId, ty: TypeId) -> bool {
        let resolved = match self.nodes[id.index()].filter {
            Some(resolved) => resolved,
            None => {
                let resolved = match &self.nodes[id.index()].bound {
                    Some(ValueType::Object(name)) => {
                        let name = name.clone();
                        ResolvedFilter::Supertype(self.filters.filter_for(
                            &name,
                            self.hierarchy.as_ref(),
                            &mut self.diagnostics,
                        ))
                    }
                    _ => ResolvedFilter::Universal,
                };
                self.nodes[id.index()].filter = Some(resolved);
                resolved
            }
        };
        match resolved {
            ResolvedFilter::Universal => true,
            ResolvedFilter::Supertype(filter) => {
                self.filters
                    .admits(filter, ty, &self.registry, self.hierarchy.as_ref())
            }
        }
    }

    pub(crate) fn edge_admits(&mut self, filter: FilterId, ty: TypeId) -> bool {
        self.filters
            .admits(filter, ty, &self.registry, self.hierarchy.as_ref())
    }

    // === Locking ============================================================

    /// Locks every node. Called by the embedder after the scheduler reports
    /// quiescence; any later attempt to grow a type set is a
    /// [`FlowError::LockViolation`].
    pub fn lock(&mut self) {
        self.locked = true;
        for node in &mut self.nodes {
            node.locked = true;
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    // === Queries ============================================================

    pub fn has_type(&self, node: NodeId, ty: TypeId) -> bool {
        self.nodes[node.index()].types.contains(ty)
    }

    /// Name-based membership test. Unknown names read as "not present".
    pub fn has_type_named(&self, node: NodeId, name: &str) -> bool {
        self.registry
            .lookup(name)
            .is_some_and(|ty| self.has_type(node, ty))
    }

    /// The node's accepted type names. Every entry satisfies the node's bound
    /// already, because ingress runs each type through the filter before it
    /// is buffered.
    pub fn types_of(&self, node: NodeId) -> Vec<&str> {
        self.nodes[node.index()]
            .types
            .iter()
            .map(|ty| self.registry.get(ty))
            .collect()
    }

    /// Whether the array-item satellite exists and has observed any type.
    pub fn has_array_type(&self, node: NodeId) -> bool {
        self.nodes[node.index()]
            .array_item
            .is_some_and(|satellite| !self.nodes[satellite.index()].types.is_empty())
    }

    /// Source nodes of this node's inbound transitions.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[node.index()]
            .in_transitions
            .iter()
            .map(|t| self.transitions[t.0].source)
    }

    /// Target nodes of this node's outbound transitions.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[node.index()]
            .out_transitions
            .iter()
            .map(|t| self.transitions[t.0].target)
    }

    /// Non-fatal conditions collected so far (unresolvable bound classes).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // === Scheduler plumbing =================================================

    /// Enqueues a delivery for the dispatch loop. All deliveries go through
    /// here; nothing notifies consumers or forwards transitions inline.
    pub(crate) fn schedule(&mut self, task: Task) {
        self.worklist.push_back(task);
    }

    pub(crate) fn pop_task(&mut self) -> Option<Task> {
        self.worklist.pop_front()
    }

    pub(crate) fn worklist_is_empty(&self) -> bool {
        self.worklist.is_empty()
    }

    pub(crate) fn has_pending(&self, node: NodeId) -> bool {
        !self.nodes[node.index()].pending.is_empty()
    }

    pub(crate) fn consumer_callback(&self, id: ConsumerId) -> SharedConsumer {
        Rc::clone(&self.consumers[id.0])
    }

    pub(crate) fn transition_parts(&self, id: TransitionId) -> (NodeId, Option<FilterId>) {
        let transition = &self.transitions[id.0];
        (transition.target, transition.filter)
    }

    fn node_label(&self, id: NodeId) -> String {
        match &self.nodes[id.index()].tag {
            Some(tag) => tag.clone(),
            None => format!("#{}", id.to_raw()),
        }
    }
}

impl std::fmt::Debug for TypeFlowGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeFlowGraph")
            .field("nodes", &self.nodes.len())
            .field("transitions", &self.transitions.len())
            .field("types", &self.registry.len())
            .field("locked", &self.locked)
            .finish_non_exhaustive()
    }
}
