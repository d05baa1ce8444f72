//! Flow-graph vertices.

use vela_core::{MethodRef, NodeId};

use crate::descriptor::ValueType;
use crate::filter::FilterId;
use crate::typeset::TypeSet;

/// Index of a transition in the graph's transition arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TransitionId(pub(crate) usize);

/// Index of a registered consumer in the graph's consumer arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConsumerId(pub(crate) usize);

/// The node's upper-bound predicate, resolved from its declared bound on
/// first use.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ResolvedFilter {
    /// No bound, or a bound that does not constrain the node itself
    /// (primitives; array bounds constrain the array-item satellite instead).
    Universal,
    Supertype(FilterId),
}

/// A value slot in the type-flow graph.
///
/// Nodes live in the graph's arena and reference each other (transitions,
/// satellites) through stable handles, never through owning pointers.
pub(crate) struct FlowNode {
    /// Declared upper bound; `None` lets everything through.
    pub(crate) bound: Option<ValueType>,
    /// Lazily resolved predicate for `bound`; `None` until first queried.
    pub(crate) filter: Option<ResolvedFilter>,
    /// Types accepted so far. Grows monotonically.
    pub(crate) types: TypeSet,
    /// Types accepted but not yet broadcast to consumers and transitions.
    pub(crate) pending: TypeSet,
    pub(crate) out_transitions: Vec<TransitionId>,
    pub(crate) in_transitions: Vec<TransitionId>,
    pub(crate) consumers: Vec<ConsumerId>,
    pub(crate) array_item: Option<NodeId>,
    pub(crate) class_value: Option<NodeId>,
    /// Depth in the array-item satellite chain. Bounds propagation nesting.
    pub(crate) degree: u32,
    /// Set once the scheduler has declared quiescence; growing a locked
    /// node's type set is an error.
    pub(crate) locked: bool,
    /// Originating method, for diagnostics.
    pub(crate) method: Option<MethodRef>,
    pub(crate) tag: Option<String>,
}

impl FlowNode {
    pub(crate) fn new(bound: Option<ValueType>) -> Self {
        Self {
            bound,
            filter: None,
            types: TypeSet::new(),
            pending: TypeSet::new(),
            out_transitions: Vec::new(),
            in_transitions: Vec::new(),
            consumers: Vec::new(),
            array_item: None,
            class_value: None,
            degree: 0,
            locked: false,
            method: None,
            tag: None,
        }
    }
}
