//! Whole-program type-flow analysis for Vela's ahead-of-time pipeline.
//!
//! For every value slot in the program (parameters, return values, fields,
//! array elements) the engine computes the set of concrete runtime types
//! that can flow into it, as a conservative whole-program over-approximation.
//! Later phases use the answer for devirtualization, dead-code elimination,
//! and reachable-method discovery.
//!
//! The reachability driver builds a [`TypeFlowGraph`]: nodes hold monotone
//! sets of interned types, transitions carry subtype filters, and consumers
//! let the driver react to newly discovered types (and grow the graph while
//! doing so). Seeding a `new` expression's type at its node and calling
//! [`TypeFlowGraph::run`] converges the graph to a fixed point; after
//! [`TypeFlowGraph::lock`], the result is read through the query surface.

mod descriptor;
mod diagnostics;
mod error;
mod filter;
mod graph;
mod hierarchy;
mod node;
mod registry;
mod scheduler;
mod typeset;

pub use crate::descriptor::{PrimitiveKind, ValueType};
pub use crate::diagnostics::{Diagnostic, Severity, TypeFlowConfig};
pub use crate::error::{FlowError, Result};
pub use crate::graph::{SharedConsumer, TypeConsumer, TypeFlowGraph, MAX_DEGREE};
pub use crate::hierarchy::{ClassHierarchy, ClassStub, EmptyHierarchy, TableHierarchy};
pub use crate::registry::TypeRegistry;

pub use vela_core::{MethodRef, Name, NodeId, TypeId};
