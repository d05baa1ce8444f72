//! Work-queue dispatch to a propagation fixed point.
//!
//! Deliveries are always scheduled, never performed inline: a node applying
//! its pending types enqueues one task per consumer and per transition, and
//! each transition delivery only buffers into the destination's pending set.
//! Downstream effects therefore fire one round later, which keeps recursion
//! bounded and the frontier breadth-first.

use vela_core::{NodeId, TypeId};

use crate::error::Result;
use crate::graph::TypeFlowGraph;
use crate::node::{ConsumerId, TransitionId};

/// A unit of scheduled delivery.
pub(crate) enum Task {
    /// Run a user consumer with a batch of new types.
    Notify {
        consumer: ConsumerId,
        types: Vec<TypeId>,
    },
    /// Forward a batch along a transition into its destination.
    Forward {
        transition: TransitionId,
        types: Vec<TypeId>,
    },
}

impl TypeFlowGraph {
    /// Drains the worklist and all pending sets until quiescence: no task
    /// queued and no node holding buffered types.
    ///
    /// Termination is guaranteed by monotone growth of finite type sets plus
    /// the degree bound; cycles in the graph need no special handling. Fails
    /// if a pending type reaches a locked node.
    pub fn run(&mut self) -> Result<()> {
        loop {
            while let Some(task) = self.pop_task() {
                self.dispatch(task);
            }
            if !self.sweep_pending()? && self.worklist_is_empty() {
                return Ok(());
            }
        }
    }

    fn dispatch(&mut self, task: Task) {
        match task {
            Task::Notify { consumer, types } => {
                let callback = self.consumer_callback(consumer);
                callback.borrow_mut().consume(self, &types);
            }
            Task::Forward { transition, types } => {
                let (target, filter) = self.transition_parts(transition);
                for ty in types {
                    let admitted = match filter {
                        None => true,
                        Some(filter) => self.edge_admits(filter, ty),
                    };
                    if admitted {
                        self.propagate(target, ty);
                    }
                }
            }
        }
    }

    /// Applies pending types on every node that has them. Returns whether any
    /// node was touched. Iterates by index because consumers may create nodes
    /// mid-sweep.
    fn sweep_pending(&mut self) -> Result<bool> {
        let mut applied = false;
        let mut index = 0;
        while index < self.node_count() {
            let id = NodeId::from_raw(index as u32);
            if self.has_pending(id) {
                self.apply_pending(id)?;
                applied = true;
            }
            index += 1;
        }
        Ok(applied)
    }
}
