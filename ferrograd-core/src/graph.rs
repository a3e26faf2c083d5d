// src/graph.rs
use std::sync::{Arc, Mutex};

use crate::autograd::BackwardOp;
use crate::tensor::Tensor;

/// Owner of every intermediate tensor and operation node produced during a
/// forward pass.
///
/// Tensors link to their creators and operations to their inputs only through
/// non-owning references, so without the arena nothing would keep the graph
/// alive between forward and backward. Each kernel that produces a
/// gradient-tracked result registers both the result and the operation node
/// here; [`clear`](GraphArena::clear) releases them all at once.
///
/// `clear` must run once per training iteration, after the optimizer step.
/// Parameter gradients live on the parameter leaves, which modules own, so
/// clearing the arena does not lose them. Clearing before backward completes
/// severs the gradient chain instead.
///
/// One arena per training context; independent contexts (per-thread training,
/// isolated tests) each hold their own. The interior mutex only serializes
/// registration, it does not make concurrent forward passes over one arena
/// meaningful.
#[derive(Debug, Default)]
pub struct GraphArena {
    inner: Mutex<ArenaInner>,
}

#[derive(Debug, Default)]
struct ArenaInner {
    tensors: Vec<Tensor>,
    ops: Vec<Arc<dyn BackwardOp + Send + Sync>>,
}

impl GraphArena {
    pub fn new() -> Self {
        GraphArena::default()
    }

    /// Takes ownership of an intermediate tensor until the next `clear`.
    pub fn add_tensor(&self, tensor: &Tensor) {
        self.inner
            .lock()
            .expect("arena mutex poisoned")
            .tensors
            .push(tensor.clone());
    }

    /// Takes ownership of an operation node until the next `clear`.
    pub fn add_op(&self, op: Arc<dyn BackwardOp + Send + Sync>) {
        self.inner.lock().expect("arena mutex poisoned").ops.push(op);
    }

    /// Releases every intermediate tensor and operation node registered since
    /// the last clear. Leaves held elsewhere (parameters, caller inputs) are
    /// unaffected.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("arena mutex poisoned");
        inner.tensors.clear();
        inner.ops.clear();
    }

    pub fn tensor_count(&self) -> usize {
        self.inner.lock().expect("arena mutex poisoned").tensors.len()
    }

    pub fn op_count(&self) -> usize {
        self.inner.lock().expect("arena mutex poisoned").ops.len()
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.lock().expect("arena mutex poisoned");
        inner.tensors.is_empty() && inner.ops.is_empty()
    }
}
