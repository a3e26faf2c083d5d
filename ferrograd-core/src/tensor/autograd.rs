// src/tensor/autograd.rs
//
// Autograd-facing methods on Tensor: gradient plumbing, the backward driver,
// and detach.

use std::sync::{Arc, RwLock, Weak};

use crate::autograd::backward_op::{BackwardOp, NodeRef};
use crate::autograd::graph::topological_sort;
use crate::error::FerrogradError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

impl Tensor {
    /// Checks if this tensor participates in gradient accumulation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag **in place**. Only allowed on leaf
    /// tensors; produced tensors inherit the flag from their inputs.
    pub fn requires_grad_(&self, requires_grad: bool) -> Result<(), FerrogradError> {
        let mut guard = self.write_data();
        if requires_grad && !guard.is_leaf() {
            return Err(FerrogradError::RequiresGradOnNonLeaf);
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns the creating operation node, if it is still resolvable.
    ///
    /// The back-link is non-owning; once the arena that owns the node is
    /// cleared this returns `None` and the tensor behaves as a leaf.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp + Send + Sync>> {
        self.read_data().grad_fn.as_ref().and_then(Weak::upgrade)
    }

    /// Links this tensor to the operation that produced it. The tensor must
    /// already require gradients; the link is stored as a weak reference.
    pub(crate) fn set_grad_fn(
        &self,
        op: &Arc<dyn BackwardOp + Send + Sync>,
    ) -> Result<(), FerrogradError> {
        let mut guard = self.write_data();
        if !guard.requires_grad {
            return Err(FerrogradError::RequiresGradNotMet);
        }
        guard.grad_fn = Some(Arc::downgrade(op));
        Ok(())
    }

    /// Non-owning reference to this tensor's shared node, as stored inside
    /// operation records.
    pub(crate) fn node_ref(&self) -> NodeRef {
        Arc::downgrade(&self.data)
    }

    /// Fills the gradient buffer with zeros, allocating it if absent.
    /// Idempotent; a no-op on tensors that do not require gradients.
    pub fn zero_grad(&self) {
        let mut guard = self.write_data();
        if !guard.requires_grad {
            return;
        }
        let len = guard.data.len();
        match guard.grad.as_mut() {
            Some(grad) => grad.iter_mut().for_each(|g| *g = 0.0),
            None => guard.grad = Some(vec![0.0; len]),
        }
    }

    /// Produces a new leaf tensor with a copy of the data, no gradient
    /// buffer, and gradient tracking disabled. Never shares storage with the
    /// source.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        let detached = TensorData {
            data: guard.data.clone(),
            shape: guard.shape.clone(),
            requires_grad: false,
            grad: None,
            grad_fn: None,
        };
        drop(guard);
        Tensor {
            data: Arc::new(RwLock::new(detached)),
        }
    }

    /// Performs the backward pass starting from this tensor.
    ///
    /// The tensor must be scalar (exactly one element) and require
    /// gradients. If the gradient buffer is empty it is seeded with `1.0`.
    /// The graph is then walked once per node in reverse topological order,
    /// each operation distributing its local gradient contributions into the
    /// gradient buffers of its inputs. Contributions always accumulate, so
    /// leaves that are reachable through several branches receive the sum of
    /// all paths.
    ///
    /// An input whose shared node was dropped before the walk reaches it is
    /// logged and skipped; the remaining branches still update their leaves.
    pub fn backward(&self) -> Result<(), FerrogradError> {
        if !self.requires_grad() {
            return Err(FerrogradError::RequiresGradNotMet);
        }
        let shape = self.shape();
        if self.numel() != 1 {
            return Err(FerrogradError::BackwardNonScalar { shape });
        }

        {
            let mut guard = self.write_data();
            if guard.grad.is_none() {
                guard.grad = Some(vec![1.0]);
            }
        }

        let order = topological_sort(self)?;
        // Post-order puts leaves first; walk from the root down so every
        // node's gradient is complete before it is distributed further.
        for node in order.iter().rev() {
            let (op, upstream) = {
                let guard = node.read().map_err(|_| {
                    FerrogradError::InternalError("tensor lock poisoned during backward".to_string())
                })?;
                let op = guard.grad_fn.as_ref().and_then(Weak::upgrade);
                let upstream = guard
                    .grad
                    .as_ref()
                    .map(|grad| (grad.clone(), guard.shape.clone()));
                (op, upstream)
            };
            let Some(op) = op else {
                continue; // leaf, or creator already released
            };
            let Some((grad, node_shape)) = upstream else {
                continue; // no contribution reached this node
            };

            let upstream = Tensor::new(grad, node_shape)?;
            let contributions = op.backward(&upstream)?;
            let inputs = op.inputs();
            if contributions.len() != inputs.len() {
                return Err(FerrogradError::InternalError(format!(
                    "operation {:?} produced {} gradients for {} inputs",
                    op,
                    contributions.len(),
                    inputs.len()
                )));
            }

            for (input, contribution) in inputs.iter().zip(contributions) {
                let Some(contribution) = contribution else {
                    continue;
                };
                match input.upgrade() {
                    Some(input_node) => {
                        accumulate_into(&input_node, &contribution)?;
                    }
                    None => {
                        log::warn!(
                            "backward: {}",
                            FerrogradError::ExpiredReference {
                                operation: format!("gradient accumulation for {:?}", op),
                            }
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

/// Accumulates a contribution into a node's gradient buffer, honoring the
/// `requires_grad` flag.
fn accumulate_into(
    node: &Arc<RwLock<TensorData>>,
    contribution: &Tensor,
) -> Result<(), FerrogradError> {
    let mut guard = node.write().map_err(|_| {
        FerrogradError::InternalError("tensor lock poisoned during gradient accumulation".to_string())
    })?;
    if !guard.requires_grad {
        return Ok(());
    }
    let contribution_guard = contribution.read_data();
    guard.accumulate_grad(&contribution_guard.data, &contribution_guard.shape)
}
