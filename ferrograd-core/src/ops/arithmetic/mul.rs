// ferrograd-core/src/ops/arithmetic/mul.rs

use std::sync::Arc;

use crate::autograd::backward_op::{BackwardOp, NodeRef};
use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::ops::register_grad_fn;
use crate::tensor::utils::{elementwise_broadcast, reduce_upstream, ElementwiseBroadcast};
use crate::tensor::Tensor;

// --- Forward operation ---

/// Element-wise multiplication `a * b`, with the same row-vector broadcasting
/// rule as [`add_op`](crate::ops::add_op).
pub fn mul_op(graph: &GraphArena, a: &Tensor, b: &Tensor) -> Result<Tensor, FerrogradError> {
    let a_requires_grad = a.requires_grad();
    let b_requires_grad = b.requires_grad();
    let requires_grad = a_requires_grad || b_requires_grad;

    let a_guard = a.read_data();
    let b_guard = b.read_data();
    let plan = elementwise_broadcast(&a_guard.shape, &b_guard.shape)?;

    let out_data: Vec<f32> = match &plan {
        ElementwiseBroadcast::Same(_) => a_guard
            .data
            .iter()
            .zip(&b_guard.data)
            .map(|(x, y)| x * y)
            .collect(),
        ElementwiseBroadcast::RowVecRhs { rows, cols } => {
            let mut out = Vec::with_capacity(rows * cols);
            for r in 0..*rows {
                for c in 0..*cols {
                    out.push(a_guard.data[r * cols + c] * b_guard.data[c]);
                }
            }
            out
        }
        ElementwiseBroadcast::RowVecLhs { rows, cols } => {
            let mut out = Vec::with_capacity(rows * cols);
            for r in 0..*rows {
                for c in 0..*cols {
                    out.push(a_guard.data[c] * b_guard.data[r * cols + c]);
                }
            }
            out
        }
    };
    let lhs_shape = a_guard.shape.clone();
    let rhs_shape = b_guard.shape.clone();
    drop(a_guard);
    drop(b_guard);

    let result = Tensor::new(out_data, plan.output_shape())?;

    if requires_grad {
        let backward_context = MulBackward {
            lhs: a.node_ref(),
            rhs: b.node_ref(),
            lhs_shape,
            rhs_shape,
            lhs_requires_grad: a_requires_grad,
            rhs_requires_grad: b_requires_grad,
        };
        register_grad_fn(graph, &result, Arc::new(backward_context))?;
    }

    Ok(result)
}

// --- Backward operation ---

/// Backward node for element-wise multiplication. Each side's gradient is
/// the upstream scaled by the *other* operand, so the operand data has to be
/// read back through the stored non-owning references.
#[derive(Debug)]
struct MulBackward {
    lhs: NodeRef,
    rhs: NodeRef,
    lhs_shape: Vec<usize>,
    rhs_shape: Vec<usize>,
    lhs_requires_grad: bool,
    rhs_requires_grad: bool,
}

impl MulBackward {
    /// Upstream times the other operand, reduced to `target_shape`. Returns
    /// `None` (after logging) when the other operand has expired.
    fn scaled_grad(
        &self,
        other: &NodeRef,
        other_shape: &[usize],
        target_shape: &[usize],
        up: &[f32],
        up_shape: &[usize],
    ) -> Result<Option<Tensor>, FerrogradError> {
        let Some(other_node) = other.upgrade() else {
            log::warn!("mul backward: an operand expired, skipping the sibling gradient");
            return Ok(None);
        };
        let other_guard = other_node.read().map_err(|_| {
            FerrogradError::InternalError("tensor lock poisoned in mul backward".to_string())
        })?;

        // The operand either matches the output shape or is a row-broadcast
        // vector indexed by column.
        let cols = if up_shape.len() == 2 { up_shape[1] } else { 0 };
        let product: Vec<f32> = up
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let factor = if other_shape.len() == 1 && up_shape.len() == 2 {
                    other_guard.data[i % cols]
                } else {
                    other_guard.data[i]
                };
                g * factor
            })
            .collect();
        drop(other_guard);

        let reduced = reduce_upstream(&product, up_shape, target_shape)?;
        Ok(Some(Tensor::new(reduced, target_shape.to_vec())?))
    }
}

impl BackwardOp for MulBackward {
    fn backward(&self, upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError> {
        let up_shape = upstream.shape();
        let up = upstream.get_data();

        let grad_lhs = if self.lhs_requires_grad {
            self.scaled_grad(&self.rhs, &self.rhs_shape, &self.lhs_shape, &up, &up_shape)?
        } else {
            None
        };
        let grad_rhs = if self.rhs_requires_grad {
            self.scaled_grad(&self.lhs, &self.lhs_shape, &self.rhs_shape, &up, &up_shape)?
        } else {
            None
        };

        Ok(vec![grad_lhs, grad_rhs])
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.lhs.clone(), self.rhs.clone()]
    }
}

// --- Tests ---
#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
