// ferrograd-core/src/ops/arithmetic/add.rs

use std::sync::Arc;

use crate::autograd::backward_op::{BackwardOp, NodeRef};
use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::ops::register_grad_fn;
use crate::tensor::utils::{elementwise_broadcast, reduce_upstream, ElementwiseBroadcast};
use crate::tensor::Tensor;

// --- Forward operation ---

/// Element-wise addition of two tensors.
///
/// Shapes must match exactly, or one operand may be a rank-one vector whose
/// length equals the other operand's last dimension; the vector is then
/// replicated along the batch dimension (the bias pattern). Any other
/// combination is rejected.
///
/// If either input requires gradients the output does too, with an
/// `AddBackward` node registered in the arena.
pub fn add_op(graph: &GraphArena, a: &Tensor, b: &Tensor) -> Result<Tensor, FerrogradError> {
    let requires_grad = a.requires_grad() || b.requires_grad();

    let a_guard = a.read_data();
    let b_guard = b.read_data();
    let plan = elementwise_broadcast(&a_guard.shape, &b_guard.shape)?;

    let out_data: Vec<f32> = match &plan {
        ElementwiseBroadcast::Same(_) => a_guard
            .data
            .iter()
            .zip(&b_guard.data)
            .map(|(x, y)| x + y)
            .collect(),
        ElementwiseBroadcast::RowVecRhs { rows, cols } => {
            let mut out = Vec::with_capacity(rows * cols);
            for r in 0..*rows {
                for c in 0..*cols {
                    out.push(a_guard.data[r * cols + c] + b_guard.data[c]);
                }
            }
            out
        }
        ElementwiseBroadcast::RowVecLhs { rows, cols } => {
            let mut out = Vec::with_capacity(rows * cols);
            for r in 0..*rows {
                for c in 0..*cols {
                    out.push(a_guard.data[c] + b_guard.data[r * cols + c]);
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
        let backward_context = AddBackward {
            lhs: a.node_ref(),
            rhs: b.node_ref(),
            lhs_shape,
            rhs_shape,
        };
        register_grad_fn(graph, &result, Arc::new(backward_context))?;
    }

    Ok(result)
}

// --- Backward operation ---

/// Backward node for element-wise addition. Keeps the original operand
/// shapes so a row-broadcast operand receives the column-wise sum of the
/// upstream gradient.
#[derive(Debug)]
struct AddBackward {
    lhs: NodeRef,
    rhs: NodeRef,
    lhs_shape: Vec<usize>,
    rhs_shape: Vec<usize>,
}

impl BackwardOp for AddBackward {
    fn backward(&self, upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError> {
        let up_shape = upstream.shape();
        let up = upstream.get_data();

        let grad_lhs = reduce_upstream(&up, &up_shape, &self.lhs_shape)?;
        let grad_rhs = reduce_upstream(&up, &up_shape, &self.rhs_shape)?;

        Ok(vec![
            Some(Tensor::new(grad_lhs, self.lhs_shape.clone())?),
            Some(Tensor::new(grad_rhs, self.rhs_shape.clone())?),
        ])
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.lhs.clone(), self.rhs.clone()]
    }
}

// --- Tests ---
#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
