use std::sync::Arc;

use crate::autograd::backward_op::{BackwardOp, NodeRef};
use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::ops::register_grad_fn;
use crate::tensor::Tensor;

// --- ReluBackward definition ---

/// Backward node for ReLU. Holds a non-owning reference to the input so the
/// gradient mask can be rebuilt from the original values: upstream passes
/// through where the input was strictly positive, zero elsewhere (including
/// at exactly zero, consistent with the strict inequality in forward).
#[derive(Debug)]
struct ReluBackward {
    input: NodeRef,
}

impl BackwardOp for ReluBackward {
    fn backward(&self, upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError> {
        let Some(input_node) = self.input.upgrade() else {
            log::warn!("relu backward: input expired, skipping branch");
            return Ok(vec![None]);
        };
        let input_guard = input_node.read().map_err(|_| {
            FerrogradError::InternalError("tensor lock poisoned in relu backward".to_string())
        })?;

        let up = upstream.get_data();
        let grad: Vec<f32> = input_guard
            .data
            .iter()
            .zip(&up)
            .map(|(x, g)| if *x > 0.0 { *g } else { 0.0 })
            .collect();
        let shape = input_guard.shape.clone();
        drop(input_guard);

        Ok(vec![Some(Tensor::new(grad, shape)?)])
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.clone()]
    }
}

// --- relu_op implementation ---

/// Applies the rectified linear unit element-wise: `max(0, x)`.
pub fn relu_op(graph: &GraphArena, input: &Tensor) -> Result<Tensor, FerrogradError> {
    let requires_grad = input.requires_grad();

    let guard = input.read_data();
    let out_data: Vec<f32> = guard
        .data
        .iter()
        .map(|&x| if x > 0.0 { x } else { 0.0 })
        .collect();
    let shape = guard.shape.clone();
    drop(guard);

    let result = Tensor::new(out_data, shape)?;

    if requires_grad {
        let backward_context = ReluBackward {
            input: input.node_ref(),
        };
        register_grad_fn(graph, &result, Arc::new(backward_context))?;
    }

    Ok(result)
}
