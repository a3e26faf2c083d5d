// ferrograd-core/src/ops/arithmetic/pow.rs

use std::sync::Arc;

use crate::autograd::backward_op::{BackwardOp, NodeRef};
use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::ops::register_grad_fn;
use crate::tensor::Tensor;

/// Element-wise power with a fixed scalar exponent.
pub fn pow_op(graph: &GraphArena, input: &Tensor, exponent: f32) -> Result<Tensor, FerrogradError> {
    let requires_grad = input.requires_grad();

    let guard = input.read_data();
    let out_data: Vec<f32> = guard.data.iter().map(|x| x.powf(exponent)).collect();
    let shape = guard.shape.clone();
    drop(guard);

    let result = Tensor::new(out_data, shape)?;

    if requires_grad {
        let backward_context = PowBackward {
            input: input.node_ref(),
            exponent,
        };
        register_grad_fn(graph, &result, Arc::new(backward_context))?;
    }

    Ok(result)
}

/// Backward node for the power operation: d(x^e)/dx = e * x^(e-1). Needs the
/// input values back, so it holds a non-owning reference to the input node.
#[derive(Debug)]
struct PowBackward {
    input: NodeRef,
    exponent: f32,
}

impl BackwardOp for PowBackward {
    fn backward(&self, upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError> {
        let Some(input_node) = self.input.upgrade() else {
            log::warn!("pow backward: input expired, skipping branch");
            return Ok(vec![None]);
        };
        let input_guard = input_node.read().map_err(|_| {
            FerrogradError::InternalError("tensor lock poisoned in pow backward".to_string())
        })?;

        let up = upstream.get_data();
        let grad: Vec<f32> = input_guard
            .data
            .iter()
            .zip(&up)
            .map(|(x, g)| self.exponent * x.powf(self.exponent - 1.0) * g)
            .collect();
        let shape = input_guard.shape.clone();
        drop(input_guard);

        Ok(vec![Some(Tensor::new(grad, shape)?)])
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.clone()]
    }
}

// --- Tests ---
#[cfg(test)]
#[path = "pow_test.rs"]
mod tests;
