// ferrograd-core/src/ops/arithmetic/div.rs

use std::sync::Arc;

use crate::autograd::backward_op::{BackwardOp, NodeRef};
use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::ops::register_grad_fn;
use crate::tensor::Tensor;

/// Element-wise division by a scalar. A zero divisor is rejected before any
/// output is produced.
pub fn div_scalar_op(
    graph: &GraphArena,
    input: &Tensor,
    divisor: f32,
) -> Result<Tensor, FerrogradError> {
    if divisor == 0.0 {
        return Err(FerrogradError::DivisionByZero);
    }
    let requires_grad = input.requires_grad();

    let guard = input.read_data();
    let out_data: Vec<f32> = guard.data.iter().map(|x| x / divisor).collect();
    let shape = guard.shape.clone();
    drop(guard);

    let result = Tensor::new(out_data, shape.clone())?;

    if requires_grad {
        let backward_context = DivScalarBackward {
            input: input.node_ref(),
            input_shape: shape,
            divisor,
        };
        register_grad_fn(graph, &result, Arc::new(backward_context))?;
    }

    Ok(result)
}

/// Backward node for scalar division: d(x/c)/dx = 1/c.
#[derive(Debug)]
struct DivScalarBackward {
    input: NodeRef,
    input_shape: Vec<usize>,
    divisor: f32,
}

impl BackwardOp for DivScalarBackward {
    fn backward(&self, upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError> {
        let grad: Vec<f32> = upstream.get_data().iter().map(|g| g / self.divisor).collect();
        Ok(vec![Some(Tensor::new(grad, self.input_shape.clone())?)])
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.clone()]
    }
}

// --- Tests ---
#[cfg(test)]
#[path = "div_test.rs"]
mod tests;
