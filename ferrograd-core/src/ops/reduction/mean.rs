use std::sync::Arc;

use crate::autograd::backward_op::{BackwardOp, NodeRef};
use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::ops::register_grad_fn;
use crate::tensor::Tensor;

// --- MeanBackward definition ---

/// Backward node for the full-tensor mean reduction.
///
/// Keeps the input shape and the element count captured at forward time; the
/// gradient spreads `upstream / count` uniformly over the input.
#[derive(Debug)]
struct MeanBackward {
    input: NodeRef,
    input_shape: Vec<usize>,
    count: usize,
}

impl BackwardOp for MeanBackward {
    fn backward(&self, upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError> {
        let scale = upstream.get(&[0])? / self.count as f32;
        let numel: usize = self.input_shape.iter().product();
        Ok(vec![Some(Tensor::new(
            vec![scale; numel],
            self.input_shape.clone(),
        )?)])
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.clone()]
    }
}

// --- mean_op implementation ---

/// Reduces a tensor of any shape to its arithmetic mean, as a tensor of
/// shape `[1]`.
pub fn mean_op(graph: &GraphArena, input: &Tensor) -> Result<Tensor, FerrogradError> {
    let requires_grad = input.requires_grad();

    let guard = input.read_data();
    let count = guard.data.len();
    if count == 0 {
        return Err(FerrogradError::DivisionByZero);
    }
    let sum: f32 = guard.data.iter().sum();
    let input_shape = guard.shape.clone();
    drop(guard);

    let result = Tensor::new(vec![sum / count as f32], vec![1])?;

    if requires_grad {
        let backward_context = MeanBackward {
            input: input.node_ref(),
            input_shape,
            count,
        };
        register_grad_fn(graph, &result, Arc::new(backward_context))?;
    }

    Ok(result)
}

// --- Tests ---
#[cfg(test)]
#[path = "mean_test.rs"]
mod tests;
