use std::sync::Arc;

use crate::autograd::backward_op::{BackwardOp, NodeRef};
use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::ops::register_grad_fn;
use crate::tensor::Tensor;

/// Backward node for the hyperbolic tangent: derivative `1 - tanh(x)^2`,
/// recomputed from the weakly held input.
#[derive(Debug)]
struct TanhBackward {
    input: NodeRef,
}

impl BackwardOp for TanhBackward {
    fn backward(&self, upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError> {
        let Some(input_node) = self.input.upgrade() else {
            log::warn!("tanh backward: input expired, skipping branch");
            return Ok(vec![None]);
        };
        let input_guard = input_node.read().map_err(|_| {
            FerrogradError::InternalError("tensor lock poisoned in tanh backward".to_string())
        })?;

        let up = upstream.get_data();
        let grad: Vec<f32> = input_guard
            .data
            .iter()
            .zip(&up)
            .map(|(x, g)| {
                let t = x.tanh();
                g * (1.0 - t * t)
            })
            .collect();
        let shape = input_guard.shape.clone();
        drop(input_guard);

        Ok(vec![Some(Tensor::new(grad, shape)?)])
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.clone()]
    }
}

/// Applies the hyperbolic tangent element-wise.
pub fn tanh_op(graph: &GraphArena, input: &Tensor) -> Result<Tensor, FerrogradError> {
    let requires_grad = input.requires_grad();

    let guard = input.read_data();
    let out_data: Vec<f32> = guard.data.iter().map(|x| x.tanh()).collect();
    let shape = guard.shape.clone();
    drop(guard);

    let result = Tensor::new(out_data, shape)?;

    if requires_grad {
        let backward_context = TanhBackward {
            input: input.node_ref(),
        };
        register_grad_fn(graph, &result, Arc::new(backward_context))?;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::mean_op;
    use approx::assert_relative_eq;

    #[test]
    fn test_tanh_forward() {
        let graph = GraphArena::new();
        let x = Tensor::new(vec![0.0, 1.0], vec![2]).unwrap();
        let out = tanh_op(&graph, &x).unwrap();
        let data = out.get_data();
        assert_relative_eq!(data[0], 0.0);
        assert_relative_eq!(data[1], 1.0f32.tanh());
    }

    #[test]
    fn test_tanh_backward() {
        let graph = GraphArena::new();
        let x = Tensor::new(vec![0.0, 1.0], vec![2]).unwrap();
        x.requires_grad_(true).unwrap();
        let t = tanh_op(&graph, &x).unwrap();
        let loss = mean_op(&graph, &t).unwrap();
        loss.backward().unwrap();
        let grad = x.get_grad().unwrap();
        assert_relative_eq!(grad[0], 0.5, epsilon = 1e-6);
        let t1 = 1.0f32.tanh();
        assert_relative_eq!(grad[1], 0.5 * (1.0 - t1 * t1), epsilon = 1e-6);
    }
}
