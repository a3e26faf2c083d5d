use std::sync::Arc;

use crate::autograd::backward_op::{BackwardOp, NodeRef};
use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::ops::register_grad_fn;
use crate::tensor::Tensor;

/// Backward node for the logistic sigmoid. Recomputes `s = sigmoid(x)` from
/// the weakly held input; the local derivative is `s * (1 - s)`.
#[derive(Debug)]
struct SigmoidBackward {
    input: NodeRef,
}

impl BackwardOp for SigmoidBackward {
    fn backward(&self, upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError> {
        let Some(input_node) = self.input.upgrade() else {
            log::warn!("sigmoid backward: input expired, skipping branch");
            return Ok(vec![None]);
        };
        let input_guard = input_node.read().map_err(|_| {
            FerrogradError::InternalError("tensor lock poisoned in sigmoid backward".to_string())
        })?;

        let up = upstream.get_data();
        let grad: Vec<f32> = input_guard
            .data
            .iter()
            .zip(&up)
            .map(|(x, g)| {
                let s = 1.0 / (1.0 + (-x).exp());
                g * s * (1.0 - s)
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

/// Applies the logistic sigmoid element-wise: `1 / (1 + e^-x)`.
pub fn sigmoid_op(graph: &GraphArena, input: &Tensor) -> Result<Tensor, FerrogradError> {
    let requires_grad = input.requires_grad();

    let guard = input.read_data();
    let out_data: Vec<f32> = guard.data.iter().map(|x| 1.0 / (1.0 + (-x).exp())).collect();
    let shape = guard.shape.clone();
    drop(guard);

    let result = Tensor::new(out_data, shape)?;

    if requires_grad {
        let backward_context = SigmoidBackward {
            input: input.node_ref(),
        };
        register_grad_fn(graph, &result, Arc::new(backward_context))?;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::grad_check::check_grad;
    use crate::ops::mean_op;
    use approx::assert_relative_eq;

    #[test]
    fn test_sigmoid_forward() {
        let graph = GraphArena::new();
        let x = Tensor::new(vec![0.0, 100.0, -100.0], vec![3]).unwrap();
        let out = sigmoid_op(&graph, &x).unwrap();
        let data = out.get_data();
        assert_relative_eq!(data[0], 0.5);
        assert_relative_eq!(data[1], 1.0, epsilon = 1e-6);
        assert_relative_eq!(data[2], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sigmoid_backward_at_zero() {
        let graph = GraphArena::new();
        let x = Tensor::new(vec![0.0], vec![1]).unwrap();
        x.requires_grad_(true).unwrap();
        let s = sigmoid_op(&graph, &x).unwrap();
        s.backward().unwrap();
        // s(0) = 0.5, derivative 0.25.
        assert_relative_eq!(x.get_grad().unwrap()[0], 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_sigmoid_gradient_against_central_differences() {
        let x = Tensor::new(vec![-1.0, -0.25, 0.5, 1.5], vec![4]).unwrap();
        x.requires_grad_(true).unwrap();
        let x_in = x.clone();
        check_grad(
            move |graph| {
                let s = sigmoid_op(graph, &x_in)?;
                mean_op(graph, &s)
            },
            &[x],
            1e-2,
            1e-2,
        )
        .unwrap();
    }
}
