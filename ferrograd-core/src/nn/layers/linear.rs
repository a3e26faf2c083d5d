use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::nn::init;
use crate::nn::module::Module;
use crate::ops::arithmetic::add_op;
use crate::ops::linalg::matmul_op;
use crate::tensor::Tensor;

/// A fully connected layer: `y = x @ weight + bias`.
///
/// Owns two leaf parameters for its whole lifetime: `weight` of shape
/// `[in_features, out_features]` (Kaiming-normal initialized) and `bias` of
/// shape `[out_features]` (zeros). Both track gradients. The bias addition
/// relies on the row-vector broadcast of [`add_op`].
#[derive(Debug)]
pub struct Linear {
    weight: Tensor,
    bias: Tensor,
}

impl Linear {
    pub fn new(in_features: usize, out_features: usize) -> Result<Self, FerrogradError> {
        let weight = Tensor::zeros(vec![in_features, out_features])?;
        init::kaiming_normal_(&weight, in_features)?;
        weight.requires_grad_(true)?;

        let bias = Tensor::zeros(vec![out_features])?;
        bias.requires_grad_(true)?;

        Ok(Linear { weight, bias })
    }

    /// Builds a layer from explicit parameter values. Used by tests and by
    /// callers restoring a known state.
    pub fn from_parameters(weight: Tensor, bias: Tensor) -> Result<Self, FerrogradError> {
        let w_shape = weight.shape();
        let b_shape = bias.shape();
        if w_shape.len() != 2 || b_shape.len() != 1 || b_shape[0] != w_shape[1] {
            return Err(FerrogradError::ShapeMismatch {
                expected: "weight [in, out] with bias [out]".to_string(),
                actual: format!("weight {:?}, bias {:?}", w_shape, b_shape),
                operation: "Linear::from_parameters".to_string(),
            });
        }
        weight.requires_grad_(true)?;
        bias.requires_grad_(true)?;
        Ok(Linear { weight, bias })
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }
}

impl Module for Linear {
    fn forward(&self, graph: &GraphArena, input: &Tensor) -> Result<Tensor, FerrogradError> {
        let wx = matmul_op(graph, input, &self.weight)?;
        add_op(graph, &wx, &self.bias)
    }

    fn parameters(&self) -> Vec<Tensor> {
        vec![self.weight.clone(), self.bias.clone()]
    }

    fn name(&self) -> &str {
        "Linear"
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
