// ferrograd-core/src/nn/losses/mse.rs

use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::ops::arithmetic::{pow_op, sub_op};
use crate::ops::reduction::mean_op;
use crate::tensor::Tensor;

/// Mean squared error between a prediction and a target.
///
/// Built as a sub-graph over the existing kernels, `mean((prediction -
/// target)^2)`, so backward needs no dedicated derivation. The result is a
/// scalar tensor of shape `[1]` that tracks gradients whenever either input
/// does.
///
/// The shapes must match exactly; the broadcasting of the element-wise
/// kernels is deliberately not available here.
pub fn mse_loss(
    graph: &GraphArena,
    prediction: &Tensor,
    target: &Tensor,
) -> Result<Tensor, FerrogradError> {
    if prediction.shape() != target.shape() {
        return Err(FerrogradError::ShapeMismatch {
            expected: format!("{:?}", target.shape()),
            actual: format!("{:?}", prediction.shape()),
            operation: "mse_loss".to_string(),
        });
    }

    let diff = sub_op(graph, prediction, target)?;
    let squared = pow_op(graph, &diff, 2.0)?;
    mean_op(graph, &squared)
}

// --- Tests ---
#[cfg(test)]
#[path = "mse_test.rs"]
mod tests;
