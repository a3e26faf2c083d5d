use std::fmt::Debug;

use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::tensor::Tensor;

/// The base trait for all neural network modules (layers, containers, etc.).
///
/// Modules own their parameter tensors for their whole lifetime; `parameters`
/// hands out shared handles so optimizers can read gradients and update data
/// in place. The arena passed to `forward` owns whatever intermediates the
/// module produces.
pub trait Module: Debug {
    /// Performs the forward pass of the module.
    fn forward(&self, graph: &GraphArena, input: &Tensor) -> Result<Tensor, FerrogradError>;

    /// Returns a flat list of all learnable parameters within the module.
    fn parameters(&self) -> Vec<Tensor>;

    /// Human-readable module name.
    fn name(&self) -> &str;

    /// Zeroes the gradient of every parameter in the module.
    fn zero_grad(&self) {
        for param in self.parameters() {
            param.zero_grad();
        }
    }
}
