//! Optimizers for ferrograd models.
//!
//! Both optimizers are driven per iteration by the caller and receive the
//! flat parameter list on every call. They mutate parameter data in place
//! using the accumulated gradients and never zero gradients themselves; that
//! is the caller's (or the module tree's) job before the next forward pass.

use ferrograd_core::error::FerrogradError;
use ferrograd_core::tensor::Tensor;

pub mod adam;
pub mod grad_clipping;
pub mod sgd;

pub use adam::Adam;
pub use grad_clipping::clip_grad_value_;
pub use sgd::SGD;

/// Trait for optimization algorithms.
pub trait Optimizer {
    /// Performs a single optimization step over the given parameters.
    fn step(&mut self, params: &[Tensor]) -> Result<(), FerrogradError>;

    /// Zeroes the gradient buffer of every parameter.
    fn zero_grad(&self, params: &[Tensor]) {
        for param in params {
            param.zero_grad();
        }
    }
}
