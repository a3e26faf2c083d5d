//! Operation kernels.
//!
//! Each kernel is a free function taking the arena plus its operands,
//! producing a fresh output tensor. When any input requires gradients the
//! kernel builds a backward node, links the output to it, and registers both
//! with the arena; otherwise the output is a plain leaf and nothing is
//! recorded. Kernels never mutate their inputs, so a failed kernel leaves no
//! partial state behind.

pub mod activation;
pub mod arithmetic;
pub mod linalg;
pub mod reduction;

pub use activation::{relu_op, sigmoid_op, tanh_op};
pub use arithmetic::{add_op, div_scalar_op, mul_op, pow_op, sub_op};
pub use linalg::matmul_op;
pub use reduction::mean_op;

use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::tensor::Tensor;

/// Autograd linkage shared by every kernel: mark the freshly built result as
/// gradient-tracked, point it at its backward node, and hand both to the
/// arena, which owns them until the next clear.
pub(crate) fn register_grad_fn(
    graph: &GraphArena,
    result: &Tensor,
    op: Arc<dyn BackwardOp + Send + Sync>,
) -> Result<(), FerrogradError> {
    result.requires_grad_(true)?;
    result.set_grad_fn(&op)?;
    graph.add_op(op);
    graph.add_tensor(result);
    Ok(())
}
