use std::fmt::Debug;
use std::sync::{RwLock, Weak};

use crate::error::FerrogradError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Non-owning reference to a tensor's shared node, as stored inside
/// operation records.
///
/// Operation nodes never own their inputs: intermediates are owned by the
/// [`GraphArena`](crate::graph::GraphArena) and parameters by their modules.
/// An expired `NodeRef` during backward means the owner released the tensor
/// early; the affected branch is skipped rather than aborting the walk.
pub type NodeRef = Weak<RwLock<TensorData>>;

/// Interface for the backward step of a differentiable tensor operation.
///
/// Every operation that produces a gradient-tracked tensor registers one
/// implementation of this trait with the arena and links the output tensor to
/// it. During the backward pass the implementation receives the upstream
/// gradient (dL/dOutput) and must produce the local gradient for each of its
/// inputs by applying the chain rule.
///
/// `Debug + Send + Sync` bounds are required because the `Arc<dyn BackwardOp>`
/// holding the node may be shared and inspected across threads.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes dL/dInput for every input, given `upstream` = dL/dOutput.
    ///
    /// Returns one entry per input, in the same order as [`inputs`]. An entry
    /// is `None` when no gradient flows into that input: either the input did
    /// not require gradients during forward, or an operand needed for the
    /// computation has expired (which is logged by the implementation).
    ///
    /// [`inputs`]: BackwardOp::inputs
    fn backward(&self, upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError>;

    /// The tensors that fed the forward operation, as non-owning references,
    /// in the same order as the gradients returned by [`backward`].
    ///
    /// [`backward`]: BackwardOp::backward
    fn inputs(&self) -> Vec<NodeRef>;
}
