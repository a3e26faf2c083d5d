// src/tensor_data.rs
use std::sync::Weak;

use crate::autograd::BackwardOp;
use crate::error::FerrogradError;

/// Internal storage and metadata for a [`Tensor`](crate::tensor::Tensor).
///
/// Holds the dense row-major buffer, the shape, and the autograd metadata.
/// It is wrapped in `Arc<RwLock<TensorData>>` by the `Tensor` struct to allow
/// shared ownership and interior mutability.
///
/// The `grad_fn` back-link to the creating operation is a `Weak` reference:
/// operation nodes are owned exclusively by the [`GraphArena`](crate::graph::GraphArena),
/// so once the arena is cleared the link expires and the tensor behaves as a
/// leaf. This keeps the tensor/operation relationship acyclic under shared
/// ownership.
#[derive(Debug)]
pub struct TensorData {
    /// Flat row-major storage. `data.len()` equals the product of `shape`.
    pub data: Vec<f32>,
    /// The shape (dimensions) of the tensor.
    pub shape: Vec<usize>,

    // --- Autograd metadata ---
    /// Flag indicating if the tensor participates in gradient accumulation.
    pub requires_grad: bool,
    /// Gradient buffer parallel to `data`. Allocated lazily on first write;
    /// `None` means the gradient is implicitly zero.
    pub grad: Option<Vec<f32>>,
    /// Non-owning back-link to the operation node that produced this tensor,
    /// or `None` for leaves (inputs, parameters, constants).
    pub grad_fn: Option<Weak<dyn BackwardOp + Send + Sync>>,
}

impl TensorData {
    /// Creates a new leaf `TensorData`, verifying that the buffer length
    /// matches the shape product.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, FerrogradError> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(FerrogradError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        Ok(TensorData {
            data,
            shape,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// True when the tensor has no creating operation (or the creator has
    /// already been released by the arena).
    pub fn is_leaf(&self) -> bool {
        match &self.grad_fn {
            Some(weak) => weak.upgrade().is_none(),
            None => true,
        }
    }

    /// Computes the flat row-major offset for multi-dimensional indices,
    /// checking rank and bounds.
    pub fn offset_of(&self, indices: &[usize]) -> Result<usize, FerrogradError> {
        if indices.len() != self.shape.len() {
            return Err(FerrogradError::IndexOutOfBounds {
                index: indices.to_vec(),
                shape: self.shape.clone(),
            });
        }
        let mut offset = 0;
        let mut stride = 1;
        for dim in (0..self.shape.len()).rev() {
            if indices[dim] >= self.shape[dim] {
                return Err(FerrogradError::IndexOutOfBounds {
                    index: indices.to_vec(),
                    shape: self.shape.clone(),
                });
            }
            offset += indices[dim] * stride;
            stride *= self.shape[dim];
        }
        Ok(offset)
    }

    /// Adds a gradient contribution into the buffer, allocating it zeroed on
    /// first write. Contributions always accumulate; existing values are
    /// never overwritten.
    pub(crate) fn accumulate_grad(
        &mut self,
        contribution: &[f32],
        contribution_shape: &[usize],
    ) -> Result<(), FerrogradError> {
        if contribution_shape != self.shape.as_slice() {
            return Err(FerrogradError::GradientAccumulationShapeMismatch {
                expected: self.shape.clone(),
                actual: contribution_shape.to_vec(),
            });
        }
        let grad = self.grad.get_or_insert_with(|| vec![0.0; self.data.len()]);
        for (g, c) in grad.iter_mut().zip(contribution) {
            *g += c;
        }
        Ok(())
    }
}
