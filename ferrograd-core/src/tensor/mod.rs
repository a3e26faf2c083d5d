// src/tensor/mod.rs
use std::fmt::{self, Debug};
// Use Arc and RwLock for thread-safe sharing and interior mutability
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::FerrogradError;
use crate::tensor_data::TensorData;

pub mod utils;

mod autograd;

/// A dense, row-major array of `f32` values.
///
/// Uses `Arc<RwLock<TensorData>>` for shared ownership and interior
/// mutability. Cloning a `Tensor` is cheap and yields a handle to the same
/// underlying storage; the computation graph, module parameter lists and the
/// [`GraphArena`](crate::graph::GraphArena) all hold such handles.
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    // --- Constructors and basic properties ---

    /// Creates a new leaf tensor from a vector of data and a shape.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, FerrogradError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Creates a tensor of zeros with the specified shape.
    pub fn zeros(shape: Vec<usize>) -> Result<Self, FerrogradError> {
        let numel = shape.iter().product::<usize>();
        Tensor::new(vec![0.0; numel], shape)
    }

    /// Creates a tensor of zeros with the same shape as another tensor.
    pub fn zeros_like(other: &Tensor) -> Result<Self, FerrogradError> {
        Tensor::zeros(other.shape())
    }

    /// Creates a tensor of ones with the specified shape.
    pub fn ones(shape: Vec<usize>) -> Result<Self, FerrogradError> {
        let numel = shape.iter().product::<usize>();
        Tensor::new(vec![1.0; numel], shape)
    }

    /// Creates a tensor filled with a specific value.
    pub fn full(shape: Vec<usize>, fill_value: f32) -> Result<Self, FerrogradError> {
        let numel = shape.iter().product::<usize>();
        Tensor::new(vec![fill_value; numel], shape)
    }

    /// Creates a single-element tensor of shape `[1]`.
    pub fn scalar(value: f32) -> Self {
        Tensor::new(vec![value], vec![1]).expect("scalar creation cannot fail")
    }

    /// Returns the shape of the tensor. Acquires a read lock.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns the number of dimensions (rank) of the tensor.
    pub fn ndim(&self) -> usize {
        self.read_data().shape.len()
    }

    /// Returns the total number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Returns a copy of the flat row-major data buffer.
    pub fn get_data(&self) -> Vec<f32> {
        self.read_data().data.clone()
    }

    /// Returns a copy of the gradient buffer, if one has been allocated.
    /// `None` means the gradient is implicitly zero.
    pub fn get_grad(&self) -> Option<Vec<f32>> {
        self.read_data().grad.clone()
    }

    /// Retrieves a single element using multi-dimensional indices.
    pub fn get(&self, indices: &[usize]) -> Result<f32, FerrogradError> {
        let guard = self.read_data();
        let offset = guard.offset_of(indices)?;
        Ok(guard.data[offset])
    }

    /// Writes a single element at the given multi-dimensional indices.
    ///
    /// Only meaningful on leaf tensors owned by the caller; the engine never
    /// mutates an input in place.
    pub fn set(&self, indices: &[usize], value: f32) -> Result<(), FerrogradError> {
        let mut guard = self.write_data();
        let offset = guard.offset_of(indices)?;
        guard.data[offset] = value;
        Ok(())
    }

    // --- Accessing internal data ---

    /// Provides immutable access (read guard) to the underlying `TensorData`.
    /// Panics if the lock is poisoned.
    pub fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Provides mutable access (write guard) to the underlying `TensorData`.
    /// Panics if the lock is poisoned.
    pub fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().expect("RwLock poisoned")
    }

    /// Returns a type-erased pointer to the shared allocation, usable as a
    /// stable identity for graph bookkeeping.
    pub fn id(&self) -> *const () {
        Arc::as_ptr(&self.data) as *const ()
    }
}

// --- Trait implementations ---

impl Clone for Tensor {
    /// Clones the handle, not the storage. The new `Tensor` shares the same
    /// underlying data via the `Arc`.
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        let head: Vec<f32> = guard.data.iter().take(8).copied().collect();
        let ellipsis = if guard.data.len() > 8 { ", ..." } else { "" };
        write!(
            f,
            "Tensor(shape={:?}, requires_grad={}, data={:?}{})",
            guard.shape, guard.requires_grad, head, ellipsis
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_checks_length() {
        let result = Tensor::new(vec![1.0, 2.0, 3.0], vec![2, 2]);
        assert!(matches!(
            result,
            Err(FerrogradError::TensorCreationError { data_len: 3, .. })
        ));
    }

    #[test]
    fn test_numel_and_shape() {
        let t = Tensor::zeros(vec![2, 3, 4]).unwrap();
        assert_eq!(t.numel(), 24);
        assert_eq!(t.shape(), vec![2, 3, 4]);
        assert_eq!(t.ndim(), 3);
    }

    #[test]
    fn test_get_set_roundtrip() {
        let t = Tensor::zeros(vec![2, 3]).unwrap();
        t.set(&[1, 2], 7.5).unwrap();
        assert_relative_eq!(t.get(&[1, 2]).unwrap(), 7.5);
        assert_relative_eq!(t.get(&[0, 0]).unwrap(), 0.0);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let t = Tensor::zeros(vec![2, 3]).unwrap();
        assert!(matches!(
            t.get(&[2, 0]),
            Err(FerrogradError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            t.get(&[0]),
            Err(FerrogradError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_clone_shares_storage() {
        let t = Tensor::zeros(vec![2]).unwrap();
        let u = t.clone();
        t.set(&[0], 3.0).unwrap();
        assert_relative_eq!(u.get(&[0]).unwrap(), 3.0);
        assert_eq!(t.id(), u.id());
    }

    #[test]
    fn test_full_and_zeros_like() {
        let t = Tensor::full(vec![2, 2], 3.0).unwrap();
        assert_eq!(t.get_data(), vec![3.0; 4]);
        let z = Tensor::zeros_like(&t).unwrap();
        assert_eq!(z.shape(), vec![2, 2]);
        assert_eq!(z.get_data(), vec![0.0; 4]);
    }

    #[test]
    fn test_scalar_shape() {
        let s = Tensor::scalar(2.5);
        assert_eq!(s.shape(), vec![1]);
        assert_relative_eq!(s.get(&[0]).unwrap(), 2.5);
    }
}
