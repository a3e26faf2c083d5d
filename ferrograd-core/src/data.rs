//! Contract between the engine and the tabular-data pipeline.
//!
//! Ingestion, normalization and file handling live outside this crate; the
//! engine only requires something that can hand over a pair of leaf tensors
//! per epoch. `InMemoryBatch` is the minimal implementation, used by tests
//! and by drivers that already hold their data in memory.

use crate::error::FerrogradError;
use crate::tensor::Tensor;

/// Supplies one `(features, targets)` pair per epoch.
///
/// `features` has shape `[N, F]` and tracks gradients so the backward walk
/// can traverse the whole graph; `targets` has shape `[N, T]` and does not.
pub trait RecordBatchSource {
    fn num_features(&self) -> usize;
    fn num_targets(&self) -> usize;

    /// Leaf tensors for the next epoch. Implementations are free to return
    /// the same pair every time (full-batch training) or re-sample.
    fn epoch_batch(&mut self) -> Result<(Tensor, Tensor), FerrogradError>;
}

/// Rejects NaN and infinite values, for drivers that delegate validation of
/// loaded data to the engine.
pub fn validate_finite(tensor: &Tensor, operation: &str) -> Result<(), FerrogradError> {
    let guard = tensor.read_data();
    for (i, value) in guard.data.iter().enumerate() {
        if !value.is_finite() {
            return Err(FerrogradError::InvalidInput {
                operation: operation.to_string(),
                reason: format!("non-finite value {} at flat index {}", value, i),
            });
        }
    }
    Ok(())
}

/// A fixed feature/target pair served for every epoch.
pub struct InMemoryBatch {
    features: Tensor,
    targets: Tensor,
}

impl InMemoryBatch {
    /// Validates the pair once up front: finite values, rank-two shapes, and
    /// matching row counts.
    pub fn new(features: Tensor, targets: Tensor) -> Result<Self, FerrogradError> {
        let f_shape = features.shape();
        let t_shape = targets.shape();
        if f_shape.len() != 2 || t_shape.len() != 2 || f_shape[0] != t_shape[0] {
            return Err(FerrogradError::ShapeMismatch {
                expected: "features [N, F] with targets [N, T]".to_string(),
                actual: format!("features {:?}, targets {:?}", f_shape, t_shape),
                operation: "InMemoryBatch::new".to_string(),
            });
        }
        validate_finite(&features, "InMemoryBatch features")?;
        validate_finite(&targets, "InMemoryBatch targets")?;
        features.requires_grad_(true)?;
        Ok(InMemoryBatch { features, targets })
    }
}

impl RecordBatchSource for InMemoryBatch {
    fn num_features(&self) -> usize {
        self.features.shape()[1]
    }

    fn num_targets(&self) -> usize {
        self.targets.shape()[1]
    }

    fn epoch_batch(&mut self) -> Result<(Tensor, Tensor), FerrogradError> {
        Ok((self.features.clone(), self.targets.clone()))
    }
}
