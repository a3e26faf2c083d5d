use thiserror::Error;

/// Custom error type for the ferrograd framework.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq/Clone for easier testing
pub enum FerrogradError {
    #[error("Shape mismatch: expected {expected}, got {actual}, operation: {operation}")]
    ShapeMismatch {
        expected: String,
        actual: String,
        operation: String,
    },

    #[error("Cannot broadcast shapes: {shape1:?} and {shape2:?}")]
    BroadcastError {
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Division by zero error")]
    DivisionByZero,

    #[error("Backward called on non-scalar tensor with shape {shape:?}")]
    BackwardNonScalar { shape: Vec<usize> },

    #[error("Operation requires tensor to require grad, but it doesn't.")]
    RequiresGradNotMet,

    #[error("Cannot change requires_grad on a non-leaf tensor. Use detach() to obtain a leaf.")]
    RequiresGradOnNonLeaf,

    #[error("Shape mismatch during gradient accumulation: expected {expected:?}, got {actual:?}")]
    GradientAccumulationShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Cycle detected in the computation graph during backward pass.")]
    CycleDetected,

    #[error("Expired graph reference during {operation}. The arena holding the intermediates was likely cleared too early.")]
    ExpiredReference { operation: String },

    #[error("Invalid input for {operation}: {reason}")]
    InvalidInput { operation: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Gradient check failed: {0}")]
    GradCheckError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}
