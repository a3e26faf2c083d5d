//! Shape utilities for the element-wise kernels.

use crate::error::FerrogradError;

/// How two operand shapes combine in an element-wise operation.
///
/// The only broadcasting supported is a rank-two tensor combined with a
/// rank-one vector whose length equals the rank-two operand's last dimension.
/// The vector is implicitly replicated along the batch (row) dimension.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ElementwiseBroadcast {
    /// Operand shapes match exactly.
    Same(Vec<usize>),
    /// Lhs is `[rows, cols]`, rhs is `[cols]`.
    RowVecRhs { rows: usize, cols: usize },
    /// Lhs is `[cols]`, rhs is `[rows, cols]`.
    RowVecLhs { rows: usize, cols: usize },
}

impl ElementwiseBroadcast {
    pub(crate) fn output_shape(&self) -> Vec<usize> {
        match self {
            ElementwiseBroadcast::Same(shape) => shape.clone(),
            ElementwiseBroadcast::RowVecRhs { rows, cols }
            | ElementwiseBroadcast::RowVecLhs { rows, cols } => vec![*rows, *cols],
        }
    }
}

/// Resolves the broadcasting plan for two operand shapes, or rejects the
/// combination.
pub(crate) fn elementwise_broadcast(
    lhs: &[usize],
    rhs: &[usize],
) -> Result<ElementwiseBroadcast, FerrogradError> {
    if lhs == rhs {
        return Ok(ElementwiseBroadcast::Same(lhs.to_vec()));
    }
    if lhs.len() == 2 && rhs.len() == 1 && rhs[0] == lhs[1] {
        return Ok(ElementwiseBroadcast::RowVecRhs {
            rows: lhs[0],
            cols: lhs[1],
        });
    }
    if lhs.len() == 1 && rhs.len() == 2 && lhs[0] == rhs[1] {
        return Ok(ElementwiseBroadcast::RowVecLhs {
            rows: rhs[0],
            cols: rhs[1],
        });
    }
    Err(FerrogradError::BroadcastError {
        shape1: lhs.to_vec(),
        shape2: rhs.to_vec(),
    })
}

/// Sums a `[rows, cols]` buffer along the row dimension, yielding `[cols]`.
pub(crate) fn sum_rows(values: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut out = vec![0.0; cols];
    for r in 0..rows {
        for c in 0..cols {
            out[c] += values[r * cols + c];
        }
    }
    out
}

/// Reduces an upstream gradient to the shape of the operand it flows into.
///
/// When the operand was a row-broadcast rank-one vector, its gradient is the
/// sum of the upstream values along the replicated (row) dimension. Otherwise
/// the upstream passes through unchanged.
pub(crate) fn reduce_upstream(
    upstream: &[f32],
    upstream_shape: &[usize],
    operand_shape: &[usize],
) -> Result<Vec<f32>, FerrogradError> {
    if operand_shape == upstream_shape {
        return Ok(upstream.to_vec());
    }
    if operand_shape.len() == 1 && upstream_shape.len() == 2 && upstream_shape[1] == operand_shape[0]
    {
        return Ok(sum_rows(upstream, upstream_shape[0], upstream_shape[1]));
    }
    Err(FerrogradError::GradientAccumulationShapeMismatch {
        expected: operand_shape.to_vec(),
        actual: upstream_shape.to_vec(),
    })
}
