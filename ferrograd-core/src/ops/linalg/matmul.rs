use std::sync::Arc;

use crate::autograd::backward_op::{BackwardOp, NodeRef};
use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::ops::register_grad_fn;
use crate::tensor::Tensor;

// --- MatmulBackward definition ---

/// Backward node for 2-D matrix multiplication.
///
/// For `out = a @ b` with `a: [m, k]` and `b: [k, n]`:
/// grad_a = upstream @ b^T and grad_b = a^T @ upstream. Both sides need the
/// other operand's data back, held through non-owning references.
#[derive(Debug)]
struct MatmulBackward {
    lhs: NodeRef,
    rhs: NodeRef,
    lhs_requires_grad: bool,
    rhs_requires_grad: bool,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self, upstream: &Tensor) -> Result<Vec<Option<Tensor>>, FerrogradError> {
        let up_shape = upstream.shape();
        let up = upstream.get_data();
        let (m, n) = (up_shape[0], up_shape[1]);

        let lhs_node = self.lhs.upgrade();
        let rhs_node = self.rhs.upgrade();

        // grad_a[i, j] = sum_l upstream[i, l] * b[j, l]
        let grad_lhs = if self.lhs_requires_grad {
            match &rhs_node {
                Some(rhs) => {
                    let rhs_guard = rhs.read().map_err(|_| {
                        FerrogradError::InternalError(
                            "tensor lock poisoned in matmul backward".to_string(),
                        )
                    })?;
                    let k = rhs_guard.shape[0];
                    let mut grad = vec![0.0; m * k];
                    for i in 0..m {
                        for j in 0..k {
                            let mut acc = 0.0;
                            for l in 0..n {
                                acc += up[i * n + l] * rhs_guard.data[j * n + l];
                            }
                            grad[i * k + j] = acc;
                        }
                    }
                    Some(Tensor::new(grad, vec![m, k])?)
                }
                None => {
                    log::warn!("matmul backward: rhs operand expired, skipping lhs gradient");
                    None
                }
            }
        } else {
            None
        };

        // grad_b[i, j] = sum_l a[l, i] * upstream[l, j]
        let grad_rhs = if self.rhs_requires_grad {
            match &lhs_node {
                Some(lhs) => {
                    let lhs_guard = lhs.read().map_err(|_| {
                        FerrogradError::InternalError(
                            "tensor lock poisoned in matmul backward".to_string(),
                        )
                    })?;
                    let k = lhs_guard.shape[1];
                    let mut grad = vec![0.0; k * n];
                    for i in 0..k {
                        for j in 0..n {
                            let mut acc = 0.0;
                            for l in 0..m {
                                acc += lhs_guard.data[l * k + i] * up[l * n + j];
                            }
                            grad[i * n + j] = acc;
                        }
                    }
                    Some(Tensor::new(grad, vec![k, n])?)
                }
                None => {
                    log::warn!("matmul backward: lhs operand expired, skipping rhs gradient");
                    None
                }
            }
        } else {
            None
        };

        Ok(vec![grad_lhs, grad_rhs])
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.lhs.clone(), self.rhs.clone()]
    }
}

// --- matmul_op implementation ---

/// 2-D matrix multiplication `a @ b`.
///
/// Both inputs must be rank two with matching inner dimensions; the
/// contraction is the plain triple loop.
pub fn matmul_op(graph: &GraphArena, a: &Tensor, b: &Tensor) -> Result<Tensor, FerrogradError> {
    let a_requires_grad = a.requires_grad();
    let b_requires_grad = b.requires_grad();
    let requires_grad = a_requires_grad || b_requires_grad;

    let a_guard = a.read_data();
    let b_guard = b.read_data();

    if a_guard.shape.len() != 2 || b_guard.shape.len() != 2 {
        let offender = if a_guard.shape.len() != 2 {
            a_guard.shape.clone()
        } else {
            b_guard.shape.clone()
        };
        return Err(FerrogradError::ShapeMismatch {
            expected: "rank-2 operands".to_string(),
            actual: format!("{:?}", offender),
            operation: "matmul".to_string(),
        });
    }
    let m = a_guard.shape[0];
    let k1 = a_guard.shape[1];
    let k2 = b_guard.shape[0];
    let n = b_guard.shape[1];
    if k1 != k2 {
        return Err(FerrogradError::ShapeMismatch {
            expected: format!("inner dimensions to match ({} vs {})", k1, k2),
            actual: format!("{:?} @ {:?}", a_guard.shape, b_guard.shape),
            operation: "matmul".to_string(),
        });
    }

    let mut out_data = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            let mut acc = 0.0;
            for l in 0..k1 {
                acc += a_guard.data[i * k1 + l] * b_guard.data[l * n + j];
            }
            out_data[i * n + j] = acc;
        }
    }
    drop(a_guard);
    drop(b_guard);

    let result = Tensor::new(out_data, vec![m, n])?;

    if requires_grad {
        let backward_context = MatmulBackward {
            lhs: a.node_ref(),
            rhs: b.node_ref(),
            lhs_requires_grad: a_requires_grad,
            rhs_requires_grad: b_requires_grad,
        };
        register_grad_fn(graph, &result, Arc::new(backward_context))?;
    }

    Ok(result)
}
