use super::*;
use crate::autograd::grad_check::check_grad;
use crate::ops::mean_op;
use approx::assert_relative_eq;

fn tensor_with_grad(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    let t = Tensor::new(data, shape).unwrap();
    t.requires_grad_(true).unwrap();
    t
}

#[test]
fn test_mul_forward() {
    let graph = GraphArena::new();
    let a = Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
    let b = Tensor::new(vec![4.0, 5.0, 6.0], vec![3]).unwrap();
    let out = mul_op(&graph, &a, &b).unwrap();
    assert_eq!(out.get_data(), vec![4.0, 10.0, 18.0]);
}

#[test]
fn test_mul_forward_row_vector_broadcast() {
    let graph = GraphArena::new();
    let m = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    let v = Tensor::new(vec![10.0, 100.0], vec![2]).unwrap();
    let out = mul_op(&graph, &m, &v).unwrap();
    assert_eq!(out.get_data(), vec![10.0, 200.0, 30.0, 400.0]);
}

#[test]
fn test_mul_backward_swaps_operands() {
    let graph = GraphArena::new();
    let a = tensor_with_grad(vec![2.0, 3.0], vec![2]);
    let b = tensor_with_grad(vec![5.0, 7.0], vec![2]);
    let prod = mul_op(&graph, &a, &b).unwrap();
    let loss = mean_op(&graph, &prod).unwrap();
    loss.backward().unwrap();
    // dL/da = b / 2, dL/db = a / 2.
    assert_eq!(a.get_grad().unwrap(), vec![2.5, 3.5]);
    assert_eq!(b.get_grad().unwrap(), vec![1.0, 1.5]);
}

#[test]
fn test_mul_backward_broadcast_vector_grad_sums_rows() {
    let graph = GraphArena::new();
    let m = tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let v = tensor_with_grad(vec![10.0, 100.0], vec![2]);
    let prod = mul_op(&graph, &m, &v).unwrap();
    let loss = mean_op(&graph, &prod).unwrap();
    loss.backward().unwrap();
    // Upstream into the product is 1/4. The vector gradient sums the matrix
    // column entries: [(1 + 3) / 4, (2 + 4) / 4].
    let v_grad = v.get_grad().unwrap();
    assert_relative_eq!(v_grad[0], 1.0, epsilon = 1e-6);
    assert_relative_eq!(v_grad[1], 1.5, epsilon = 1e-6);
    // The matrix gradient replicates the vector scaled by 1/4.
    let m_grad = m.get_grad().unwrap();
    assert_relative_eq!(m_grad[0], 2.5, epsilon = 1e-6);
    assert_relative_eq!(m_grad[1], 25.0, epsilon = 1e-6);
    assert_relative_eq!(m_grad[2], 2.5, epsilon = 1e-6);
    assert_relative_eq!(m_grad[3], 25.0, epsilon = 1e-6);
}

#[test]
fn test_mul_skips_gradient_for_untracked_operand() {
    let graph = GraphArena::new();
    let a = tensor_with_grad(vec![2.0, 3.0], vec![2]);
    let b = Tensor::new(vec![5.0, 7.0], vec![2]).unwrap();
    let prod = mul_op(&graph, &a, &b).unwrap();
    let loss = mean_op(&graph, &prod).unwrap();
    loss.backward().unwrap();
    assert!(a.get_grad().is_some());
    assert!(b.get_grad().is_none());
}

#[test]
fn test_mul_gradient_against_central_differences() {
    let a = tensor_with_grad(vec![0.5, -1.25, 2.0], vec![3]);
    let b = tensor_with_grad(vec![1.5, 0.75, -0.5], vec![3]);
    let a_in = a.clone();
    let b_in = b.clone();
    check_grad(
        move |graph| {
            let prod = mul_op(graph, &a_in, &b_in)?;
            mean_op(graph, &prod)
        },
        &[a, b],
        1e-2,
        1e-2,
    )
    .unwrap();
}
