use super::*;
use approx::assert_relative_eq;

fn tensor_with_grad(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    let t = Tensor::new(data, shape).unwrap();
    t.requires_grad_(true).unwrap();
    t
}

#[test]
fn test_sub_forward() {
    let graph = GraphArena::new();
    let a = Tensor::new(vec![5.0, 7.0, 9.0], vec![3]).unwrap();
    let b = Tensor::new(vec![1.0, 2.0, 3.0], vec![3]).unwrap();
    let out = sub_op(&graph, &a, &b).unwrap();
    assert_eq!(out.get_data(), vec![4.0, 5.0, 6.0]);
}

#[test]
fn test_sub_forward_broadcast() {
    let graph = GraphArena::new();
    let m = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    let v = Tensor::new(vec![1.0, 1.0], vec![2]).unwrap();
    let out = sub_op(&graph, &m, &v).unwrap();
    assert_eq!(out.get_data(), vec![0.0, 1.0, 2.0, 3.0]);

    let flipped = sub_op(&graph, &v, &m).unwrap();
    assert_eq!(flipped.get_data(), vec![0.0, -1.0, -2.0, -3.0]);
}

#[test]
fn test_sub_rejects_incompatible_shapes() {
    let graph = GraphArena::new();
    let a = Tensor::zeros(vec![3, 2]).unwrap();
    let b = Tensor::zeros(vec![3]).unwrap();
    assert!(matches!(
        sub_op(&graph, &a, &b),
        Err(FerrogradError::BroadcastError { .. })
    ));
}

#[test]
fn test_sub_backward_signs() {
    let graph = GraphArena::new();
    let a = tensor_with_grad(vec![2.0, 4.0], vec![2]);
    let b = tensor_with_grad(vec![1.0, 1.0], vec![2]);
    let diff = sub_op(&graph, &a, &b).unwrap();
    let loss = crate::ops::mean_op(&graph, &diff).unwrap();
    loss.backward().unwrap();
    assert_eq!(a.get_grad().unwrap(), vec![0.5, 0.5]);
    assert_eq!(b.get_grad().unwrap(), vec![-0.5, -0.5]);
}

#[test]
fn test_sub_backward_broadcast_sums_rows() {
    let graph = GraphArena::new();
    let m = tensor_with_grad(vec![1.0; 6], vec![2, 3]);
    let v = tensor_with_grad(vec![0.0; 3], vec![3]);
    let diff = sub_op(&graph, &m, &v).unwrap();
    let loss = crate::ops::mean_op(&graph, &diff).unwrap();
    loss.backward().unwrap();
    for g in v.get_grad().unwrap() {
        assert_relative_eq!(g, -2.0 / 6.0, epsilon = 1e-6);
    }
}

#[test]
fn test_sub_self_is_zero_with_zero_gradients() {
    // mean(x - x) is zero and contributes nothing to x.
    let graph = GraphArena::new();
    let x = tensor_with_grad(vec![1.0, -2.0, 3.0], vec![3]);
    let diff = sub_op(&graph, &x, &x).unwrap();
    let loss = crate::ops::mean_op(&graph, &diff).unwrap();
    assert_relative_eq!(loss.get(&[0]).unwrap(), 0.0);
    loss.backward().unwrap();
    for g in x.get_grad().unwrap() {
        assert_relative_eq!(g, 0.0);
    }
}
