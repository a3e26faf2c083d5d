use super::*;
use approx::assert_relative_eq;

#[test]
fn test_mean_forward_reduces_to_scalar_shape() {
    let graph = GraphArena::new();
    let x = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
    let m = mean_op(&graph, &x).unwrap();
    assert_eq!(m.shape(), vec![1]);
    assert_relative_eq!(m.get(&[0]).unwrap(), 3.5);
}

#[test]
fn test_mean_of_scalar_is_identity() {
    let graph = GraphArena::new();
    let x = Tensor::scalar(7.0);
    let m = mean_op(&graph, &x).unwrap();
    assert_relative_eq!(m.get(&[0]).unwrap(), 7.0);
}

#[test]
fn test_mean_backward_spreads_uniformly() {
    let graph = GraphArena::new();
    let x = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
    x.requires_grad_(true).unwrap();
    let m = mean_op(&graph, &x).unwrap();
    m.backward().unwrap();
    for g in x.get_grad().unwrap() {
        assert_relative_eq!(g, 0.25, epsilon = 1e-6);
    }
}

#[test]
fn test_mean_backward_accumulates_over_repeated_passes() {
    let graph = GraphArena::new();
    let x = Tensor::new(vec![2.0, 4.0], vec![2]).unwrap();
    x.requires_grad_(true).unwrap();
    let m1 = mean_op(&graph, &x).unwrap();
    m1.backward().unwrap();
    let m2 = mean_op(&graph, &x).unwrap();
    m2.backward().unwrap();
    // Two backward passes without zero_grad in between sum their
    // contributions.
    for g in x.get_grad().unwrap() {
        assert_relative_eq!(g, 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_mean_untracked_input_registers_nothing() {
    let graph = GraphArena::new();
    let x = Tensor::ones(vec![4]).unwrap();
    let m = mean_op(&graph, &x).unwrap();
    assert!(!m.requires_grad());
    assert!(m.grad_fn().is_none());
    assert!(graph.is_empty());
}
