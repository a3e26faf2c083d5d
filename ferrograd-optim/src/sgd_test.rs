use super::*;
use approx::assert_relative_eq;

fn param_with_grad(data: Vec<f32>, grad: Vec<f32>) -> Tensor {
    let len = data.len();
    let param = Tensor::new(data, vec![len]).unwrap();
    param.requires_grad_(true).unwrap();
    param.write_data().grad = Some(grad);
    param
}

#[test]
fn test_sgd_rejects_non_positive_learning_rate() {
    assert!(matches!(
        SGD::new(0.0),
        Err(FerrogradError::ConfigurationError(_))
    ));
    assert_relative_eq!(SGD::new(0.1).unwrap().learning_rate(), 0.1);
}

#[test]
fn test_sgd_basic_step() {
    let param = param_with_grad(vec![1.0, 2.0], vec![0.5, -0.5]);
    let mut optimizer = SGD::new(0.1).unwrap();
    optimizer.step(std::slice::from_ref(&param)).unwrap();
    let data = param.get_data();
    assert_relative_eq!(data[0], 0.95, epsilon = 1e-6);
    assert_relative_eq!(data[1], 2.05, epsilon = 1e-6);
    // The gradient buffer is left for the caller to zero.
    assert_eq!(param.get_grad().unwrap(), vec![0.5, -0.5]);
}

#[test]
fn test_sgd_skips_param_without_grad() {
    let param = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    param.requires_grad_(true).unwrap();
    let mut optimizer = SGD::new(0.1).unwrap();
    optimizer.step(std::slice::from_ref(&param)).unwrap();
    assert_eq!(param.get_data(), vec![1.0, 2.0]);
}

#[test]
fn test_sgd_skips_untracked_param() {
    let param = Tensor::new(vec![1.0], vec![1]).unwrap();
    param.write_data().grad = Some(vec![1.0]);
    let mut optimizer = SGD::new(0.1).unwrap();
    optimizer.step(std::slice::from_ref(&param)).unwrap();
    assert_eq!(param.get_data(), vec![1.0]);
}

#[test]
fn test_sgd_skips_mismatched_grad_buffer() {
    let param = Tensor::new(vec![1.0, 2.0], vec![2]).unwrap();
    param.requires_grad_(true).unwrap();
    param.write_data().grad = Some(vec![1.0]); // wrong length, injected by hand
    let mut optimizer = SGD::new(0.1).unwrap();
    optimizer.step(std::slice::from_ref(&param)).unwrap();
    assert_eq!(param.get_data(), vec![1.0, 2.0]);
}

#[test]
fn test_optimizer_zero_grad_helper() {
    let param = param_with_grad(vec![1.0, 2.0], vec![0.5, -0.5]);
    let optimizer = SGD::new(0.1).unwrap();
    optimizer.zero_grad(std::slice::from_ref(&param));
    assert_eq!(param.get_grad().unwrap(), vec![0.0, 0.0]);
}
