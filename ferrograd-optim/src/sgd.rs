// ferrograd-optim/src/sgd.rs

use ferrograd_core::error::FerrogradError;
use ferrograd_core::tensor::Tensor;
use ferrograd_core::tensor_data::TensorData;

use crate::Optimizer;

/// Plain gradient descent: `data -= lr * grad`.
///
/// Parameters that do not require gradients, or whose gradient buffer was
/// never allocated, are skipped.
#[derive(Debug)]
pub struct SGD {
    lr: f32,
}

impl SGD {
    pub fn new(lr: f32) -> Result<Self, FerrogradError> {
        if lr <= 0.0 {
            return Err(FerrogradError::ConfigurationError(format!(
                "Invalid learning rate: {}",
                lr
            )));
        }
        Ok(SGD { lr })
    }

    pub fn learning_rate(&self) -> f32 {
        self.lr
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &[Tensor]) -> Result<(), FerrogradError> {
        for (idx, param) in params.iter().enumerate() {
            let mut guard = param.write_data();
            if !guard.requires_grad {
                continue;
            }
            let TensorData { data, grad, .. } = &mut *guard;
            let Some(grad) = grad.as_ref() else {
                continue;
            };
            if grad.len() != data.len() {
                log::warn!(
                    "sgd: gradient length {} does not match data length {} for parameter {}, skipping",
                    grad.len(),
                    data.len(),
                    idx
                );
                continue;
            }
            for (value, g) in data.iter_mut().zip(grad) {
                *value -= self.lr * g;
            }
        }
        Ok(())
    }
}

// --- Tests ---
#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
