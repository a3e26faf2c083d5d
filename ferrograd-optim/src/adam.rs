// ferrograd-optim/src/adam.rs

use ferrograd_core::error::FerrogradError;
use ferrograd_core::tensor::Tensor;
use ferrograd_core::tensor_data::TensorData;

use crate::grad_clipping::clip_grad_value_;
use crate::Optimizer;

/// Adaptive moment estimation.
///
/// Maintains per-parameter exponential moving averages of gradients (`m`)
/// and squared gradients (`v`), bias-corrected by the timestep. State is
/// allocated lazily on the first step, indexed by the parameter's position
/// in the list, so the caller must pass the same parameter list every
/// iteration.
///
/// Gradients are clipped element-wise to `[-1, 1]` before the moment update.
/// This bounds the update magnitude during the first epochs, when raw
/// gradients on unnormalized targets can be large.
#[derive(Debug)]
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    t: u64,
    m: Vec<Vec<f32>>,
    v: Vec<Vec<f32>>,
}

/// Magnitude bound applied to every gradient element before the update.
const GRAD_CLIP: f32 = 1.0;

impl Adam {
    /// Creates an Adam optimizer with the standard defaults:
    /// beta1 = 0.9, beta2 = 0.999, eps = 1e-8.
    pub fn new(lr: f32) -> Result<Self, FerrogradError> {
        Adam::with_hyperparams(lr, 0.9, 0.999, 1e-8)
    }

    pub fn with_hyperparams(
        lr: f32,
        beta1: f32,
        beta2: f32,
        eps: f32,
    ) -> Result<Self, FerrogradError> {
        if lr <= 0.0 {
            return Err(FerrogradError::ConfigurationError(
                "Learning rate must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&beta1) {
            return Err(FerrogradError::ConfigurationError(
                "Beta1 must be in [0, 1)".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&beta2) {
            return Err(FerrogradError::ConfigurationError(
                "Beta2 must be in [0, 1)".to_string(),
            ));
        }
        if eps <= 0.0 {
            return Err(FerrogradError::ConfigurationError(
                "Epsilon must be positive".to_string(),
            ));
        }
        Ok(Adam {
            lr,
            beta1,
            beta2,
            eps,
            t: 0,
            m: Vec::new(),
            v: Vec::new(),
        })
    }

    /// Timestep of the last completed step; zero before the first.
    pub fn timestep(&self) -> u64 {
        self.t
    }

    /// Clears both moment buffers and resets the timestep, as if freshly
    /// constructed.
    pub fn zero_state(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn initialize_state(&mut self, params: &[Tensor]) {
        self.m = params.iter().map(|p| vec![0.0; p.numel()]).collect();
        self.v = params.iter().map(|p| vec![0.0; p.numel()]).collect();
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &[Tensor]) -> Result<(), FerrogradError> {
        if self.m.is_empty() {
            self.initialize_state(params);
        }

        clip_grad_value_(params, GRAD_CLIP)?;
        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);

        for (idx, param) in params.iter().enumerate() {
            let Some((m, v)) = self.m.get_mut(idx).zip(self.v.get_mut(idx)) else {
                log::warn!(
                    "adam: no state for parameter {}, skipping (parameter list changed after the first step?)",
                    idx
                );
                continue;
            };

            let mut guard = param.write_data();
            if !guard.requires_grad {
                continue;
            }
            let TensorData { data, grad, .. } = &mut *guard;
            let Some(grad) = grad.as_ref() else {
                continue;
            };
            if grad.len() != data.len() || m.len() != data.len() {
                log::warn!(
                    "adam: buffer size mismatch for parameter {} (data {}, grad {}, state {}), skipping",
                    idx,
                    data.len(),
                    grad.len(),
                    m.len()
                );
                continue;
            }

            for j in 0..data.len() {
                let g = grad[j];
                m[j] = self.beta1 * m[j] + (1.0 - self.beta1) * g;
                v[j] = self.beta2 * v[j] + (1.0 - self.beta2) * g * g;
                let m_hat = m[j] / bias_correction1;
                let v_hat = v[j] / bias_correction2;
                data[j] -= self.lr * m_hat / (v_hat.sqrt() + self.eps);
            }
        }
        Ok(())
    }
}

// --- Tests ---
#[cfg(test)]
#[path = "adam_test.rs"]
mod tests;
