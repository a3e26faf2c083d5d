//! In-place parameter initialization.

use rand::thread_rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::FerrogradError;
use crate::tensor::Tensor;

/// Fills the tensor with zeros in place.
pub fn zeros_(tensor: &Tensor) -> Result<(), FerrogradError> {
    let mut guard = tensor.write_data();
    guard.data.iter_mut().for_each(|x| *x = 0.0);
    Ok(())
}

/// Fills the tensor in place with Kaiming-normal samples: zero-mean Gaussian
/// scaled by `sqrt(2 / fan_in)`, matched to ReLU networks.
pub fn kaiming_normal_(tensor: &Tensor, fan_in: usize) -> Result<(), FerrogradError> {
    if fan_in == 0 {
        return Err(FerrogradError::ConfigurationError(
            "kaiming_normal_ requires a positive fan_in".to_string(),
        ));
    }
    let std = (2.0 / fan_in as f32).sqrt();
    let mut rng = thread_rng();
    let mut guard = tensor.write_data();
    for x in guard.data.iter_mut() {
        let sample: f32 = StandardNormal.sample(&mut rng);
        *x = sample * std;
    }
    Ok(())
}
