use ferrograd_core::error::FerrogradError;
use ferrograd_core::tensor::Tensor;

/// Clips gradients of the given parameters in place.
///
/// Each gradient element is clamped to the closed interval
/// `[-clip_value, clip_value]`, preserving sign. Parameters without an
/// allocated gradient buffer are left alone.
pub fn clip_grad_value_(params: &[Tensor], clip_value: f32) -> Result<(), FerrogradError> {
    if clip_value < 0.0 {
        return Err(FerrogradError::ConfigurationError(
            "clip_value must be non-negative".to_string(),
        ));
    }
    for param in params {
        let mut guard = param.write_data();
        if let Some(grad) = guard.grad.as_mut() {
            for g in grad.iter_mut() {
                *g = g.clamp(-clip_value, clip_value);
            }
        }
    }
    Ok(())
}
