//! Numerical gradient checking via central differences.
//!
//! Test tooling: rebuilds the forward graph through a caller-supplied closure
//! and compares analytic gradients against `(f(x+h) - f(x-h)) / 2h` for every
//! element of every checked parameter.

use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::tensor::Tensor;

/// Verifies the analytic gradients of a scalar-valued computation.
///
/// `build_loss` must construct the full forward graph in the given arena and
/// return the scalar loss tensor; it is invoked repeatedly, once for the
/// analytic pass and twice per checked element for the numeric estimate.
/// `params` are the leaf tensors to perturb; each must require gradients and
/// appear in the graph `build_loss` builds.
///
/// Comparison uses a relative tolerance with the denominator floored at one,
/// so tiny gradients are compared absolutely.
pub fn check_grad<F>(
    build_loss: F,
    params: &[Tensor],
    h: f32,
    tolerance: f32,
) -> Result<(), FerrogradError>
where
    F: Fn(&GraphArena) -> Result<Tensor, FerrogradError>,
{
    // Analytic pass.
    let arena = GraphArena::new();
    for param in params {
        param.zero_grad();
    }
    let loss = build_loss(&arena)?;
    if loss.numel() != 1 {
        return Err(FerrogradError::GradCheckError(format!(
            "loss must be scalar, got shape {:?}",
            loss.shape()
        )));
    }
    loss.backward()?;
    let analytic: Vec<Vec<f32>> = params
        .iter()
        .map(|p| p.get_grad().unwrap_or_else(|| vec![0.0; p.numel()]))
        .collect();
    arena.clear();

    // Numeric passes, one element at a time.
    for (param_idx, param) in params.iter().enumerate() {
        for i in 0..param.numel() {
            let original = param.read_data().data[i];

            param.write_data().data[i] = original + h;
            let loss_plus = eval_scalar(&build_loss)?;
            param.write_data().data[i] = original - h;
            let loss_minus = eval_scalar(&build_loss)?;
            param.write_data().data[i] = original;

            let numeric = (loss_plus - loss_minus) / (2.0 * h);
            let a = analytic[param_idx][i];
            let denom = a.abs().max(numeric.abs()).max(1.0);
            if ((a - numeric) / denom).abs() > tolerance {
                return Err(FerrogradError::GradCheckError(format!(
                    "parameter {} element {}: analytic {} vs numeric {}",
                    param_idx, i, a, numeric
                )));
            }
        }
    }
    Ok(())
}

fn eval_scalar<F>(build_loss: &F) -> Result<f32, FerrogradError>
where
    F: Fn(&GraphArena) -> Result<Tensor, FerrogradError>,
{
    let arena = GraphArena::new();
    let loss = build_loss(&arena)?;
    let value = loss.get(&[0])?;
    arena.clear();
    Ok(value)
}
