use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::nn::module::Module;
use crate::ops::activation::tanh_op;
use crate::tensor::Tensor;

/// Parameter-less hyperbolic tangent layer.
#[derive(Debug, Default)]
pub struct Tanh;

impl Tanh {
    pub fn new() -> Self {
        Tanh
    }
}

impl Module for Tanh {
    fn forward(&self, graph: &GraphArena, input: &Tensor) -> Result<Tensor, FerrogradError> {
        tanh_op(graph, input)
    }

    fn parameters(&self) -> Vec<Tensor> {
        vec![]
    }

    fn name(&self) -> &str {
        "Tanh"
    }
}
