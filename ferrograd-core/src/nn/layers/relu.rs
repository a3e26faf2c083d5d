use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::nn::module::Module;
use crate::ops::activation::relu_op;
use crate::tensor::Tensor;

/// Parameter-less rectified linear unit layer.
#[derive(Debug, Default)]
pub struct ReLU;

impl ReLU {
    pub fn new() -> Self {
        ReLU
    }
}

impl Module for ReLU {
    fn forward(&self, graph: &GraphArena, input: &Tensor) -> Result<Tensor, FerrogradError> {
        relu_op(graph, input)
    }

    fn parameters(&self) -> Vec<Tensor> {
        vec![]
    }

    fn name(&self) -> &str {
        "ReLU"
    }
}
