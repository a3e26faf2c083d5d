use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::nn::module::Module;
use crate::ops::activation::sigmoid_op;
use crate::tensor::Tensor;

/// Parameter-less logistic sigmoid layer.
#[derive(Debug, Default)]
pub struct Sigmoid;

impl Sigmoid {
    pub fn new() -> Self {
        Sigmoid
    }
}

impl Module for Sigmoid {
    fn forward(&self, graph: &GraphArena, input: &Tensor) -> Result<Tensor, FerrogradError> {
        sigmoid_op(graph, input)
    }

    fn parameters(&self) -> Vec<Tensor> {
        vec![]
    }

    fn name(&self) -> &str {
        "Sigmoid"
    }
}
