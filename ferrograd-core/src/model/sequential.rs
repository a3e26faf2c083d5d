use crate::error::FerrogradError;
use crate::graph::GraphArena;
use crate::nn::module::Module;
use crate::tensor::Tensor;

/// An ordered container of sub-modules; forward threads the tensor through
/// each in turn.
#[derive(Debug, Default)]
pub struct Sequential {
    modules: Vec<Box<dyn Module>>,
}

impl Sequential {
    pub fn new() -> Self {
        Sequential {
            modules: Vec::new(),
        }
    }

    pub fn add_module(&mut self, module: Box<dyn Module>) {
        self.modules.push(module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Module for Sequential {
    fn forward(&self, graph: &GraphArena, input: &Tensor) -> Result<Tensor, FerrogradError> {
        let mut current = input.clone();
        for module in &self.modules {
            current = module.forward(graph, &current)?;
        }
        Ok(current)
    }

    fn parameters(&self) -> Vec<Tensor> {
        let mut params = Vec::new();
        for module in &self.modules {
            params.extend(module.parameters());
        }
        params
    }

    fn name(&self) -> &str {
        "Sequential"
    }

    fn zero_grad(&self) {
        for module in &self.modules {
            module.zero_grad();
        }
    }
}
