use rand::rngs::StdRng;

use super::Layer;
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::error::ModelError;
use crate::tensor::Tensor;

/// 展平层：[batch_size, d1, d2, ...] -> [batch_size, d1*d2*...]
#[derive(Debug, Clone)]
pub struct Flatten {
    name: String,
}

impl Flatten {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl Layer for Flatten {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "Flatten"
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, ModelError> {
        Ok(vec![input_shape.iter().product()])
    }

    fn forward(&self, x: &Tensor, _train: bool, _rng: &mut StdRng) -> Result<Tensor, ModelError> {
        if x.dimension() == 0 {
            return Err(ModelError::ShapeMismatch {
                expected: vec![1],
                got: vec![0],
                message: format!("{}: 输入至少需要 batch 维度", self.name),
            });
        }
        Ok(x.try_flatten_batch()?)
    }

    fn descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Flatten
    }
}
