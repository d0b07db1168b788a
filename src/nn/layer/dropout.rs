/*
 * @Author       : 老董
 * @Description  : Dropout 层（inverted dropout）
 *
 * 训练模式下以概率`rate`将元素置零，并将保留的元素放大 1/(1-rate)，
 * 使推理模式下无需任何缩放（直接恒等输出）。
 */

use rand::Rng;
use rand::rngs::StdRng;

use super::Layer;
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::error::ModelError;
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub struct Dropout {
    rate: f32,
    name: String,
}

impl Dropout {
    /// `rate`须在 [0, 1) 内
    pub fn new(name: &str, rate: f32) -> Result<Self, ModelError> {
        if !(0.0..1.0).contains(&rate) {
            return Err(ModelError::InvalidConfig(format!(
                "{name}: 丢弃率须在[0, 1)内，实际为{rate}"
            )));
        }
        Ok(Self {
            rate,
            name: name.to_string(),
        })
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }
}

impl Layer for Dropout {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "Dropout"
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, ModelError> {
        Ok(input_shape.to_vec())
    }

    fn forward(&self, x: &Tensor, train: bool, rng: &mut StdRng) -> Result<Tensor, ModelError> {
        if !train || self.rate == 0.0 {
            return Ok(x.clone());
        }
        let keep = 1.0 - self.rate;
        let data = x
            .as_slice()
            .iter()
            .map(|&v| if rng.r#gen::<f32>() < keep { v / keep } else { 0.0 })
            .collect();
        Ok(Tensor::from_shape_vec(data, x.shape())?)
    }

    fn descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Dropout { rate: self.rate }
    }
}
