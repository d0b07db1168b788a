/*
 * @Author       : 老董
 * @Description  : Linear (全连接) 层
 */

use rand::rngs::StdRng;

use super::{Layer, check_batch_input};
use crate::nn::activation::Activation;
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::error::ModelError;
use crate::nn::init::Init;
use crate::tensor::Tensor;

/// Linear (全连接) 层：`output = activation(x @ W + b)`
///
/// # 输入/输出形状
/// - 输入：[batch_size, in_features]
/// - 输出：[batch_size, units]
///
/// # 使用示例
/// ```ignore
/// let fc = Linear::new("dense_1", 5408, 512, Activation::ReLU, &mut rng)?;
/// let h = fc.forward(&x, true, &mut rng)?;
/// ```
#[derive(Debug, Clone)]
pub struct Linear {
    /// 权重参数 [in_features, units]
    weights: Tensor,
    /// 偏置参数 [units]
    bias: Tensor,
    in_features: usize,
    units: usize,
    activation: Activation,
    name: String,
}

impl Linear {
    /// 创建新的 Linear 层。权重使用 Xavier 均匀初始化，偏置为零
    pub fn new(
        name: &str,
        in_features: usize,
        units: usize,
        activation: Activation,
        rng: &mut StdRng,
    ) -> Result<Self, ModelError> {
        if in_features == 0 || units == 0 {
            return Err(ModelError::InvalidConfig(format!(
                "{name}: 输入特征数与输出单元数都必须大于0"
            )));
        }
        let weights =
            Init::Xavier.generate_with_rng(&[in_features, units], in_features, units, rng);
        let bias = Init::Zeros.generate_with_rng(&[units], 0, 0, rng);
        Ok(Self {
            weights,
            bias,
            in_features,
            units,
            activation,
            name: name.to_string(),
        })
    }

    /// 替换权重与偏置（形状须与原参数一致）
    pub fn set_weights(&mut self, weights: Tensor, bias: Tensor) -> Result<(), ModelError> {
        if !weights.is_same_shape(&self.weights) || !bias.is_same_shape(&self.bias) {
            return Err(ModelError::ShapeMismatch {
                expected: self.weights.shape().to_vec(),
                got: weights.shape().to_vec(),
                message: format!("{}: 权重或偏置形状不符", self.name),
            });
        }
        self.weights = weights;
        self.bias = bias;
        Ok(())
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }
}

impl Layer for Linear {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "Linear"
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, ModelError> {
        if input_shape != [self.in_features] {
            return Err(ModelError::ShapeMismatch {
                expected: vec![self.in_features],
                got: input_shape.to_vec(),
                message: format!("{}: 输入特征数不符", self.name),
            });
        }
        Ok(vec![self.units])
    }

    fn forward(&self, x: &Tensor, _train: bool, _rng: &mut StdRng) -> Result<Tensor, ModelError> {
        check_batch_input(x, 1, &self.name)?;
        self.output_shape(&x.shape()[1..])?;
        let y = x.mat_mul(&self.weights)?.add_bias(&self.bias)?;
        Ok(self.activation.apply(y))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.weights, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.weights, &mut self.bias]
    }

    fn descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Linear {
            units: self.units,
            activation: self.activation,
        }
    }
}
