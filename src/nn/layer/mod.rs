/*
 * @Author       : 老董
 * @Description  : 网络层（Layer）特性及各具体层
 *
 * 所有层均采用 Batch-First 的 NHWC 布局：
 * - 图像类输入：[batch_size, H, W, C]
 * - 向量类输入：[batch_size, features]
 *
 * `output_shape`只处理不含 batch 维度的单样本形状，由`Sequential`在添加层时逐层推导。
 */

mod conv2d;
mod dropout;
mod flatten;
mod linear;
mod max_pool2d;

pub use conv2d::{Conv2d, Padding};
pub use dropout::Dropout;
pub use flatten::Flatten;
pub use linear::Linear;
pub use max_pool2d::MaxPool2d;

use enum_dispatch::enum_dispatch;
use rand::rngs::StdRng;

use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::error::ModelError;
use crate::tensor::Tensor;

#[enum_dispatch]
#[derive(Debug, Clone)]
pub enum LayerKind {
    Conv2d,
    MaxPool2d,
    Dropout,
    Flatten,
    Linear,
}

#[enum_dispatch(LayerKind)]
pub trait Layer {
    /// 层名称（如"conv2d_1"）
    fn name(&self) -> &str;

    /// 层类型名称（如"Conv2d"）
    fn type_name(&self) -> &'static str;

    /// 由单样本输入形状推导单样本输出形状，不兼容时返回错误
    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, ModelError>;

    /// 前向计算。`train`为 false 时（推理模式）Dropout 等层不生效
    fn forward(&self, x: &Tensor, train: bool, rng: &mut StdRng) -> Result<Tensor, ModelError>;

    /// 可训练参数（无参数的层返回空）
    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        Vec::new()
    }

    /// 参数量（所有参数张量元素个数之和）
    fn num_params(&self) -> usize {
        self.parameters().iter().map(|p| p.size()).sum()
    }

    /// 类型描述（含类型特定的超参数），用于摘要与序列化
    fn descriptor(&self) -> LayerTypeDescriptor;
}

/// 检查批量输入的维数与单样本形状，返回批量大小
pub(crate) fn check_batch_input(
    x: &Tensor,
    sample_rank: usize,
    layer: &str,
) -> Result<usize, ModelError> {
    if x.dimension() != sample_rank + 1 {
        return Err(ModelError::ShapeMismatch {
            expected: vec![sample_rank + 1],
            got: vec![x.dimension()],
            message: format!("{layer}的输入维数不符（含 batch 维度）"),
        });
    }
    Ok(x.shape()[0])
}
