/*
 * @Author       : 老董
 * @Description  : 优化器模块
 *
 * 本框架不包含自动求导与训练循环，优化器只负责“给定梯度后如何更新参数”这一步，
 * 梯度由外部按`Sequential::parameters()`的顺序提供。
 */

mod adadelta;

pub use adadelta::Adadelta;

use super::error::ModelError;
use super::sequential::Sequential;
use crate::tensor::Tensor;

/// Optimizer trait
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = Adadelta::default();
/// let grads: Vec<Tensor> = compute_gradients(&model, &x, &y); // 外部计算
/// optimizer.step(&mut model, &grads)?;
/// ```
pub trait Optimizer {
    /// 按梯度更新一次模型参数。`grads`须与`model.parameters()`一一对应且形状一致
    fn step(&mut self, model: &mut Sequential, grads: &[Tensor]) -> Result<(), ModelError>;

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);

    /// 重置累积状态
    fn reset(&mut self);
}
