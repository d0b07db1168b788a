/*
 * @Author       : 老董
 * @Description  : 已编译的模型：网络结构 + 损失函数 + 优化器 + 评估指标
 *
 * 只提供推理与评估（predict/evaluate）以及单步参数更新（apply_gradients），
 * 不包含训练循环。
 */

use super::criterion::Criterion;
use super::descriptor::ModelDescriptor;
use super::error::ModelError;
use super::metric::Metric;
use super::optimizer::{Adadelta, Optimizer};
use super::sequential::Sequential;
use crate::tensor::Tensor;

/// 推理时每批的样本数
pub const PREDICT_BATCH_SIZE: usize = 128;

/// 一次评估的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// 平均损失
    pub loss: f32,
    /// 各评估指标的值，顺序与编译时给定的指标一致
    pub metrics: Vec<(Metric, f32)>,
}

impl Evaluation {
    /// 按指标查找数值
    pub fn metric(&self, metric: Metric) -> Option<f32> {
        self.metrics
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, v)| *v)
    }
}

/// 已编译的模型
#[derive(Debug, Clone)]
pub struct Model {
    network: Sequential,
    criterion: Criterion,
    optimizer: Adadelta,
    metrics: Vec<Metric>,
}

impl Model {
    /// 编译模型
    pub fn compile(
        network: Sequential,
        criterion: Criterion,
        optimizer: Adadelta,
        metrics: Vec<Metric>,
    ) -> Self {
        Self {
            network,
            criterion,
            optimizer,
            metrics,
        }
    }

    pub fn network(&self) -> &Sequential {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Sequential {
        &mut self.network
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn optimizer(&self) -> &Adadelta {
        &self.optimizer
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// 单样本输入形状
    pub fn input_shape(&self) -> &[usize] {
        self.network.input_shape()
    }

    /// 单样本输出形状（即 [类别数]）
    pub fn output_shape(&self) -> &[usize] {
        self.network.output_shape()
    }

    pub fn num_params(&self) -> usize {
        self.network.num_params()
    }

    pub fn describe(&self) -> ModelDescriptor {
        self.network.describe()
    }

    pub fn summary(&self) {
        self.network.summary();
    }

    pub fn set_train_mode(&mut self) {
        self.network.set_train_mode();
    }

    pub fn set_eval_mode(&mut self) {
        self.network.set_eval_mode();
    }

    pub fn is_train_mode(&self) -> bool {
        self.network.is_train_mode()
    }

    /// 推理：在 eval 模式下分批前向计算，返回各类别概率 [N, K]。调用前后的模式保持不变
    pub fn predict(&mut self, images: &Tensor) -> Result<Tensor, ModelError> {
        let was_train = self.network.is_train_mode();
        self.network.set_eval_mode();
        let result = self.predict_in_batches(images);
        if was_train {
            self.network.set_train_mode();
        }
        result
    }

    fn predict_in_batches(&mut self, images: &Tensor) -> Result<Tensor, ModelError> {
        if images.dimension() == 0 {
            return self.network.forward(images);
        }
        let n = images.shape()[0];
        if n <= PREDICT_BATCH_SIZE {
            return self.network.forward(images);
        }
        let mut data = Vec::new();
        for start in (0..n).step_by(PREDICT_BATCH_SIZE) {
            let batch = images.slice_batch(start..start + PREDICT_BATCH_SIZE);
            data.extend_from_slice(self.network.forward(&batch)?.as_slice());
        }
        let mut shape = vec![n];
        shape.extend_from_slice(self.network.output_shape());
        Ok(Tensor::from_shape_vec(data, &shape)?)
    }

    /// 推理并返回每个样本概率最大的类别下标
    pub fn predict_classes(&mut self, images: &Tensor) -> Result<Vec<usize>, ModelError> {
        Ok(self.predict(images)?.argmax_rows())
    }

    /// 在给定数据上计算损失与各评估指标
    ///
    /// # 参数
    /// - `images`: 输入 [N, H, W, C]
    /// - `targets`: one-hot 目标 [N, K]
    pub fn evaluate(&mut self, images: &Tensor, targets: &Tensor) -> Result<Evaluation, ModelError> {
        let predictions = self.predict(images)?;
        let loss = self.criterion.compute(&predictions, targets)?;
        let metrics = self
            .metrics
            .iter()
            .map(|m| Ok((*m, m.compute(&predictions, targets)?)))
            .collect::<Result<Vec<_>, ModelError>>()?;
        Ok(Evaluation { loss, metrics })
    }

    /// 用外部计算的梯度（与`network().parameters()`一一对应）做一次优化器更新
    pub fn apply_gradients(&mut self, grads: &[Tensor]) -> Result<(), ModelError> {
        self.optimizer.step(&mut self.network, grads)
    }
}
