use serde::{Deserialize, Serialize};

use super::error::ModelError;
use crate::tensor::Tensor;

/// 评估指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    /// 准确率：预测概率最大的类别与 one-hot 目标一致的样本比例
    Accuracy,
}

impl Metric {
    /// 计算一个批次上的指标
    ///
    /// # 参数
    /// - `predictions`: 预测概率 [N, K]
    /// - `targets`: one-hot 目标 [N, K]
    pub fn compute(&self, predictions: &Tensor, targets: &Tensor) -> Result<f32, ModelError> {
        if !predictions.is_same_shape(targets) || predictions.dimension() != 2 {
            return Err(ModelError::ShapeMismatch {
                expected: predictions.shape().to_vec(),
                got: targets.shape().to_vec(),
                message: "预测与目标须为形状相同的 [N, K] 张量".to_string(),
            });
        }
        let n = predictions.shape()[0];
        if n == 0 {
            return Ok(0.0);
        }
        match self {
            Self::Accuracy => {
                let correct = predictions
                    .argmax_rows()
                    .iter()
                    .zip(targets.argmax_rows())
                    .filter(|(p, t)| **p == *t)
                    .count();
                Ok(correct as f32 / n as f32)
            }
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
        }
    }
}
