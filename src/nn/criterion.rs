/*
 * @Author       : 老董
 * @Description  : 损失函数
 *
 * 模型最后一层已输出概率分布（Softmax），因此这里的交叉熵直接作用于概率，
 * 而非 logits；概率被截断到 [ε, 1-ε] 以避免 ln(0)。
 */

use serde::{Deserialize, Serialize};

use super::error::ModelError;
use crate::tensor::Tensor;

/// 概率截断阈值
pub const PROBABILITY_EPSILON: f32 = 1e-7;

/// 损失函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criterion {
    /// 分类交叉熵：`-mean_n(sum_k t[n,k] * ln(p[n,k]))`，目标为 one-hot 编码
    CategoricalCrossEntropy,
}

impl Criterion {
    /// 计算一个批次的平均损失
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
            Self::CategoricalCrossEntropy => {
                let total: f32 = predictions
                    .as_slice()
                    .iter()
                    .zip(targets.as_slice())
                    .map(|(&p, &t)| {
                        let p = p.clamp(PROBABILITY_EPSILON, 1.0 - PROBABILITY_EPSILON);
                        -t * p.ln()
                    })
                    .sum();
                Ok(total / n as f32)
            }
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::CategoricalCrossEntropy => "categorical_crossentropy",
        }
    }
}
