/*
 * @Author       : 老董
 * @Description  : 模型构建与推理相关的错误类型
 */

use thiserror::Error;

use crate::errors::TensorError;

/// 模型相关错误
#[derive(Debug, Error)]
pub enum ModelError {
    /// 配置无效（如类别数为0、丢弃率越界）
    #[error("配置无效: {0}")]
    InvalidConfig(String),

    /// 形状不匹配（如输入张量形状与模型输入不符）
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}（{message}）")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    /// 计算错误
    #[error("计算错误: {0}")]
    ComputationError(String),
}

impl From<TensorError> for ModelError {
    fn from(e: TensorError) -> Self {
        Self::ComputationError(e.to_string())
    }
}
