//! 数据加载错误类型定义

use std::path::PathBuf;
use thiserror::Error;

use crate::errors::TensorError;

/// 数据加载相关错误
#[derive(Debug, Error)]
pub enum DataError {
    /// 文件未找到
    #[error("文件未找到: {0}")]
    FileNotFound(PathBuf),

    /// IO 错误（如映射表写入失败）
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    /// 格式错误（如 .mat 文件头无效、结构与预期不符）
    #[error("格式错误: {0}")]
    FormatError(String),

    /// 索引越界
    #[error("索引越界: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// 形状不匹配（如声明的宽高与原始数据长度不符）
    #[error("形状不匹配: 期望 {expected:?}, 实际 {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// 映射表（反）序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(#[from] bincode::Error),
}

impl DataError {
    /// 便捷构造格式错误
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::FormatError(msg.into())
    }
}

/// 张量层面的错误（如图像张量维数不符）在数据加载中一律视为格式错误
impl From<TensorError> for DataError {
    fn from(e: TensorError) -> Self {
        Self::FormatError(e.to_string())
    }
}
