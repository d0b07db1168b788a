use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// 层内置的激活函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Activation {
    /// 恒等（不做变换）
    #[default]
    Linear,
    ReLU,
    /// 沿最后一个维度做 softmax
    Softmax,
}

impl Activation {
    pub fn apply(&self, x: Tensor) -> Tensor {
        match self {
            Self::Linear => x,
            Self::ReLU => x.relu(),
            Self::Softmax => x.softmax(),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::ReLU => "relu",
            Self::Softmax => "softmax",
        }
    }
}
