/*
 * @Author       : 老董
 * @Description  : 参数初始化方式
 */

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::tensor::Tensor;

/// 参数初始化方式
///
/// 卷积核与全连接权重的`fan_in`/`fan_out`由调用方按各自的布局算好后传入。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Init {
    /// 全零（偏置默认）
    Zeros,
    /// 常数
    Constant(f32),
    /// Kaiming/He 正态初始化（适用于 `ReLU`）：std = sqrt(2 / fan_in)
    Kaiming,
    /// Xavier/Glorot 均匀初始化：limit = sqrt(6 / (fan_in + fan_out))
    Xavier,
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng(
        &self,
        shape: &[usize],
        fan_in: usize,
        fan_out: usize,
        rng: &mut StdRng,
    ) -> Tensor {
        match self {
            Self::Zeros => Tensor::zeros(shape),
            Self::Constant(v) => Tensor::ones(shape).map(|x| x * v),
            Self::Kaiming => {
                let std = (2.0 / fan_in.max(1) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
            Self::Xavier => {
                let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
                Tensor::uniform_with_rng(-limit, limit, shape, rng)
            }
        }
    }
}
