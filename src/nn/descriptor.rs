/*
 * @Author       : 老董
 * @Description  : 模型描述符（Model Descriptor）
 *                 顺序模型的可序列化描述，用于摘要输出、JSON 导出和调试
 */

use serde::{Deserialize, Serialize};

use super::activation::Activation;
use super::layer::Padding;

/// 描述符格式版本
pub const DESCRIPTOR_VERSION: &str = "1.0";

/// 模型的可序列化描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    /// 模型名称
    pub name: String,
    /// 单样本输入形状
    pub input_shape: Vec<usize>,
    /// 按顺序排列的层描述
    pub layers: Vec<LayerDescriptor>,
}

/// 层描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// 层名称
    pub name: String,
    /// 层类型
    pub layer_type: LayerTypeDescriptor,
    /// 单样本输出形状
    pub output_shape: Vec<usize>,
    /// 参数数量（无参数的层为 None）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_count: Option<usize>,
}

/// 层类型描述（包含类型特定参数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerTypeDescriptor {
    Conv2d {
        filters: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        padding: Padding,
        activation: Activation,
    },
    MaxPool2d {
        pool_size: (usize, usize),
        stride: (usize, usize),
    },
    Dropout {
        rate: f32,
    },
    Flatten,
    Linear {
        units: usize,
        activation: Activation,
    },
}

impl LayerTypeDescriptor {
    /// 类型名称
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Conv2d { .. } => "Conv2d",
            Self::MaxPool2d { .. } => "MaxPool2d",
            Self::Dropout { .. } => "Dropout",
            Self::Flatten => "Flatten",
            Self::Linear { .. } => "Linear",
        }
    }
}

impl ModelDescriptor {
    pub fn new(name: &str, input_shape: &[usize]) -> Self {
        Self {
            version: DESCRIPTOR_VERSION.to_string(),
            name: name.to_string(),
            input_shape: input_shape.to_vec(),
            layers: Vec::new(),
        }
    }

    pub fn add_layer(&mut self, layer: LayerDescriptor) {
        self.layers.push(layer);
    }

    /// 总参数量
    pub fn total_params(&self) -> usize {
        self.layers.iter().filter_map(|l| l.param_count).sum()
    }

    /// 序列化为格式化的 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串反序列化
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
