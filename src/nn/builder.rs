/*
 * @Author       : 老董
 * @Description  : EMNIST 分类模型的构建
 *
 * 结构（输入形状取自数据集，如 [28, 28, 1]）：
 * Conv2d(32, 3x3, Same, ReLU) -> Conv2d(32, 3x3, Valid, ReLU) -> MaxPool2d(2x2)
 * -> Dropout(0.25) -> Flatten -> Linear(512, ReLU) -> Dropout(0.5) -> Linear(类别数, Softmax)
 *
 * 编译：分类交叉熵 + Adadelta + 准确率
 */

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::activation::Activation;
use super::criterion::Criterion;
use super::error::ModelError;
use super::layer::{Conv2d, Dropout, Flatten, Linear, MaxPool2d, Padding};
use super::metric::Metric;
use super::model::Model;
use super::optimizer::Adadelta;
use super::sequential::Sequential;
use crate::data::DatasetBundle;

/// 模型超参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// 两个卷积层的卷积核数量
    pub filters: usize,
    /// 卷积核尺寸
    pub kernel_size: (usize, usize),
    /// 池化窗口尺寸
    pub pool_size: (usize, usize),
    /// 池化后的丢弃率
    pub conv_dropout: f32,
    /// 隐藏全连接层的单元数
    pub hidden_units: usize,
    /// 隐藏全连接层后的丢弃率
    pub dense_dropout: f32,
    /// Adadelta 学习率
    pub learning_rate: f32,
    /// Adadelta 衰减系数
    pub rho: f32,
    /// Adadelta 数值稳定项
    pub epsilon: f32,
    /// 随机种子（参数初始化与 Dropout），None 则每次不同
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            filters: 32,
            kernel_size: (3, 3),
            pool_size: (2, 2),
            conv_dropout: 0.25,
            hidden_units: 512,
            dense_dropout: 0.5,
            learning_rate: 1.0,
            rho: 0.95,
            epsilon: 1e-7,
            seed: None,
        }
    }
}

macro_rules! config_setters {
    ($($field:ident: $ty:ty),* $(,)?) => {
        paste::paste! {
            impl ModelConfig {
                $(
                    pub fn [<with_ $field>](mut self, $field: $ty) -> Self {
                        self.$field = $field;
                        self
                    }
                )*
            }
        }
    };
}

config_setters! {
    filters: usize,
    kernel_size: (usize, usize),
    pool_size: (usize, usize),
    conv_dropout: f32,
    hidden_units: usize,
    dense_dropout: f32,
    learning_rate: f32,
    rho: f32,
    epsilon: f32,
}

impl ModelConfig {
    /// 固定随机种子
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ModelError::InvalidConfig(format!("模型配置序列化失败: {e}")))
    }

    /// 从 JSON 读取配置，缺省字段取默认值
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        serde_json::from_str(json)
            .map_err(|e| ModelError::InvalidConfig(format!("模型配置解析失败: {e}")))
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// 以默认配置构建并编译模型
pub fn build_model(bundle: &DatasetBundle) -> Result<Model, ModelError> {
    build_model_with(bundle, &ModelConfig::default())
}

/// 以指定配置构建并编译模型，输入形状取自数据集中的图像张量
pub fn build_model_with(bundle: &DatasetBundle, config: &ModelConfig) -> Result<Model, ModelError> {
    if bundle.num_classes == 0 {
        return Err(ModelError::InvalidConfig(
            "类别数为0，无法构建分类模型".to_string(),
        ));
    }
    let input_shape = bundle.input_shape();
    if input_shape.len() != 3 {
        return Err(ModelError::ShapeMismatch {
            expected: vec![0, 0, 0],
            got: input_shape,
            message: "图像样本应为 [H, W, C]".to_string(),
        });
    }
    let channels = input_shape[2];

    let mut rng = config.rng();
    let mut network = match config.seed {
        Some(seed) => Sequential::new_seeded("emnist_cnn", &input_shape, seed),
        None => Sequential::new("emnist_cnn", &input_shape),
    };

    network
        .add(Conv2d::new(
            "conv2d_1",
            channels,
            config.filters,
            config.kernel_size,
            Padding::Same,
            Activation::ReLU,
            &mut rng,
        )?)?
        .add(Conv2d::new(
            "conv2d_2",
            config.filters,
            config.filters,
            config.kernel_size,
            Padding::Valid,
            Activation::ReLU,
            &mut rng,
        )?)?
        .add(MaxPool2d::new("max_pool2d", config.pool_size, None)?)?
        .add(Dropout::new("dropout_1", config.conv_dropout)?)?
        .add(Flatten::new("flatten"))?;

    let flat_features = network.output_shape()[0];
    network
        .add(Linear::new(
            "dense_1",
            flat_features,
            config.hidden_units,
            Activation::ReLU,
            &mut rng,
        )?)?
        .add(Dropout::new("dropout_2", config.dense_dropout)?)?
        .add(Linear::new(
            "dense_2",
            config.hidden_units,
            bundle.num_classes,
            Activation::Softmax,
            &mut rng,
        )?)?;

    let model = Model::compile(
        network,
        Criterion::CategoricalCrossEntropy,
        Adadelta::new(config.learning_rate, config.rho, config.epsilon),
        vec![Metric::Accuracy],
    );

    tracing::info!(
        layers = model.network().len(),
        params = model.num_params(),
        num_classes = bundle.num_classes,
        "模型构建完成"
    );
    model.summary();

    Ok(model)
}
