/*
 * @Author       : 老董
 * @Description  : 神经网络模块：层、顺序模型、损失函数、评估指标、优化器以及 EMNIST 分类模型的构建
 */

mod activation;
pub mod builder;
mod criterion;
mod descriptor;
mod error;
mod init;
pub mod layer;
mod metric;
mod model;
pub mod optimizer;
mod sequential;

#[cfg(test)]
mod tests;

pub use activation::Activation;
pub use builder::{ModelConfig, build_model, build_model_with};
pub use criterion::{Criterion, PROBABILITY_EPSILON};
pub use descriptor::{LayerDescriptor, LayerTypeDescriptor, ModelDescriptor};
pub use error::ModelError;
pub use init::Init;
pub use layer::{Conv2d, Dropout, Flatten, Layer, LayerKind, Linear, MaxPool2d, Padding};
pub use metric::Metric;
pub use model::{Evaluation, Model, PREDICT_BATCH_SIZE};
pub use optimizer::{Adadelta, Optimizer};
pub use sequential::Sequential;
