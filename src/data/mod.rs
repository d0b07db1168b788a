//! 数据加载模块
//!
//! 提供 MATLAB 格式数据集的解析、变换和类别映射功能。
//!
//! # 主要组件
//!
//! - [`matlab`]: MAT-file（level 5）读取器
//! - [`load_data`]: EMNIST 手写字符数据集加载
//! - [`ClassMapping`]: 类别下标与字符编码的映射表
//! - [`transforms`]: 数据变换函数（归一化、图像转正、one-hot 等）
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use emnist_torch::data::{EmnistOptions, load_data};
//!
//! let options = EmnistOptions::new()
//!     .max_samples(Some(6000))
//!     .mapping_path("bin/mapping.p");
//! let bundle = load_data("data/emnist-byclass.mat", &options)?;
//! assert_eq!(bundle.train.images.shape(), &[6000, 28, 28, 1]);
//! ```

pub mod datasets;
pub mod error;
pub mod mapping;
pub mod matlab;
pub mod transforms;

#[cfg(test)]
mod tests;

// Re-exports
pub use datasets::{DatasetBundle, EmnistOptions, Split, load_data, load_data_default};
pub use error::DataError;
pub use mapping::ClassMapping;
pub use matlab::{MatFile, MatValue};
