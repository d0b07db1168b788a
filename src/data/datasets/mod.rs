//! 内置数据集
//!
//! - EMNIST：手写字符分类（MATLAB 格式发布）

mod emnist;

pub use emnist::{
    DEFAULT_MAPPING_PATH, DatasetBundle, EmnistOptions, Split, TEST_SPLIT_RATIO, load_data,
    load_data_default,
};
