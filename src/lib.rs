//! # EMNIST Torch
//!
//! `emnist_torch`用纯rust读取MATLAB v5格式（.mat）的[EMNIST](https://www.nist.gov/itl/products-and-services/emnist-dataset)
//! 手写字符数据集，将其整理为可直接送入网络的张量，并构建一个用于字符分类的卷积神经网络。
//!
//! - [`data`]：.mat 解析、类别映射表、数据集加载与图像变换
//! - [`nn`]：层、顺序模型、损失函数、优化器以及 EMNIST 分类模型的构建
//! - [`tensor`]：基于`ndarray`的张量
//!

pub mod data;
pub mod errors;
pub mod nn;
pub mod tensor;
