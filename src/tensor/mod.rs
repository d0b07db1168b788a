use ndarray::{Array, ArrayD, IxDyn};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::errors::TensorError;

mod ops {
    pub mod div;
    pub mod others;
}

mod image;
mod property;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：内部数据始终保持标准（行优先）内存布局，故`as_slice()`总是可用。
#[derive(Debug, Clone)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则会panic。
    /// 对于来自外部输入的数据，请使用`from_shape_vec`。
    pub fn new(data: &[f32], shape: &[usize]) -> Tensor {
        Self::from_shape_vec(data.to_vec(), shape).unwrap_or_else(|e| panic!("{}", e))
    }

    /// 由已拥有所有权的数据创建张量，长度与形状不符时返回错误而非panic
    pub fn from_shape_vec(data: Vec<f32>, shape: &[usize]) -> Result<Tensor, TensorError> {
        let data_len = data.len();
        Array::from_shape_vec(IxDyn(shape), data)
            .map(|data| Tensor { data })
            .map_err(|_| TensorError::DataShapeMismatch {
                data_len,
                shape: shape.to_vec(),
            })
    }

    /// 创建一个全零张量
    pub fn zeros(shape: &[usize]) -> Tensor {
        Tensor {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    /// 创建一个全一张量
    pub fn ones(shape: &[usize]) -> Tensor {
        Tensor {
            data: ArrayD::ones(IxDyn(shape)),
        }
    }

    /// 创建一个随机张量，其值在[min, max]的闭区间，随机数由调用方提供的`rng`产生（便于固定种子）
    pub fn uniform_with_rng<R: Rng>(min: f32, max: f32, shape: &[usize], rng: &mut R) -> Tensor {
        let dist = Uniform::from(min..=max);
        let data = (0..shape.iter().product::<usize>())
            .map(|_| dist.sample(rng))
            .collect::<Vec<_>>();
        Tensor::new(&data, shape)
    }

    /// 创建一个服从正态分布的随机张量（Box-Muller 变换）。
    pub fn normal_with_rng<R: Rng>(mean: f32, std_dev: f32, shape: &[usize], rng: &mut R) -> Tensor {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);
        let unit = Uniform::from(0.0f32..1.0);

        while data.len() < data_len {
            let u1: f32 = unit.sample(rng);
            let u2: f32 = unit.sample(rng);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Tensor::new(&data, shape)
    }

    /// 由`ndarray`数组构建张量，确保标准内存布局
    pub(crate) fn from_array(data: ArrayD<f32>) -> Tensor {
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Tensor { data }
    }

    /// 取得底层`ndarray`数组的只读引用
    pub(crate) fn array(&self) -> &ArrayD<f32> {
        &self.data
    }
}

