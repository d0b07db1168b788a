use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::{Axis, Ix2, Zip};
use std::cmp::PartialEq;

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Tensor {
    /// 对张量中的所有元素求和并返回一个纯数
    pub fn sum(&self) -> f32 {
        let mut value = 0.0;
        Zip::from(&self.data).for_each(|a| value += a);
        value
    }

    /// 逐元素映射，返回新张量
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Tensor {
        Tensor {
            data: self.data.mapv(f),
        }
    }

    /// 逐元素 ReLU：`max(0, x)`
    pub fn relu(&self) -> Tensor {
        self.map(|x| x.max(0.0))
    }

    /// 沿最后一个维度做 softmax（减去最大值以保证数值稳定）
    pub fn softmax(&self) -> Tensor {
        let last = Axis(self.dimension().saturating_sub(1));
        let mut data = self.data.clone();
        for mut lane in data.lanes_mut(last) {
            let max = lane.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            lane.mapv_inplace(|x| (x - max).exp());
            let sum = lane.sum();
            if sum > 0.0 {
                lane.mapv_inplace(|x| x / sum);
            }
        }
        Tensor { data }
    }

    /// 对`[N, C]`张量逐行求最大值所在的下标
    pub fn argmax_rows(&self) -> Vec<usize> {
        let last = Axis(self.dimension().saturating_sub(1));
        self.data
            .lanes(last)
            .into_iter()
            .map(|lane| {
                lane.iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |(best_i, best_v), (i, &v)| {
                        if v > best_v { (i, v) } else { (best_i, best_v) }
                    })
                    .0
            })
            .collect()
    }

    /// 二维矩阵乘法：`[n, k] @ [k, m] -> [n, m]`
    pub fn mat_mul(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        let error = || TensorError::OperatorError {
            operator: Operator::MatMul,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        let lhs = self.data.view().into_dimensionality::<Ix2>().map_err(|_| error())?;
        let rhs = other.data.view().into_dimensionality::<Ix2>().map_err(|_| error())?;
        if lhs.ncols() != rhs.nrows() {
            return Err(error());
        }
        Ok(Tensor::from_array(lhs.dot(&rhs).into_dyn()))
    }

    /// 将形状为`[m]`的偏置广播加到最后一个维度长度为`m`的张量上
    pub fn add_bias(&self, bias: &Tensor) -> Result<Tensor, TensorError> {
        let last = self.shape().last().copied().unwrap_or(0);
        if self.dimension() == 0 || bias.dimension() != 1 || bias.size() != last {
            return Err(TensorError::OperatorError {
                operator: Operator::AddBias,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: bias.shape().to_vec(),
            });
        }
        let mut data = self.data.clone();
        let bias = bias.as_slice();
        for mut lane in data.lanes_mut(Axis(self.dimension() - 1)) {
            lane.iter_mut().zip(bias).for_each(|(x, b)| *x += b);
        }
        Ok(Tensor { data })
    }
}
