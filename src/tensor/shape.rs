use super::Tensor;
use crate::errors::{ComparisonOperator, TensorError};
use ndarray::{Axis, IxDyn, Slice};
use std::ops::Range;

impl Tensor {
    pub fn reshape(&self, shape: &[usize]) -> Self {
        self.try_reshape(shape)
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// 与`reshape`相同，但元素数量不一致时返回错误
    pub fn try_reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let new_total_elements = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or(TensorError::IncompatibleShape)?;
        if self.data.len() != new_total_elements {
            return Err(TensorError::IncompatibleShape);
        }
        let data = self
            .data
            .as_standard_layout()
            .into_owned()
            .into_shape(IxDyn(shape))
            .map_err(|_| TensorError::IncompatibleShape)?;
        Ok(Self { data })
    }

    /// 将`[N, d1, d2, ...]`展平为`[N, d1*d2*...]`，首个维度（batch）保持不变
    pub fn flatten_batch(&self) -> Self {
        self.try_flatten_batch()
            .unwrap_or_else(|e| panic!("{}", e))
    }

    /// 与`flatten_batch`相同，但标量张量返回错误
    pub fn try_flatten_batch(&self) -> Result<Self, TensorError> {
        let shape = self.shape();
        let Some((&n, rest)) = shape.split_first() else {
            return Err(TensorError::ValueMustSatisfyComparison {
                value_name: "张量维数".to_string(),
                operator: ComparisonOperator::GreaterOrEqual,
                threshold: 1,
            });
        };
        let flat_size = rest.iter().product();
        self.try_reshape(&[n, flat_size])
    }

    /// 沿首个维度（样本维度）截取`range`范围内的样本，其余维度保持不变。
    /// `range`超出样本数量的部分会被截断。
    pub fn slice_batch(&self, range: Range<usize>) -> Self {
        assert!(
            self.dimension() >= 1,
            "{}",
            TensorError::ValueMustSatisfyComparison {
                value_name: "张量维数".to_string(),
                operator: ComparisonOperator::GreaterOrEqual,
                threshold: 1,
            }
        );
        let len = self.shape()[0];
        let end = range.end.min(len);
        let start = range.start.min(end);
        let view = self
            .data
            .slice_axis(Axis(0), Slice::from(start..end));
        Self::from_array(view.to_owned())
    }

    /// 将多个形状相同的张量沿新增的首个维度堆叠起来
    pub fn stack(tensors: &[&Self]) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        if tensors.iter().any(|t| !t.is_same_shape(first)) {
            return Err(TensorError::IncompatibleShape);
        }
        let mut shape = first.shape().to_vec();
        shape.insert(0, tensors.len());
        let data = tensors
            .iter()
            .flat_map(|t| t.as_slice())
            .copied()
            .collect::<Vec<_>>();
        Self::from_shape_vec(data, &shape)
    }
}
