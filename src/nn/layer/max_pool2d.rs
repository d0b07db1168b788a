/*
 * @Author       : 老董
 * @Description  : MaxPool2d (2D 最大池化) 层
 *
 * - 输入格式：[batch_size, H, W, channels]
 * - 输出格式：[batch_size, H', W', channels]
 * - 无可学习参数，不补零：H' = (H - pool_h) / stride_h + 1
 */

use ndarray::Ix4;
use rand::rngs::StdRng;

use super::{Layer, check_batch_input};
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::error::ModelError;
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub struct MaxPool2d {
    pool_size: (usize, usize),
    stride: (usize, usize),
    name: String,
}

impl MaxPool2d {
    /// 创建池化层，`stride`为 None 时等于`pool_size`
    pub fn new(
        name: &str,
        pool_size: (usize, usize),
        stride: Option<(usize, usize)>,
    ) -> Result<Self, ModelError> {
        let stride = stride.unwrap_or(pool_size);
        if pool_size.0 == 0 || pool_size.1 == 0 || stride.0 == 0 || stride.1 == 0 {
            return Err(ModelError::InvalidConfig(format!(
                "{name}: 池化窗口与步长都必须大于0"
            )));
        }
        Ok(Self {
            pool_size,
            stride,
            name: name.to_string(),
        })
    }

    pub fn pool_size(&self) -> (usize, usize) {
        self.pool_size
    }
}

impl Layer for MaxPool2d {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "MaxPool2d"
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, ModelError> {
        let (p_h, p_w) = self.pool_size;
        match input_shape {
            &[h, w, c] if h >= p_h && w >= p_w => Ok(vec![
                (h - p_h) / self.stride.0 + 1,
                (w - p_w) / self.stride.1 + 1,
                c,
            ]),
            _ => Err(ModelError::ShapeMismatch {
                expected: vec![p_h, p_w, 0],
                got: input_shape.to_vec(),
                message: format!("{}: 输入应为 [H, W, C] 且不小于池化窗口", self.name),
            }),
        }
    }

    fn forward(&self, x: &Tensor, _train: bool, _rng: &mut StdRng) -> Result<Tensor, ModelError> {
        let batch_size = check_batch_input(x, 3, &self.name)?;
        let out_shape = self.output_shape(&x.shape()[1..])?;
        let (out_h, out_w, channels) = (out_shape[0], out_shape[1], out_shape[2]);
        let (p_h, p_w) = self.pool_size;
        let (s_h, s_w) = self.stride;

        let input = x
            .view()
            .into_dimensionality::<Ix4>()
            .map_err(|e| ModelError::ComputationError(e.to_string()))?;

        let mut output = Vec::with_capacity(batch_size * out_h * out_w * channels);
        for n in 0..batch_size {
            for oy in 0..out_h {
                for ox in 0..out_w {
                    for c in 0..channels {
                        let mut max = f32::NEG_INFINITY;
                        for py in 0..p_h {
                            for px in 0..p_w {
                                max = max.max(input[(n, oy * s_h + py, ox * s_w + px, c)]);
                            }
                        }
                        output.push(max);
                    }
                }
            }
        }

        Ok(Tensor::from_shape_vec(
            output,
            &[batch_size, out_h, out_w, channels],
        )?)
    }

    fn descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::MaxPool2d {
            pool_size: self.pool_size,
            stride: self.stride,
        }
    }
}
