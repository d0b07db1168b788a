/*
 * @Author       : 老董
 * @Description  : Conv2d (2D 卷积) 层 - Keras 风格的填充方式
 *
 * 输入/输出形状（NHWC）：
 * - 输入：[batch_size, H, W, in_channels]
 * - 输出：[batch_size, H', W', filters]
 *
 * 输出尺寸计算：
 * - Padding::Valid：H' = (H - kernel_h) / stride_h + 1
 * - Padding::Same ：H' = ceil(H / stride_h)，不足部分在上下（左右）补零，多出的一行（列）补在下方（右侧）
 *
 * 计算：output = activation(conv2d(x, K) + b)
 */

use ndarray::{Array2, Ix2, Ix4};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::{Layer, check_batch_input};
use crate::nn::activation::Activation;
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::error::ModelError;
use crate::nn::init::Init;
use crate::tensor::Tensor;

/// 卷积的填充方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Padding {
    /// 补零，使输出尺寸为 ceil(输入 / 步长)
    Same,
    /// 不补零
    Valid,
}

impl Padding {
    /// 单个空间维度上的（输出尺寸, 前侧补零数）；尺寸不足时返回 None
    fn resolve(&self, input: usize, kernel: usize, stride: usize) -> Option<(usize, usize)> {
        match self {
            Self::Valid => {
                if input < kernel {
                    None
                } else {
                    Some(((input - kernel) / stride + 1, 0))
                }
            }
            Self::Same => {
                let output = input.div_ceil(stride);
                let total_pad = (output.saturating_sub(1) * stride + kernel).saturating_sub(input);
                Some((output, total_pad / 2))
            }
        }
    }
}

/// Conv2d (2D 卷积) 层
///
/// # 使用示例
/// ```ignore
/// let conv = Conv2d::new("conv2d_1", 1, 32, (3, 3), Padding::Same, Activation::ReLU, &mut rng)?;
/// let y = conv.forward(&x, false, &mut rng)?;  // [N, 28, 28, 1] -> [N, 28, 28, 32]
/// ```
#[derive(Debug, Clone)]
pub struct Conv2d {
    /// 卷积核参数 [kernel_h, kernel_w, in_channels, filters]
    kernel: Tensor,
    /// 偏置参数 [filters]
    bias: Tensor,
    in_channels: usize,
    filters: usize,
    kernel_size: (usize, usize),
    stride: (usize, usize),
    padding: Padding,
    activation: Activation,
    name: String,
}

impl Conv2d {
    /// 创建新的 Conv2d 层（步长为 1）。卷积核使用 Xavier 均匀初始化，偏置为零
    pub fn new(
        name: &str,
        in_channels: usize,
        filters: usize,
        kernel_size: (usize, usize),
        padding: Padding,
        activation: Activation,
        rng: &mut StdRng,
    ) -> Result<Self, ModelError> {
        Self::with_stride(
            name,
            in_channels,
            filters,
            kernel_size,
            (1, 1),
            padding,
            activation,
            rng,
        )
    }

    /// 创建指定步长的 Conv2d 层
    #[allow(clippy::too_many_arguments)]
    pub fn with_stride(
        name: &str,
        in_channels: usize,
        filters: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        padding: Padding,
        activation: Activation,
        rng: &mut StdRng,
    ) -> Result<Self, ModelError> {
        let (k_h, k_w) = kernel_size;
        if in_channels == 0 || filters == 0 || k_h == 0 || k_w == 0 {
            return Err(ModelError::InvalidConfig(format!(
                "{name}: 通道数、卷积核数量和卷积核尺寸都必须大于0"
            )));
        }
        if stride.0 == 0 || stride.1 == 0 {
            return Err(ModelError::InvalidConfig(format!("{name}: 步长必须大于0")));
        }

        let receptive = k_h * k_w;
        let kernel = Init::Xavier.generate_with_rng(
            &[k_h, k_w, in_channels, filters],
            receptive * in_channels,
            receptive * filters,
            rng,
        );
        let bias = Init::Zeros.generate_with_rng(&[filters], 0, 0, rng);

        Ok(Self {
            kernel,
            bias,
            in_channels,
            filters,
            kernel_size,
            stride,
            padding,
            activation,
            name: name.to_string(),
        })
    }

    /// 替换卷积核与偏置（形状须与原参数一致）
    pub fn set_weights(&mut self, kernel: Tensor, bias: Tensor) -> Result<(), ModelError> {
        if !kernel.is_same_shape(&self.kernel) || !bias.is_same_shape(&self.bias) {
            return Err(ModelError::ShapeMismatch {
                expected: self.kernel.shape().to_vec(),
                got: kernel.shape().to_vec(),
                message: format!("{}: 卷积核或偏置形状不符", self.name),
            });
        }
        self.kernel = kernel;
        self.bias = bias;
        Ok(())
    }

    pub fn kernel(&self) -> &Tensor {
        &self.kernel
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    pub fn filters(&self) -> usize {
        self.filters
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    /// 空间维度的（输出高, 输出宽, 上侧补零, 左侧补零）
    fn geometry(&self, h: usize, w: usize) -> Result<(usize, usize, usize, usize), ModelError> {
        let (k_h, k_w) = self.kernel_size;
        let (s_h, s_w) = self.stride;
        let too_small = || ModelError::ShapeMismatch {
            expected: vec![k_h, k_w],
            got: vec![h, w],
            message: format!("{}: 输入尺寸小于卷积核（Valid 填充）", self.name),
        };
        let (out_h, pad_top) = self.padding.resolve(h, k_h, s_h).ok_or_else(too_small)?;
        let (out_w, pad_left) = self.padding.resolve(w, k_w, s_w).ok_or_else(too_small)?;
        Ok((out_h, out_w, pad_top, pad_left))
    }
}

impl Layer for Conv2d {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "Conv2d"
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<Vec<usize>, ModelError> {
        if input_shape.len() != 3 || input_shape[2] != self.in_channels {
            return Err(ModelError::ShapeMismatch {
                expected: vec![0, 0, self.in_channels],
                got: input_shape.to_vec(),
                message: format!("{}: 输入应为 [H, W, {}]", self.name, self.in_channels),
            });
        }
        let (out_h, out_w, _, _) = self.geometry(input_shape[0], input_shape[1])?;
        Ok(vec![out_h, out_w, self.filters])
    }

    fn forward(&self, x: &Tensor, _train: bool, _rng: &mut StdRng) -> Result<Tensor, ModelError> {
        let batch_size = check_batch_input(x, 3, &self.name)?;
        let out_shape = self.output_shape(&x.shape()[1..])?;
        let (out_h, out_w) = (out_shape[0], out_shape[1]);
        let (in_h, in_w, in_c) = (x.shape()[1], x.shape()[2], self.in_channels);
        let (k_h, k_w) = self.kernel_size;
        let (s_h, s_w) = self.stride;
        let (_, _, pad_top, pad_left) = self.geometry(in_h, in_w)?;

        let input = x
            .view()
            .into_dimensionality::<Ix4>()
            .map_err(|e| ModelError::ComputationError(e.to_string()))?;
        // [k_h, k_w, C, F] -> [k_h * k_w * C, F]，行下标为 (ky * k_w + kx) * C + c
        let kernel = self
            .kernel
            .try_reshape(&[k_h * k_w * in_c, self.filters])?
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|e| ModelError::ComputationError(e.to_string()))?
            .to_owned();

        let patch_len = k_h * k_w * in_c;
        let mut output = Vec::with_capacity(batch_size * out_h * out_w * self.filters);
        for n in 0..batch_size {
            // im2col：每个输出位置对应一行感受野
            let mut patches = Array2::<f32>::zeros((out_h * out_w, patch_len));
            for oy in 0..out_h {
                for ox in 0..out_w {
                    let mut row = patches.row_mut(oy * out_w + ox);
                    for ky in 0..k_h {
                        let iy = (oy * s_h + ky) as isize - pad_top as isize;
                        if iy < 0 || iy >= in_h as isize {
                            continue;
                        }
                        for kx in 0..k_w {
                            let ix = (ox * s_w + kx) as isize - pad_left as isize;
                            if ix < 0 || ix >= in_w as isize {
                                continue;
                            }
                            let base = (ky * k_w + kx) * in_c;
                            for c in 0..in_c {
                                row[base + c] = input[(n, iy as usize, ix as usize, c)];
                            }
                        }
                    }
                }
            }
            output.extend(patches.dot(&kernel).iter().copied());
        }

        let y = Tensor::from_shape_vec(output, &[batch_size, out_h, out_w, self.filters])?;
        Ok(self.activation.apply(y.add_bias(&self.bias)?))
    }

    fn parameters(&self) -> Vec<&Tensor> {
        vec![&self.kernel, &self.bias]
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        vec![&mut self.kernel, &mut self.bias]
    }

    fn descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Conv2d {
            filters: self.filters,
            kernel_size: self.kernel_size,
            stride: self.stride,
            padding: self.padding,
            activation: self.activation,
        }
    }
}
