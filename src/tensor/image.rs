/*
 * @Author       : 老董
 * @Description  : 图像类张量（[H, W] 或 [H, W, C]）的翻转、旋转以及与 image 库的互转
 */

use super::Tensor;
use crate::errors::{ComparisonOperator, TensorError};
use image::{GrayImage, Luma};
use ndarray::Axis;

impl Tensor {
    fn check_image_dims(&self) -> Result<(), TensorError> {
        let (operator, threshold) = match self.dimension() {
            2 | 3 => return Ok(()),
            0 | 1 => (ComparisonOperator::GreaterOrEqual, 2),
            _ => (ComparisonOperator::LessOrEqual, 3),
        };
        Err(TensorError::ValueMustSatisfyComparison {
            value_name: "图像张量的维数".to_string(),
            operator,
            threshold,
        })
    }

    /// 左右镜像（等价于 numpy 的 `fliplr`）：`out[i][j] = in[i][W-1-j]`
    pub fn flip_lr(&self) -> Result<Tensor, TensorError> {
        self.check_image_dims()?;
        let mut view = self.data.view();
        view.invert_axis(Axis(1));
        Ok(Tensor::from_array(view.to_owned()))
    }

    /// 逆时针旋转90°（等价于 numpy 的 `rot90(k=1)`）：形状 [H, W, ..] 变为 [W, H, ..]，
    /// `out[i][j] = in[j][W-1-i]`
    pub fn rot90(&self) -> Result<Tensor, TensorError> {
        self.check_image_dims()?;
        let mut view = self.data.view();
        view.invert_axis(Axis(1));
        view.swap_axes(0, 1);
        Ok(Tensor::from_array(view.to_owned()))
    }

    /// 将`[H, W]`或`[H, W, 1]`、取值在[0, 1]的灰度张量转换为`image`库的`GrayImage`
    pub fn to_gray_image(&self) -> Result<GrayImage, TensorError> {
        self.check_image_dims()?;
        let shape = self.shape();
        if self.dimension() == 3 && shape[2] != 1 {
            return Err(TensorError::ValueMustSatisfyComparison {
                value_name: "灰度图像的通道数".to_string(),
                operator: ComparisonOperator::Equal,
                threshold: 1,
            });
        }
        let (height, width) = (shape[0], shape[1]);
        let pixels = self.as_slice();

        let mut imgbuf = GrayImage::new(width as u32, height as u32);
        for y in 0..height {
            for x in 0..width {
                let value = (pixels[y * width + x] * 255.0).round().clamp(0.0, 255.0) as u8;
                imgbuf.put_pixel(x as u32, y as u32, Luma([value]));
            }
        }
        Ok(imgbuf)
    }
}
