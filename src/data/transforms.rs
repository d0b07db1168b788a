//! 数据变换函数
//!
//! 提供常用的数据预处理操作，如归一化、图像转正、one-hot 编码等。

use std::path::Path;

use crate::data::error::DataError;
use crate::errors::TensorError;
use crate::tensor::Tensor;

/// 将 0-255 像素值归一化到 0-1
///
/// # 参数
/// - `tensor`: 输入 Tensor，值范围 [0, 255]
///
/// # 返回
/// 归一化后的 Tensor，值范围 [0, 1]
pub fn normalize_pixels(tensor: &Tensor) -> Tensor {
    tensor / 255.0
}

/// 将 .mat 文件中按列存储的图像转正：先左右镜像，再逆时针旋转 90°
///
/// 输入形状为 `[W, H]`（或 `[W, H, C]`），输出形状为 `[H, W]`（或 `[H, W, C]`）。
pub fn reorient_image(image: &Tensor) -> Result<Tensor, TensorError> {
    image.flip_lr()?.rot90()
}

/// 将类别下标转换为 one-hot 编码
///
/// # 参数
/// - `labels`: 类别下标，值为 0..num_classes
/// - `num_classes`: 类别总数
///
/// # 返回
/// one-hot 编码 Tensor，形状 [N, num_classes]；越界的下标对应全零行
///
/// # 示例
/// ```ignore
/// let encoded = one_hot(&[0, 2, 1], 3);
/// // 结果: [[1,0,0], [0,0,1], [0,1,0]]
/// ```
pub fn one_hot(labels: &[u32], num_classes: usize) -> Tensor {
    let n = labels.len();
    let mut data = vec![0.0; n * num_classes];
    for (i, &label) in labels.iter().enumerate() {
        let class_idx = label as usize;
        if class_idx < num_classes {
            data[i * num_classes + class_idx] = 1.0;
        }
    }
    Tensor::new(&data, &[n, num_classes])
}

/// 以字符画形式输出一张`[H, W]`或`[H, W, 1]`的图像：大于`threshold`的像素画`@`，否则画`.`
///
/// 调试用，便于在终端里确认图像方向是否正确。
pub fn render_ascii(image: &Tensor, threshold: f32) -> Result<String, TensorError> {
    let gray = image.to_gray_image()?;
    let limit = (threshold * 255.0).round();
    let mut out = String::with_capacity((gray.width() as usize + 1) * gray.height() as usize);
    for row in gray.rows() {
        for pixel in row {
            out.push(if f32::from(pixel.0[0]) > limit { '@' } else { '.' });
        }
        out.push('\n');
    }
    Ok(out)
}

/// 将一张取值在[0, 1]的灰度图像保存为 PNG（或`path`扩展名对应的格式），必要时创建父目录
pub fn save_sample_png<P: AsRef<Path>>(image: &Tensor, path: P) -> Result<(), DataError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    image
        .to_gray_image()?
        .save(path)
        .map_err(|e| DataError::format(format!("保存图像{}失败: {e}", path.display())))
}
