//! EMNIST 手写字符数据集
//!
//! 从官方发布的 MATLAB 格式压缩包（如 `emnist-byclass.mat`）加载：
//! - 解析 .mat（level 5）文件中的 `dataset` 结构体
//! - 构建并持久化类别映射表
//! - 图像转正、像素归一化 (0-255 → 0-1)，输出 NHWC 格式 `[N, H, W, 1]`
//!
//! `dataset` 结构体按位置依次包含：训练集、测试集、映射表。
//! 训练集与测试集本身也是结构体，按位置依次包含：图像 `N×(H·W)`、标签 `N×1`。

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::data::error::DataError;
use crate::data::mapping::ClassMapping;
use crate::data::matlab::{MatFile, MatValue, NumericArray, StructArray};
use crate::data::transforms::{normalize_pixels, reorient_image};
use crate::tensor::Tensor;

/// 测试集样本上限 = 训练集样本上限 / 该比例
pub const TEST_SPLIT_RATIO: usize = 6;

/// 映射表的默认保存路径
pub const DEFAULT_MAPPING_PATH: &str = "bin/mapping.p";

/// 顶层变量名
const DATASET_VARIABLE: &str = "dataset";

/// EMNIST 加载选项
#[derive(Debug, Clone)]
pub struct EmnistOptions {
    /// 图像宽度
    pub width: usize,
    /// 图像高度
    pub height: usize,
    /// 训练集样本上限（测试集上限为其 1/6），None 表示全部加载
    pub max_samples: Option<usize>,
    /// 映射表保存路径
    pub mapping_path: PathBuf,
    /// 是否显示进度条
    pub show_progress: bool,
}

impl Default for EmnistOptions {
    fn default() -> Self {
        Self {
            width: 28,
            height: 28,
            max_samples: None,
            mapping_path: PathBuf::from(DEFAULT_MAPPING_PATH),
            show_progress: true,
        }
    }
}

impl EmnistOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: usize) -> Self {
        self.height = height;
        self
    }

    pub fn max_samples(mut self, max_samples: Option<usize>) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn mapping_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.mapping_path = path.into();
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 训练集与测试集的样本上限
    fn caps(&self) -> (Option<usize>, Option<usize>) {
        match self.max_samples {
            Some(max) => (Some(max), Some(max / TEST_SPLIT_RATIO)),
            None => (None, None),
        }
    }
}

/// 一个数据划分（训练集或测试集）
#[derive(Debug, Clone)]
pub struct Split {
    /// 图像 [N, H, W, 1]，取值 [0, 1]
    pub images: Tensor,
    /// 类别下标，长度为 N
    pub labels: Vec<u32>,
}

impl Split {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// 加载后的完整数据集
#[derive(Debug, Clone)]
pub struct DatasetBundle {
    pub train: Split,
    pub test: Split,
    pub mapping: ClassMapping,
    pub num_classes: usize,
}

impl DatasetBundle {
    pub fn height(&self) -> usize {
        self.train.images.shape()[1]
    }

    pub fn width(&self) -> usize {
        self.train.images.shape()[2]
    }

    /// 单个样本的形状 `[H, W, C]`
    pub fn input_shape(&self) -> Vec<usize> {
        self.train.images.shape()[1..].to_vec()
    }
}

/// 以默认选项加载
pub fn load_data_default<P: AsRef<Path>>(path: P) -> Result<DatasetBundle, DataError> {
    load_data(path, &EmnistOptions::default())
}

/// 加载 EMNIST 压缩包，并将类别映射表写入`options.mapping_path`
pub fn load_data<P: AsRef<Path>>(
    path: P,
    options: &EmnistOptions,
) -> Result<DatasetBundle, DataError> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "加载 EMNIST 数据集");

    let mat = MatFile::open(path)?;
    let dataset = mat
        .get(DATASET_VARIABLE)
        .ok_or_else(|| DataError::format(format!("缺少变量`{DATASET_VARIABLE}`")))?;
    let dataset = expect_struct(dataset, DATASET_VARIABLE)?;

    let train_block = expect_struct(positional_field(dataset, 0, DATASET_VARIABLE)?, "训练集")?;
    let test_block = expect_struct(positional_field(dataset, 1, DATASET_VARIABLE)?, "测试集")?;
    let mapping_table = expect_numeric(positional_field(dataset, 2, DATASET_VARIABLE)?, "映射表")?;

    let mapping = ClassMapping::from_table(mapping_table)?;
    mapping.save(&options.mapping_path)?;

    let (train_cap, test_cap) = options.caps();
    let train = load_split(train_block, "训练集", train_cap, &mapping, options)?;
    let test = load_split(test_block, "测试集", test_cap, &mapping, options)?;

    let num_classes = mapping.len();
    tracing::info!(
        train = train.len(),
        test = test.len(),
        num_classes,
        "EMNIST 数据集加载完成"
    );

    Ok(DatasetBundle {
        train,
        test,
        mapping,
        num_classes,
    })
}

fn expect_struct<'a>(value: &'a MatValue, what: &str) -> Result<&'a StructArray, DataError> {
    let s = value.as_struct().ok_or_else(|| {
        DataError::format(format!("{what}应为结构体，实际为{}", value.kind()))
    })?;
    if s.is_empty() {
        return Err(DataError::format(format!("{what}结构体为空")));
    }
    Ok(s)
}

fn expect_numeric<'a>(value: &'a MatValue, what: &str) -> Result<&'a NumericArray, DataError> {
    value.as_numeric().ok_or_else(|| {
        DataError::format(format!("{what}应为数值矩阵，实际为{}", value.kind()))
    })
}

fn positional_field<'a>(
    s: &'a StructArray,
    position: usize,
    what: &str,
) -> Result<&'a MatValue, DataError> {
    s.field_at(0, position).ok_or_else(|| {
        DataError::format(format!(
            "{what}结构体缺少第{position}个字段（共{}个字段）",
            s.field_names().len()
        ))
    })
}

fn new_progress_bar(len: usize, name: &str, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {percent:>3}% ({pos}/{len})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(name.to_string());
    pb
}

fn load_split(
    block: &StructArray,
    name: &str,
    cap: Option<usize>,
    mapping: &ClassMapping,
    options: &EmnistOptions,
) -> Result<Split, DataError> {
    let images = expect_numeric(positional_field(block, 0, name)?, name)?;
    let labels = expect_numeric(positional_field(block, 1, name)?, name)?;

    if images.rows() != labels.rows() {
        return Err(DataError::format(format!(
            "{name}的图像数量{}与标签数量{}不一致",
            images.rows(),
            labels.rows()
        )));
    }

    let (width, height) = (options.width, options.height);
    let pixels_per_image = width.checked_mul(height).ok_or_else(|| {
        DataError::format(format!("图像尺寸{width}x{height}过大"))
    })?;
    if images.rows() > 0 && images.cols() != pixels_per_image {
        return Err(DataError::ShapeMismatch {
            expected: vec![pixels_per_image],
            got: vec![images.cols()],
        });
    }

    let count = cap.map_or(images.rows(), |c| c.min(images.rows()));
    let pb = new_progress_bar(count, name, options.show_progress);

    let mut pixels = Vec::with_capacity(count * pixels_per_image);
    let mut label_values = Vec::with_capacity(count);
    for i in 0..count {
        let raw = images.row(i).ok_or(DataError::IndexOutOfBounds {
            index: i,
            len: images.rows(),
        })?;
        let raw = checked_pixels(&raw, name, i)?;
        // 文件中按列存储，先按 [W, H] 读入再转正为 [H, W]
        let stored = Tensor::from_shape_vec(raw, &[width, height])?;
        let upright = reorient_image(&stored)?;
        pixels.extend_from_slice(upright.as_slice());

        let label = labels.get(i, 0).ok_or(DataError::IndexOutOfBounds {
            index: i,
            len: labels.rows(),
        })?;
        label_values.push(checked_label(label, mapping, name, i)?);

        pb.inc(1);
    }
    pb.finish_and_clear();

    let images = Tensor::from_shape_vec(pixels, &[count, height, width, 1])?;
    tracing::debug!(split = name, count, "数据划分加载完成");

    Ok(Split {
        images: normalize_pixels(&images),
        labels: label_values,
    })
}

/// 像素须为 [0, 255] 内的整数（与存储类别无关）
fn checked_pixels(raw: &[f64], name: &str, index: usize) -> Result<Vec<f32>, DataError> {
    raw.iter()
        .map(|&v| {
            if v.fract() == 0.0 && (0.0..=255.0).contains(&v) {
                Ok(v as f32)
            } else {
                Err(DataError::format(format!(
                    "{name}第{index}个样本的像素值{v}不在[0, 255]内或不是整数"
                )))
            }
        })
        .collect()
}

/// 标签须为非负整数且存在于映射表中
fn checked_label(
    value: f64,
    mapping: &ClassMapping,
    name: &str,
    index: usize,
) -> Result<u32, DataError> {
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(DataError::format(format!(
            "{name}第{index}个标签{value}不是非负整数"
        )));
    }
    let label = value as u32;
    if !mapping.contains(label) {
        return Err(DataError::format(format!(
            "{name}第{index}个标签{label}不在映射表中"
        )));
    }
    Ok(label)
}
