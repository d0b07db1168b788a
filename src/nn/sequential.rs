/*
 * @Author       : 老董
 * @Description  : 顺序模型（Sequential）：按添加顺序串联各层，负责逐层形状推导、
 *                 train/eval 模式切换以及模型摘要（summary）
 */

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::descriptor::{LayerDescriptor, ModelDescriptor};
use super::error::ModelError;
use super::layer::{Layer, LayerKind};
use crate::tensor::Tensor;

/// 顺序模型
#[derive(Debug, Clone)]
pub struct Sequential {
    name: String,
    /// 单样本输入形状（不含 batch 维度）
    input_shape: Vec<usize>,
    layers: Vec<LayerKind>,
    /// 每层的单样本输出形状，与`layers`一一对应
    output_shapes: Vec<Vec<usize>>,
    is_eval_mode: bool,
    /// Dropout 等随机层使用的随机数生成器
    rng: StdRng,
}

impl Sequential {
    /// 创建空模型，默认处于训练模式
    pub fn new(name: &str, input_shape: &[usize]) -> Self {
        Self::with_rng(name, input_shape, StdRng::from_entropy())
    }

    /// 创建空模型，并指定随机层使用的种子
    pub fn new_seeded(name: &str, input_shape: &[usize], seed: u64) -> Self {
        Self::with_rng(name, input_shape, StdRng::seed_from_u64(seed))
    }

    fn with_rng(name: &str, input_shape: &[usize], rng: StdRng) -> Self {
        Self {
            name: name.to_string(),
            input_shape: input_shape.to_vec(),
            layers: Vec::new(),
            output_shapes: Vec::new(),
            is_eval_mode: false,
            rng,
        }
    }

    /// 在末尾追加一层。层的输入须与当前输出形状兼容，否则返回错误且模型保持不变
    pub fn add<L: Into<LayerKind>>(&mut self, layer: L) -> Result<&mut Self, ModelError> {
        let layer = layer.into();
        if self.layers.iter().any(|l| l.name() == layer.name()) {
            return Err(ModelError::InvalidConfig(format!(
                "层名称重复: {}",
                layer.name()
            )));
        }
        let shape = layer.output_shape(self.output_shape())?;
        tracing::debug!(layer = layer.name(), output_shape = ?shape, "添加层");
        self.layers.push(layer);
        self.output_shapes.push(shape);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_shape(&self) -> &[usize] {
        &self.input_shape
    }

    /// 当前的单样本输出形状（空模型即输入形状）
    pub fn output_shape(&self) -> &[usize] {
        self.output_shapes.last().unwrap_or(&self.input_shape)
    }

    pub fn layers(&self) -> &[LayerKind] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [LayerKind] {
        &mut self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    // ========== train/eval 模式 ==========

    pub fn set_train_mode(&mut self) {
        self.is_eval_mode = false;
    }

    pub fn set_eval_mode(&mut self) {
        self.is_eval_mode = true;
    }

    pub fn is_train_mode(&self) -> bool {
        !self.is_eval_mode
    }

    // ========== 前向计算 ==========

    /// 对一个批次`[N, ...input_shape]`做前向计算
    pub fn forward(&mut self, x: &Tensor) -> Result<Tensor, ModelError> {
        if x.dimension() == 0 || x.shape()[1..] != self.input_shape[..] {
            let mut expected = vec![0];
            expected.extend_from_slice(&self.input_shape);
            return Err(ModelError::ShapeMismatch {
                expected,
                got: x.shape().to_vec(),
                message: format!("{}: 输入应为 [N, ..单样本形状]", self.name),
            });
        }
        let train = self.is_train_mode();
        let mut out = x.clone();
        for layer in &self.layers {
            out = layer.forward(&out, train, &mut self.rng)?;
        }
        Ok(out)
    }

    // ========== 参数 ==========

    /// 按层顺序返回全部可训练参数
    pub fn parameters(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }

    pub fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        self.layers
            .iter_mut()
            .flat_map(|l| l.parameters_mut())
            .collect()
    }

    /// 总参数量
    pub fn num_params(&self) -> usize {
        self.layers.iter().map(|l| l.num_params()).sum()
    }

    // ========== 模型描述（describe）==========

    /// 导出模型的描述符（用于序列化、调试）
    pub fn describe(&self) -> ModelDescriptor {
        let mut descriptor = ModelDescriptor::new(&self.name, &self.input_shape);
        for (layer, shape) in self.layers.iter().zip(&self.output_shapes) {
            let params = layer.num_params();
            descriptor.add_layer(LayerDescriptor {
                name: layer.name().to_string(),
                layer_type: layer.descriptor(),
                output_shape: shape.clone(),
                param_count: (!layer.parameters().is_empty()).then_some(params),
            });
        }
        descriptor
    }

    // ========== 模型摘要（summary）==========

    /// 打印模型摘要（类似 Keras 的 `model.summary()`）
    ///
    /// # 示例
    /// ```ignore
    /// model.summary();
    /// // 输出：
    /// // ┌───────────┬──────────┬────────────────┬────────────┐
    /// // │ 层名称    │ 类型     │ 输出形状       │ 参数量     │
    /// // ├───────────┼──────────┼────────────────┼────────────┤
    /// // │ conv2d_1  │ Conv2d   │ [28, 28, 32]   │        320 │
    /// // ...
    /// ```
    pub fn summary(&self) {
        println!("{}", self.summary_string());
    }

    /// 将模型摘要保存到文件
    ///
    /// 根据文件扩展名自动选择格式：
    /// - `.md` → Markdown 表格
    /// - 其他（`.txt` 等）→ Unicode 文本表格
    pub fn save_summary<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        let summary = match path.extension().and_then(|e| e.to_str()) {
            Some("md") => self.summary_markdown(),
            _ => self.summary_string(),
        };
        std::fs::write(path, summary)
            .map_err(|e| ModelError::ComputationError(format!("保存摘要文件失败: {e}")))
    }

    /// 返回模型摘要的 Markdown 格式字符串
    pub fn summary_markdown(&self) -> String {
        let desc = self.describe();
        let mut output = String::new();

        output.push_str(&format!("# 模型摘要: {}\n\n", desc.name));
        output.push_str(&format!("输入形状: {:?}\n\n", desc.input_shape));
        output.push_str("| 层名称 | 类型 | 输出形状 | 参数量 |\n");
        output.push_str("|--------|------|----------|--------|\n");

        for layer in &desc.layers {
            output.push_str(&format!(
                "| {} | {} | {:?} | {} |\n",
                layer.name,
                layer.layer_type.type_name(),
                layer.output_shape,
                layer
                    .param_count
                    .map_or_else(|| "-".to_string(), format_number),
            ));
        }

        let total_params = desc.total_params();
        output.push_str(&format!(
            "\n**总参数量**: {}  \n**可训练参数**: {}\n",
            format_number(total_params),
            format_number(total_params)
        ));

        output
    }

    /// 返回模型摘要字符串（Unicode 文本表格，用于控制台输出）
    pub fn summary_string(&self) -> String {
        let desc = self.describe();

        let name_width = desc
            .layers
            .iter()
            .map(|l| display_width(&l.name))
            .max()
            .unwrap_or(8)
            .max(8);
        let type_width = desc
            .layers
            .iter()
            .map(|l| l.layer_type.type_name().len())
            .max()
            .unwrap_or(8)
            .max(8);
        let shape_width = desc
            .layers
            .iter()
            .map(|l| format!("{:?}", l.output_shape).len())
            .max()
            .unwrap_or(8)
            .max(8);
        let param_width = 10;

        let total_width = name_width + type_width + shape_width + param_width + 13;

        let mut output = String::new();
        let rule = |left: &str, mid: &str, right: &str| {
            format!(
                "{left}{}{mid}{}{mid}{}{mid}{}{right}\n",
                "─".repeat(name_width + 2),
                "─".repeat(type_width + 2),
                "─".repeat(shape_width + 2),
                "─".repeat(param_width + 2),
            )
        };

        // 表头（中文字符占两列，需手动补齐）
        output.push_str(&rule("┌", "┬", "┐"));
        output.push_str(&format!(
            "│ {} │ {} │ {} │ {} │\n",
            pad_display("层名称", name_width),
            pad_display("类型", type_width),
            pad_display("输出形状", shape_width),
            pad_display("参数量", param_width),
        ));
        output.push_str(&rule("├", "┼", "┤"));

        for layer in &desc.layers {
            let param_str = layer
                .param_count
                .map_or_else(|| "-".to_string(), format_number);
            output.push_str(&format!(
                "│ {} │ {:<type_w$} │ {:<shape_w$} │ {:>param_w$} │\n",
                pad_display(&layer.name, name_width),
                layer.layer_type.type_name(),
                format!("{:?}", layer.output_shape),
                param_str,
                type_w = type_width,
                shape_w = shape_width,
                param_w = param_width,
            ));
        }

        output.push_str(&rule("├", "┴", "┤"));

        let total_params = desc.total_params();
        for line in [
            format!("输入形状: {:?}", desc.input_shape),
            format!("总参数量: {}", format_number(total_params)),
            format!("可训练参数: {}", format_number(total_params)),
        ] {
            output.push_str(&format!("│ {} │\n", pad_display(&line, total_width - 4)));
        }

        output.push_str(&format!("└{}┘\n", "─".repeat(total_width - 2)));

        output
    }
}

/// 格式化数字为千分位分隔形式
pub(crate) fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// 终端显示宽度：ASCII 字符占 1 列，其余（中文等）按 2 列计
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

/// 按显示宽度在右侧补空格
fn pad_display(s: &str, width: usize) -> String {
    let padding = width.saturating_sub(display_width(s));
    format!("{s}{}", " ".repeat(padding))
}
