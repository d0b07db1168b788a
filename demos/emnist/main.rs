/*
 * @Author       : 老董
 * @Description  : EMNIST 示例：加载 .mat 压缩包，构建分类模型并打印摘要，
 *                 随后用（未训练的）模型对几个测试样本做推理
 *
 * 运行：
 *   cargo run --release --example emnist -- data/emnist-byclass.mat
 *   RUST_LOG=debug cargo run --release --example emnist
 */

use std::error::Error;

use emnist_torch::data::transforms::render_ascii;
use emnist_torch::data::{EmnistOptions, load_data};
use emnist_torch::nn::build_model;
use tracing_subscriber::EnvFilter;

const DEFAULT_ARCHIVE: &str = "data/emnist-byclass.mat";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let archive = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ARCHIVE.to_string());

    let options = EmnistOptions::new().max_samples(Some(6_000));
    let bundle = load_data(&archive, &options)?;
    println!(
        "训练集: {:?}，测试集: {:?}，类别数: {}",
        bundle.train.images.shape(),
        bundle.test.images.shape(),
        bundle.num_classes
    );

    let mut model = build_model(&bundle)?;

    if bundle.test.is_empty() {
        return Ok(());
    }
    let first = bundle.test.images.slice_batch(0..1);
    let (h, w) = (bundle.height(), bundle.width());
    println!("{}", render_ascii(&first.reshape(&[h, w, 1]), 0.5)?);

    let samples = bundle.test.images.slice_batch(0..8);
    let predicted = model.predict_classes(&samples)?;
    let expected: Vec<usize> = bundle.test.labels.iter().take(8).map(|&l| l as usize).collect();
    println!("真实: {}", bundle.mapping.decode(&expected));
    println!("预测: {}", bundle.mapping.decode(&predicted));

    Ok(())
}
