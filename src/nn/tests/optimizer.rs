use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::nn::{Activation, Adadelta, LayerKind, Linear, ModelError, Optimizer, Sequential};
use crate::tensor::Tensor;

fn tiny_network() -> Sequential {
    let mut fc = Linear::new("fc", 1, 1, Activation::Linear, &mut StdRng::seed_from_u64(0)).unwrap();
    fc.set_weights(Tensor::new(&[1.0], &[1, 1]), Tensor::new(&[0.0], &[1]))
        .unwrap();
    let mut network = Sequential::new_seeded("tiny", &[1], 0);
    network.add(fc).unwrap();
    network
}

fn weight(network: &Sequential) -> f32 {
    match &network.layers()[0] {
        LayerKind::Linear(fc) => fc.weights().as_slice()[0],
        other => panic!("期望 Linear，实际为 {other:?}"),
    }
}

#[test]
fn test_adadelta_defaults() {
    let optimizer = Adadelta::default();
    assert_abs_diff_eq!(optimizer.learning_rate(), 1.0);
    assert_abs_diff_eq!(optimizer.rho(), 0.95);
    assert_abs_diff_eq!(optimizer.epsilon(), 1e-7);
}

#[test]
fn test_adadelta_single_step() -> Result<(), ModelError> {
    let mut network = tiny_network();
    let mut optimizer = Adadelta::default();
    let grads = [Tensor::new(&[0.5], &[1, 1]), Tensor::new(&[0.0], &[1])];

    optimizer.step(&mut network, &grads)?;

    // E[g²] = 0.05 * 0.25；Δ = sqrt(1e-7) / sqrt(E[g²] + 1e-7) * 0.5
    assert_abs_diff_eq!(weight(&network), 0.99858579, epsilon = 1e-5);
    // 零梯度不改变偏置
    assert_eq!(network.parameters()[1].as_slice(), &[0.0]);
    Ok(())
}

#[test]
fn test_adadelta_steps_accumulate() -> Result<(), ModelError> {
    let mut network = tiny_network();
    let mut optimizer = Adadelta::default();
    let grads = [Tensor::new(&[0.5], &[1, 1]), Tensor::new(&[0.0], &[1])];

    optimizer.step(&mut network, &grads)?;
    let after_one = weight(&network);
    optimizer.step(&mut network, &grads)?;
    let after_two = weight(&network);

    // 正梯度使权重持续减小，且第二步的步长大于第一步（E[Δθ²] 已累积）
    assert!(after_two < after_one);
    assert!(1.0 - after_one < after_one - after_two);

    // 重置后状态清空，第一步的步长与全新优化器一致
    optimizer.reset();
    let mut fresh = tiny_network();
    optimizer.step(&mut fresh, &grads)?;
    assert_abs_diff_eq!(weight(&fresh), after_one, epsilon = 1e-7);
    Ok(())
}

#[test]
fn test_adadelta_learning_rate() -> Result<(), ModelError> {
    let mut network = tiny_network();
    let mut optimizer = Adadelta::default();
    optimizer.set_learning_rate(0.0);
    let grads = [Tensor::new(&[0.5], &[1, 1]), Tensor::new(&[0.3], &[1])];
    optimizer.step(&mut network, &grads)?;
    assert_eq!(weight(&network), 1.0);
    Ok(())
}

#[test]
fn test_adadelta_gradient_mismatch() {
    let mut network = tiny_network();
    let mut optimizer = Adadelta::default();

    let too_few = [Tensor::new(&[0.5], &[1, 1])];
    assert!(matches!(
        optimizer.step(&mut network, &too_few),
        Err(ModelError::ShapeMismatch { .. })
    ));

    let wrong_shape = [Tensor::new(&[0.5, 0.5], &[1, 2]), Tensor::new(&[0.0], &[1])];
    assert!(matches!(
        optimizer.step(&mut network, &wrong_shape),
        Err(ModelError::ShapeMismatch { .. })
    ));
    assert_eq!(weight(&network), 1.0);
}
