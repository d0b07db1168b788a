use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::nn::{Activation, Layer, Linear, ModelError};
use crate::tensor::Tensor;

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn linear(activation: Activation) -> Linear {
    let mut fc = Linear::new("fc", 3, 2, activation, &mut rng()).unwrap();
    #[rustfmt::skip]
    let weights = Tensor::new(&[
        1.0, 0.0,
        0.0, 1.0,
        1.0, 1.0,
    ], &[3, 2]);
    fc.set_weights(weights, Tensor::new(&[0.5, -1.0], &[2])).unwrap();
    fc
}

#[test]
fn test_linear_forward() -> Result<(), ModelError> {
    let x = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let y = linear(Activation::Linear).forward(&x, false, &mut rng())?;

    assert_eq!(y.shape(), &[2, 2]);
    assert_eq!(y.as_slice(), &[4.5, 4.0, 10.5, 10.0]);
    Ok(())
}

#[test]
fn test_linear_softmax_rows_sum_to_one() -> Result<(), ModelError> {
    let x = Tensor::new(&[1.0, 2.0, 3.0, -4.0, 5.0, 0.0], &[2, 3]);
    let y = linear(Activation::Softmax).forward(&x, false, &mut rng())?;

    for row in y.as_slice().chunks(2) {
        assert_abs_diff_eq!(row.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
    }
    // 第一行 logits 为 [4.5, 4.0]
    assert_abs_diff_eq!(y.as_slice()[0], 0.62245935, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_linear_shapes_and_params() -> Result<(), ModelError> {
    let fc = Linear::new("dense_1", 5408, 512, Activation::ReLU, &mut rng())?;
    assert_eq!(fc.output_shape(&[5408])?, vec![512]);
    assert_eq!(fc.num_params(), 5408 * 512 + 512);
    assert!(fc.output_shape(&[13, 13, 32]).is_err());

    let x = Tensor::zeros(&[2, 4]);
    assert!(linear(Activation::Linear).forward(&x, false, &mut rng()).is_err());
    Ok(())
}

#[test]
fn test_linear_invalid_config() {
    assert!(matches!(
        Linear::new("fc", 3, 0, Activation::Linear, &mut rng()),
        Err(ModelError::InvalidConfig(_))
    ));
}
