use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::nn::{Layer, MaxPool2d, ModelError};
use crate::tensor::Tensor;

#[test]
fn test_max_pool2d_forward() -> Result<(), ModelError> {
    let pool = MaxPool2d::new("pool", (2, 2), None)?;
    let data = (1..=16).map(|v| v as f32).collect::<Vec<_>>();
    let x = Tensor::new(&data, &[1, 4, 4, 1]);

    let y = pool.forward(&x, false, &mut StdRng::seed_from_u64(0))?;
    assert_eq!(y.shape(), &[1, 2, 2, 1]);
    assert_eq!(y.as_slice(), &[6.0, 8.0, 14.0, 16.0]);
    Ok(())
}

#[test]
fn test_max_pool2d_keeps_channels_separate() -> Result<(), ModelError> {
    let pool = MaxPool2d::new("pool", (2, 2), None)?;
    // 2x2 样本、2 个通道：通道 0 递增，通道 1 递减
    #[rustfmt::skip]
    let x = Tensor::new(&[
        1.0, -1.0,   2.0, -2.0,
        3.0, -3.0,   4.0, -4.0,
    ], &[1, 2, 2, 2]);

    let y = pool.forward(&x, true, &mut StdRng::seed_from_u64(0))?;
    assert_eq!(y.shape(), &[1, 1, 1, 2]);
    assert_eq!(y.as_slice(), &[4.0, -1.0]);
    Ok(())
}

#[test]
fn test_max_pool2d_output_shape() -> Result<(), ModelError> {
    let pool = MaxPool2d::new("pool", (2, 2), None)?;
    assert_eq!(pool.output_shape(&[26, 26, 32])?, vec![13, 13, 32]);
    // 奇数尺寸向下取整
    assert_eq!(pool.output_shape(&[5, 5, 1])?, vec![2, 2, 1]);
    assert!(pool.output_shape(&[1, 5, 1]).is_err());
    assert!(pool.output_shape(&[4, 4]).is_err());
    assert_eq!(pool.num_params(), 0);

    let strided = MaxPool2d::new("pool", (3, 3), Some((1, 1)))?;
    assert_eq!(strided.output_shape(&[5, 5, 2])?, vec![3, 3, 2]);
    Ok(())
}

#[test]
fn test_max_pool2d_invalid_config() {
    assert!(matches!(
        MaxPool2d::new("pool", (0, 2), None),
        Err(ModelError::InvalidConfig(_))
    ));
}
