use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::nn::{Dropout, Flatten, Layer, ModelError};
use crate::tensor::Tensor;

#[test]
fn test_dropout_eval_mode_is_identity() -> Result<(), ModelError> {
    let dropout = Dropout::new("dropout", 0.5)?;
    let x = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let y = dropout.forward(&x, false, &mut StdRng::seed_from_u64(1))?;
    assert_eq!(y, x);
    Ok(())
}

#[test]
fn test_dropout_train_mode_masks_and_rescales() -> Result<(), ModelError> {
    let dropout = Dropout::new("dropout", 0.5)?;
    let x = Tensor::ones(&[10, 100]);
    let y = dropout.forward(&x, true, &mut StdRng::seed_from_u64(1))?;

    assert_eq!(y.shape(), x.shape());
    assert!(y.as_slice().iter().all(|&v| v == 0.0 || v == 2.0));
    let dropped = y.as_slice().iter().filter(|&&v| v == 0.0).count();
    assert!((400..=600).contains(&dropped), "丢弃数量为{dropped}");
    Ok(())
}

#[test]
fn test_dropout_keeps_shape_and_has_no_params() -> Result<(), ModelError> {
    let dropout = Dropout::new("dropout", 0.25)?;
    assert_eq!(dropout.output_shape(&[13, 13, 32])?, vec![13, 13, 32]);
    assert_eq!(dropout.num_params(), 0);
    Ok(())
}

#[test]
fn test_dropout_rate_out_of_range() {
    for rate in [-0.1, 1.0, 1.5] {
        assert!(matches!(
            Dropout::new("dropout", rate),
            Err(ModelError::InvalidConfig(_))
        ));
    }
}

#[test]
fn test_flatten() -> Result<(), ModelError> {
    let flatten = Flatten::new("flatten");
    assert_eq!(flatten.output_shape(&[13, 13, 32])?, vec![5408]);

    let data = (0..36).map(|v| v as f32).collect::<Vec<_>>();
    let x = Tensor::new(&data, &[2, 3, 3, 2]);
    let y = flatten.forward(&x, false, &mut StdRng::seed_from_u64(0))?;
    assert_eq!(y.shape(), &[2, 18]);
    assert_eq!(y.as_slice(), x.as_slice());
    Ok(())
}

#[test]
fn test_flatten_scalar_input_is_error() {
    let flatten = Flatten::new("flatten");
    let scalar = Tensor::new(&[1.], &[]);
    assert!(matches!(
        flatten.forward(&scalar, false, &mut StdRng::seed_from_u64(0)),
        Err(ModelError::ShapeMismatch { .. })
    ));
}
