use crate::errors::TensorError;
use crate::tensor::Tensor;

#[test]
fn test_reshape() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let reshaped = tensor.reshape(&[3, 2, 1]);
    assert_eq!(reshaped.shape(), &[3, 2, 1]);
    assert_eq!(reshaped.as_slice(), tensor.as_slice());
}

#[test]
#[should_panic(expected = "张量形状不兼容")]
fn test_reshape_with_incompatible_shape() {
    let tensor = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    tensor.reshape(&[4, 2]);
}

#[test]
fn test_try_reshape_with_incompatible_shape() {
    let tensor = Tensor::new(&[1., 2., 3., 4.], &[4]);
    assert_eq!(
        tensor.try_reshape(&[3]),
        Err(TensorError::IncompatibleShape)
    );
}

#[test]
fn test_flatten_batch() {
    let tensor = Tensor::zeros(&[2, 3, 4, 5]);
    assert_eq!(tensor.flatten_batch().shape(), &[2, 60]);
}

#[test]
fn test_slice_batch() {
    let data = (0..12).map(|x| x as f32).collect::<Vec<_>>();
    let tensor = Tensor::new(&data, &[4, 3]);

    let head = tensor.slice_batch(0..2);
    assert_eq!(head.shape(), &[2, 3]);
    assert_eq!(head.as_slice(), &[0., 1., 2., 3., 4., 5.]);

    let tail = tensor.slice_batch(3..10);
    assert_eq!(tail.shape(), &[1, 3]);
    assert_eq!(tail.as_slice(), &[9., 10., 11.]);

    let empty = tensor.slice_batch(5..8);
    assert_eq!(empty.shape(), &[0, 3]);
}

#[test]
fn test_stack() {
    let a = Tensor::new(&[1., 2.], &[2, 1]);
    let b = Tensor::new(&[3., 4.], &[2, 1]);
    let stacked = Tensor::stack(&[&a, &b]).unwrap();
    assert_eq!(stacked.shape(), &[2, 2, 1]);
    assert_eq!(stacked.as_slice(), &[1., 2., 3., 4.]);

    assert_eq!(Tensor::stack(&[]), Err(TensorError::EmptyList));
    let c = Tensor::new(&[1., 2.], &[2]);
    assert_eq!(
        Tensor::stack(&[&a, &c]),
        Err(TensorError::IncompatibleShape)
    );
}

#[test]
fn test_try_reshape_with_overflowing_shape() {
    let tensor = Tensor::new(&[1., 2., 3., 4.], &[4]);
    assert_eq!(
        tensor.try_reshape(&[usize::MAX, 2]).unwrap_err(),
        TensorError::IncompatibleShape
    );
}

#[test]
fn test_try_flatten_batch() {
    let tensor = Tensor::zeros(&[3, 2, 2, 1]);
    assert_eq!(tensor.try_flatten_batch().unwrap().shape(), &[3, 4]);

    let scalar = Tensor::new(&[1.], &[]);
    assert!(matches!(
        scalar.try_flatten_batch(),
        Err(TensorError::ValueMustSatisfyComparison { .. })
    ));
}

#[test]
#[should_panic(expected = "数据长度为3")]
fn test_new_with_mismatched_data() {
    Tensor::new(&[1., 2., 3.], &[2, 2]);
}
