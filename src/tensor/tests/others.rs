use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_sum() {
    let tensor = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    assert_eq!(tensor.sum(), 10.);
}

#[test]
fn test_relu() {
    let tensor = Tensor::new(&[-1., 0., 2.5, -0.1], &[2, 2]);
    assert_eq!(tensor.relu().as_slice(), &[0., 0., 2.5, 0.]);
}

#[test]
fn test_softmax_rows_sum_to_one() {
    let tensor = Tensor::new(&[1., 2., 3., 1000., 1000., 1000.], &[2, 3]);
    let probs = tensor.softmax();
    assert_eq!(probs.shape(), &[2, 3]);

    let p = probs.as_slice();
    assert_abs_diff_eq!(p[0] + p[1] + p[2], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(p[0], 0.09003057, epsilon = 1e-6);
    assert_abs_diff_eq!(p[2], 0.66524096, epsilon = 1e-6);
    // 大数值时不应溢出
    for v in &p[3..] {
        assert_abs_diff_eq!(*v, 1.0 / 3.0, epsilon = 1e-6);
    }
}

#[test]
fn test_argmax_rows() {
    let tensor = Tensor::new(&[0.1, 0.7, 0.2, 0.9, 0.05, 0.05], &[2, 3]);
    assert_eq!(tensor.argmax_rows(), vec![1, 0]);
}

#[test]
fn test_mat_mul() {
    let a = Tensor::new(&[1., 2., 3., 4., 5., 6.], &[2, 3]);
    let b = Tensor::new(&[1., 0., 0., 1., 1., 1.], &[3, 2]);
    let c = a.mat_mul(&b).unwrap();
    assert_eq!(c.shape(), &[2, 2]);
    assert_eq!(c.as_slice(), &[4., 5., 10., 11.]);

    let err = a.mat_mul(&a).unwrap_err();
    assert_eq!(
        err,
        TensorError::OperatorError {
            operator: Operator::MatMul,
            tensor1_shape: vec![2, 3],
            tensor2_shape: vec![2, 3],
        }
    );
}

#[test]
fn test_add_bias() {
    let x = Tensor::new(&[1., 2., 3., 4.], &[2, 2]);
    let b = Tensor::new(&[10., 20.], &[2]);
    assert_eq!(x.add_bias(&b).unwrap().as_slice(), &[11., 22., 13., 24.]);

    let wrong = Tensor::new(&[1., 2., 3.], &[3]);
    assert!(x.add_bias(&wrong).is_err());
}
