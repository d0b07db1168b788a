use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 数字比较用
    #[error("{value_name}须{operator}{threshold}")]
    ValueMustSatisfyComparison {
        value_name: String,
        operator: ComparisonOperator,
        threshold: usize,
    },
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },
    // 数据长度与形状不符
    #[error("数据长度为{data_len}，与形状{shape:?}所需的元素数量不一致")]
    DataShapeMismatch { data_len: usize, shape: Vec<usize> },

    #[error("张量列表为空")]
    EmptyList,
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("除数为零")]
    DivByZero,
}
