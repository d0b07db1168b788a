use crate::errors::TensorError;
use crate::tensor::Tensor;
use std::ops::Div;

impl Tensor {
    /// 张量除以标量，除数为零时返回错误
    pub fn try_div(&self, scalar: f32) -> Result<Tensor, TensorError> {
        if scalar == 0. {
            return Err(TensorError::DivByZero);
        }
        Ok(Tensor {
            data: &self.data / scalar,
        })
    }
}

//↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 / f32↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓
impl Div<f32> for Tensor {
    type Output = Tensor;

    fn div(mut self, scalar: f32) -> Tensor {
        if scalar == 0. {
            panic!("{}", TensorError::DivByZero);
        }
        self.data.mapv_inplace(|x| x / scalar);
        self
    }
}
impl<'a> Div<f32> for &'a Tensor {
    type Output = Tensor;

    fn div(self, scalar: f32) -> Tensor {
        self.try_div(scalar).unwrap_or_else(|e| panic!("{}", e))
    }
}
//↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 / f32↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑

