/*
 * @Author       : 老董
 * @Description  : Adadelta 优化器
 *
 * - E[g²]  = ρ * E[g²] + (1 - ρ) * g²
 * - Δθ     = sqrt(E[Δθ²] + ε) / sqrt(E[g²] + ε) * g
 * - E[Δθ²] = ρ * E[Δθ²] + (1 - ρ) * Δθ²
 * - θ      = θ - α * Δθ
 */

use ndarray::Zip;

use super::Optimizer;
use crate::nn::error::ModelError;
use crate::nn::sequential::Sequential;
use crate::tensor::Tensor;

/// Adadelta 优化器
#[derive(Debug, Clone)]
pub struct Adadelta {
    /// 学习率
    lr: f32,
    /// 衰减系数 ρ
    rho: f32,
    /// 数值稳定项
    epsilon: f32,
    /// 梯度平方的滑动平均（按参数顺序索引）
    accum_grad: Vec<Tensor>,
    /// 更新量平方的滑动平均（按参数顺序索引）
    accum_update: Vec<Tensor>,
}

impl Default for Adadelta {
    fn default() -> Self {
        Self::new(1.0, 0.95, 1e-7)
    }
}

impl Adadelta {
    pub fn new(lr: f32, rho: f32, epsilon: f32) -> Self {
        Self {
            lr,
            rho,
            epsilon,
            accum_grad: Vec::new(),
            accum_update: Vec::new(),
        }
    }

    pub fn rho(&self) -> f32 {
        self.rho
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    fn ensure_state(&mut self, params: &[&mut Tensor]) {
        let matches = self.accum_grad.len() == params.len()
            && self
                .accum_grad
                .iter()
                .zip(params)
                .all(|(a, p)| a.is_same_shape(p));
        if !matches {
            self.accum_grad = params.iter().map(|p| Tensor::zeros(p.shape())).collect();
            self.accum_update = self.accum_grad.clone();
        }
    }
}

impl Optimizer for Adadelta {
    fn step(&mut self, model: &mut Sequential, grads: &[Tensor]) -> Result<(), ModelError> {
        let mut params = model.parameters_mut();
        if params.len() != grads.len() {
            return Err(ModelError::ShapeMismatch {
                expected: vec![params.len()],
                got: vec![grads.len()],
                message: "梯度数量须与参数数量一致".to_string(),
            });
        }
        if let Some((p, g)) = params
            .iter()
            .zip(grads)
            .find(|(p, g)| !p.is_same_shape(g))
        {
            return Err(ModelError::ShapeMismatch {
                expected: p.shape().to_vec(),
                got: g.shape().to_vec(),
                message: "梯度形状须与参数形状一致".to_string(),
            });
        }
        self.ensure_state(&params);

        let (lr, rho, eps) = (self.lr, self.rho, self.epsilon);
        for (((param, grad), acc_g), acc_u) in params
            .iter_mut()
            .zip(grads)
            .zip(self.accum_grad.iter_mut())
            .zip(self.accum_update.iter_mut())
        {
            Zip::from(param.view_mut())
                .and(grad.view())
                .and(acc_g.view_mut())
                .and(acc_u.view_mut())
                .for_each(|p, &g, a_g, a_u| {
                    *a_g = rho * *a_g + (1.0 - rho) * g * g;
                    let delta = ((*a_u + eps).sqrt() / (*a_g + eps).sqrt()) * g;
                    *a_u = rho * *a_u + (1.0 - rho) * delta * delta;
                    *p -= lr * delta;
                });
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.accum_grad.clear();
        self.accum_update.clear();
    }
}
