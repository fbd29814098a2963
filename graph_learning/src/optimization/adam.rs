use super::Optimizer;
use crate::{MlErr, Result};

/// The Adam optimizer with L2 weight decay: the decay term `weight_decay * p`
/// is added to the gradient before updating the moment estimates.
#[derive(Debug)]
pub struct Adam {
    learning_rate: f32,
    weight_decay: f32,
    beta1: f32,
    beta2: f32,
    beta1_t: f32,
    beta2_t: f32,
    v: Box<[f32]>,
    s: Box<[f32]>,
    epsilon: f32,
}

impl Adam {
    pub const BETA1: f32 = 0.9;
    pub const BETA2: f32 = 0.999;
    pub const EPSILON: f32 = 1e-8;

    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `weight_decay` - The L2 penalty coefficient.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    ///
    /// # Returns
    /// A new `Adam` instance.
    pub fn new(
        len: usize,
        learning_rate: f32,
        weight_decay: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    ) -> Self {
        Self {
            learning_rate,
            weight_decay,
            beta1,
            beta2,
            beta1_t: 1.,
            beta2_t: 1.,
            v: vec![0.; len].into_boxed_slice(),
            s: vec![0.; len].into_boxed_slice(),
            epsilon,
        }
    }

    /// Creates a new `Adam` optimizer with the usual `beta1`, `beta2` and `epsilon`.
    pub fn with_defaults(len: usize, learning_rate: f32, weight_decay: f32) -> Self {
        Self::new(
            len,
            learning_rate,
            weight_decay,
            Self::BETA1,
            Self::BETA2,
            Self::EPSILON,
        )
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        for (what, got) in [("grad", grad.len()), ("params", params.len())] {
            if got != self.v.len() {
                return Err(MlErr::SizeMismatch {
                    what,
                    got,
                    expected: self.v.len(),
                });
            }
        }

        let Self {
            learning_rate: lr,
            weight_decay: wd,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2_sqrt = (1. - self.beta2_t).sqrt();
        let step_size = lr / bc1;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.v.iter_mut())
            .zip(self.s.iter_mut())
            .for_each(|(((p, g), v), s)| {
                let g = g + wd * *p;
                *v = b1 * *v + (1. - b1) * g;
                *s = b2 * *s + (1. - b2) * g.powi(2);
                *p -= step_size * *v / (s.sqrt() / bc2_sqrt + eps);
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_the_learning_rate() {
        let mut adam = Adam::with_defaults(3, 0.1, 0.0);
        let mut params = [1.0, 1.0, 1.0];

        adam.update_params(&[2.0, -0.5, 0.0], &mut params).unwrap();

        assert!((params[0] - 0.9).abs() < 1e-5);
        assert!((params[1] - 1.1).abs() < 1e-5);
        assert_eq!(params[2], 1.0);
    }

    #[test]
    fn weight_decay_pulls_towards_zero() {
        let mut adam = Adam::with_defaults(2, 0.01, 0.5);
        let mut params = [3.0, -3.0];

        for _ in 0..10 {
            adam.update_params(&[0.0, 0.0], &mut params).unwrap();
        }

        assert!(params[0] < 3.0 && params[0] > 0.0);
        assert!(params[1] > -3.0 && params[1] < 0.0);
    }

    #[test]
    fn minimizes_a_quadratic() {
        let mut adam = Adam::with_defaults(1, 0.1, 0.0);
        let mut params = [5.0];

        for _ in 0..500 {
            let grad = [2.0 * (params[0] - 2.0)];
            adam.update_params(&grad, &mut params).unwrap();
        }

        assert!((params[0] - 2.0).abs() < 1e-2);
    }

    #[test]
    fn size_mismatch_fails() {
        let mut adam = Adam::with_defaults(2, 0.1, 0.0);
        let mut params = [0.0; 2];

        assert!(matches!(
            adam.update_params(&[1.0], &mut params),
            Err(MlErr::SizeMismatch { what: "grad", .. })
        ));
    }
}
