use rand::Rng;
use rand_distr::{Distribution, Uniform, uniform::Error as UniformError};

use crate::{MlErr, Result};

/// A parameter generator that follows a certain probabilistic distribution.
pub struct RandParamGen<D: Distribution<f32>> {
    distribution: D,
}

impl<D: Distribution<f32>> RandParamGen<D> {
    /// Creates a new `RandParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `distribution` - The distribution to sample the random numbers from.
    pub fn new(distribution: D) -> Self {
        Self { distribution }
    }

    /// Overwrites every value of `params` with a new sample.
    pub fn fill<R: Rng>(&self, rng: &mut R, params: &mut [f32]) {
        for p in params {
            *p = self.distribution.sample(rng);
        }
    }
}

impl RandParamGen<Uniform<f32>> {
    /// Creates a new `RandParamGen` with a uniform distribution in `[low, high)`.
    ///
    /// # Returns
    /// An error if the range is invalid (low >= high).
    pub fn uniform(low: f32, high: f32) -> Result<Self> {
        Ok(Self::new(Uniform::new(low, high)?))
    }

    /// Creates a new `RandParamGen` using Xavier uniform initialization.
    ///
    /// # Arguments
    /// * `fan_in` - The number of input units in the weight tensor.
    /// * `fan_out` - The number of output units in the weight tensor.
    ///
    /// # Returns
    /// An error if the calculated range is invalid.
    pub fn xavier_uniform(fan_in: usize, fan_out: usize) -> Result<Self> {
        let range = (6. / (fan_in + fan_out) as f32).sqrt();
        Self::uniform(-range, range)
    }
}

impl From<UniformError> for MlErr {
    fn from(value: UniformError) -> Self {
        Self::InvalidInit(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn xavier_samples_stay_in_range() {
        let init = RandParamGen::xavier_uniform(500, 3).unwrap();
        let bound = (6f32 / 503.).sqrt();
        let mut params = vec![0.0; 1000];

        init.fill(&mut StdRng::seed_from_u64(42), &mut params);

        assert!(params.iter().all(|p| (-bound..bound).contains(p)));
        assert!(params.iter().any(|&p| p != 0.0));
    }

    #[test]
    fn empty_layer_is_an_invalid_range() {
        assert!(matches!(
            RandParamGen::xavier_uniform(0, 0),
            Err(MlErr::InvalidInit(_))
        ));
    }

    #[test]
    fn same_seed_same_params() {
        let init = RandParamGen::uniform(-1., 1.).unwrap();
        let mut a = vec![0.0; 16];
        let mut b = vec![0.0; 16];

        init.fill(&mut StdRng::seed_from_u64(3), &mut a);
        init.fill(&mut StdRng::seed_from_u64(3), &mut b);
        assert_eq!(a, b);
    }
}
