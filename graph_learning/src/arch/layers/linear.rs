use ndarray::{linalg, prelude::*};
use rand::Rng;

use crate::{MlErr, Result, initialization::RandParamGen};

/// An affine map `x W + b` whose parameters live in an external flat slice,
/// laid out as the `(input, output)` weights in row-major order followed by
/// the `output` biases, when enabled.
#[derive(Debug, Clone)]
pub struct Linear {
    dim: (usize, usize),
    bias: bool,
    size: usize,
}

impl Linear {
    /// Creates a new `Linear` layer.
    ///
    /// # Arguments
    /// * `dim` - The `(input, output)` dimensions.
    /// * `bias` - Whether to add a learnable bias.
    pub fn new(dim: (usize, usize), bias: bool) -> Self {
        let w_size = dim.0 * dim.1;
        let size = if bias { w_size + dim.1 } else { w_size };

        Self { dim, bias, size }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Initializes the weights with Xavier uniform and the biases with zeros.
    pub fn init_params<R: Rng>(&self, params: &mut [f32], rng: &mut R) -> Result<()> {
        self.check_len("params", params.len())?;

        let (w, b) = params.split_at_mut(self.w_size());
        RandParamGen::xavier_uniform(self.dim.0, self.dim.1)?.fill(rng, w);
        b.fill(0.0);
        Ok(())
    }

    /// Computes `x W + b` for every row of `x`.
    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_len("params", params.len())?;
        self.check_input(x.ncols())?;

        let (w, b) = self.view_params(params)?;
        let mut z = Array2::zeros((x.nrows(), self.dim.1));
        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut z);

        if let Some(b) = b {
            z += &b;
        }

        Ok(z)
    }

    /// Writes the gradient of the loss with respect to this layer's parameters.
    ///
    /// # Arguments
    /// * `grad` - The gradient slice, it gets overwritten.
    /// * `x` - The input rows the loss was computed on.
    /// * `d` - The derivative of the loss with respect to the output of those rows.
    pub fn backward(&self, grad: &mut [f32], x: ArrayView2<f32>, d: ArrayView2<f32>) -> Result<()> {
        self.check_len("grad", grad.len())?;
        self.check_input(x.ncols())?;

        if d.dim() != (x.nrows(), self.dim.1) {
            return Err(MlErr::SizeMismatch {
                what: "output delta",
                got: d.len(),
                expected: x.nrows() * self.dim.1,
            });
        }

        let (mut dw, db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &d, 0.0, &mut dw);

        if let Some(mut db) = db {
            db.assign(&d.sum_axis(Axis(0)));
        }

        Ok(())
    }

    fn w_size(&self) -> usize {
        self.dim.0 * self.dim.1
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        if got != self.size {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected: self.size,
            });
        }

        Ok(())
    }

    fn check_input(&self, got: usize) -> Result<()> {
        if got != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "input columns",
                got,
                expected: self.dim.0,
            });
        }

        Ok(())
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, Option<ArrayViewMut1<'a, f32>>)> {
        let (dw_raw, db_raw) = grad.split_at_mut(self.w_size());
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).map_err(|_| self.shape_err())?;
        let db = self.bias.then(|| ArrayViewMut1::from(db_raw));
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, Option<ArrayView1<'a, f32>>)> {
        let (w_raw, b_raw) = params.split_at(self.w_size());
        let w = ArrayView2::from_shape(self.dim, w_raw).map_err(|_| self.shape_err())?;
        let b = self.bias.then(|| ArrayView1::from(b_raw));
        Ok((w, b))
    }

    fn shape_err(&self) -> MlErr {
        MlErr::SizeMismatch {
            what: "weights",
            got: self.size,
            expected: self.w_size(),
        }
    }
}
