use ndarray::{Array2, ArrayView1, ArrayView2};

/// A classification loss over per-class scores and class-index targets.
pub trait LossFn {
    /// The mean loss over the rows of `y_pred`.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> f32;

    /// The derivative of `loss` with respect to every score in `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Array2<f32>;
}
