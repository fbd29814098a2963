use ndarray::{Array2, ArrayView1, ArrayView2, Axis, Zip};

use super::LossFn;

/// Softmax cross-entropy loss, averaged over the rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossEntropy;

impl CrossEntropy {
    /// Returns a new `CrossEntropy`.
    pub fn new() -> Self {
        Self
    }
}

/// Row-wise softmax, shifted by the row maximum so large scores don't overflow.
fn softmax(y_pred: ArrayView2<f32>) -> Array2<f32> {
    let mut p = y_pred.to_owned();

    for mut row in p.axis_iter_mut(Axis(0)) {
        let max = row.fold(f32::NEG_INFINITY, |m, &z| m.max(z));
        row.mapv_inplace(|z| (z - max).exp());
        let sum = row.sum();
        row /= sum;
    }

    p
}

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> f32 {
        if y_pred.nrows() == 0 {
            return 0.0;
        }

        let total: f32 = y_pred
            .axis_iter(Axis(0))
            .zip(y)
            .map(|(row, &class)| {
                let max = row.fold(f32::NEG_INFINITY, |m, &z| m.max(z));
                let log_sum = row.iter().map(|&z| (z - max).exp()).sum::<f32>().ln() + max;
                log_sum - row[class]
            })
            .sum();

        total / y_pred.nrows() as f32
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Array2<f32> {
        let n = y_pred.nrows().max(1) as f32;
        let mut d = softmax(y_pred);

        Zip::from(d.axis_iter_mut(Axis(0)))
            .and(&y)
            .for_each(|mut row, &class| row[class] -= 1.0);

        d /= n;
        d
    }
}
