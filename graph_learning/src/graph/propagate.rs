use ndarray::{Array2, ArrayView2, ArrayViewMut1, Axis, Zip};

use super::Graph;
use crate::{MlErr, Result};

/// How the row aggregation of a propagation step is executed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Compute {
    /// One row after the other on the calling thread.
    #[default]
    Serial,
    /// Rows split across the rayon thread pool.
    Parallel,
}

impl Graph {
    /// Smooths `features` over the graph `k` times with the symmetric normalized
    /// adjacency, that is, `H <- D^{-1/2} A^T D^{-1/2} H` where `D` holds the
    /// in-degrees clamped to a minimum of one.
    ///
    /// Every destination row only reads source rows of the previous step, so
    /// both `Compute` modes produce the exact same result.
    ///
    /// # Arguments
    /// * `features` - A `(num_nodes, dim)` feature matrix.
    /// * `k` - The amount of propagation steps, zero returns a copy of `features`.
    /// * `compute` - How to run the aggregation.
    ///
    /// # Returns
    /// The propagated features or an error if `features` has the wrong amount of rows.
    pub fn propagate(
        &self,
        features: ArrayView2<f32>,
        k: usize,
        compute: Compute,
    ) -> Result<Array2<f32>> {
        if features.nrows() != self.num_nodes {
            return Err(MlErr::SizeMismatch {
                what: "feature rows",
                got: features.nrows(),
                expected: self.num_nodes,
            });
        }

        let norm: Vec<f32> = self
            .in_degrees()
            .into_iter()
            .map(|d| (d.max(1) as f32).powf(-0.5))
            .collect();

        let (offsets, sources) = self.in_adjacency();
        let mut h = features.to_owned();

        for _ in 0..k {
            scale_rows(&mut h, &norm);

            let mut out = Array2::zeros(h.raw_dim());
            let aggregate = |v: usize, mut row: ArrayViewMut1<f32>| {
                for &u in &sources[offsets[v]..offsets[v + 1]] {
                    row.scaled_add(1.0, &h.row(u));
                }
            };

            let zip = Zip::indexed(out.rows_mut());
            match compute {
                Compute::Serial => zip.for_each(&aggregate),
                Compute::Parallel => zip.par_for_each(&aggregate),
            }

            scale_rows(&mut out, &norm);
            h = out;
        }

        Ok(h)
    }
}

fn scale_rows(h: &mut Array2<f32>, norm: &[f32]) {
    for (mut row, &n) in h.axis_iter_mut(Axis(0)).zip(norm) {
        row *= n;
    }
}
