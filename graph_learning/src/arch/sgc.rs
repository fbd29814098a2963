use log::debug;
use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;

use super::{Mode, Model, layers::Linear};
use crate::{
    MlErr, Result,
    graph::{Compute, Graph},
};

/// Simplified graph convolution: `k` steps of symmetric normalized propagation
/// followed by a single linear layer.
///
/// The propagation has no parameters, so it is computed on the first forward
/// pass and reused afterwards. The cache belongs to the first graph and
/// features the model sees, a model must not be shared between graphs.
#[derive(Debug, Clone)]
pub struct Sgc {
    k: usize,
    linear: Linear,
    compute: Compute,
    mode: Mode,

    // Forward metadata
    propagated: Option<Array2<f32>>,
    recorded: bool,
}

impl Sgc {
    /// Creates a new `Sgc`.
    ///
    /// # Arguments
    /// * `in_feats` - The size of each node's feature vector.
    /// * `n_classes` - The amount of classes to score.
    /// * `k` - The amount of propagation steps.
    /// * `bias` - Whether the linear layer has a bias.
    /// * `compute` - How to run the propagation.
    pub fn new(in_feats: usize, n_classes: usize, k: usize, bias: bool, compute: Compute) -> Self {
        Self {
            k,
            linear: Linear::new((in_feats, n_classes), bias),
            compute,
            mode: Mode::Train,
            propagated: None,
            recorded: false,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The propagated features, if a forward pass already happened.
    pub fn propagated(&self) -> Option<&Array2<f32>> {
        self.propagated.as_ref()
    }

    fn propagate(&mut self, graph: &Graph, features: ArrayView2<f32>) -> Result<()> {
        if self.propagated.is_none() {
            debug!(k = self.k, nodes = graph.num_nodes(); "propagating features");
            self.propagated = Some(graph.propagate(features, self.k, self.compute)?);
        }

        Ok(())
    }
}

impl Model for Sgc {
    fn size(&self) -> usize {
        self.linear.size()
    }

    fn init_params<R: Rng>(&self, params: &mut [f32], rng: &mut R) -> Result<()> {
        self.linear.init_params(params, rng)
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn forward(
        &mut self,
        params: &[f32],
        graph: &Graph,
        features: ArrayView2<f32>,
    ) -> Result<Array2<f32>> {
        self.recorded = false;

        self.propagate(graph, features)?;
        let Some(x) = &self.propagated else {
            return Err(MlErr::NoForwardPass);
        };
        let z = self.linear.forward(params, x.view())?;

        self.recorded = self.mode == Mode::Train;
        Ok(z)
    }

    fn backward(&self, grad: &mut [f32], rows: &[usize], d: ArrayView2<f32>) -> Result<()> {
        let (true, Some(x)) = (self.recorded, &self.propagated) else {
            return Err(MlErr::NoForwardPass);
        };

        let num_nodes = x.nrows();
        if let Some(&node) = rows.iter().find(|&&r| r >= num_nodes) {
            return Err(MlErr::NodeOutOfBounds { node, num_nodes });
        }

        let x = x.select(Axis(0), rows);
        self.linear.backward(grad, x.view(), d)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn graph() -> Graph {
        let mut g = Graph::new(3, [(0, 1), (1, 0), (1, 2), (2, 1)]).unwrap();
        g.add_self_loops().unwrap();
        g
    }

    fn features() -> Array2<f32> {
        array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]
    }

    #[test]
    fn forward_scores_every_node() {
        let mut model = Sgc::new(2, 3, 2, true, Compute::Serial);
        let mut params = vec![0.0; model.size()];
        model
            .init_params(&mut params, &mut StdRng::seed_from_u64(1))
            .unwrap();

        let z = model.forward(&params, &graph(), features().view()).unwrap();
        assert_eq!(z.dim(), (3, 3));
    }

    #[test]
    fn propagation_is_cached() {
        let mut model = Sgc::new(2, 2, 2, false, Compute::Serial);
        let params = vec![0.5; model.size()];
        let g = graph();

        model.forward(&params, &g, features().view()).unwrap();
        let first = model.propagated().unwrap().clone();

        // different features are ignored once cached
        model
            .forward(&params, &g, Array2::zeros((3, 2)).view())
            .unwrap();
        assert_eq!(model.propagated().unwrap(), &first);
    }

    #[test]
    fn backward_requires_a_training_forward() {
        let mut model = Sgc::new(2, 2, 1, false, Compute::Serial);
        let params = vec![0.1; model.size()];
        let mut grad = vec![0.0; model.size()];
        let d = Array2::ones((1, 2));

        assert!(matches!(
            model.backward(&mut grad, &[0], d.view()),
            Err(MlErr::NoForwardPass)
        ));

        model.set_mode(Mode::Eval);
        model.forward(&params, &graph(), features().view()).unwrap();
        assert!(matches!(
            model.backward(&mut grad, &[0], d.view()),
            Err(MlErr::NoForwardPass)
        ));

        model.set_mode(Mode::Train);
        model.forward(&params, &graph(), features().view()).unwrap();
        model.backward(&mut grad, &[0], d.view()).unwrap();
    }

    #[test]
    fn backward_uses_only_the_given_rows() {
        let mut model = Sgc::new(2, 2, 0, false, Compute::Serial);
        let params = vec![0.0; model.size()];
        let mut grad = vec![0.0; model.size()];
        model.forward(&params, &graph(), features().view()).unwrap();

        // k = 0 so the propagated features are the raw ones, row 1 is [0, 1]
        let d = array![[1.0, -1.0]];
        model.backward(&mut grad, &[1], d.view()).unwrap();

        assert_eq!(grad, [0.0, 0.0, 1.0, -1.0]);
    }

    #[test]
    fn backward_rejects_unknown_rows() {
        let mut model = Sgc::new(2, 2, 0, false, Compute::Serial);
        let params = vec![0.0; model.size()];
        let mut grad = vec![0.0; model.size()];
        model.forward(&params, &graph(), features().view()).unwrap();

        assert!(matches!(
            model.backward(&mut grad, &[3], Array2::ones((1, 2)).view()),
            Err(MlErr::NodeOutOfBounds { node: 3, .. })
        ));
    }
}
