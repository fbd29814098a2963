use ndarray::{Array2, ArrayView2};
use rand::Rng;

use crate::{Result, graph::Graph};

/// Whether a model records what `backward` needs while running forward.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Train,
    Eval,
}

/// A node classification model whose parameters live outside of it, in a flat slice.
pub trait Model {
    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize;

    /// Writes the initial value of every parameter into `params`.
    fn init_params<R: Rng>(&self, params: &mut [f32], rng: &mut R) -> Result<()>;

    /// Switches between training and inference behaviour.
    fn set_mode(&mut self, mode: Mode);

    /// Computes the class scores of every node of `graph`.
    ///
    /// # Arguments
    /// * `params` - The model's parameters.
    /// * `graph` - The graph the nodes belong to.
    /// * `features` - One feature row per node.
    ///
    /// # Returns
    /// A `(num_nodes, num_classes)` score matrix.
    fn forward(
        &mut self,
        params: &[f32],
        graph: &Graph,
        features: ArrayView2<f32>,
    ) -> Result<Array2<f32>>;

    /// Writes the gradient of the loss with respect to the parameters into `grad`.
    ///
    /// # Arguments
    /// * `grad` - A buffer of `size()` values, it gets overwritten.
    /// * `rows` - The nodes the loss was computed on.
    /// * `d` - The derivative of the loss with respect to the scores of `rows`.
    fn backward(&self, grad: &mut [f32], rows: &[usize], d: ArrayView2<f32>) -> Result<()>;
}
