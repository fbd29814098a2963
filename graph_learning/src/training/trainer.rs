use std::time::Instant;

use log::{debug, info};
use ndarray::Axis;

use super::{EpochReport, History, evaluate};
use crate::{
    MlErr, Result,
    arch::{Mode, Model, loss::LossFn},
    dataset::{GraphDataset, Mask},
    optimization::Optimizer,
};

/// A full-graph `Trainer`. Owns the model, its parameters and gradient buffer,
/// the optimizer and the loss function.
pub struct Trainer<M, O, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
{
    model: M,
    optimizer: O,
    loss_fn: L,
    params: Vec<f32>,
    grad: Vec<f32>,
    n_epochs: usize,
}

impl<M, O, L> Trainer<M, O, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
{
    /// The amount of initial epochs left out of the timing.
    pub const WARMUP_EPOCHS: usize = 3;

    /// Returns a new `Trainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `optimizer` - The optimizer, sized for the model's parameters.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output and the expected one.
    /// * `params` - The initial parameters of the model.
    /// * `n_epochs` - The amount of epochs `run` performs.
    ///
    /// # Returns
    /// An error if `params` doesn't have one value per model parameter.
    pub fn new(
        model: M,
        optimizer: O,
        loss_fn: L,
        params: Vec<f32>,
        n_epochs: usize,
    ) -> Result<Self> {
        let size = model.size();
        if params.len() != size {
            return Err(MlErr::SizeMismatch {
                what: "params",
                got: params.len(),
                expected: size,
            });
        }

        Ok(Self {
            model,
            optimizer,
            loss_fn,
            params,
            grad: vec![0.0; size],
            n_epochs,
        })
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn n_epochs(&self) -> usize {
        self.n_epochs
    }

    /// Trains the model for `n_epochs` epochs over the whole graph of `dataset`.
    ///
    /// Every epoch performs one optimizer step on the training nodes and then
    /// measures the train, validation and test accuracy.
    ///
    /// # Arguments
    /// * `dataset` - The dataset to train on.
    /// * `on_epoch` - Called with the report of every finished epoch.
    ///
    /// # Returns
    /// The metrics of every epoch.
    pub fn run<F>(&mut self, dataset: &GraphDataset, mut on_epoch: F) -> Result<History>
    where
        F: FnMut(&EpochReport),
    {
        let graph = dataset.graph();
        let features = dataset.features().view();
        let labels = dataset.labels().view();
        let split = dataset.split();

        let train_rows = split.train.indices();
        let train_labels = labels.select(Axis(0), &train_rows);

        let mut history = History::with_capacity(self.n_epochs);

        info!(epochs = self.n_epochs, train_nodes = train_rows.len(); "starting training");

        for epoch in 0..self.n_epochs {
            let start = Instant::now();

            self.model.set_mode(Mode::Train);
            let logits = self.model.forward(&self.params, graph, features)?;
            let logits = logits.select(Axis(0), &train_rows);

            let loss = self.loss_fn.loss(logits.view(), train_labels.view());
            let d = self.loss_fn.loss_prime(logits.view(), train_labels.view());

            self.grad.fill(0.0);
            self.model.backward(&mut self.grad, &train_rows, d.view())?;
            self.optimizer.update_params(&self.grad, &mut self.params)?;

            if epoch >= Self::WARMUP_EPOCHS {
                history.record_duration(start.elapsed());
            }

            let mut acc = |mask: &Mask| {
                evaluate(&mut self.model, &self.params, graph, features, labels, mask)
            };
            let train_acc = acc(&split.train)?;
            let val_acc = acc(&split.val)?;
            let test_acc = acc(&split.test)?;

            let report = EpochReport {
                epoch,
                loss,
                train_acc,
                val_acc,
                test_acc,
                mean_duration: history.mean_duration(),
            };

            debug!(
                epoch = epoch,
                loss = loss,
                val_acc = val_acc,
                test_acc = test_acc;
                "finished epoch"
            );

            history.push(&report);
            on_epoch(&report);
        }

        if let Some(last) = history.test_acc.last() {
            info!(epochs = self.n_epochs, test_acc = *last; "training finished");
        }

        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, array};

    use super::*;
    use crate::{
        arch::{Sgc, loss::CrossEntropy},
        dataset::Split,
        graph::{Compute, Graph},
        optimization::Adam,
    };

    /// Two disconnected pairs, the first of class 0 and the second of class 1.
    fn dataset() -> GraphDataset {
        let mut graph = Graph::new(4, [(0, 1), (1, 0), (2, 3), (3, 2)]).unwrap();
        graph.add_self_loops().unwrap();

        let features = array![[1.0, 0.0], [0.9, 0.1], [0.0, 1.0], [0.1, 0.9]];
        let labels = Array1::from(vec![0, 0, 1, 1]);
        let split = Split {
            train: Mask::from_indices(4, [0, 2]).unwrap(),
            val: Mask::from_indices(4, [1]).unwrap(),
            test: Mask::from_indices(4, [3]).unwrap(),
        };

        GraphDataset::new(graph, features, labels, 2, split).unwrap()
    }

    fn trainer(n_epochs: usize) -> Trainer<Sgc, Adam, CrossEntropy> {
        let model = Sgc::new(2, 2, 1, true, Compute::Serial);
        let params = vec![0.0; model.size()];
        let optimizer = Adam::with_defaults(model.size(), 0.1, 0.0);

        Trainer::new(model, optimizer, CrossEntropy::new(), params, n_epochs).unwrap()
    }

    #[test]
    fn zero_epochs_changes_nothing() {
        let mut trainer = trainer(0);
        let mut calls = 0;

        let history = trainer.run(&dataset(), |_| calls += 1).unwrap();

        assert!(history.is_empty());
        assert!(history.durations.is_empty());
        assert_eq!(calls, 0);
        assert!(trainer.params().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn reports_every_epoch() {
        let mut trainer = trainer(5);
        let mut epochs = Vec::new();

        let history = trainer.run(&dataset(), |r| epochs.push(r.epoch)).unwrap();

        assert_eq!(epochs, [0, 1, 2, 3, 4]);
        assert_eq!(history.len(), 5);
        assert_eq!(history.durations.len(), 5 - Trainer::<Sgc, Adam, CrossEntropy>::WARMUP_EPOCHS);
    }

    #[test]
    fn loss_decreases_on_a_separable_graph() {
        let mut trainer = trainer(30);

        let history = trainer.run(&dataset(), |_| {}).unwrap();

        assert!(history.losses.last().unwrap() < history.losses.first().unwrap());
        assert_eq!(*history.train_acc.last().unwrap(), 1.0);
        assert_eq!(*history.test_acc.last().unwrap(), 1.0);
    }

    #[test]
    fn mismatched_params_fail() {
        let model = Sgc::new(2, 2, 1, false, Compute::Serial);
        let optimizer = Adam::with_defaults(model.size(), 0.1, 0.0);

        assert!(matches!(
            Trainer::new(model, optimizer, CrossEntropy::new(), vec![0.0; 3], 1),
            Err(MlErr::SizeMismatch { what: "params", .. })
        ));
    }
}
