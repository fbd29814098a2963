use rand::{Rng, seq::SliceRandom};

use super::Mask;
use crate::{MlErr, Result};

/// The train/validation/test masks of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Mask,
    pub val: Mask,
    pub test: Mask,
}

impl Split {
    /// Checks that every node belongs to exactly one of the three masks.
    pub fn check_partition(&self) -> Result<()> {
        for node in 0..self.train.len() {
            let hits = [&self.train, &self.val, &self.test]
                .iter()
                .filter(|mask| mask.contains(node))
                .count();

            match hits {
                0 => return Err(MlErr::MasksIncomplete { node }),
                1 => {}
                _ => return Err(MlErr::MasksOverlap { node }),
            }
        }

        Ok(())
    }
}

/// How to split labelled nodes: a fixed amount of training nodes per class,
/// a fixed amount of validation nodes, and every other node for testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSpec {
    pub train_per_class: usize,
    pub num_val: usize,
}

impl Default for SplitSpec {
    fn default() -> Self {
        Self {
            train_per_class: 20,
            num_val: 500,
        }
    }
}

impl SplitSpec {
    /// Splits the nodes with the given labels.
    ///
    /// The nodes are shuffled with `rng`, the first `train_per_class` nodes of
    /// each class go to training, the next `num_val` remaining ones to
    /// validation and the rest to testing.
    ///
    /// # Arguments
    /// * `labels` - The label of every node.
    /// * `num_classes` - The amount of classes.
    /// * `rng` - The random number generator used for shuffling.
    pub fn split<R: Rng>(&self, labels: &[usize], num_classes: usize, rng: &mut R) -> Split {
        let n = labels.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let mut per_class = vec![0; num_classes];
        let mut train = vec![false; n];
        let mut rest = Vec::with_capacity(n);

        for node in order {
            match per_class.get_mut(labels[node]) {
                Some(taken) if *taken < self.train_per_class => {
                    *taken += 1;
                    train[node] = true;
                }
                _ => rest.push(node),
            }
        }

        let mut val = vec![false; n];
        let mut test = vec![false; n];
        let num_val = self.num_val.min(rest.len());

        for &node in &rest[..num_val] {
            val[node] = true;
        }

        for &node in &rest[num_val..] {
            test[node] = true;
        }

        Split {
            train: Mask::new(train),
            val: Mask::new(val),
            test: Mask::new(test),
        }
    }
}
