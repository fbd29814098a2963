mod mask;
pub mod pubmed;
mod split;

pub use mask::Mask;
pub use split::{Split, SplitSpec};

use ndarray::{Array1, Array2};

use crate::{MlErr, Result, graph::Graph};

/// A node classification dataset: one graph, a feature row and a label per node,
/// and the train/validation/test masks over its nodes.
#[derive(Debug, Clone)]
pub struct GraphDataset {
    graph: Graph,
    features: Array2<f32>,
    labels: Array1<usize>,
    num_classes: usize,
    split: Split,
}

impl GraphDataset {
    /// Creates a new `GraphDataset`.
    ///
    /// # Returns
    /// An error if the features, labels or masks don't cover exactly the graph's nodes,
    /// a label is not lower than `num_classes`, or the masks don't partition the nodes.
    pub fn new(
        graph: Graph,
        features: Array2<f32>,
        labels: Array1<usize>,
        num_classes: usize,
        split: Split,
    ) -> Result<Self> {
        let n = graph.num_nodes();

        let sizes = [
            ("feature rows", features.nrows()),
            ("labels", labels.len()),
            ("train mask", split.train.len()),
            ("validation mask", split.val.len()),
            ("test mask", split.test.len()),
        ];

        for (what, got) in sizes {
            if got != n {
                return Err(MlErr::SizeMismatch {
                    what,
                    got,
                    expected: n,
                });
            }
        }

        if let Some((node, &label)) = labels.iter().enumerate().find(|&(_, &l)| l >= num_classes) {
            return Err(MlErr::LabelOutOfRange {
                node,
                label,
                num_classes,
            });
        }

        split.check_partition()?;

        Ok(Self {
            graph,
            features,
            labels,
            num_classes,
            split,
        })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    pub fn features(&self) -> &Array2<f32> {
        &self.features
    }

    pub fn labels(&self) -> &Array1<usize> {
        &self.labels
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn split(&self) -> &Split {
        &self.split
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn split(train: &[usize], val: &[usize], test: &[usize], n: usize) -> Split {
        Split {
            train: Mask::from_indices(n, train.iter().copied()).unwrap(),
            val: Mask::from_indices(n, val.iter().copied()).unwrap(),
            test: Mask::from_indices(n, test.iter().copied()).unwrap(),
        }
    }

    fn graph() -> Graph {
        Graph::new(3, [(0, 1), (1, 2)]).unwrap()
    }

    #[test]
    fn valid_dataset() {
        let ds = GraphDataset::new(
            graph(),
            Array2::zeros((3, 2)),
            array![0, 1, 1],
            2,
            split(&[0], &[1], &[2], 3),
        )
        .unwrap();

        assert_eq!(ds.num_features(), 2);
        assert_eq!(ds.num_classes(), 2);
        let s = ds.split();
        assert_eq!(s.train.count() + s.val.count() + s.test.count(), 3);
    }

    #[test]
    fn labels_must_be_in_range() {
        let err = GraphDataset::new(
            graph(),
            Array2::zeros((3, 2)),
            array![0, 2, 1],
            2,
            split(&[0], &[1], &[2], 3),
        )
        .unwrap_err();

        assert!(matches!(err, MlErr::LabelOutOfRange { node: 1, .. }));
    }

    #[test]
    fn features_must_match_nodes() {
        let err = GraphDataset::new(
            graph(),
            Array2::zeros((2, 2)),
            array![0, 1, 1],
            2,
            split(&[0], &[1], &[2], 3),
        )
        .unwrap_err();

        assert!(matches!(err, MlErr::SizeMismatch { what: "feature rows", .. }));
    }

    #[test]
    fn masks_must_partition_nodes() {
        let overlap = GraphDataset::new(
            graph(),
            Array2::zeros((3, 2)),
            array![0, 1, 1],
            2,
            split(&[0, 1], &[1], &[2], 3),
        )
        .unwrap_err();
        assert!(matches!(overlap, MlErr::MasksOverlap { node: 1 }));

        let missing = GraphDataset::new(
            graph(),
            Array2::zeros((3, 2)),
            array![0, 1, 1],
            2,
            split(&[0], &[], &[2], 3),
        )
        .unwrap_err();
        assert!(matches!(missing, MlErr::MasksIncomplete { node: 1 }));
    }
}
