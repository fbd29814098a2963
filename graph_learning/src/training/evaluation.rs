use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::{
    MlErr, Result,
    arch::{Mode, Model},
    dataset::Mask,
    graph::Graph,
};

/// The fraction of rows of `logits` whose highest score is at the index given by `labels`.
///
/// # Returns
/// An error if there isn't one label per row or there are no rows at all.
pub fn accuracy(logits: ArrayView2<f32>, labels: ArrayView1<usize>) -> Result<f32> {
    if logits.nrows() != labels.len() {
        return Err(MlErr::SizeMismatch {
            what: "labels",
            got: labels.len(),
            expected: logits.nrows(),
        });
    }

    if labels.is_empty() {
        return Err(MlErr::EmptyMask);
    }

    let correct = logits
        .axis_iter(Axis(0))
        .zip(labels)
        .filter(|(row, label)| argmax(*row) == Some(**label))
        .count();

    Ok(correct as f32 / labels.len() as f32)
}

fn argmax(row: ArrayView1<f32>) -> Option<usize> {
    row.iter()
        .enumerate()
        .fold(None, |best, (i, &z)| match best {
            Some((_, max)) if max >= z => best,
            _ => Some((i, z)),
        })
        .map(|(i, _)| i)
}

/// Measures the accuracy of `model` over the nodes selected by `mask`.
///
/// The model is switched to evaluation mode, so it doesn't record anything for
/// a later `backward`.
///
/// # Arguments
/// * `model` - The model to evaluate.
/// * `params` - The model's parameters.
/// * `graph` - The graph the nodes belong to.
/// * `features` - One feature row per node.
/// * `labels` - One label per node.
/// * `mask` - The nodes to measure.
///
/// # Returns
/// The accuracy in `[0, 1]`, or an error if the mask selects no node.
pub fn evaluate<M: Model>(
    model: &mut M,
    params: &[f32],
    graph: &Graph,
    features: ArrayView2<f32>,
    labels: ArrayView1<usize>,
    mask: &Mask,
) -> Result<f32> {
    let rows = mask.indices();
    if rows.is_empty() {
        return Err(MlErr::EmptyMask);
    }

    if mask.len() != labels.len() {
        return Err(MlErr::SizeMismatch {
            what: "mask",
            got: mask.len(),
            expected: labels.len(),
        });
    }

    model.set_mode(Mode::Eval);
    let logits = model.forward(params, graph, features)?;

    accuracy(
        logits.select(Axis(0), &rows).view(),
        labels.select(Axis(0), &rows).view(),
    )
}
