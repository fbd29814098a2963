//! Console output of a training run.

use graph_learning::{dataset::GraphDataset, training::EpochReport};

/// The data statistics block printed before training.
///
/// # Arguments
/// * `dataset` - The loaded dataset.
/// * `num_edges` - The amount of edges before adding self loops.
pub fn statistics(dataset: &GraphDataset, num_edges: usize) -> String {
    let split = dataset.split();

    format!(
        "----Data statistics------\n  \
         #Edges {num_edges}\n  \
         #Classes {}\n  \
         #Train samples {}\n  \
         #Val samples {}\n  \
         #Test samples {}",
        dataset.num_classes(),
        split.train.count(),
        split.val.count(),
        split.test.count(),
    )
}

/// One line summarizing an epoch.
///
/// The time is the mean duration of the timed epochs and the throughput is
/// measured in thousands of edges per second, both are `NaN` during warm-up.
pub fn epoch_line(report: &EpochReport, num_edges: usize) -> String {
    let secs = report
        .mean_duration
        .map_or(f64::NAN, |d| d.as_secs_f64());
    let kteps = num_edges as f64 / secs / 1000.;

    format!(
        "Epoch {:05} | Time(s) {secs:.4} | Loss {:.6} | Val accuracy {:.6} | Test accuracy {:.6} | ETputs(KTEPS) {kteps:.2}",
        report.epoch, report.loss, report.val_acc, report.test_acc,
    )
}
