use std::time::Duration;

/// What happened during a single epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochReport {
    pub epoch: usize,
    pub loss: f32,
    pub train_acc: f32,
    pub val_acc: f32,
    pub test_acc: f32,
    /// The mean duration of the timed epochs so far, `None` while still warming up.
    pub mean_duration: Option<Duration>,
}

/// The per-epoch metrics of a training run, one entry per epoch in every sequence.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct History {
    pub losses: Vec<f32>,
    pub train_acc: Vec<f32>,
    pub val_acc: Vec<f32>,
    pub test_acc: Vec<f32>,

    // Only epochs past the warm-up are timed
    pub durations: Vec<Duration>,
}

impl History {
    pub fn with_capacity(epochs: usize) -> Self {
        Self {
            losses: Vec::with_capacity(epochs),
            train_acc: Vec::with_capacity(epochs),
            val_acc: Vec::with_capacity(epochs),
            test_acc: Vec::with_capacity(epochs),
            durations: Vec::with_capacity(epochs),
        }
    }

    /// The amount of recorded epochs.
    pub fn len(&self) -> usize {
        self.losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }

    #[inline]
    pub fn record_duration(&mut self, duration: Duration) {
        self.durations.push(duration);
    }

    /// Appends the metrics of `report`.
    pub fn push(&mut self, report: &EpochReport) {
        self.losses.push(report.loss);
        self.train_acc.push(report.train_acc);
        self.val_acc.push(report.val_acc);
        self.test_acc.push(report.test_acc);
    }

    /// The mean of the recorded durations, `None` if there are none.
    pub fn mean_duration(&self) -> Option<Duration> {
        let n = u32::try_from(self.durations.len()).ok().filter(|&n| n > 0)?;
        Some(self.durations.iter().sum::<Duration>() / n)
    }
}
