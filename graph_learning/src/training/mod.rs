mod evaluation;
mod history;
mod trainer;

pub use evaluation::{accuracy, evaluate};
pub use history::{EpochReport, History};
pub use trainer::Trainer;
