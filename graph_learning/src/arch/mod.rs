pub mod layers;
pub mod loss;
mod model;
mod sgc;

pub use model::{Mode, Model};
pub use sgc::Sgc;
