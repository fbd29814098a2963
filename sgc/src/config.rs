use std::{
    error::Error,
    fmt::{self, Display},
    path::PathBuf,
};

use clap::Parser;
use graph_learning::graph::Compute;

/// Train a simplified graph convolution on the Pubmed citation graph
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Device index, a negative value selects the serial CPU path
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub gpu: i32,

    /// Learning rate
    #[arg(long, default_value_t = 0.2)]
    pub lr: f32,

    /// Use a bias in the linear layer
    #[arg(long)]
    pub bias: bool,

    /// Number of training epochs
    #[arg(long, default_value_t = 300)]
    pub n_epochs: usize,

    /// L2 weight decay
    #[arg(long, default_value_t = 5e-5)]
    pub weight_decay: f32,

    /// Number of propagation steps
    #[arg(long, default_value_t = 2)]
    pub k: usize,

    /// Random seed for the split and the initial weights
    #[arg(long, default_value_t = 128)]
    pub seed: u64,

    /// Directory holding the Pubmed-Diabetes tab files
    #[arg(long, default_value = "./data/pubmed")]
    pub data_dir: PathBuf,

    /// Directory the accuracy plot is written to
    #[arg(long, default_value = "./loss_curve")]
    pub output_dir: PathBuf,

    /// Don't open the plot once it's written
    #[arg(long)]
    pub no_show: bool,
}

/// A validated training configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub compute: Compute,
    pub lr: f32,
    pub bias: bool,
    pub n_epochs: usize,
    pub weight_decay: f32,
    pub k: usize,
    pub seed: u64,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigErr {
    InvalidLearningRate(f32),
    InvalidWeightDecay(f32),
}

impl Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErr::InvalidLearningRate(lr) => {
                write!(f, "learning rate must be positive, got {lr}")
            }
            ConfigErr::InvalidWeightDecay(wd) => {
                write!(f, "weight decay must be finite and non negative, got {wd}")
            }
        }
    }
}

impl Error for ConfigErr {}

impl Args {
    /// Validates the hyper-parameters and maps the device index to a compute backend.
    pub fn into_config(self) -> Result<Config, ConfigErr> {
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(ConfigErr::InvalidLearningRate(self.lr));
        }

        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(ConfigErr::InvalidWeightDecay(self.weight_decay));
        }

        let compute = if self.gpu < 0 {
            Compute::Serial
        } else {
            Compute::Parallel
        };

        Ok(Config {
            compute,
            lr: self.lr,
            bias: self.bias,
            n_epochs: self.n_epochs,
            weight_decay: self.weight_decay,
            k: self.k,
            seed: self.seed,
            data_dir: self.data_dir,
            output_dir: self.output_dir,
            show: !self.no_show,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("sgc").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&[]).into_config().unwrap();

        assert!(matches!(config.compute, Compute::Parallel));
        assert_eq!(config.lr, 0.2);
        assert!(!config.bias);
        assert_eq!(config.n_epochs, 300);
        assert_eq!(config.weight_decay, 5e-5);
        assert_eq!(config.k, 2);
        assert_eq!(config.seed, 128);
        assert_eq!(config.data_dir, PathBuf::from("./data/pubmed"));
        assert_eq!(config.output_dir, PathBuf::from("./loss_curve"));
        assert!(config.show);
    }

    #[test]
    fn negative_gpu_is_serial() {
        let config = parse(&["--gpu", "-1", "--bias", "--n-epochs", "5", "--no-show"])
            .into_config()
            .unwrap();

        assert!(matches!(config.compute, Compute::Serial));
        assert!(config.bias);
        assert_eq!(config.n_epochs, 5);
        assert!(!config.show);
    }

    #[test]
    fn invalid_hyper_parameters_are_rejected() {
        assert_eq!(
            parse(&["--lr", "0"]).into_config().unwrap_err(),
            ConfigErr::InvalidLearningRate(0.0)
        );
        assert_eq!(
            parse(&["--weight-decay=-0.5"]).into_config().unwrap_err(),
            ConfigErr::InvalidWeightDecay(-0.5)
        );
    }
}
