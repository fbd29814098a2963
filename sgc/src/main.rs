use anyhow::Context;
use clap::Parser;
use graph_learning::{
    arch::{Model, Sgc, loss::CrossEntropy},
    dataset::{SplitSpec, pubmed},
    graph::Compute,
    optimization::Adam,
    training::Trainer,
};
use log::info;
use rand::{SeedableRng, rngs::StdRng};

use sgc::{config::Args, plot, report};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let gpu = args.gpu;
    let config = args.into_config().context("invalid arguments")?;

    if let Compute::Parallel = config.compute {
        info!(gpu = gpu; "no gpu backend available, propagating on the rayon thread pool");
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    info!(seed = config.seed; "set random seed");

    let mut dataset = pubmed::load(&config.data_dir, SplitSpec::default(), &mut rng)
        .with_context(|| format!("loading {} from {}", pubmed::NAME, config.data_dir.display()))?;

    let num_edges = dataset.graph().num_edges();
    println!("{}", report::statistics(&dataset, num_edges));

    dataset
        .graph_mut()
        .add_self_loops()
        .context("adding self loops")?;

    let model = Sgc::new(
        dataset.num_features(),
        dataset.num_classes(),
        config.k,
        config.bias,
        config.compute,
    );

    let mut params = vec![0.0; model.size()];
    model
        .init_params(&mut params, &mut rng)
        .context("initializing parameters")?;

    let optimizer = Adam::with_defaults(model.size(), config.lr, config.weight_decay);
    let mut trainer = Trainer::new(model, optimizer, CrossEntropy::new(), params, config.n_epochs)?;

    let history = trainer
        .run(&dataset, |r| println!("{}", report::epoch_line(r, num_edges)))
        .context("training")?;

    let path = plot::accuracy_curve(
        &history.train_acc,
        &history.test_acc,
        pubmed::NAME,
        &config.output_dir,
    )
    .context("plotting accuracy")?;
    info!("accuracy curve written to {}", path.display());

    if config.show {
        open::that(&path).with_context(|| format!("opening {}", path.display()))?;
    }

    Ok(())
}
