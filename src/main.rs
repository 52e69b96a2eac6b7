use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use mnist_burn::backend::{MainAutoBackend, MainDevice};
use mnist_burn::data::mnist::default_data_dir;
use mnist_burn::prelude::*;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Path of a json [`TrainingConfig`], defaults are used when unset.
const CONFIG_ENV: &str = "MNIST_BURN_CONFIG";

pub fn launch<AutoB: AutodiffBackend + MainDevice>() -> Result<(), Box<dyn Error>> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => TrainingConfig::load(&path)
            .map_err(|err| format!("failed to load the training config {path:?}: {err}"))?,
        None => TrainingConfig::new(),
    };

    let data_dir = config
        .data_dir
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(default_data_dir);
    let dataset = MnistDataset::load(&data_dir)?;
    config.save(data_dir.join("config.json"))?;

    let device = AutoB::main_device();
    AutoB::seed(config.seed);

    match config.architecture {
        Architecture::Mlp => {
            let model = config.mlp.init::<AutoB>(&device);
            train::<AutoB, _>(&config, model, &dataset, &device);
        }
        Architecture::Cnn => {
            let model = config.cnn.init::<AutoB>(&device);
            train::<AutoB, _>(&config, model, &dataset, &device);
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    launch::<MainAutoBackend>()
}
