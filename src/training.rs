use crate::data::{DataLoader, MnistBatch, MnistBatcher, MnistDataset, MnistItem, MnistSplit};
use crate::model::{Architecture, Classifier, ConvNetConfig, TinyMlpConfig};
use burn::data::dataloader::batcher::Batcher;
use burn::module::AutodiffModule;
use burn::nn::loss::CrossEntropyLossConfig;
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::prelude::*;
use burn::tensor::ElementConversion;
use burn::tensor::backend::AutodiffBackend;
use burn_dataset::Dataset;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Config)]
pub struct TrainingConfig {
    #[config(default = "SgdConfig::new()")]
    pub optimizer: SgdConfig,
    #[config(default = "Architecture::Mlp")]
    pub architecture: Architecture,
    #[config(default = "TinyMlpConfig::new()")]
    pub mlp: TinyMlpConfig,
    #[config(default = "ConvNetConfig::new()")]
    pub cnn: ConvNetConfig,
    #[config(default = 10)]
    pub num_epochs: usize,
    /// Upper bound, an epoch never takes more steps than there are batches in the train split.
    #[config(default = 1000)]
    pub steps_per_epoch: usize,
    #[config(default = 64)]
    pub batch_size: usize,
    /// Chunk size of the held-out evaluation.
    #[config(default = 1000)]
    pub eval_batch_size: usize,
    #[config(default = 1e-3)]
    pub lr: f64,
    #[config(default = 42)]
    pub seed: u64,
    /// Cache directory for the dataset, defaults to `~/.cache/mnist-burn`.
    #[config(default = "None")]
    pub data_dir: Option<String>,
}

/// Results of one epoch.
#[derive(Clone, Debug, PartialEq)]
pub struct EpochSummary {
    pub epoch: usize,
    pub num_epochs: usize,
    pub steps: usize,
    pub max_batches: usize,
    pub train_loss: f64,
    pub test_accuracy: f64,
    pub elapsed: Duration,
}

impl fmt::Display for EpochSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Epoch {}/{}: {} Batches (max: {}) | Train Loss: {:.4} | Test Accuracy: {:.4} | Time: {:.2}s",
            self.epoch,
            self.num_epochs,
            self.steps,
            self.max_batches,
            self.train_loss,
            self.test_accuracy,
            self.elapsed.as_secs_f64(),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingReport {
    pub epochs: Vec<EpochSummary>,
    pub total_time: Duration,
}

/// Trains `model` for `config.num_epochs` epochs and evaluates it on the test split after each one.
///
/// Every step samples `config.batch_size` training indices uniformly, with replacement.
pub fn train<B, M>(
    config: &TrainingConfig,
    model: M,
    dataset: &MnistDataset,
    device: &B::Device,
) -> (M, TrainingReport)
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Classifier<B>,
    M::InnerModule: Classifier<B::InnerBackend>,
{
    log::info!("model: {}", model.describe());
    for param in model.parameters() {
        log::debug!("parameter {}: {:?}", param.name, param.shape);
    }
    log::info!("trainable parameters: {}", model.num_params());

    let mut model = model;
    let mut optim = config.optimizer.init::<B, M>();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let batcher = MnistBatcher::default();

    let train_len = dataset.train.len();
    let max_batches = train_len.div_ceil(config.batch_size);
    let steps = config.steps_per_epoch.min(max_batches);

    let mut report = TrainingReport::default();

    for epoch in 1..config.num_epochs + 1 {
        let start = Instant::now();
        let mut running_loss = 0.0;

        for _step in 0..steps {
            let indices = sample_indices(&mut rng, train_len, config.batch_size);
            let items: Vec<MnistItem> = indices
                .iter()
                .filter_map(|&index| dataset.train.get(index))
                .collect();
            let batch: MnistBatch<B> = batcher.batch(items, device);

            let (updated, loss) = train_step(model, &mut optim, config.lr, batch);
            model = updated;
            running_loss += loss;
        }
        let train_loss = running_loss / steps.max(1) as f64;

        let test_accuracy = evaluate::<B::InnerBackend, _>(
            &model.valid(),
            &dataset.test,
            config.eval_batch_size,
            device,
        );

        let summary = EpochSummary {
            epoch,
            num_epochs: config.num_epochs,
            steps,
            max_batches,
            train_loss,
            test_accuracy,
            elapsed: start.elapsed(),
        };
        println!("{summary}");
        report.total_time += summary.elapsed;
        report.epochs.push(summary);
    }

    println!(
        "Total training time: {:.2}s",
        report.total_time.as_secs_f64()
    );

    (model, report)
}

/// Forward, sparse categorical cross-entropy, backward and one optimizer update.
///
/// Returns the updated model and the loss of the batch before the update.
pub fn train_step<B, M, O>(model: M, optim: &mut O, lr: f64, batch: MnistBatch<B>) -> (M, f64)
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Classifier<B>,
    O: Optimizer<M, B>,
{
    let output = model.forward(batch.images);
    let loss = CrossEntropyLossConfig::new()
        .init(&output.device())
        .forward(output, batch.targets);
    let loss_value = loss.clone().into_scalar().elem::<f64>();

    // gradients are rebuilt from this loss alone, nothing carries over from previous steps
    let grads = GradientsParams::from_grads(loss.backward(), &model);
    let model = optim.step(lr, model, grads);

    (model, loss_value)
}

/// Mean accuracy of `model` over the whole `split`, processed in chunks of `batch_size`.
pub fn evaluate<B: Backend, M: Classifier<B>>(
    model: &M,
    split: &MnistSplit,
    batch_size: usize,
    device: &B::Device,
) -> f64 {
    if split.is_empty() {
        return 0.0;
    }

    let batcher = MnistBatcher::default();
    let mut loader = DataLoader::<MnistItem>::new(split, batch_size, false, 0);
    let correct: usize = loader
        .iter()
        .map(|chunk| {
            let batch: MnistBatch<B> = batcher.batch(chunk.items, device);
            num_correct(model.forward(batch.images), batch.targets)
        })
        .sum();

    correct as f64 / loader.num_items() as f64
}

/// Number of rows whose arg-max matches the target.
///
/// # Shapes
///   - output [batch, num_classes]
///   - targets [batch]
pub fn num_correct<B: Backend>(output: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> usize {
    let [batch, _] = output.dims();
    let predictions = output.argmax(1).reshape([batch]);
    let correct = predictions.equal(targets).int().sum().into_scalar();
    correct.elem::<i64>() as usize
}

/// Fraction of rows whose arg-max matches the target.
pub fn accuracy<B: Backend>(output: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> f64 {
    let [batch, _] = output.dims();
    if batch == 0 {
        return 0.0;
    }
    num_correct(output, targets) as f64 / batch as f64
}

/// `count` indices drawn uniformly from `0..len`, with replacement.
pub fn sample_indices<R: Rng + ?Sized>(rng: &mut R, len: usize, count: usize) -> Vec<usize> {
    (0..count).map(|_| rng.random_range(0..len)).collect()
}
