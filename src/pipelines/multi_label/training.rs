use std::{fmt::Display, sync::Arc};

use burn::{
    config::Config as _,
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::{AutodiffModule, Module},
    optim::AdamConfig,
    record::{CompactRecorder, Recorder},
    tensor::backend::{AutodiffBackend, Backend},
    train::{
        metric::{CudaMetric, LearningRateMetric, LossMetric},
        LearnerBuilder, TrainStep, ValidStep,
    },
    LearningRate,
};

use crate::vocabulary::Vocabulary;

use super::{
    batcher::Train,
    evaluation::{evaluate, Evaluation},
    Batcher, Classifier, Item, ModelConfig, Output,
};

/// Define configuration struct for the experiment
#[derive(burn::config::Config)]
pub struct Config {
    /// Batch size
    #[config(default = 256)]
    pub batch_size: usize,

    /// Number of epochs
    #[config(default = 2)]
    pub num_epochs: usize,

    /// Adam epsilon
    #[config(default = 1e-7)]
    pub adam_epsilon: f32,

    /// Learning rate
    #[config(default = 1e-3)]
    pub learning_rate: LearningRate,

    /// Sequences are padded or truncated to this many words
    #[config(default = 500)]
    pub max_seq_len: usize,

    /// Only the most frequent words below this index are embedded
    #[config(default = 100_000)]
    pub max_words: usize,

    /// Share of the training data held out for validation
    #[config(default = 0.1)]
    pub valid_fraction: f64,

    /// Seed for the train/validation split and batch shuffling
    #[config(default = 42)]
    pub seed: u64,

    /// Number of CUDA devices to train across, 0 for CPU
    #[config(default = 0)]
    pub gpus: usize,

    /// Data loader workers
    #[config(default = 4)]
    pub num_workers: usize,

    /// The location of the top-level data directory
    #[config(default = "\"data\".to_string()")]
    pub data_dir: String,

    /// Architecture name (e.g., "cnn")
    pub architecture: String,

    /// The Dataset to use (e.g., "jigsaw")
    pub dataset_name: String,

    /// Class labels for the selected dataset
    pub labels: Vec<String>,
}

impl Config {
    /// Where the artifacts of this experiment are written
    pub fn artifact_dir(&self) -> String {
        artifact_dir(&self.data_dir, &self.architecture)
    }
}

/// The artifact directory of an architecture under a data directory
pub fn artifact_dir(data_dir: &str, architecture: &str) -> String {
    format!("{}/multi-label-classification/{}", data_dir, architecture)
}

/// Define train function
#[allow(clippy::too_many_arguments)]
pub fn train<B, C, M, I, D>(
    devices: Vec<B::Device>, // Devices to train across (e.g., CPU or several CUDA devices)
    model: M,                // Initialized model
    model_config: &C,        // The configuration the model was built from
    vocabulary: Vocabulary,  // Word index used to encode text
    dataset_train: D,        // Training dataset
    dataset_valid: D,        // Validation dataset
    config: Config,          // Experiment configuration
) -> anyhow::Result<(M, Evaluation)>
where
    B: AutodiffBackend,
    C: ModelConfig,
    M: AutodiffModule<B> + TrainStep<Train<B>, Output<B>> + Display + 'static,
    M::InnerModule: ValidStep<Train<B::InnerBackend>, Output<B::InnerBackend>>
        + Classifier<B::InnerBackend>,
    I: Item + 'static,
    D: Dataset<I> + 'static,
{
    let device = devices
        .first()
        .ok_or_else(|| anyhow!("At least one device is required for training"))?
        .clone();

    let n_classes = model_config.num_classes();
    if n_classes == 0 || n_classes != config.labels.len() {
        return Err(anyhow!(
            "The model has {} classes but {} labels are configured",
            n_classes,
            config.labels.len()
        ));
    }

    if !model_config.has_output() {
        return Err(anyhow!(
            "The model has no output layer and can only be used as a feature branch"
        ));
    }

    let artifact_dir = config.artifact_dir();
    std::fs::create_dir_all(&artifact_dir)?;

    let vocabulary = Arc::new(vocabulary);

    // Initialize batchers for training and validation data
    let batcher_train = Batcher::<B>::new(
        vocabulary.clone(),
        config.max_seq_len,
        n_classes,
        device.clone(),
    );
    let batcher_valid = Batcher::<B::InnerBackend>::new(
        vocabulary.clone(),
        config.max_seq_len,
        n_classes,
        device.clone(),
    );

    let dataset_valid = Arc::new(dataset_valid);

    log::info!(
        "Training {} on {} items, validating on {}",
        config.architecture,
        dataset_train.len(),
        dataset_valid.len()
    );

    // Initialize data loaders for training and validation data
    let dataloader_train = DataLoaderBuilder::new(batcher_train)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(dataset_train);

    let dataloader_valid = DataLoaderBuilder::new(batcher_valid.clone())
        .batch_size(config.batch_size)
        .num_workers(config.num_workers)
        .build(dataset_valid.clone());

    // Initialize optimizer
    let optimizer = AdamConfig::new().with_epsilon(config.adam_epsilon).init();

    // Initialize learner
    let learner = LearnerBuilder::new(&artifact_dir)
        .metric_train(CudaMetric::new())
        .metric_valid(CudaMetric::new())
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .metric_train_numeric(LearningRateMetric::new())
        .with_file_checkpointer(CompactRecorder::new())
        .devices(devices)
        .num_epochs(config.num_epochs)
        .summary()
        .build(model, optimizer, config.learning_rate);

    // Train the model
    let model_trained = learner.fit(dataloader_train, dataloader_valid);

    let evaluation = evaluate(
        &model_trained.valid(),
        &batcher_valid,
        dataset_valid.as_ref(),
        config.batch_size,
    );

    for (label, auc) in config.labels.iter().zip(&evaluation.per_label) {
        match auc {
            Some(auc) => log::info!("Validation ROC AUC for {}: {:.4}", label, auc),
            None => log::warn!("Validation ROC AUC for {} is undefined", label),
        }
    }

    if let Some(mean) = evaluation.mean() {
        log::info!("Mean validation ROC AUC: {:.4}", mean);
    }

    save::<B, _, _>(&artifact_dir, &model_trained, model_config, &config, &vocabulary)?;

    log::info!("Saved artifacts to {}", artifact_dir);

    Ok((model_trained, evaluation))
}

/// Write the configurations, the vocabulary and the model weights that [`super::inference::load`] reads
pub fn save<B: Backend, C: ModelConfig, M: Module<B>>(
    artifact_dir: &str,
    model: &M,
    model_config: &C,
    config: &Config,
    vocabulary: &Vocabulary,
) -> anyhow::Result<()> {
    model_config
        .save(format!("{artifact_dir}/config.json"))
        .map_err(|e| anyhow!("Unable to save model config: {}", e))?;

    config
        .save(format!("{artifact_dir}/training.json"))
        .map_err(|e| anyhow!("Unable to save training config: {}", e))?;

    vocabulary.save(format!("{artifact_dir}/vocab.json"))?;

    CompactRecorder::new()
        .record(
            model.clone().into_record(),
            format!("{artifact_dir}/model").into(),
        )
        .map_err(|e| anyhow!("Unable to save trained model weights: {}", e))?;

    Ok(())
}
