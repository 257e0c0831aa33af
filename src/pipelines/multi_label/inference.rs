use std::sync::Arc;

use burn::{
    config::Config as _,
    data::dataloader::batcher::Batcher as _,
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::{backend::Backend, Tensor},
};

use crate::vocabulary::Vocabulary;

use super::{training, Batcher, Classifier, Infer, ModelConfig};

/// A trained model with everything needed to encode new text for it
pub struct Artifacts<B: Backend, C: ModelConfig> {
    /// The trained model
    pub model: C::Model<B>,

    /// The model configuration
    pub config: C,

    /// The experiment configuration the model was trained with
    pub training: training::Config,

    /// Batcher that encodes text the way the training data was encoded
    pub batcher: Batcher<B>,
}

/// Load the model, configs and vocabulary written by [`training::train`]
pub fn load<B: Backend, C: ModelConfig>(
    device: B::Device,  // Device on which to perform computation (e.g., CPU or CUDA device)
    artifact_dir: &str, // Directory containing model and config files
) -> anyhow::Result<Artifacts<B, C>> {
    // Load experiment configuration
    let config = C::load(format!("{artifact_dir}/config.json").as_str())
        .map_err(|e| anyhow!("Unable to load config file: {}", e))?;

    let training = training::Config::load(format!("{artifact_dir}/training.json").as_str())
        .map_err(|e| anyhow!("Unable to load training config file: {}", e))?;

    let vocabulary = Vocabulary::load(format!("{artifact_dir}/vocab.json"))
        .map_err(|e| anyhow!("Unable to load vocabulary: {}", e))?;

    log::info!("Loading weights...");

    let record = CompactRecorder::new()
        .load(format!("{artifact_dir}/model").into(), &device)
        .map_err(|e| anyhow!("Unable to load trained model weights: {}", e))?;

    log::info!("Creating model...");

    let model = config.init_empty::<B>(&device)?.load_record(record);

    let batcher = Batcher::new(
        Arc::new(vocabulary),
        training.max_seq_len,
        config.num_classes(),
        device,
    );

    Ok(Artifacts {
        model,
        config,
        training,
        batcher,
    })
}

/// Define inference function: per-class probabilities for each text, `batch_size` texts at a time
pub fn infer<B: Backend, M: Classifier<B>>(
    model: &M,
    batcher: &Batcher<B>,
    samples: Vec<String>,
    batch_size: usize,
) -> Option<Tensor<B, 2>> {
    let batches: Vec<Tensor<B, 2>> = samples
        .chunks(batch_size.max(1))
        .map(|chunk| {
            let item: Infer<B> = batcher.batch(chunk.to_vec());

            model.infer(item)
        })
        .collect();

    (!batches.is_empty()).then(|| Tensor::cat(batches, 0))
}
