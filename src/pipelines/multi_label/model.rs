use burn::{
    module::Module,
    nn::Linear,
    tensor::{activation::sigmoid, backend::Backend, Int, Tensor},
};

use crate::models::embedding::EmbeddingMatrix;

use super::{
    batcher::{Infer, Train},
    Output,
};

/// Mean binary cross-entropy computed from logits: `max(x, 0) - x * y + ln(1 + e^-|x|)`
pub fn binary_cross_entropy_with_logits<B: Backend>(
    logits: Tensor<B, 2>,
    targets: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let positive = logits.clone().clamp_min(0.0);
    let overlap = logits.clone() * targets;
    let softplus = logits.abs().neg().exp().log1p();

    (positive - overlap + softplus).mean()
}

/// A trait for models that can be used for multi-label classification
pub trait Classifier<B: Backend> {
    /// Activations of the last hidden layer: [batch_size, features]
    fn features(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2>;

    /// The per-class output layer, absent when the model is used as a feature branch
    fn output(&self) -> Option<&Linear<B>>;

    /// Sum of the L2 kernel penalties of the regularized layers
    fn regularization(&self) -> Tensor<B, 1>;

    /// Logits when an output layer is present, otherwise the hidden features
    fn forward(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let features = self.features(tokens);

        match self.output() {
            Some(output) => output.forward(features),
            None => features,
        }
    }

    /// Defines forward pass for training and validation
    fn forward_classification(&self, item: Train<B>) -> Output<B> {
        let logits = self.forward(item.input.tokens);
        let targets = item.targets.to_device(&logits.device());

        let loss = binary_cross_entropy_with_logits(logits.clone(), targets.clone())
            + self.regularization();

        Output {
            loss,
            output: logits,
            targets,
        }
    }

    /// Defines forward pass for inference: per-class probabilities
    fn infer(&self, input: Infer<B>) -> Tensor<B, 2> {
        let output = self.forward(input.tokens);

        match self.output() {
            Some(_) => sigmoid(output),
            None => output,
        }
    }
}

/// A trait for configs that can be used for multi-label classification models
pub trait ModelConfig: burn::config::Config + Clone {
    /// The model this config builds
    type Model<B: Backend>: Module<B> + Classifier<B>;

    /// Initialize the model with pretrained embeddings
    fn init<B: Backend>(
        &self,
        embeddings: &EmbeddingMatrix,
        device: &B::Device,
    ) -> anyhow::Result<Self::Model<B>>;

    /// Rows of the embedding matrix the model was built with
    fn vocab_size(&self) -> usize;

    /// Width of the embedding matrix the model was built with
    fn embedding_dim(&self) -> usize;

    /// Number of output classes
    fn num_classes(&self) -> usize;

    /// Whether the model ends with a per-class output layer
    fn has_output(&self) -> bool;

    /// Initialize a model with zeroed embeddings, to be overwritten by a saved record
    fn init_empty<B: Backend>(&self, device: &B::Device) -> anyhow::Result<Self::Model<B>> {
        let embeddings = EmbeddingMatrix::zeros(self.vocab_size(), self.embedding_dim());

        self.init(&embeddings, device)
    }
}
