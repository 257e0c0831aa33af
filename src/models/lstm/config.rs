use burn::{
    nn::{lstm::LstmConfig, DropoutConfig},
    tensor::backend::Backend,
};

use crate::{
    models::{
        check_embeddings,
        embedding::EmbeddingMatrix,
        layers::{dense, GlobalPool1d, Pooling},
    },
    pipelines::multi_label,
};

use super::Model;

/// The Model Configuration
#[derive(burn::config::Config)]
pub struct Config {
    /// Rows of the embedding matrix (vocabulary size, padding included)
    pub vocab_size: usize,

    /// Width of the embedding matrix
    pub embedding_dim: usize,

    /// Number of output classes
    pub num_classes: usize,

    /// Hidden size of each LSTM direction, also the width of the first dense layer
    #[config(default = 50)]
    pub lstm_dim: usize,

    /// L2 penalty on the last hidden dense kernel
    #[config(default = 1e-4)]
    pub l2_weight_decay: f64,

    /// Dropout after the pooled LSTM output and after the first dense layer
    #[config(default = 0.3)]
    pub dropout: f64,

    /// Size of the last hidden dense layer
    #[config(default = 32)]
    pub dense_dim: usize,

    /// Whether to end with a per-class output layer
    #[config(default = true)]
    pub with_output: bool,

    /// Whether the pretrained embeddings are updated during training
    #[config(default = false)]
    pub train_embeds: bool,
}

impl Config {
    /// A configuration matching the shape of a pretrained embedding matrix
    pub fn for_embeddings(embeddings: &EmbeddingMatrix, num_classes: usize) -> Self {
        Self::new(embeddings.rows(), embeddings.dim(), num_classes)
    }

    /// Initialize the model with pretrained embeddings
    pub fn init<B: Backend>(
        &self,
        embeddings: &EmbeddingMatrix,
        device: &B::Device,
    ) -> anyhow::Result<Model<B>> {
        check_embeddings(embeddings, self.vocab_size, self.embedding_dim)?;

        let lstm = LstmConfig::new(self.embedding_dim, self.lstm_dim, true);

        Ok(Model {
            embedding: embeddings.init(self.train_embeds, device),
            forward_lstm: lstm.init(device),
            backward_lstm: lstm.init(device),
            global_pool: GlobalPool1d::new(Pooling::Max),
            dropout: DropoutConfig::new(self.dropout).init(),
            hidden: dense(2 * self.lstm_dim, self.lstm_dim, device),
            projection: dense(self.lstm_dim, self.dense_dim, device),
            output: self
                .with_output
                .then(|| dense(self.dense_dim, self.num_classes, device)),
            l2_weight_decay: self.l2_weight_decay,
        })
    }
}

impl multi_label::ModelConfig for Config {
    type Model<B: Backend> = Model<B>;

    fn init<B: Backend>(
        &self,
        embeddings: &EmbeddingMatrix,
        device: &B::Device,
    ) -> anyhow::Result<Model<B>> {
        self.init(embeddings, device)
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn has_output(&self) -> bool {
        self.with_output
    }
}
