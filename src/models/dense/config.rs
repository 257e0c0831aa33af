use burn::{nn::DropoutConfig, tensor::backend::Backend};

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

    /// Width of each hidden block
    #[config(default = 100)]
    pub hidden_dim: usize,

    /// Number of hidden blocks
    #[config(default = 10)]
    pub n_layers: usize,

    /// Concatenate each block's output with its input instead of replacing it
    #[config(default = false)]
    pub concat: bool,

    /// How the embedded words are pooled into one vector
    #[config(default = "Pooling::Max")]
    pub pool: Pooling,

    /// Dropout after each hidden block
    #[config(default = 0.5)]
    pub dropout: f64,

    /// L2 penalty on every hidden kernel
    #[config(default = 1e-4)]
    pub l2_weight_decay: f64,

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

    /// Input width of each hidden block
    fn block_inputs(&self) -> Vec<usize> {
        (0..self.n_layers)
            .map(|i| match (self.concat, i) {
                (true, _) => self.embedding_dim + i * self.hidden_dim,
                (false, 0) => self.embedding_dim,
                (false, _) => self.hidden_dim,
            })
            .collect()
    }

    /// Width of the features fed to the output layer
    pub fn features_dim(&self) -> usize {
        match (self.concat, self.n_layers) {
            (true, n) => self.embedding_dim + n * self.hidden_dim,
            (false, 0) => self.embedding_dim,
            (false, _) => self.hidden_dim,
        }
    }

    /// Initialize the model with pretrained embeddings
    pub fn init<B: Backend>(
        &self,
        embeddings: &EmbeddingMatrix,
        device: &B::Device,
    ) -> anyhow::Result<Model<B>> {
        check_embeddings(embeddings, self.vocab_size, self.embedding_dim)?;

        Ok(Model {
            embedding: embeddings.init(self.train_embeds, device),
            global_pool: GlobalPool1d::new(self.pool),
            blocks: self
                .block_inputs()
                .into_iter()
                .map(|d_input| dense(d_input, self.hidden_dim, device))
                .collect(),
            dropout: DropoutConfig::new(self.dropout).init(),
            output: self
                .with_output
                .then(|| dense(self.features_dim(), self.num_classes, device)),
            concat: self.concat,
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
