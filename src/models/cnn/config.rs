use burn::{
    nn::{
        conv::Conv1dConfig,
        pool::MaxPool1dConfig,
        DropoutConfig, PaddingConfig1d,
    },
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

    /// Filters in each convolution
    #[config(default = 64)]
    pub num_filters: usize,

    /// Convolution window
    #[config(default = 7)]
    pub kernel_size: usize,

    /// Window and stride of the max pooling between the convolutions
    #[config(default = 2)]
    pub pool_size: usize,

    /// L2 penalty on the hidden dense kernel
    #[config(default = 1e-4)]
    pub l2_weight_decay: f64,

    /// Dropout before the hidden dense layer
    #[config(default = 0.5)]
    pub dropout: f64,

    /// Size of the hidden dense layer
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

        let conv = |channels_in| {
            Conv1dConfig::new(channels_in, self.num_filters, self.kernel_size)
                .with_padding(PaddingConfig1d::Same)
                .init(device)
        };

        Ok(Model {
            embedding: embeddings.init(self.train_embeds, device),
            conv1: conv(self.embedding_dim),
            pool: MaxPool1dConfig::new(self.pool_size)
                .with_stride(self.pool_size)
                .init(),
            conv2: conv(self.num_filters),
            global_pool: GlobalPool1d::new(Pooling::Max),
            dropout: DropoutConfig::new(self.dropout).init(),
            hidden: dense(self.num_filters, self.dense_dim, device),
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
