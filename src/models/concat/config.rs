use burn::{
    nn::{BatchNormConfig, DropoutConfig},
    tensor::backend::Backend,
};

use crate::{
    models::{
        cnn, dense,
        embedding::EmbeddingMatrix,
        layers::{self, Pooling},
        lstm,
    },
    pipelines::multi_label,
};

use super::Model;

/// Width of the hidden blocks of the dense branch
pub const DENSE_BRANCH_DIM: usize = 100;

/// The Model Configuration
#[derive(burn::config::Config)]
pub struct Config {
    /// Rows of the embedding matrix (vocabulary size, padding included)
    pub vocab_size: usize,

    /// Width of the embedding matrix
    pub embedding_dim: usize,

    /// Number of output classes
    pub num_classes: usize,

    /// Hidden blocks in the dense branch
    #[config(default = 10)]
    pub n_layers: usize,

    /// Whether the dense branch concatenates block outputs with their inputs
    #[config(default = false)]
    pub concat: bool,

    /// Pooling of the dense branch
    #[config(default = "Pooling::Max")]
    pub pool: Pooling,

    /// Filters in each convolution of the CNN branch
    #[config(default = 64)]
    pub num_filters: usize,

    /// L2 penalty on the regularized kernels of every branch and of the merged hidden layer
    #[config(default = 1e-4)]
    pub l2_weight_decay: f64,

    /// Hidden size of each LSTM direction
    #[config(default = 50)]
    pub lstm_dim: usize,

    /// Dropout rate shared by the branches and the merged layers
    #[config(default = 0.5)]
    pub dropout: f64,

    /// Size of the branch outputs and the merged hidden layer
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

    /// The LSTM branch, without an output layer
    pub fn lstm_branch(&self) -> lstm::Config {
        lstm::Config::new(self.vocab_size, self.embedding_dim, self.num_classes)
            .with_l2_weight_decay(self.l2_weight_decay)
            .with_lstm_dim(self.lstm_dim)
            .with_dropout(self.dropout)
            .with_dense_dim(self.dense_dim)
            .with_with_output(false)
            .with_train_embeds(self.train_embeds)
    }

    /// The CNN branch, without an output layer
    pub fn cnn_branch(&self) -> cnn::Config {
        cnn::Config::new(self.vocab_size, self.embedding_dim, self.num_classes)
            .with_num_filters(self.num_filters)
            .with_l2_weight_decay(self.l2_weight_decay)
            .with_dropout(self.dropout)
            .with_dense_dim(self.dense_dim)
            .with_with_output(false)
            .with_train_embeds(self.train_embeds)
    }

    /// The dense branch, without an output layer
    pub fn dense_branch(&self) -> dense::Config {
        dense::Config::new(self.vocab_size, self.embedding_dim, self.num_classes)
            .with_hidden_dim(DENSE_BRANCH_DIM)
            .with_n_layers(self.n_layers)
            .with_concat(self.concat)
            .with_dropout(self.dropout)
            .with_l2_weight_decay(self.l2_weight_decay)
            .with_pool(self.pool)
            .with_with_output(false)
            .with_train_embeds(self.train_embeds)
    }

    /// Width of the concatenated branch features
    pub fn merged_dim(&self) -> usize {
        2 * self.dense_dim + self.dense_branch().features_dim()
    }

    /// Initialize the model with pretrained embeddings
    pub fn init<B: Backend>(
        &self,
        embeddings: &EmbeddingMatrix,
        device: &B::Device,
    ) -> anyhow::Result<Model<B>> {
        let merged_dim = self.merged_dim();

        Ok(Model {
            lstm: self.lstm_branch().init(embeddings, device)?,
            cnn: self.cnn_branch().init(embeddings, device)?,
            dense: self.dense_branch().init(embeddings, device)?,
            norm: BatchNormConfig::new(merged_dim)
                .with_epsilon(1e-3)
                .with_momentum(0.01)
                .init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
            hidden: layers::dense(merged_dim, self.dense_dim, device),
            output: self
                .with_output
                .then(|| layers::dense(self.dense_dim, self.num_classes, device)),
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
