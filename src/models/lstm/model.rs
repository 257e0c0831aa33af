use burn::{
    module::Module,
    nn::{lstm::Lstm, Dropout, Embedding, Linear},
    tensor::{activation::relu, backend::Backend, Int, Tensor},
};

use crate::{
    models::layers::{l2_penalty, GlobalPool1d},
    pipelines::multi_label::Classifier,
    utils::tensors::reversed_indices,
};

/// Bidirectional LSTM text classifier over pretrained word embeddings
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// Word embeddings
    pub embedding: Embedding<B>,

    /// LSTM reading the sequence front to back
    pub forward_lstm: Lstm<B>,

    /// LSTM reading the sequence back to front
    pub backward_lstm: Lstm<B>,

    /// Max over time
    pub global_pool: GlobalPool1d,

    pub dropout: Dropout,

    /// Dense layer over the pooled bidirectional states
    pub hidden: Linear<B>,

    /// L2-regularized dense layer
    pub projection: Linear<B>,

    /// Per-class output layer
    pub output: Option<Linear<B>>,

    /// Weight of the projection kernel penalty
    pub l2_weight_decay: f64,
}

impl<B: Backend> Model<B> {
    /// Hidden states of both directions for every step: [batch_size, seq_length, 2 * lstm_dim]
    pub fn encode(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let embedded = self.embedding.forward(tokens);
        let [_batch_size, seq_length, _embedding_dim] = embedded.dims();
        let reverse = reversed_indices::<B>(seq_length, &embedded.device());

        let (_, forward) = self.forward_lstm.forward(embedded.clone(), None);
        let (_, backward) = self
            .backward_lstm
            .forward(embedded.select(1, reverse.clone()), None);

        // Realign the backward states with the steps they belong to
        let backward = backward.select(1, reverse);

        Tensor::cat(vec![forward, backward], 2)
    }
}

impl<B: Backend> Classifier<B> for Model<B> {
    fn features(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let x = self.global_pool.forward(self.encode(tokens), 1);
        let x = self.dropout.forward(x);

        let x = self.dropout.forward(relu(self.hidden.forward(x)));

        relu(self.projection.forward(x))
    }

    fn output(&self) -> Option<&Linear<B>> {
        self.output.as_ref()
    }

    fn regularization(&self) -> Tensor<B, 1> {
        l2_penalty(&self.projection, self.l2_weight_decay)
    }
}

multi_label_steps!(Model);
