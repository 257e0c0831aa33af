use burn::{
    module::Module,
    nn::{conv::Conv1d, pool::MaxPool1d, Dropout, Embedding, Linear},
    tensor::{activation::relu, backend::Backend, Int, Tensor},
};

use crate::{
    models::layers::{l2_penalty, GlobalPool1d},
    pipelines::multi_label::Classifier,
};

/// Convolutional text classifier over pretrained word embeddings
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// Word embeddings
    pub embedding: Embedding<B>,

    /// First convolution over the embedded sequence
    pub conv1: Conv1d<B>,

    /// Downsampling between the convolutions
    pub pool: MaxPool1d,

    /// Second convolution
    pub conv2: Conv1d<B>,

    /// Max over time
    pub global_pool: GlobalPool1d,

    pub dropout: Dropout,

    /// L2-regularized hidden layer
    pub hidden: Linear<B>,

    /// Per-class output layer
    pub output: Option<Linear<B>>,

    /// Weight of the hidden kernel penalty
    pub l2_weight_decay: f64,
}

impl<B: Backend> Classifier<B> for Model<B> {
    fn features(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        // [batch_size, seq_length, embedding_dim] -> [batch_size, embedding_dim, seq_length]
        let x = self.embedding.forward(tokens).swap_dims(1, 2);

        let x = relu(self.conv1.forward(x));
        let x = self.pool.forward(x);
        let x = relu(self.conv2.forward(x));

        let x = self.global_pool.forward(x, 2);
        let x = self.dropout.forward(x);

        relu(self.hidden.forward(x))
    }

    fn output(&self) -> Option<&Linear<B>> {
        self.output.as_ref()
    }

    fn regularization(&self) -> Tensor<B, 1> {
        l2_penalty(&self.hidden, self.l2_weight_decay)
    }
}

multi_label_steps!(Model);

#[cfg(test)]
mod tests {
    use burn::backend::{Autodiff, NdArray};
    use pretty_assertions::assert_eq;

    use crate::{
        models::embedding::EmbeddingMatrix,
        pipelines::multi_label::{Infer, Train},
        utils::tensors::{float_matrix, pad_to},
    };

    use super::{super::Config, *};

    type TestBackend = NdArray<f32>;

    fn embeddings() -> EmbeddingMatrix {
        let weights = (0..20 * 8).map(|i| (i % 7) as f32 / 7.0).collect();

        EmbeddingMatrix::new(weights, 20, 8).unwrap()
    }

    #[test]
    fn test_forward_shapes() {
        let device = Default::default();
        let config = Config::for_embeddings(&embeddings(), 6).with_num_filters(4);
        let model = config.init::<TestBackend>(&embeddings(), &device).unwrap();

        let tokens = pad_to::<TestBackend>(0, &[vec![1, 2, 3], vec![4, 5, 6, 7, 8]], 10, &device);

        assert_eq!(model.features(tokens.clone()).dims(), [2, 32]);
        assert_eq!(Classifier::forward(&model, tokens).dims(), [2, 6]);
    }

    #[test]
    fn test_branch_without_output_returns_features() {
        let device = Default::default();
        let config = Config::for_embeddings(&embeddings(), 6)
            .with_dense_dim(5)
            .with_with_output(false);
        let model = config.init::<TestBackend>(&embeddings(), &device).unwrap();

        let tokens = pad_to::<TestBackend>(0, &[vec![1, 2]], 6, &device);

        assert!(model.output.is_none());
        assert_eq!(Classifier::forward(&model, tokens).dims(), [1, 5]);
    }

    #[test]
    fn test_init_rejects_mismatched_embeddings() {
        let device = Default::default();
        let config = Config::new(21, 8, 6);

        assert!(config.init::<TestBackend>(&embeddings(), &device).is_err());
    }

    #[test]
    fn test_embeddings_frozen_unless_trainable() {
        type TrainBackend = Autodiff<TestBackend>;

        let device = Default::default();

        for train_embeds in [false, true] {
            let model = Config::for_embeddings(&embeddings(), 2)
                .with_num_filters(4)
                .with_train_embeds(train_embeds)
                .init::<TrainBackend>(&embeddings(), &device)
                .unwrap();

            let tokens = pad_to::<TrainBackend>(0, &[vec![1, 2, 3], vec![4, 5]], 10, &device);
            let targets = float_matrix::<TrainBackend>(vec![1.0, 0.0, 0.0, 1.0], 2, 2, &device);

            let output = model.forward_classification(Train::new(Infer::new(tokens), targets));
            let grads = output.loss.backward();

            assert_eq!(
                model.embedding.weight.val().grad(&grads).is_some(),
                train_embeds
            );
        }
    }
}
