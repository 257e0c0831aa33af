use burn::{
    module::Module,
    nn::{Dropout, Embedding, Linear},
    tensor::{activation::relu, backend::Backend, Int, Tensor},
};

use crate::{
    models::layers::{l2_penalty, GlobalPool1d},
    pipelines::multi_label::Classifier,
};

/// Bag-of-embeddings classifier: pooled word vectors through a stack of dense blocks
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// Word embeddings
    pub embedding: Embedding<B>,

    /// Max or average over the words
    pub global_pool: GlobalPool1d,

    /// L2-regularized hidden blocks
    pub blocks: Vec<Linear<B>>,

    pub dropout: Dropout,

    /// Per-class output layer
    pub output: Option<Linear<B>>,

    /// Whether each block's output is appended to its input
    pub concat: bool,

    /// Weight of the block kernel penalties
    pub l2_weight_decay: f64,
}

impl<B: Backend> Classifier<B> for Model<B> {
    fn features(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let mut x = self
            .global_pool
            .forward(self.embedding.forward(tokens), 1);

        for block in &self.blocks {
            let h = self.dropout.forward(relu(block.forward(x.clone())));

            x = if self.concat {
                Tensor::cat(vec![x, h], 1)
            } else {
                h
            };
        }

        x
    }

    fn output(&self) -> Option<&Linear<B>> {
        self.output.as_ref()
    }

    fn regularization(&self) -> Tensor<B, 1> {
        let device = self.embedding.weight.val().device();

        self.blocks
            .iter()
            .fold(Tensor::zeros([1], &device), |penalty, block| {
                penalty + l2_penalty(block, self.l2_weight_decay)
            })
    }
}

multi_label_steps!(Model);

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use pretty_assertions::assert_eq;

    use crate::{
        models::{embedding::EmbeddingMatrix, layers::Pooling},
        utils::tensors::pad_to,
    };

    use super::{super::Config, *};

    type TestBackend = NdArray<f32>;

    fn embeddings() -> EmbeddingMatrix {
        let weights = (0..10 * 6).map(|i| (i % 4) as f32).collect();

        EmbeddingMatrix::new(weights, 10, 6).unwrap()
    }

    #[test]
    fn test_stacked_blocks() {
        let device = Default::default();
        let config = Config::for_embeddings(&embeddings(), 6)
            .with_hidden_dim(8)
            .with_n_layers(3);
        let model = config.init::<TestBackend>(&embeddings(), &device).unwrap();

        let tokens = pad_to::<TestBackend>(0, &[vec![1, 2], vec![3]], 4, &device);

        assert_eq!(config.features_dim(), 8);
        assert_eq!(model.features(tokens.clone()).dims(), [2, 8]);
        assert_eq!(Classifier::forward(&model, tokens).dims(), [2, 6]);
    }

    #[test]
    fn test_concatenated_blocks_grow_features() {
        let device = Default::default();
        let config = Config::for_embeddings(&embeddings(), 6)
            .with_hidden_dim(8)
            .with_n_layers(3)
            .with_concat(true)
            .with_pool(Pooling::Avg);
        let model = config.init::<TestBackend>(&embeddings(), &device).unwrap();

        let tokens = pad_to::<TestBackend>(0, &[vec![1, 2], vec![3]], 4, &device);

        assert_eq!(config.features_dim(), 6 + 3 * 8);
        assert_eq!(model.features(tokens.clone()).dims(), [2, 30]);
        assert_eq!(Classifier::forward(&model, tokens).dims(), [2, 6]);
    }

    #[test]
    fn test_without_blocks_features_are_pooled_embeddings() {
        let device = Default::default();
        let config = Config::for_embeddings(&embeddings(), 6)
            .with_n_layers(0)
            .with_with_output(false);
        let model = config.init::<TestBackend>(&embeddings(), &device).unwrap();

        let tokens = pad_to::<TestBackend>(0, &[vec![1]], 2, &device);

        assert_eq!(model.features(tokens).dims(), [1, 6]);
        assert_eq!(model.regularization().into_scalar(), 0.0);
    }
}
