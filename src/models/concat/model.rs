use burn::{
    module::Module,
    nn::{BatchNorm, Dropout, Linear},
    tensor::{activation::relu, backend::Backend, Int, Tensor},
};

use crate::{
    models::{cnn, dense, layers::l2_penalty, lstm},
    pipelines::multi_label::Classifier,
};

/// LSTM, CNN and dense branches merged into one classifier
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    pub lstm: lstm::Model<B>,

    pub cnn: cnn::Model<B>,

    pub dense: dense::Model<B>,

    /// Normalizes the concatenated branch features
    pub norm: BatchNorm<B, 1>,

    pub dropout: Dropout,

    /// L2-regularized hidden layer over the merged features
    pub hidden: Linear<B>,

    /// Per-class output layer
    pub output: Option<Linear<B>>,

    /// Weight of the hidden kernel penalty
    pub l2_weight_decay: f64,
}

impl<B: Backend> Classifier<B> for Model<B> {
    fn features(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let merged = Tensor::cat(
            vec![
                self.lstm.features(tokens.clone()),
                self.cnn.features(tokens.clone()),
                self.dense.features(tokens),
            ],
            1,
        );

        // Batch norm expects a channel dimension followed by at least one more
        let [batch_size, channels] = merged.dims();
        let x = self
            .norm
            .forward(merged.reshape([batch_size, channels, 1]))
            .reshape([batch_size, channels]);

        let x = self.dropout.forward(x);

        relu(self.hidden.forward(x))
    }

    fn output(&self) -> Option<&Linear<B>> {
        self.output.as_ref()
    }

    fn regularization(&self) -> Tensor<B, 1> {
        self.lstm.regularization()
            + self.cnn.regularization()
            + self.dense.regularization()
            + l2_penalty(&self.hidden, self.l2_weight_decay)
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
        let weights = (0..15 * 6).map(|i| ((i * 7) % 11) as f32 / 11.0).collect();

        EmbeddingMatrix::new(weights, 15, 6).unwrap()
    }

    fn config() -> Config {
        Config::for_embeddings(&embeddings(), 6)
            .with_n_layers(2)
            .with_num_filters(4)
            .with_lstm_dim(3)
            .with_dense_dim(5)
    }

    #[test]
    fn test_merged_width() {
        // lstm (5) + cnn (5) + dense branch (100)
        assert_eq!(config().merged_dim(), 110);
        assert_eq!(config().with_concat(true).merged_dim(), 10 + 6 + 2 * 100);
    }

    #[test]
    fn test_branches_have_no_output_layer() {
        let device = Default::default();
        let model = config().init::<TestBackend>(&embeddings(), &device).unwrap();

        assert!(model.lstm.output.is_none());
        assert!(model.cnn.output.is_none());
        assert!(model.dense.output.is_none());
        assert!(model.output.is_some());
    }

    #[test]
    fn test_infer_returns_probabilities() {
        let device = Default::default();
        let model = config().init::<TestBackend>(&embeddings(), &device).unwrap();

        let tokens = pad_to::<TestBackend>(0, &[vec![1, 2, 3], vec![4, 5]], 6, &device);
        let probabilities = model.infer(Infer::new(tokens));

        assert_eq!(probabilities.dims(), [2, 6]);
        assert!(probabilities
            .into_data()
            .convert::<f32>()
            .value
            .iter()
            .all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_training_loss_includes_branch_penalties() {
        type TrainBackend = Autodiff<TestBackend>;

        let device = Default::default();
        let model = config()
            .with_l2_weight_decay(10.0)
            .init::<TrainBackend>(&embeddings(), &device)
            .unwrap();

        let tokens = pad_to::<TrainBackend>(0, &[vec![1, 2, 3], vec![4, 5]], 6, &device);
        let targets = float_matrix::<TrainBackend>(vec![0.0; 12], 2, 6, &device);

        let output = model.forward_classification(Train::new(Infer::new(tokens), targets));
        let penalty = model.regularization().into_scalar();

        assert!(penalty > 0.0);
        assert!(output.loss.clone().into_scalar() > penalty);
        assert_eq!(output.output.dims(), [2, 6]);

        // Gradients flow back through every branch
        let _grads = output.loss.backward();
    }

    #[test]
    fn test_branch_embeddings_follow_train_embeds() {
        type TrainBackend = Autodiff<TestBackend>;

        let device = Default::default();

        for train_embeds in [false, true] {
            let model = config()
                .with_train_embeds(train_embeds)
                .init::<TrainBackend>(&embeddings(), &device)
                .unwrap();

            let tokens = pad_to::<TrainBackend>(0, &[vec![1, 2, 3], vec![4, 5]], 6, &device);
            let targets = float_matrix::<TrainBackend>(vec![0.0; 12], 2, 6, &device);

            let output = model.forward_classification(Train::new(Infer::new(tokens), targets));
            let grads = output.loss.backward();

            for embedding in [
                &model.lstm.embedding,
                &model.cnn.embedding,
                &model.dense.embedding,
            ] {
                assert_eq!(embedding.weight.val().grad(&grads).is_some(), train_embeds);
            }
        }
    }
}
