/// Pretrained word embeddings
pub mod embedding;

/// Layers shared by the architectures
pub mod layers;

/// Implement the training and validation steps of a multi-label classifier
macro_rules! multi_label_steps {
    ($model:ident) => {
        impl<B: burn::tensor::backend::AutodiffBackend>
            burn::train::TrainStep<
                $crate::pipelines::multi_label::Train<B>,
                $crate::pipelines::multi_label::Output<B>,
            > for $model<B>
        {
            fn step(
                &self,
                item: $crate::pipelines::multi_label::Train<B>,
            ) -> burn::train::TrainOutput<$crate::pipelines::multi_label::Output<B>> {
                // Run forward pass, calculate gradients and return them along with the output
                let output = $crate::pipelines::multi_label::Classifier::forward_classification(
                    self, item,
                );
                let grads = output.loss.backward();

                burn::train::TrainOutput::new(self, grads, output)
            }
        }

        impl<B: burn::tensor::backend::Backend>
            burn::train::ValidStep<
                $crate::pipelines::multi_label::Train<B>,
                $crate::pipelines::multi_label::Output<B>,
            > for $model<B>
        {
            fn step(
                &self,
                item: $crate::pipelines::multi_label::Train<B>,
            ) -> $crate::pipelines::multi_label::Output<B> {
                $crate::pipelines::multi_label::Classifier::forward_classification(self, item)
            }
        }
    };
}

/// Convolutional classifier
pub mod cnn;

/// Bidirectional LSTM classifier
pub mod lstm;

/// Dense bag-of-embeddings classifier
pub mod dense;

/// Multi-branch classifier concatenating the LSTM, CNN and dense branches
pub mod concat;

pub use embedding::{EmbeddingError, EmbeddingMatrix};

/// Check that a pretrained matrix has the shape a config expects
pub(crate) fn check_embeddings(
    embeddings: &EmbeddingMatrix,
    vocab_size: usize,
    embedding_dim: usize,
) -> anyhow::Result<()> {
    if embeddings.rows() != vocab_size || embeddings.dim() != embedding_dim {
        return Err(anyhow!(
            "Embedding matrix is {}x{}, but the model expects {}x{}",
            embeddings.rows(),
            embeddings.dim(),
            vocab_size,
            embedding_dim
        ));
    }

    Ok(())
}
