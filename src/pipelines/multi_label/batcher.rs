use std::sync::Arc;

use burn::{
    data::dataloader,
    tensor::{backend::Backend, Int, Tensor},
};
use derive_new::new;

use crate::{
    utils::tensors::{float_matrix, pad_to},
    vocabulary::{Vocabulary, PAD_INDEX},
};

use super::Item;

/// An inference batch for multi-label classification
#[derive(Debug, Clone, new)]
pub struct Infer<B: Backend> {
    /// Word indices as 2D tensor: [batch_size, max_seq_length]
    pub tokens: Tensor<B, 2, Int>,
}

/// A training batch for multi-label classification
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Model input
    pub input: Infer<B>,

    /// 0/1 targets for the batch: [batch_size, num_classes]
    pub targets: Tensor<B, 2>,
}

/// Struct for batching multi-label classification items
#[derive(Clone)]
pub struct Batcher<B: Backend> {
    /// Word index used to encode text
    vocabulary: Arc<Vocabulary>,

    /// Sequences are padded or truncated to this length
    max_seq_length: usize,

    /// Number of target columns per item
    num_classes: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    device: B::Device,
}

impl<B: Backend> Batcher<B> {
    /// Creates a new batcher
    pub fn new(
        vocabulary: Arc<Vocabulary>,
        max_seq_length: usize,
        num_classes: usize,
        device: B::Device,
    ) -> Self {
        Self {
            vocabulary,
            max_seq_length,
            num_classes,
            device,
        }
    }
}

/// Implement Batcher trait for Batcher struct for inference
impl<B: Backend> dataloader::batcher::Batcher<String, Infer<B>> for Batcher<B> {
    /// Collects a vector of texts into an inference batch
    fn batch(&self, items: Vec<String>) -> Infer<B> {
        let token_ids_list: Vec<Vec<usize>> = items
            .iter()
            .map(|input| self.vocabulary.encode(input))
            .collect();

        Infer {
            tokens: pad_to(
                PAD_INDEX,
                &token_ids_list,
                self.max_seq_length,
                &self.device,
            ),
        }
    }
}

/// Implement Batcher trait for Batcher struct for training
impl<B: Backend, I: Item> dataloader::batcher::Batcher<I, Train<B>> for Batcher<B> {
    /// Collects a vector of items into a training batch
    fn batch(&self, items: Vec<I>) -> Train<B> {
        let batch_size = items.len();

        let inputs = items.iter().map(|item| item.input().to_string()).collect();
        let infer: Infer<B> = self.batch(inputs);

        let mut targets = Vec::with_capacity(batch_size * self.num_classes);

        for item in &items {
            let item_targets = item.targets();

            assert_eq!(
                item_targets.len(),
                self.num_classes,
                "item has {} targets, expected {}",
                item_targets.len(),
                self.num_classes
            );

            targets.extend(item_targets);
        }

        Train {
            input: infer,
            targets: float_matrix(targets, batch_size, self.num_classes, &self.device),
        }
    }
}
