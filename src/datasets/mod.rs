use std::sync::Arc;

use async_trait::async_trait;
use burn::data::dataset::{
    transform::{PartialDataset, ShuffledDataset},
    Dataset,
};

/// The Jigsaw toxic comment dataset
pub mod jigsaw;

/// A dataset which can be loaded
#[async_trait]
pub trait LoadableDataset<I>: Dataset<I> {
    /// Load the dataset for a mode (e.g., "train" or "test")
    async fn load(data_dir: &str, mode: &str) -> std::io::Result<Self>
    where
        Self: std::marker::Sized;
}

/// One side of a shuffled train/validation split
pub type Split<D, I> = PartialDataset<Arc<ShuffledDataset<D, I>>, I>;

/// Shuffle a dataset with a fixed seed and hold out `valid_fraction` of it for validation
pub fn train_valid_split<D, I>(dataset: D, valid_fraction: f64, seed: u64) -> (Split<D, I>, Split<D, I>)
where
    D: Dataset<I>,
    I: Clone + Send + Sync,
{
    let shuffled = Arc::new(ShuffledDataset::with_seed(dataset, seed));
    let len = shuffled.len();

    let n_valid = ((len as f64) * valid_fraction.clamp(0.0, 1.0)).round() as usize;
    let n_train = len - n_valid;

    (
        PartialDataset::new(shuffled.clone(), 0, n_train),
        PartialDataset::new(shuffled, n_train, len),
    )
}
