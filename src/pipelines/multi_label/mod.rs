/// Items that can be classified
pub mod item;

/// Batcher
pub mod batcher;

/// Common model traits for multi-label classification
pub mod model;

/// Training and validation step output
pub mod output;

/// Training
pub mod training;

/// Inference
pub mod inference;

/// Evaluation metrics
pub mod evaluation;

pub use batcher::{Batcher, Infer, Train};
pub use inference::infer;
pub use item::Item;
pub use model::{Classifier, ModelConfig};
pub use output::Output;
pub use training::train;
