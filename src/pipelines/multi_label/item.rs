use std::fmt::Debug;

/// A trait for items that can be used for multi-label classification
pub trait Item: Send + Sync + Clone + Debug {
    /// Returns the input text for the item
    fn input(&self) -> &str;

    /// Returns one 0/1 target per class label
    fn targets(&self) -> Vec<f32>;
}
