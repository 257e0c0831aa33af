/// File utilities
pub mod files;

/// Tensor utilities
pub mod tensors;
