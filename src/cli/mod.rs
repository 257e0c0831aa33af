/// CLI Indexes: Architectures
pub mod architectures;

/// CLI Indexes: Datasets
pub mod datasets;

pub use architectures::Architecture;
pub use datasets::Dataset;
