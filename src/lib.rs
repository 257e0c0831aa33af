//! # Burn Text Classifiers
//!
//! Multi-label text classification over pretrained word embeddings, with TF-IDF feature
//! extraction for linear baselines.
#![forbid(unsafe_code)]

/// Models
pub mod models;

/// Pipelines
pub mod pipelines;

/// Datasets
pub mod datasets;

/// TF-IDF features and linear feature importance
pub mod features;

/// Prediction frames
pub mod predictions;

/// Word index
pub mod vocabulary;

/// Utilities
pub mod utils;

/// CLI indexes and utilities
pub mod cli;

/// Error macros
#[macro_use]
extern crate anyhow;
