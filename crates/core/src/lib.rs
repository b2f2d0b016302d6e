//! Core library: tweet tables, feature extraction, classifiers and metrics.

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod pipeline;

pub use error::{Error, Result};
