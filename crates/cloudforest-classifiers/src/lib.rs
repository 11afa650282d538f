//! cloudforest-classifiers: random forest classifiers for tabular data.
//!
//! The main model, [`models::CloudForestClassifier`], wraps the CloudForest
//! `growforest` / `applyforest` command line tools: training data is written as
//! ARFF, the tools run as child processes, and their prediction or vote files
//! are parsed back. An in-process smartcore forest shares the same
//! [`models::ClassifierModel`] trait so both can be benchmarked side by side.
//!
//! Supporting modules cover the file formats (`io`), small dense containers
//! (`math`), accuracy metrics and configuration.
pub mod config;
pub mod error;
pub mod io;
pub mod math;
pub mod metrics;
pub mod models;

pub use error::{ClassifierError, Result};
