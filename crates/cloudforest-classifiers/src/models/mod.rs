pub mod classifier_trait;
pub mod cloudforest;
pub mod factory;
pub mod smartcore_forest;

pub use classifier_trait::{ClassifierModel, ProbabilisticClassifier};
pub use cloudforest::CloudForestClassifier;
pub use smartcore_forest::SmartcoreForestClassifier;
