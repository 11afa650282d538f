use crate::config::{ModelConfig, ModelType};
use crate::error::Result;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::cloudforest::CloudForestClassifier;
use crate::models::smartcore_forest::SmartcoreForestClassifier;

/// Build a boxed classifier model from a `ModelConfig`.
/// Currently this is a thin factory implemented as a single function.
pub fn build_model(params: ModelConfig) -> Result<Box<dyn ClassifierModel>> {
    match &params.model_type {
        ModelType::CloudForest { .. } => Ok(Box::new(CloudForestClassifier::from_model_type(
            &params.model_type,
        )?)),
        ModelType::RandomForest { .. } => Ok(Box::new(SmartcoreForestClassifier::new(
            &params.model_type,
        )?)),
    }
}
