//! Fit a CloudForest model and write per-sample predictions and class
//! probabilities as a TSV.
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cloudforest_classifiers::config::{ModelConfig, ModelType};
use cloudforest_classifiers::io::{read_svmlight, read_svmlight_with_config};
use cloudforest_classifiers::math::Array2;
use cloudforest_classifiers::models::{
    ClassifierModel, CloudForestClassifier, ProbabilisticClassifier,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    pub model: ModelConfig,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::new(ModelType::default()),
        }
    }
}

pub fn load_classify_config<P: AsRef<Path>>(path: P) -> Result<ClassifyConfig> {
    crate::util::load_json_config(path)
}

#[derive(Debug)]
pub struct ClassifyOutput {
    pub classes: Vec<i64>,
    pub predictions: Vec<i64>,
    pub probabilities: Array2<f64>,
}

/// Train on `train_path` and classify every sample of `test_path`.
pub fn run_classify(
    train_path: &Path,
    test_path: &Path,
    config: &ClassifyConfig,
) -> Result<ClassifyOutput> {
    let train = read_svmlight(train_path)?;
    let test = read_svmlight_with_config(test_path, &train.matching_config())?;

    let mut model = CloudForestClassifier::from_model_type(&config.model.model_type)?;
    model
        .fit(&train.x, &train.class_labels())
        .with_context(|| format!("Training on {} failed", train_path.display()))?;
    log::info!(
        "Classifying {} samples from {}",
        test.x.nrows(),
        test_path.display()
    );

    let predictions = model.predict(&test.x)?;
    let probabilities = model.predict_proba(&test.x)?;
    Ok(ClassifyOutput {
        classes: model.classes().to_vec(),
        predictions,
        probabilities,
    })
}

/// Write `sample`, `predicted` and one `p_<label>` column per class.
pub fn write_classify_output<W: Write>(output: &ClassifyOutput, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);

    let mut header = vec!["sample".to_string(), "predicted".to_string()];
    header.extend(output.classes.iter().map(|c| format!("p_{}", c)));
    wtr.write_record(&header)?;

    for (i, (pred, probs)) in output
        .predictions
        .iter()
        .zip(output.probabilities.rows())
        .enumerate()
    {
        let mut record = vec![i.to_string(), pred.to_string()];
        record.extend(probs.iter().map(|p| p.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write to `path`, or to stdout when no path is given.
pub fn write_classify_output_to(output: &ClassifyOutput, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_classify_output(output, file)?;
            log::info!("Predictions written to {}", path.display());
        }
        None => write_classify_output(output, io::stdout().lock())?,
    }
    Ok(())
}
