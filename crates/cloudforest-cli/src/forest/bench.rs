//! Train-and-score benchmark over SVMLight datasets.
//!
//! Loads a training file, fits the configured forest, times the fit and
//! reports accuracy either on the training data itself or on a held-out file.
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cloudforest_classifiers::config::{ModelConfig, ModelType};
use cloudforest_classifiers::io::{read_svmlight, read_svmlight_with_config};
use cloudforest_classifiers::metrics::ClassificationSummary;
use cloudforest_classifiers::models::factory::build_model;

/// Parameters for a benchmark run. `n_trees`, `n_jobs` and `seed` are applied
/// on top of `model` so one file can drive either backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub model: ModelConfig,
    pub n_trees: usize,
    pub n_jobs: usize,
    pub seed: u64,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::new(ModelType::random_forest()),
            n_trees: 2000,
            n_jobs: 8,
            seed: 0,
        }
    }
}

impl BenchConfig {
    /// Model configuration with the run-level overrides applied.
    pub fn resolved_model(&self) -> ModelConfig {
        let mut model = self.model.clone();
        model.model_type.set_n_trees(self.n_trees);
        model.model_type.set_n_jobs(self.n_jobs);
        model.model_type.set_seed(self.seed);
        model
    }
}

/// Where the reported accuracy was measured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationSet {
    Training,
    Test(PathBuf),
}

#[derive(Debug)]
pub struct BenchReport {
    pub train_seconds: f64,
    pub evaluated_on: EvaluationSet,
    pub summary: ClassificationSummary,
    /// Correct predictions among samples labelled 1 and 0.
    pub positive_correct: usize,
    pub negative_correct: usize,
}

/// Load a benchmark configuration from a JSON file.
pub fn load_bench_config<P: AsRef<Path>>(path: P) -> Result<BenchConfig> {
    crate::util::load_json_config(path)
}

/// Fit on `train_path`, then score on `test_path` or, without one, on the
/// training data. Progress lines go to `out` as the run advances.
pub fn run_benchmark<W: Write>(
    train_path: &Path,
    test_path: Option<&Path>,
    config: &BenchConfig,
    out: &mut W,
) -> Result<BenchReport> {
    let train = read_svmlight(train_path)?;
    let y_train = train.class_labels();
    log::info!(
        "Loaded {} training samples with {} features",
        train.x.nrows(),
        train.n_features()
    );

    let model_config = config.resolved_model();
    writeln!(out, "{:?}", model_config.model_type)?;
    let mut model = build_model(model_config)?;

    writeln!(out, "Starting Training")?;
    let started = Instant::now();
    model
        .fit(&train.x, &y_train)
        .with_context(|| format!("Training on {} failed", train_path.display()))?;
    let train_seconds = started.elapsed().as_secs_f64();
    writeln!(out, "Training on {} took {}", train_path.display(), train_seconds)?;

    let (x_eval, y_eval, evaluated_on) = match test_path {
        Some(path) => {
            let test = read_svmlight_with_config(path, &train.matching_config())?;
            let labels = test.class_labels();
            (test.x, labels, EvaluationSet::Test(path.to_path_buf()))
        }
        None => (train.x, y_train, EvaluationSet::Training),
    };

    let predictions = model.predict(&x_eval)?;
    let summary = ClassificationSummary::compute(&y_eval, &predictions);
    let report = BenchReport {
        train_seconds,
        evaluated_on,
        positive_correct: summary.correct_for(1),
        negative_correct: summary.correct_for(0),
        summary,
    };
    write_score_line(&report, out)?;
    Ok(report)
}

/// Print the score line for a finished run.
pub fn write_score_line<W: Write>(report: &BenchReport, out: &mut W) -> Result<()> {
    let s = &report.summary;
    match report.evaluated_on {
        EvaluationSet::Training => {
            writeln!(out, "Score: {}, {} / {} ", s.accuracy, s.correct, s.total)?;
        }
        EvaluationSet::Test(_) => {
            writeln!(
                out,
                "Testing Score: {}, {} / {}, {}, {}, {} ",
                s.accuracy,
                s.correct,
                s.total,
                report.positive_correct,
                report.negative_correct,
                s.balanced_accuracy
            )?;
        }
    }
    Ok(())
}
