//! Classifier that delegates training and inference to CloudForest's
//! `growforest` and `applyforest` executables.
//!
//! Data is handed over through ARFF files inside a scratch directory owned by
//! the classifier. Every file name carries the instance's random identifier,
//! and the directory (model artifact included) is removed when the classifier
//! is dropped. The executables are launched with an explicit argument list;
//! no shell is involved.
//!
//! One instance is not meant to serve concurrent `predict` calls: they share
//! the same interchange file names.
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};
use tempfile::TempDir;
use uuid::Uuid;

use crate::config::{GrowForestOptions, ModelType, Normalization};
use crate::error::{ClassifierError, Result};
use crate::io::arff::{write_relation_file, ColumnValues, Relation, TargetColumn};
use crate::io::forest_output::{read_predictions, read_votes};
use crate::math::Array2;
use crate::models::classifier_trait::{ClassifierModel, ProbabilisticClassifier};

#[derive(Debug)]
enum ForestState {
    Untrained,
    Trained { model_path: PathBuf },
}

pub struct CloudForestClassifier {
    growforest_bin: String,
    applyforest_bin: String,
    options: GrowForestOptions,
    normalization: Normalization,
    id: String,
    workspace: TempDir,
    classes: Vec<i64>,
    state: ForestState,
}

impl CloudForestClassifier {
    /// Classifier using the default executable names and the given options.
    pub fn new(options: GrowForestOptions) -> Result<Self> {
        let mut model_type = ModelType::default();
        if let ModelType::CloudForest { options: o, .. } = &mut model_type {
            *o = options;
        }
        Self::from_model_type(&model_type)
    }

    /// Classifier taking `growforest` options as one free-form string.
    pub fn from_option_string(options: &str) -> Result<Self> {
        Self::new(GrowForestOptions::from_option_string(options))
    }

    pub fn from_model_type(model_type: &ModelType) -> Result<Self> {
        match model_type {
            ModelType::CloudForest {
                growforest_bin,
                applyforest_bin,
                work_dir,
                normalization,
                options,
            } => {
                let id = Uuid::new_v4().to_string();
                let mut builder = tempfile::Builder::new();
                builder.prefix("cloudforest-");
                let workspace = match work_dir {
                    Some(dir) => builder.tempdir_in(dir)?,
                    None => builder.tempdir()?,
                };
                debug!(
                    "CloudForest classifier {} using scratch directory {}",
                    id,
                    workspace.path().display()
                );
                Ok(Self {
                    growforest_bin: growforest_bin.clone(),
                    applyforest_bin: applyforest_bin.clone(),
                    options: options.clone(),
                    normalization: *normalization,
                    id,
                    workspace,
                    classes: Vec::new(),
                    state: ForestState::Untrained,
                })
            }
            other => Err(ClassifierError::Backend(format!(
                "Expected ModelType::CloudForest params, got {:?}",
                other
            ))),
        }
    }

    pub fn with_executables(
        mut self,
        growforest: impl Into<String>,
        applyforest: impl Into<String>,
    ) -> Self {
        self.growforest_bin = growforest.into();
        self.applyforest_bin = applyforest.into();
        self
    }

    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Random identifier embedded in every interchange file name.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn workspace(&self) -> &Path {
        self.workspace.path()
    }

    /// Path of the trained forest, once `fit` has succeeded.
    pub fn model_path(&self) -> Option<&Path> {
        match &self.state {
            ForestState::Trained { model_path } => Some(model_path),
            ForestState::Untrained => None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.model_path().is_some()
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.workspace.path().join(format!("{}.{}", self.id, suffix))
    }

    fn target_name(&self) -> String {
        format!("{}.target", self.id)
    }

    fn run(&self, program: &str, args: &[OsString]) -> Result<()> {
        debug!("Running {} {:?}", program, args);
        let output = Command::new(program)
            .args(args)
            .current_dir(self.workspace.path())
            .output()
            .map_err(|source| ClassifierError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.stdout.is_empty() {
            debug!("{} stdout:\n{}", program, String::from_utf8_lossy(&output.stdout));
        }
        if !output.status.success() {
            return Err(ClassifierError::ProcessFailed {
                program: program.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    /// Serialize `x`, run `applyforest` with `output_flag` and return the path
    /// it was asked to write.
    fn apply(&self, x: &Array2<f64>, output_flag: &str, output_suffix: &str) -> Result<PathBuf> {
        let model_path = self.model_path().ok_or(ClassifierError::NotFitted)?;

        let test_path = self.file("test.cloudforest.arff");
        let output_path = self.file(output_suffix);
        let relation = Relation::from_matrix(format!("{}.test", self.id), x);
        write_relation_file(&test_path, &relation, None)?;

        // a stale file from an earlier call must not pass for fresh output
        if output_path.exists() {
            std::fs::remove_file(&output_path)?;
        }

        let args: Vec<OsString> = vec![
            "-fm".into(),
            test_path.into_os_string(),
            "-rfpred".into(),
            model_path.as_os_str().to_os_string(),
            output_flag.into(),
            output_path.clone().into_os_string(),
        ];
        self.run(&self.applyforest_bin, &args)?;
        Ok(output_path)
    }
}

fn unique_sorted(y: &[i64]) -> Vec<i64> {
    y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

fn count_mismatch(path: &Path, expected: usize, found: usize, what: &'static str) -> ClassifierError {
    ClassifierError::OutputCount {
        path: path.to_path_buf(),
        what,
        expected,
        found,
    }
}

impl ClassifierModel for CloudForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[i64]) -> Result<()> {
        if x.nrows() == 0 {
            return Err(ClassifierError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(ClassifierError::Shape(format!(
                "{} feature rows but {} labels",
                x.nrows(),
                y.len()
            )));
        }

        let classes = unique_sorted(y);
        let target = self.target_name();
        let train_path = self.file("train.cloudforest.arff");
        let model_path = self.file("forest.cloudforest.sf");

        let mut relation = Relation::from_matrix(target.clone(), x);
        relation.push_column(
            target.clone(),
            ColumnValues::Nominal(y.iter().map(|&v| Some(v)).collect()),
        )?;
        write_relation_file(
            &train_path,
            &relation,
            Some(&TargetColumn {
                name: &target,
                classes: &classes,
            }),
        )?;

        if model_path.exists() {
            std::fs::remove_file(&model_path)?;
        }
        self.state = ForestState::Untrained;

        let mut args: Vec<OsString> = vec![
            "-train".into(),
            train_path.into_os_string(),
            "-target".into(),
            target.into(),
            "-rfpred".into(),
            model_path.clone().into_os_string(),
        ];
        args.extend(self.options.to_args().into_iter().map(OsString::from));

        info!(
            "Growing forest on {} samples, {} features, {} classes",
            x.nrows(),
            x.ncols(),
            classes.len()
        );
        self.run(&self.growforest_bin, &args)?;

        if !model_path.exists() {
            return Err(ClassifierError::MissingOutput(model_path));
        }
        self.classes = classes;
        self.state = ForestState::Trained { model_path };
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<i64>> {
        let preds_path = self.apply(x, "-preds", "preds.cloudforest.tsv")?;
        let predictions = read_predictions(&preds_path)?;
        if predictions.len() != x.nrows() {
            return Err(count_mismatch(
                &preds_path,
                x.nrows(),
                predictions.len(),
                "predictions",
            ));
        }
        Ok(predictions)
    }

    fn name(&self) -> &str {
        "cloudforest"
    }
}

impl ProbabilisticClassifier for CloudForestClassifier {
    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let votes_path = self.apply(x, "-votes", "votes.cloudforest.tsv")?;
        let table = read_votes(&votes_path)?;
        if table.n_samples() != x.nrows() {
            return Err(count_mismatch(
                &votes_path,
                x.nrows(),
                table.n_samples(),
                "vote rows",
            ));
        }
        Ok(table.probabilities(&self.classes, self.normalization))
    }
}
