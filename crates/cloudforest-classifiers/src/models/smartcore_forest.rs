use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::SplitCriterion;

use crate::config::ModelType;
use crate::error::{ClassifierError, Result};
use crate::math::Array2;
use crate::models::classifier_trait::ClassifierModel;

type Forest = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// In-process random forest (smartcore), the library-provided baseline the
/// benchmark times.
pub struct SmartcoreForestClassifier {
    model: Option<Forest>,
    params: RandomForestClassifierParameters,
}

fn split_criterion(name: &str) -> Result<SplitCriterion> {
    match name.to_lowercase().as_str() {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        "classification_error" | "error" => Ok(SplitCriterion::ClassificationError),
        other => Err(ClassifierError::Backend(format!(
            "Unknown split criterion: {}",
            other
        ))),
    }
}

fn to_dense(x: &Array2<f64>) -> DenseMatrix<f64> {
    DenseMatrix::from_2d_vec(&x.to_nested_vec())
}

impl SmartcoreForestClassifier {
    pub fn new(model_type: &ModelType) -> Result<Self> {
        match model_type {
            ModelType::RandomForest {
                n_trees,
                max_depth,
                min_samples_leaf,
                min_samples_split,
                m,
                criterion,
                seed,
            } => Ok(Self {
                model: None,
                params: RandomForestClassifierParameters {
                    criterion: split_criterion(criterion)?,
                    max_depth: *max_depth,
                    min_samples_leaf: *min_samples_leaf,
                    min_samples_split: *min_samples_split,
                    n_trees: *n_trees,
                    m: *m,
                    keep_samples: false,
                    seed: *seed,
                },
            }),
            other => Err(ClassifierError::Backend(format!(
                "Expected ModelType::RandomForest params, got {:?}",
                other
            ))),
        }
    }

    pub fn params(&self) -> &RandomForestClassifierParameters {
        &self.params
    }
}

impl ClassifierModel for SmartcoreForestClassifier {
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
        let labels = y
            .iter()
            .map(|&v| {
                i32::try_from(v)
                    .map_err(|_| ClassifierError::Backend(format!("label {} does not fit in i32", v)))
            })
            .collect::<Result<Vec<i32>>>()?;

        log::info!(
            "Fitting smartcore forest with {} trees on {} samples",
            self.params.n_trees,
            x.nrows()
        );
        let forest = Forest::fit(&to_dense(x), &labels, self.params.clone())
            .map_err(|e| ClassifierError::Backend(e.to_string()))?;
        self.model = Some(forest);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<i64>> {
        let model = self.model.as_ref().ok_or(ClassifierError::NotFitted)?;
        let predictions = model
            .predict(&to_dense(x))
            .map_err(|e| ClassifierError::Backend(e.to_string()))?;
        Ok(predictions.into_iter().map(i64::from).collect())
    }

    fn name(&self) -> &str {
        "randomforest"
    }
}
