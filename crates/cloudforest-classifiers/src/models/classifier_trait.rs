use crate::error::Result;
use crate::math::Array2;
use crate::metrics;

/// Contract shared by the forest backends, shaped after the familiar
/// `fit` / `predict` / `score` estimator API.
pub trait ClassifierModel {
    /// Fit the model on `x` with one integer class label per row.
    fn fit(&mut self, x: &Array2<f64>, y: &[i64]) -> Result<()>;

    /// Predict one class label per row.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<i64>>;

    /// Mean accuracy of `predict(x)` against `y`.
    fn score(&self, x: &Array2<f64>, y: &[i64]) -> Result<f64> {
        let predictions = self.predict(x)?;
        Ok(metrics::accuracy(y, &predictions))
    }

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Classifiers that also report per-class probabilities.
pub trait ProbabilisticClassifier: ClassifierModel {
    /// Class labels seen during `fit`, sorted ascending. Columns of
    /// `predict_proba` follow this order.
    fn classes(&self) -> &[i64];

    /// One row per sample, one column per entry of `classes()`.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>>;
}
