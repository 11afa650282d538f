//! Parsers for the tab-separated files written by `applyforest`.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::Normalization;
use crate::error::{ClassifierError, Result};
use crate::math::Array2;

/// Convert a string representation of truth to 1 or 0.
///
/// True values are `y`, `yes`, `t`, `true`, `on` and `1`; false values are
/// `n`, `no`, `f`, `false`, `off` and `0`. Matching ignores case.
pub fn str_to_bool(value: &str) -> Result<i64> {
    match value.to_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(1),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(0),
        _ => Err(ClassifierError::InvalidTruthValue(value.to_string())),
    }
}

fn is_bool_word(value: &str) -> bool {
    value == "True" || value == "False"
}

/// Parse a class label, accepting either an integer or a `True`/`False` word.
fn parse_label(token: &str) -> Option<i64> {
    if is_bool_word(token) {
        str_to_bool(token).ok()
    } else {
        token.parse().ok()
    }
}

fn open_lines(path: &Path) -> Result<impl Iterator<Item = std::io::Result<String>>> {
    let file = File::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => ClassifierError::MissingOutput(path.to_path_buf()),
        _ => ClassifierError::Io(err),
    })?;
    Ok(BufReader::new(file).lines())
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> ClassifierError {
    ClassifierError::OutputMalformed {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

/// Read an `applyforest -preds` file. The predicted label is the second
/// whitespace-separated token of each non-empty line.
pub fn read_predictions<P: AsRef<Path>>(path: P) -> Result<Vec<i64>> {
    let path = path.as_ref();
    let mut predictions = Vec::new();
    for (idx, line) in open_lines(path)?.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let token = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| malformed(path, idx + 1, "missing predicted label column"))?;
        let label = parse_label(token).ok_or_else(|| {
            malformed(path, idx + 1, format!("predicted label '{}' is not an integer", token))
        })?;
        predictions.push(label);
    }
    Ok(predictions)
}

/// Per-class vote counts as written by `applyforest -votes`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteTable {
    /// Class labels in header order; boolean words are coded 1/0.
    pub labels: Vec<i64>,
    /// One row per sample, one column per header label.
    pub votes: Array2<u64>,
}

/// Read an `applyforest -votes` file: a header naming the classes after a
/// leading name column, then `index count count ...` rows.
pub fn read_votes<P: AsRef<Path>>(path: P) -> Result<VoteTable> {
    let path = path.as_ref();
    let mut lines = open_lines(path)?;

    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| malformed(path, 1, "empty votes file"))?;
    let names: Vec<&str> = header.split_whitespace().skip(1).collect();
    if names.is_empty() {
        return Err(malformed(path, 1, "header lists no classes"));
    }
    let labels = if is_bool_word(names[0]) {
        names.iter().map(|v| str_to_bool(v)).collect::<Result<Vec<_>>>()?
    } else {
        names
            .iter()
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|_| malformed(path, 1, format!("class label '{}' is not an integer", v)))
            })
            .collect::<Result<Vec<_>>>()?
    };

    let mut rows = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != labels.len() + 1 {
            return Err(malformed(
                path,
                line_no,
                format!(
                    "expected {} vote columns, found {}",
                    labels.len(),
                    tokens.len().saturating_sub(1)
                ),
            ));
        }
        let counts = tokens[1..]
            .iter()
            .map(|t| {
                t.parse::<u64>()
                    .map_err(|_| malformed(path, line_no, format!("vote count '{}' is not an integer", t)))
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(counts);
    }

    let votes = if rows.is_empty() {
        Array2::zeros(0, labels.len())
    } else {
        Array2::from_rows(rows)?
    };
    Ok(VoteTable { labels, votes })
}

impl VoteTable {
    pub fn n_samples(&self) -> usize {
        self.votes.nrows()
    }

    /// Total votes cast for each sample.
    pub fn row_totals(&self) -> Vec<u64> {
        self.votes.rows().map(|row| row.iter().sum()).collect()
    }

    /// Vote fractions for `classes`, in the given order. Classes missing from
    /// the header get an all-zero column; a zero total gives zero fractions.
    pub fn probabilities(&self, classes: &[i64], normalization: Normalization) -> Array2<f64> {
        let totals = self.row_totals();
        let first_total = totals.first().copied().unwrap_or(0);
        if totals.iter().any(|&t| t != first_total) {
            log::warn!(
                "Vote totals differ between samples; normalizing by {:?}",
                normalization
            );
        }

        let mut probs = Array2::zeros(self.n_samples(), classes.len());
        for (class_idx, class) in classes.iter().enumerate() {
            let Some(col) = self.labels.iter().position(|l| l == class) else {
                continue;
            };
            for row in 0..self.n_samples() {
                let total = match normalization {
                    Normalization::FirstRow => first_total,
                    Normalization::PerRow => totals[row],
                };
                if total > 0 {
                    probs[(row, class_idx)] = self.votes[(row, col)] as f64 / total as f64;
                }
            }
        }
        probs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn truth_values() {
        assert_eq!(str_to_bool("YES").unwrap(), 1);
        assert_eq!(str_to_bool("off").unwrap(), 0);
        assert!(matches!(
            str_to_bool("maybe"),
            Err(ClassifierError::InvalidTruthValue(v)) if v == "maybe"
        ));
    }

    #[test]
    fn predictions_take_second_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "p.tsv", "0\t1\tNA\n1\t0\tNA\n\n2\tTrue\tNA\n");
        assert_eq!(read_predictions(&path).unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn predictions_reject_short_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "p.tsv", "0\t1\n7\n");
        let err = read_predictions(&path).unwrap_err();
        assert!(matches!(err, ClassifierError::OutputMalformed { line: 2, .. }));
    }

    #[test]
    fn missing_file_is_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_predictions(dir.path().join("nope.tsv")).unwrap_err();
        assert!(matches!(err, ClassifierError::MissingOutput(_)));
    }

    #[test]
    fn first_row_normalization_matches_reference_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "v.tsv", "class 0 1\n0 3 7\n1 6 4\n");
        let table = read_votes(&path).unwrap();
        assert_eq!(table.labels, vec![0, 1]);

        let probs = table.probabilities(&[0, 1], Normalization::FirstRow);
        assert_eq!(probs.shape(), (2, 2));
        assert!((probs[(0, 1)] - 0.7).abs() < 1e-12);
        assert!((probs[(1, 1)] - 0.4).abs() < 1e-12);
        assert!((probs[(1, 0)] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn per_row_normalization_uses_own_total() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "v.tsv", "class\t0\t1\n0\t3\t7\n1\t1\t1\n");
        let probs = read_votes(&path)
            .unwrap()
            .probabilities(&[0, 1], Normalization::PerRow);
        assert!((probs[(1, 0)] - 0.5).abs() < 1e-12);
        assert!((probs[(0, 0)] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn boolean_header_and_unseen_class() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "v.tsv", "target\tTrue\tFalse\n0\t8\t2\n");
        let table = read_votes(&path).unwrap();
        assert_eq!(table.labels, vec![1, 0]);

        let probs = table.probabilities(&[0, 1, 2], Normalization::FirstRow);
        assert!((probs[(0, 0)] - 0.2).abs() < 1e-12);
        assert!((probs[(0, 1)] - 0.8).abs() < 1e-12);
        assert_eq!(probs[(0, 2)], 0.0);
    }

    #[test]
    fn bad_boolean_header_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "v.tsv", "target\tTrue\tPerhaps\n0\t8\t2\n");
        assert!(matches!(
            read_votes(&path),
            Err(ClassifierError::InvalidTruthValue(_))
        ));
    }

    #[test]
    fn ragged_vote_row_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_tmp(&dir, "v.tsv", "class 0 1\n0 3\n");
        assert!(matches!(
            read_votes(&path),
            Err(ClassifierError::OutputMalformed { line: 2, .. })
        ));
    }
}
