//! SVMLight / LibSVM reader.
//!
//! Rows look like `<label> <index>:<value> ... # comment`. The sparse rows are
//! densified into an `Array2<f64>`, absent entries become `0.0`.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};

use crate::math::{Array1, Array2};

/// Dense dataset loaded from an SVMLight file.
#[derive(Debug, Clone)]
pub struct SvmLightData {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    /// Index base the file was read with, given or detected.
    pub zero_based: bool,
}

impl SvmLightData {
    /// Labels as integer classes, the form the classifiers take.
    pub fn class_labels(&self) -> Vec<i64> {
        self.y.iter().map(|v| v.round() as i64).collect()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Reader settings that lay out another file (e.g. a test set) in the same
    /// columns as this one: same width, same index base.
    pub fn matching_config(&self) -> SvmLightReaderConfig {
        SvmLightReaderConfig {
            n_features: Some(self.n_features()),
            zero_based: Some(self.zero_based),
        }
    }
}

/// Options for reading SVMLight files.
#[derive(Debug, Clone, Default)]
pub struct SvmLightReaderConfig {
    /// Force the width of the dense matrix, e.g. to match a training file.
    /// Indices beyond it are an error. When `None` the widest row decides.
    pub n_features: Option<usize>,
    /// `Some(true)` for zero-based indices, `Some(false)` for one-based,
    /// `None` to detect: zero-based if any index is 0.
    pub zero_based: Option<bool>,
}

struct SparseRow {
    label: f64,
    entries: Vec<(usize, f64)>,
}

/// Read an SVMLight file with automatic width and index base.
pub fn read_svmlight<P: AsRef<Path>>(path: P) -> Result<SvmLightData> {
    read_svmlight_with_config(path, &SvmLightReaderConfig::default())
}

/// Read an SVMLight file using a custom configuration.
pub fn read_svmlight_with_config<P: AsRef<Path>>(
    path: P,
    config: &SvmLightReaderConfig,
) -> Result<SvmLightData> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open SVMLight file: {}", path.as_ref().display()))?;
    let reader = BufReader::new(file);

    let mut rows = Vec::new();
    for (row_idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", row_idx + 1))?;
        if let Some(row) = parse_line(&line).with_context(|| format!("Invalid row at line {}", row_idx + 1))? {
            rows.push(row);
        }
    }

    let zero_based = config.zero_based.unwrap_or_else(|| {
        rows.iter()
            .flat_map(|r| r.entries.iter())
            .any(|&(idx, _)| idx == 0)
    });

    let widest = rows
        .iter()
        .flat_map(|r| r.entries.iter())
        .map(|&(idx, _)| if zero_based { idx + 1 } else { idx })
        .max()
        .unwrap_or(0);
    let n_features = match config.n_features {
        Some(n) if widest > n => bail!(
            "{} uses feature index {} but the width is fixed to {}",
            path.as_ref().display(),
            widest,
            n
        ),
        Some(n) => n,
        None => widest,
    };

    let mut data = vec![0.0; rows.len() * n_features];
    let mut labels = Vec::with_capacity(rows.len());
    for (row_idx, row) in rows.iter().enumerate() {
        labels.push(row.label);
        for &(idx, value) in &row.entries {
            let col = if zero_based {
                idx
            } else {
                idx.checked_sub(1)
                    .ok_or_else(|| anyhow!("Feature index 0 in one-based file at row {}", row_idx + 1))?
            };
            data[row_idx * n_features + col] = value;
        }
    }

    let x = Array2::from_shape_vec((rows.len(), n_features), data)
        .context("Failed to build feature matrix")?;
    log::debug!(
        "Loaded {} samples with {} features from {}",
        x.nrows(),
        x.ncols(),
        path.as_ref().display()
    );
    Ok(SvmLightData {
        x,
        y: Array1::from_vec(labels),
        zero_based,
    })
}

fn parse_line(line: &str) -> Result<Option<SparseRow>> {
    let content = line.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Ok(None);
    }

    let mut tokens = content.split_whitespace();
    let label_token = tokens.next().unwrap_or_default();
    let label = label_token
        .parse::<f64>()
        .with_context(|| format!("Invalid label '{}'", label_token))?;

    let mut entries = Vec::new();
    for token in tokens {
        // qid is a ranking annotation, irrelevant for classification
        if token.starts_with("qid:") {
            continue;
        }
        let (idx, value) = token
            .split_once(':')
            .ok_or_else(|| anyhow!("Expected index:value, found '{}'", token))?;
        let idx = idx
            .parse::<usize>()
            .with_context(|| format!("Invalid feature index '{}'", idx))?;
        let value = value
            .parse::<f64>()
            .with_context(|| format!("Invalid feature value '{}'", value))?;
        entries.push((idx, value));
    }

    Ok(Some(SparseRow { label, entries }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.svm");
        File::create(&path).unwrap().write_all(body.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn densifies_one_based_rows() {
        let (_dir, path) = write_tmp("1 1:0.5 3:2\n# comment only\n\n0 2:1.5 # trailing\n");
        let data = read_svmlight(&path).unwrap();
        assert_eq!(data.x.shape(), (2, 3));
        assert_eq!(data.x.row_slice(0), &[0.5, 0.0, 2.0]);
        assert_eq!(data.x.row_slice(1), &[0.0, 1.5, 0.0]);
        assert_eq!(data.class_labels(), vec![1, 0]);
    }

    #[test]
    fn detects_zero_based_indices() {
        let (_dir, path) = write_tmp("-1 0:1 1:2\n+1 2:3\n");
        let data = read_svmlight(&path).unwrap();
        assert_eq!(data.x.shape(), (2, 3));
        assert_eq!(data.x.row_slice(1), &[0.0, 0.0, 3.0]);
        assert_eq!(data.class_labels(), vec![-1, 1]);
    }

    #[test]
    fn pads_to_requested_width() {
        let (_dir, path) = write_tmp("1 1:1\n");
        let config = SvmLightReaderConfig {
            n_features: Some(4),
            zero_based: None,
        };
        let data = read_svmlight_with_config(&path, &config).unwrap();
        assert_eq!(data.x.row_slice(0), &[1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn rejects_index_beyond_fixed_width() {
        let (_dir, path) = write_tmp("1 5:1\n");
        let config = SvmLightReaderConfig {
            n_features: Some(2),
            zero_based: Some(false),
        };
        assert!(read_svmlight_with_config(&path, &config).is_err());
    }

    #[test]
    fn test_file_follows_training_index_base() {
        // the test file never uses index 0, which alone would read as one-based
        let (_train_dir, train_path) = write_tmp("0 0:1 1:2 2:3\n1 0:4 2:9\n");
        let (_test_dir, test_path) = write_tmp("1 1:5 2:7\n");

        let train = read_svmlight(&train_path).unwrap();
        assert!(train.zero_based);
        assert_eq!(train.n_features(), 3);

        let test = read_svmlight_with_config(&test_path, &train.matching_config()).unwrap();
        assert!(test.zero_based);
        assert_eq!(test.x.row_slice(0), &[0.0, 5.0, 7.0]);
    }

    #[test]
    fn one_based_training_rejects_zero_index_in_test_file() {
        let (_train_dir, train_path) = write_tmp("1 1:1 2:2\n");
        let (_test_dir, test_path) = write_tmp("0 0:3\n");
        let train = read_svmlight(&train_path).unwrap();
        assert!(!train.zero_based);
        assert!(read_svmlight_with_config(&test_path, &train.matching_config()).is_err());
    }

    #[test]
    fn rejects_malformed_pairs() {
        let (_dir, path) = write_tmp("1 3=4\n");
        let err = read_svmlight(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));
    }
}
