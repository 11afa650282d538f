//! Integration tests for CLI config parsing and util helpers.

use std::io::Write;

use cloudforest_classifiers::config::{ModelType, Normalization};
use cloudforest_cli::forest::bench::{load_bench_config, BenchConfig};
use cloudforest_cli::forest::classify::{load_classify_config, ClassifyConfig};
use cloudforest_cli::util::validate_input_file;

// ---------------------------------------------------------------------------
// validate_input_file
// ---------------------------------------------------------------------------

#[test]
fn validate_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.svm");
    std::fs::File::create(&path).unwrap();
    assert!(validate_input_file(&path).is_ok());
}

#[test]
fn validate_directory_errors() {
    let dir = tempfile::tempdir().unwrap();
    assert!(validate_input_file(dir.path()).is_err());
}

#[test]
fn validate_nonexistent_file_errors() {
    assert!(validate_input_file("/nonexistent/path/train.svm").is_err());
}

// ---------------------------------------------------------------------------
// BenchConfig
// ---------------------------------------------------------------------------

#[test]
fn bench_config_serializes_to_json() {
    let json = serde_json::to_string_pretty(&BenchConfig::default()).unwrap();
    assert!(json.contains("n_trees"));
    assert!(json.contains("n_jobs"));
    assert!(json.contains("RandomForest"));
}

#[test]
fn bench_config_partial_json_keeps_defaults() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, r#"{{"n_trees": 50}}"#).unwrap();
    let cfg = load_bench_config(f.path()).unwrap();
    assert_eq!(cfg.n_trees, 50);
    assert_eq!(cfg.n_jobs, 8);
    assert_eq!(cfg.seed, 0);
}

#[test]
fn bench_overrides_reach_cloudforest_options() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(
        f,
        r#"{{"model": {{"CloudForest": {{"growforest_bin": "gf", "applyforest_bin": "af"}}}}, "n_trees": 300, "n_jobs": 4}}"#
    )
    .unwrap();
    let cfg = load_bench_config(f.path()).unwrap();
    match cfg.resolved_model().model_type {
        ModelType::CloudForest {
            growforest_bin,
            options,
            ..
        } => {
            assert_eq!(growforest_bin, "gf");
            assert_eq!(options.n_trees, 300);
            assert_eq!(options.n_cores, 4);
        }
        other => panic!("expected CloudForest, got {:?}", other),
    }
}

#[test]
fn bench_config_invalid_json_errors() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "not json").unwrap();
    assert!(load_bench_config(f.path()).is_err());
}

// ---------------------------------------------------------------------------
// ClassifyConfig
// ---------------------------------------------------------------------------

#[test]
fn classify_config_reads_normalization() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(
        f,
        r#"{{"model": {{"CloudForest": {{
            "growforest_bin": "growforest",
            "applyforest_bin": "applyforest",
            "normalization": "per_row",
            "options": {{"n_trees": 20, "balance": true}}
        }}}}}}"#
    )
    .unwrap();
    let cfg: ClassifyConfig = load_classify_config(f.path()).unwrap();
    match cfg.model.model_type {
        ModelType::CloudForest {
            normalization,
            options,
            ..
        } => {
            assert_eq!(normalization, Normalization::PerRow);
            assert_eq!(options.n_trees, 20);
            assert!(options.balance);
            assert_eq!(options.n_cores, 1);
        }
        other => panic!("expected CloudForest, got {:?}", other),
    }
}
