use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Central configuration for models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ModelConfig {
    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum ModelType {
    /// Forest grown and applied by the external `growforest` / `applyforest` tools.
    CloudForest {
        growforest_bin: String,
        applyforest_bin: String,
        /// Parent directory for the per-instance scratch directory.
        /// Defaults to the system temp directory.
        #[serde(default)]
        work_dir: Option<PathBuf>,
        #[serde(default)]
        normalization: Normalization,
        #[serde(default)]
        options: GrowForestOptions,
    },
    /// In-process forest from smartcore.
    RandomForest {
        n_trees: u16,
        max_depth: Option<u16>,
        min_samples_leaf: usize,
        min_samples_split: usize,
        m: Option<usize>,
        criterion: String,
        seed: u64,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::CloudForest {
            growforest_bin: "growforest".to_string(),
            applyforest_bin: "applyforest".to_string(),
            work_dir: None,
            normalization: Normalization::default(),
            options: GrowForestOptions::default(),
        }
    }
}

impl ModelType {
    /// Default in-process forest, sized like the benchmark script it replaces.
    pub fn random_forest() -> Self {
        ModelType::RandomForest {
            n_trees: 2000,
            max_depth: None,
            min_samples_leaf: 1,
            min_samples_split: 2,
            m: None,
            criterion: "gini".to_string(),
            seed: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelType::CloudForest { .. } => "cloudforest",
            ModelType::RandomForest { .. } => "randomforest",
        }
    }

    /// Apply a tree count regardless of backend.
    pub fn set_n_trees(&mut self, trees: usize) {
        match self {
            ModelType::CloudForest { options, .. } => options.n_trees = trees,
            ModelType::RandomForest { n_trees, .. } => {
                *n_trees = u16::try_from(trees).unwrap_or(u16::MAX)
            }
        }
    }

    /// Apply a worker count. Only CloudForest runs trees in parallel.
    pub fn set_n_jobs(&mut self, jobs: usize) {
        if let ModelType::CloudForest { options, .. } = self {
            options.n_cores = jobs;
        }
    }

    pub fn set_seed(&mut self, value: u64) {
        if let ModelType::RandomForest { seed, .. } = self {
            *seed = value;
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cloudforest" => Ok(ModelType::default()),
            "randomforest" | "smartcore" => Ok(ModelType::random_forest()),
            _ => Err(format!(
                "Unknown model type: {}. Expected 'cloudforest' or 'randomforest'",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(model_type: ModelType) -> Self {
        Self { model_type }
    }
}

/// How vote tallies become probabilities.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Every row is divided by the vote total of the first row.
    #[default]
    FirstRow,
    /// Every row is divided by its own vote total.
    PerRow,
}

/// Options forwarded to `growforest`. Every field maps to one of its flags;
/// `extra_args` is appended verbatim, one argv element per entry.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GrowForestOptions {
    pub n_trees: usize,
    pub n_cores: usize,
    /// Count (`10`) or fraction (`.5`) of candidate features per split.
    pub m_try: Option<String>,
    /// Count or fraction of cases bagged per tree.
    pub n_samples: Option<String>,
    pub leaf_size: Option<String>,
    pub max_depth: Option<usize>,
    pub entropy: bool,
    pub balance: bool,
    pub impute: bool,
    pub extra: bool,
    pub oob: bool,
    pub progress: bool,
    pub selftest: bool,
    pub extra_args: Vec<String>,
}

impl Default for GrowForestOptions {
    fn default() -> Self {
        Self {
            n_trees: 100,
            n_cores: 1,
            m_try: None,
            n_samples: None,
            leaf_size: None,
            max_depth: None,
            entropy: false,
            balance: false,
            impute: false,
            extra: false,
            oob: false,
            progress: false,
            selftest: false,
            extra_args: Vec::new(),
        }
    }
}

impl GrowForestOptions {
    /// Parse a free-form option string such as `"-nTrees 500 -balance"`.
    /// Tokens are split on whitespace and forwarded as separate arguments;
    /// no shell is involved so quoting is not interpreted.
    pub fn from_option_string(options: &str) -> Self {
        Self {
            extra_args: options.split_whitespace().map(str::to_string).collect(),
            ..Self::default()
        }
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-nTrees".to_string(),
            self.n_trees.to_string(),
            "-nCores".to_string(),
            self.n_cores.to_string(),
        ];
        let valued = [
            ("-mTry", self.m_try.clone()),
            ("-nSamples", self.n_samples.clone()),
            ("-leafSize", self.leaf_size.clone()),
            ("-maxDepth", self.max_depth.map(|d| d.to_string())),
        ];
        for (flag, value) in valued {
            if let Some(value) = value {
                args.push(flag.to_string());
                args.push(value);
            }
        }
        let switches = [
            ("-entropy", self.entropy),
            ("-balance", self.balance),
            ("-impute", self.impute),
            ("-extra", self.extra),
            ("-oob", self.oob),
            ("-progress", self.progress),
            ("-selftest", self.selftest),
        ];
        for (flag, enabled) in switches {
            if enabled {
                args.push(flag.to_string());
            }
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_only_pass_tree_and_core_counts() {
        let args = GrowForestOptions::default().to_args();
        assert_eq!(args, vec!["-nTrees", "100", "-nCores", "1"]);
    }

    #[test]
    fn option_string_is_split_not_interpreted() {
        let opts = GrowForestOptions::from_option_string("-balance  -mTry .5; rm -rf /");
        assert_eq!(
            opts.extra_args,
            vec!["-balance", "-mTry", ".5;", "rm", "-rf", "/"]
        );
    }

    #[test]
    fn typed_options_render_their_flags() {
        let opts = GrowForestOptions {
            n_trees: 10,
            m_try: Some(".5".to_string()),
            max_depth: Some(4),
            balance: true,
            ..GrowForestOptions::default()
        };
        let args = opts.to_args();
        assert!(args.windows(2).any(|w| w == ["-mTry", ".5"]));
        assert!(args.windows(2).any(|w| w == ["-maxDepth", "4"]));
        assert!(args.contains(&"-balance".to_string()));
        assert!(!args.contains(&"-entropy".to_string()));
    }

    #[test]
    fn model_type_from_str() {
        assert!(matches!(
            "CloudForest".parse::<ModelType>(),
            Ok(ModelType::CloudForest { .. })
        ));
        assert!(matches!(
            "randomforest".parse::<ModelType>(),
            Ok(ModelType::RandomForest { n_trees: 2000, .. })
        ));
        assert!("gbdt".parse::<ModelType>().is_err());
    }
}
