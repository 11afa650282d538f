//! File formats exchanged with CloudForest and the benchmark datasets.

pub mod arff;
pub mod forest_output;
pub mod svmlight;

pub use arff::{write_relation, write_relation_file, ColumnValues, Relation, TargetColumn};
pub use forest_output::{read_predictions, read_votes, str_to_bool, VoteTable};
pub use svmlight::{read_svmlight, read_svmlight_with_config, SvmLightData, SvmLightReaderConfig};
