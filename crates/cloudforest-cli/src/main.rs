use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use cloudforest_classifiers::config::{ModelConfig, ModelType};
use cloudforest_cli::forest::bench::{load_bench_config, run_benchmark, BenchConfig};
use cloudforest_cli::forest::classify::{
    load_classify_config, run_classify, write_classify_output_to, ClassifyConfig,
};
use cloudforest_cli::util::validate_input_file;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CLOUDFOREST_LOG", "error,cloudforest=info"))
        .init();

    let matches = Command::new("cloudforest")
        .version(clap::crate_version!())
        .about("\u{1F332} CloudForest - decision forest classifiers and benchmarks")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("bench")
                .about("Train a forest on an SVMLight file and report accuracy and training time")
                .arg(
                    Arg::new("train")
                        .help("Path to the SVMLight training file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("test")
                        .help("Optional SVMLight test file. Without it the training data is scored.")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a benchmark JSON configuration file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("engine")
                        .short('e')
                        .long("engine")
                        .help("Override the forest backend from the configuration.")
                        .value_parser(["smartcore", "randomforest", "cloudforest"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("n_trees")
                        .short('n')
                        .long("n-trees")
                        .help("Number of trees to grow")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("n_jobs")
                        .short('j')
                        .long("n-jobs")
                        .help("Number of worker cores (CloudForest only)")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Random seed (smartcore only)")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("classify")
                .about("Grow a CloudForest model and write predictions with class probabilities")
                .arg(
                    Arg::new("train")
                        .help("Path to the SVMLight training file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("test")
                        .help("Path to the SVMLight file to classify")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a classifier JSON configuration file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the predictions (TSV). Defaults to stdout.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("bench", sub_m)) => handle_bench(sub_m),
        Some(("classify", sub_m)) => handle_classify(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn required_path<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .with_context(|| format!("Missing required argument <{}>", name))
}

fn echo_default_config<T: serde::Serialize>(config: &T) {
    let default_json = serde_json::to_string_pretty(config).unwrap_or_default();
    eprintln!("[CloudForest] Default config:\n{}", default_json);
}

fn handle_bench(matches: &ArgMatches) -> Result<()> {
    let train_path = required_path(matches, "train")?;
    validate_input_file(train_path)?;
    let test_path = matches.get_one::<PathBuf>("test");
    if let Some(path) = test_path {
        validate_input_file(path)?;
    }

    let config_path = matches.get_one::<PathBuf>("config");
    let mut config = match config_path {
        Some(path) => {
            eprintln!("[CloudForest] Using config: {:?}", path);
            load_bench_config(path)?
        }
        None => BenchConfig::default(),
    };

    if let Some(engine) = matches.get_one::<String>("engine") {
        config.model = ModelConfig::new(ModelType::from_str(engine).map_err(anyhow::Error::msg)?);
    }
    if let Some(n_trees) = matches.get_one::<usize>("n_trees") {
        config.n_trees = *n_trees;
    }
    if let Some(n_jobs) = matches.get_one::<usize>("n_jobs") {
        config.n_jobs = *n_jobs;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.seed = *seed;
    }

    if config_path.is_none() {
        echo_default_config(&config);
    }

    let mut stdout = io::stdout().lock();
    run_benchmark(train_path, test_path.map(|p| p.as_path()), &config, &mut stdout)?;
    Ok(())
}

fn handle_classify(matches: &ArgMatches) -> Result<()> {
    let train_path = required_path(matches, "train")?;
    let test_path = required_path(matches, "test")?;
    validate_input_file(train_path)?;
    validate_input_file(test_path)?;
    let output_path = matches.get_one::<PathBuf>("output_file");

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            eprintln!("[CloudForest] Using config: {:?}", path);
            load_classify_config(path)?
        }
        None => {
            let config = ClassifyConfig::default();
            echo_default_config(&config);
            config
        }
    };

    let output = run_classify(train_path, test_path, &config)?;
    write_classify_output_to(&output, output_path.map(|p| p.as_path()))?;
    eprintln!(
        "[CloudForest] Classified {} samples.",
        output.predictions.len()
    );
    Ok(())
}
