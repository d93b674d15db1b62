use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;

use maven_repo_builder::config::Configuration;
use maven_repo_builder::orchestrator::generate_artifact_list;
use maven_repo_builder::util::logging::init_logging;
use maven_repo_builder::util::validating_http_downloader::ValidatingHttpDownloader;

/// Generates the list of artifacts to put into a Maven repository from the sources declared in
///  a configuration file, and prints it to stdout.
#[derive(Parser, Debug)]
#[command(name = "artifact-list-generator")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generates a Maven artifact list from configured sources")]
struct Cli {
    /// configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: PathBuf,

    /// list every classifier found in the sources, not just the main artifacts
    #[arg(short = 'a', long = "allclassifiers")]
    all_classifiers: bool,

    /// trace, debug, info, warning, error or critical
    #[arg(short = 'l', long = "loglevel", default_value = "info")]
    log_level: String,

    /// write log output to this file instead of stderr
    #[arg(short = 'L', long = "logfile", value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level, cli.log_file.as_deref()) {
        eprintln!("unable to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let mut config = match Configuration::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if cli.all_classifiers {
        config.all_classifiers = true;
    }

    match generate_artifact_list(&config, Arc::new(ValidatingHttpDownloader::new())).await {
        Ok(list) => {
            print!("{}", list);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
