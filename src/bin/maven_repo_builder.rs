use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use tracing::{error, info, warn};

use maven_repo_builder::artifact_list::resolver::ResolvedArtifactList;
use maven_repo_builder::config::Configuration;
use maven_repo_builder::maven::MavenClassifier;
use maven_repo_builder::orchestrator::{generate_artifact_list, read_list_files, RepositoryBuilder};
use maven_repo_builder::util::logging::init_logging;
use maven_repo_builder::util::validating_http_downloader::ValidatingHttpDownloader;

/// requests every classifier the sources know about instead of a fixed list
const ALL_CLASSIFIERS: &str = "__all__";

/// Builds a local Maven repository from a configuration file or from artifact list files, then
///  generates checksum files for its contents.
#[derive(Parser, Debug)]
#[command(name = "maven-repo-builder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Builds a Maven repository from artifact lists")]
struct Cli {
    /// configuration file, takes precedence over list files
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// repository that the artifacts of list files are retrieved from
    #[arg(short = 'u', long = "url", default_value = "https://repo1.maven.org/maven2/")]
    url: String,

    /// output repository directory
    #[arg(short = 'o', long = "output", default_value = "local-maven-repository")]
    output: PathBuf,

    /// comma separated classifiers to fetch along with main artifacts, or __all__
    #[arg(short = 'a', long = "classifiers", default_value = "sources")]
    classifiers: String,

    /// trace, debug, info, warning, error or critical
    #[arg(short = 'l', long = "loglevel", default_value = "info")]
    log_level: String,

    /// write log output to this file instead of stderr
    #[arg(short = 'L', long = "logfile", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// artifact list files
    files: Vec<PathBuf>,
}

fn auxiliary_classifiers(classifiers: &str) -> Vec<MavenClassifier> {
    if classifiers.trim() == ALL_CLASSIFIERS {
        return vec![];
    }
    classifiers.split(',')
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(MavenClassifier::from)
        .collect()
}

async fn artifact_list(cli: &Cli, downloader: Arc<ValidatingHttpDownloader>) -> anyhow::Result<ResolvedArtifactList> {
    match &cli.config {
        Some(config_file) => {
            if !cli.files.is_empty() {
                warn!("A configuration file was given, ignoring {} list files", cli.files.len());
            }
            let mut config = Configuration::load(config_file)?;
            if cli.classifiers.trim() == ALL_CLASSIFIERS {
                config.all_classifiers = true;
            }
            generate_artifact_list(&config, downloader).await
        }
        None => Ok(read_list_files(&cli.files, &cli.url).await),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level, cli.log_file.as_deref()) {
        eprintln!("unable to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    if cli.config.is_none() && cli.files.is_empty() {
        error!("You must specify a configuration file or at least one artifact list file");
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    }

    let downloader = Arc::new(ValidatingHttpDownloader::new());
    let list = match artifact_list(&cli, downloader.clone()).await {
        Ok(list) => list,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let builder = RepositoryBuilder::new(&cli.output, auxiliary_classifiers(&cli.classifiers), downloader);
    match builder.build(&list).await {
        Ok(report) => {
            report.log_summary();
            info!("Repository written to {}", cli.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Unable to build repository in {}: {:#}", cli.output.display(), e);
            ExitCode::FAILURE
        }
    }
}
