use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use policycheck_classifier::Classifier;
use policycheck_common::{Config, PolicyCorpus};

#[derive(Parser)]
#[command(name = "policycheck")]
#[command(about = "Classify product listings against the Shopee policy corpus")]
#[command(version)]
struct Cli {
    /// Policy corpus JSON (defaults to POLICY_CORPUS_PATH)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single product description
    Classify {
        /// Product description
        description: String,
    },

    /// Classify one description per non-empty line of a file
    Batch {
        /// Input file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("policycheck=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    run().await
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::from_env();
    config.log_redacted();

    let corpus_path = cli.corpus.unwrap_or_else(|| config.corpus_path.clone());
    let corpus = PolicyCorpus::load(&corpus_path)?;
    let classifier = Classifier::from_config(&config)?;

    match cli.command {
        Commands::Classify { description } => {
            match classifier.classify(&description, &corpus).await {
                Ok(analysis) => {
                    println!("{analysis}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!(error = %e, "Classification failed");
                    eprintln!("{}", e.user_message());
                    Ok(ExitCode::from(1))
                }
            }
        }
        Commands::Batch { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let descriptions: Vec<String> = raw
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();

            info!(items = descriptions.len(), "Starting batch classification");
            for item in classifier.classify_batch(&descriptions, &corpus).await {
                println!("{}\t{}", item.index, item.analysis.replace('\n', " "));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
