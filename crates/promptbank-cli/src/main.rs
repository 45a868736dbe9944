mod keywords;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use promptbank_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "promptbank-cli")]
#[command(about = "promptbank keyword analysis command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply keywords to stored responses and print per-backend match counts as JSON
    Apply {
        /// JSON file holding an array of responses
        #[arg(long)]
        responses: PathBuf,
        /// Keyword definitions file (defaults to `PROMPTBANK_KEYWORDS_PATH`)
        #[arg(long)]
        keywords: Option<PathBuf>,
        /// Engine worker threads (defaults to `PROMPTBANK_ENGINE_WORKER_THREADS`)
        #[arg(long)]
        threads: Option<usize>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Validate a keyword definitions file, compiling every pattern
    Check {
        /// Keyword definitions file (defaults to `PROMPTBANK_KEYWORDS_PATH`)
        #[arg(long)]
        keywords: Option<PathBuf>,
    },
    /// List the known AI backend types
    Backends,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    run(cli, || Ok(promptbank_core::load_app_config()?))
}

/// Dispatch a parsed command.
///
/// Configuration is loaded only by commands that read it, so a bad
/// `PROMPTBANK_*` value never breaks `backends` or `--help`.
fn run<F>(cli: Cli, load_config: F) -> anyhow::Result<()>
where
    F: FnOnce() -> anyhow::Result<AppConfig>,
{
    match cli.command {
        Some(Commands::Apply {
            responses,
            keywords,
            threads,
            pretty,
        }) => {
            let config = load_config()?;
            init_tracing(&config.log_level)?;
            let keywords_path = keywords.unwrap_or(config.keywords_path);
            let worker_threads = threads.unwrap_or(config.engine_worker_threads);
            keywords::run_apply(&keywords_path, &responses, worker_threads, pretty)?;
        }
        Some(Commands::Check { keywords }) => {
            let config = load_config()?;
            init_tracing(&config.log_level)?;
            let keywords_path = keywords.unwrap_or(config.keywords_path);
            keywords::run_check(&keywords_path)?;
        }
        Some(Commands::Backends) => keywords::run_backends(),
        None => println!("promptbank-cli: run with --help for usage"),
    }

    Ok(())
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    // stdout carries command output; logs go to stderr. A subscriber may
    // already be installed when commands run in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
