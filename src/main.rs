mod cache;
mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};

use crate::cmd::cache::{self as cache_cmd, CacheArgs};
use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::ticket::{self, CreateArgs, NlArgs};
use crate::config::{AppConfig, StoredConfig, config_file_path};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::infra::language_model_from_config;

#[derive(Parser)]
#[command(
    name = "terry",
    author,
    version,
    about = "Terry: Your Sarcastic AI Product Manager CLI"
)]
struct Cli {
    /// Configuration file (default: ~/.terry_config.yaml).
    #[arg(long, global = true, env = "TERRY_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for failed issue submissions (default: /var/tmp/terry_cache).
    #[arg(long, global = true, env = "TERRY_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a ticket from natural language.
    Nl(NlArgs),
    /// Create a ticket from explicit scores.
    Create(CreateArgs),
    /// Manage cached issues.
    Cache(CacheArgs),
    /// Update Terry's configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        if matches!(
            error,
            AppError::Configuration(_) | AppError::LanguageModel(_)
        ) {
            print_setup_hints();
        }
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config_path = config_file_path(cli.config.as_deref())?;
    let command = match command {
        Commands::Config(args) => return config_cmd::run(&config_path, args),
        other => other,
    };

    let stored = StoredConfig::load_or_init(&config_path)?;
    let config = AppConfig::resolve(&stored, cli.cache_dir);

    let language_model = match &command {
        Commands::Nl(_) => Some(language_model_from_config(&config)?),
        _ => None,
    };
    let context = AppContext::from_config(&config, language_model);

    match command {
        Commands::Nl(args) => ticket::run_nl(&context, args).await,
        Commands::Create(args) => ticket::run_create(&context, args).await,
        Commands::Cache(args) => cache_cmd::run(&context, args.command).await,
        Commands::Config(_) => Ok(()),
    }
}

fn print_setup_hints() {
    eprintln!("\nPlease make sure your configuration is correct:");
    eprintln!(
        "  - For OpenAI: set your API key with `terry config --openai-api-key` or OPENAI_API_KEY"
    );
    eprintln!("  - For Llama: run a llama.cpp server and set `terry config --llm-endpoint`");
    eprintln!("  - For GitHub: set GITHUB_TOKEN and GITHUB_REPO environment variables");
}
