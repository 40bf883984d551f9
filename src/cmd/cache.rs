use std::path::PathBuf;

use clap::{ArgGroup, Args, Subcommand};
use tracing::warn;

use crate::cache::{CacheHandle, RetryOutcome};
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

#[derive(Args, Debug, Clone)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheCommand {
    /// List cached issues.
    List,
    /// Retry creating cached issues.
    Retry(RetryArgs),
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["all", "file"])))]
pub struct RetryArgs {
    /// Retry all cached issues for the configured tracker.
    #[arg(long)]
    pub all: bool,
    /// Retry a specific cache file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

pub async fn run(ctx: &AppContext, command: CacheCommand) -> AppResult<()> {
    match command {
        CacheCommand::List => run_list(ctx),
        CacheCommand::Retry(args) => run_retry(ctx, args).await,
    }
}

fn run_list(ctx: &AppContext) -> AppResult<()> {
    let cached = ctx.cache.list()?;
    if cached.is_empty() {
        println!("No cached issues found in {}.", ctx.cache.dir().display());
        return Ok(());
    }

    println!("\n📋 Cached Issues:");
    println!("{}", "-".repeat(40));
    for attempt in &cached {
        println!("Timestamp: {}", attempt.timestamp);
        println!("Type: {}", attempt.tracker_type);
        println!("Title: {}", attempt.title());
        println!("Cache File: {}", attempt.handle);
        println!("{}", "-".repeat(40));
    }
    Ok(())
}

async fn run_retry(ctx: &AppContext, args: RetryArgs) -> AppResult<()> {
    let tracker = ctx
        .issue_tracker
        .as_deref()
        .ok_or_else(|| AppError::Configuration("no issue tracker configured".to_string()))?;

    if !tracker.get_status().await {
        warn!("{} is not reachable; retries will probably fail", tracker.kind());
    }

    if let Some(file) = args.file {
        println!("\n🔄 Retrying cached issue from: {}", file.display());
        let outcome = ctx.cache.retry(&CacheHandle::new(file), tracker).await;
        match &outcome.result {
            Ok(url) => {
                println!("✅ Successfully created issue!");
                println!("🔗 Issue URL: {url}");
            }
            Err(error) => println!("❌ Failed to create issue: {error}"),
        }
        return Ok(());
    }

    println!("\n🔄 Retrying all cached issues...");
    let outcomes = ctx.cache.retry_all(tracker).await?;
    print_summary(&outcomes);
    Ok(())
}

fn print_summary(outcomes: &[RetryOutcome]) {
    let success_count = outcomes.iter().filter(|o| o.is_success()).count();
    println!("\n📊 Retry Results:");
    println!(
        "Successfully created: {success_count}/{} issues",
        outcomes.len()
    );

    if success_count > 0 {
        println!("\n✅ Successfully created issues:");
        for url in outcomes.iter().filter_map(|o| o.result.as_ref().ok()) {
            println!("🔗 {url}");
        }
    }

    if success_count < outcomes.len() {
        println!("\n❌ Failed issues:");
        for outcome in outcomes {
            if let Err(error) = &outcome.result {
                println!("- {}: {error}", outcome.handle);
                println!("  Retry with: terry cache retry --file {}", outcome.handle);
            }
        }
    }
}
