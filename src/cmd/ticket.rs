use clap::Args;

use crate::context::AppContext;
use crate::domain::scores::{DEFAULT_SCORE, ScoreSet};
use crate::domain::ticket::Ticket;
use crate::error::AppResult;
use crate::workflow::ticket::{
    Submission, create_ticket_from_scores, create_ticket_from_text, save_ticket, submit_with_cache,
};

#[derive(Args, Debug, Clone)]
pub struct DeliveryArgs {
    /// Save the ticket to <ticket-id>.yaml in the current directory.
    #[arg(short, long)]
    pub output: bool,
    /// Skip creating the issue in the tracking system.
    #[arg(long)]
    pub no_tracker: bool,
}

#[derive(Args, Debug, Clone)]
pub struct NlArgs {
    /// Natural language description of the ticket.
    pub description: String,
    #[command(flatten)]
    pub delivery: DeliveryArgs,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Ticket title.
    pub title: String,
    /// Ticket description.
    pub description: String,
    /// Revenue potential score (0-100).
    #[arg(
        long,
        default_value_t = DEFAULT_SCORE,
        value_parser = parse_score,
        allow_negative_numbers = true
    )]
    pub revenue: f64,
    /// User impact score (0-100).
    #[arg(
        long,
        default_value_t = DEFAULT_SCORE,
        value_parser = parse_score,
        allow_negative_numbers = true
    )]
    pub user_impact: f64,
    /// Technical complexity score (0-100).
    #[arg(
        long,
        default_value_t = DEFAULT_SCORE,
        value_parser = parse_score,
        allow_negative_numbers = true
    )]
    pub complexity: f64,
    /// Strategic alignment score (0-100).
    #[arg(
        long,
        default_value_t = DEFAULT_SCORE,
        value_parser = parse_score,
        allow_negative_numbers = true
    )]
    pub alignment: f64,
    #[command(flatten)]
    pub delivery: DeliveryArgs,
}

fn parse_score(raw: &str) -> Result<f64, String> {
    let score: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if score.is_finite() {
        Ok(score)
    } else {
        Err(format!("'{raw}' is not a finite score"))
    }
}

impl CreateArgs {
    fn scores(&self) -> ScoreSet {
        ScoreSet::new(self.revenue, self.user_impact, self.complexity, self.alignment)
    }
}

pub async fn run_nl(ctx: &AppContext, args: NlArgs) -> AppResult<()> {
    println!("\n🤖 Terry is analyzing your request...");
    let ticket = create_ticket_from_text(ctx, &args.description).await?;
    deliver(ctx, &ticket, &args.delivery).await
}

pub async fn run_create(ctx: &AppContext, args: CreateArgs) -> AppResult<()> {
    let ticket = create_ticket_from_scores(ctx, &args.title, &args.description, args.scores());
    deliver(ctx, &ticket, &args.delivery).await
}

async fn deliver(ctx: &AppContext, ticket: &Ticket, delivery: &DeliveryArgs) -> AppResult<()> {
    print_ticket(ticket);

    if let Some(tracker) = ctx.issue_tracker.as_deref().filter(|_| !delivery.no_tracker) {
        println!("\n📋 Creating issue in tracking system...");
        match submit_with_cache(tracker, &ctx.cache, &ticket.issue_payload()).await? {
            Submission::Created { url } => println!("✅ Issue created: {url}"),
            Submission::Cached { error, handle } => {
                println!("❌ Failed to create issue: {error}");
                println!("💾 Issue cached at: {handle}");
                println!("You can retry later with: terry cache retry --file {handle}");
            }
        }
    }

    if delivery.output {
        let cwd = std::env::current_dir()?;
        let path = save_ticket(ticket, &cwd)?;
        println!("\n💾 Ticket saved to {}", path.display());
    }

    Ok(())
}

fn print_ticket(ticket: &Ticket) {
    println!("\n🎫 Generated Ticket:");
    println!("{}", "-".repeat(40));
    println!("Ticket ID:      {}", ticket.id);
    println!("Priority:       {}", ticket.priority.code());
    println!("Impact Area:    {}", ticket.impact_area.label());
    println!("\n📝 Description:");
    println!("{}", ticket.description);
}
