//! # Ledger-Relay CLI
//!
//! Operator tool for the submission orchestrator: submit transactions to the
//! container activity ledger, fire concurrent stress workloads, and inspect
//! the chain.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use tokio::task::JoinSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_core::adapters::http::HttpLedgerClient;
use relay_core::{RelayConfig, RelayService, SubmitOutcome};

#[derive(Parser)]
#[command(name = "relay-cli", about = "Ledger-Relay operator CLI", version)]
struct Cli {
    /// Base URL of the ledger HTTP API.
    #[arg(long, default_value = "http://localhost:8080")]
    ledger_url: String,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    request_timeout_ms: u64,

    /// Maximum attempts per submission.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Backoff base in milliseconds.
    #[arg(long, default_value_t = 500)]
    backoff_base_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit one or more transactions for a resource.
    Submit {
        /// Resource (container) identifier.
        resource_id: String,
        /// Number of sequential submissions.
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Fire many concurrent submissions across a pool of resources.
    Stress {
        /// Number of distinct resources in the pool.
        #[arg(long, default_value_t = 10)]
        resources: usize,
        /// Total submissions to fire concurrently.
        #[arg(long, default_value_t = 50)]
        count: usize,
        /// Resource name prefix.
        #[arg(long, default_value = "container")]
        prefix: String,
    },
    /// Fetch and print the chain.
    Chain,
    /// Scan the chain for duplicated resources.
    Audit,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = RelayConfig::default();
    config.ledger.base_url = cli.ledger_url.clone();
    config.ledger.request_timeout_ms = cli.request_timeout_ms;
    config.retry.max_retries = cli.max_retries;
    config.retry.backoff_base_ms = cli.backoff_base_ms;
    config.validate().context("invalid relay configuration")?;

    let ledger = Arc::new(HttpLedgerClient::new(&config.ledger)?);
    let service = Arc::new(RelayService::new(ledger, config));

    match cli.command {
        Command::Submit { resource_id, count } => submit(service, &resource_id, count).await,
        Command::Stress {
            resources,
            count,
            prefix,
        } => stress(service, resources, count, &prefix).await,
        Command::Chain => chain(service).await,
        Command::Audit => audit(service).await,
    }
}

async fn submit(
    service: Arc<RelayService<HttpLedgerClient>>,
    resource_id: &str,
    count: u32,
) -> Result<()> {
    for _ in 0..count {
        let outcome = service.submit(resource_id).await?;
        print_outcome(&outcome);
    }
    print_conflicts(&service);
    Ok(())
}

async fn stress(
    service: Arc<RelayService<HttpLedgerClient>>,
    resources: usize,
    count: usize,
    prefix: &str,
) -> Result<()> {
    info!(resources, count, "starting stress workload");

    let mut tasks = JoinSet::new();
    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let resource_id = format!("{prefix}-{}", rng.gen_range(0..resources));
        let service = service.clone();
        tasks.spawn(async move { service.submit(&resource_id).await });
    }

    let mut accepted = 0usize;
    let mut conflicts = 0usize;
    let mut failures = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined.context("stress task panicked")?? {
            SubmitOutcome::Accepted { .. } => accepted += 1,
            SubmitOutcome::Conflict { .. } => conflicts += 1,
            SubmitOutcome::Unreachable { .. } | SubmitOutcome::Upstream { .. } => failures += 1,
        }
    }

    println!("stress complete: {accepted} accepted, {conflicts} conflicted, {failures} failed");
    print_conflicts(&service);
    Ok(())
}

async fn chain(service: Arc<RelayService<HttpLedgerClient>>) -> Result<()> {
    let blocks = service.fetch_chain().await?;
    println!("{}", serde_json::to_string_pretty(&blocks)?);
    println!("{} block(s)", blocks.len());
    Ok(())
}

async fn audit(service: Arc<RelayService<HttpLedgerClient>>) -> Result<()> {
    let findings = service.audit_chain().await?;
    if findings.is_empty() {
        println!("chain audit clean: no duplicated resources");
    } else {
        println!("{}", serde_json::to_string_pretty(&findings)?);
        println!("{} duplicated resource appearance(s)", findings.len());
    }
    Ok(())
}

fn print_outcome(outcome: &SubmitOutcome) {
    match outcome {
        SubmitOutcome::Accepted {
            transaction_id,
            version,
        } => println!("accepted: transaction {transaction_id} at version {version}"),
        SubmitOutcome::Conflict { transaction_id } => {
            println!("conflict: transaction {transaction_id} exhausted its retries")
        }
        SubmitOutcome::Unreachable {
            transaction_id,
            detail,
        } => println!("unreachable: transaction {transaction_id}: {detail}"),
        SubmitOutcome::Upstream {
            transaction_id,
            code,
            detail,
        } => println!("upstream error {code}: transaction {transaction_id}: {detail}"),
    }
}

fn print_conflicts(service: &RelayService<HttpLedgerClient>) {
    let report = service.list_conflicts();
    if report.total_conflicts == 0 {
        return;
    }
    println!("{} concurrency conflict(s) observed:", report.total_conflicts);
    for entry in report.conflicts {
        println!("  [{}] {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S"), entry.message);
    }
}
