//! Ingestion daemon
//!
//! Loads a decoded ledger log (JSONL, one `LedgerRecord` per line) into an
//! in-memory source and drives the indexing engine over it on a fixed tick
//! interval. With `--follow` the daemon keeps polling after catching up,
//! the way a deployment tails a live log.

use chaingraph_core::LedgerRecord;
use chaingraph_ingest::{IngestConfig, Ingestor, MemoryLedgerSource, TickOutcome};
use chaingraph_store::MemoryGraphStore;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "chaingraph-ingestd", about = "Ledger-to-graph ingestion daemon")]
struct Args {
    /// Decoded ledger log: JSONL file with one ledger record per line
    #[arg(long)]
    ledgers: PathBuf,

    /// Sequence to start from (default: head of the log)
    #[arg(long)]
    start: Option<u64>,

    /// Tick interval in milliseconds
    #[arg(long, default_value_t = 2000)]
    interval_ms: u64,

    /// Keep polling after catching up instead of exiting
    #[arg(long)]
    follow: bool,
}

fn init_logging() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chaingraph_ingest=info,chaingraph_ingestd=info"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact());

    let _ = tracing::dispatcher::set_global_default(tracing::Dispatch::new(subscriber));
}

async fn load_source(path: &Path) -> Result<MemoryLedgerSource, Box<dyn std::error::Error>> {
    let text = tokio::fs::read_to_string(path).await?;
    let source = MemoryLedgerSource::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: LedgerRecord = serde_json::from_str(line)
            .map_err(|e| format!("{}:{}: {}", path.display(), line_no + 1, e))?;
        source.insert(record);
    }
    Ok(source)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();

    let source = load_source(&args.ledgers).await?;
    info!(ledgers = source.len(), "Loaded decoded ledger log");

    let store = MemoryGraphStore::new();
    let config = IngestConfig {
        start_seq: args.start,
        ..IngestConfig::default()
    };
    let mut ingestor = Ingestor::start(source, store, config).await?;
    let interval = Duration::from_millis(args.interval_ms);
    info!(
        start = ingestor.next_seq(),
        interval_ms = args.interval_ms,
        "Starting ingest"
    );

    let mut ledgers = 0u64;
    let mut transactions = 0u64;
    let mut changes = 0u64;

    loop {
        match ingestor.tick().await {
            Ok(TickOutcome::Ingested {
                seq,
                transactions: tx_nodes,
                changes: extracted,
                ..
            }) => {
                ledgers += 1;
                transactions += tx_nodes.len() as u64;
                changes += extracted.len() as u64;
                info!(
                    seq,
                    transactions = tx_nodes.len(),
                    changes = extracted.len(),
                    "Ledger committed"
                );
            }
            Ok(TickOutcome::GapSkipped { from, to }) => {
                warn!(from, to, "Skipped ledger gap");
            }
            Ok(TickOutcome::NotYetAvailable { seq }) => {
                if !args.follow {
                    break;
                }
                debug!(seq, "Caught up, waiting for the source");
                tokio::time::sleep(interval).await;
            }
            Err(e) => {
                // The cursor did not advance; the same ledger is retried.
                error!(error = %e, seq = ingestor.next_seq(), "Tick failed, retrying");
                tokio::time::sleep(interval).await;
            }
        }
    }

    info!(
        ledgers,
        transactions,
        changes,
        accounts = ingestor.accounts().len(),
        "Ingest complete"
    );
    Ok(())
}
