use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swapdesk::application::engine::{ConversationEngine, Dispatch, Stores};
use swapdesk::config::load_config;
use swapdesk::infrastructure::in_memory::{
    InMemorySettingsStore, InMemoryTransactionStore, InMemoryUserStore,
};
use swapdesk::interfaces::csv::event_reader::EventReader;
use swapdesk::interfaces::csv::transcript_writer::TranscriptWriter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Inbound events CSV file (session,name,kind,payload,size,mime)
    input: PathBuf,

    /// Configuration file. Defaults to ./swapdesk.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). Overrides storage.db_path.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).into_diagnostic()?;
    let db_path = cli.db_path.or_else(|| config.storage.db_path.clone());
    let stores = open_stores(db_path.as_deref())?;

    let transcript = Arc::new(TranscriptWriter::new(io::stdout()));
    let engine = ConversationEngine::new(&config, stores, transcript.clone())
        .await
        .into_diagnostic()?;

    let file = File::open(&cli.input).into_diagnostic()?;
    let mut handled = 0usize;
    let mut dropped = 0usize;
    for event in EventReader::new(file).events() {
        match event {
            Ok(event) => match engine.handle(event).await {
                Dispatch::Handled => handled += 1,
                Dispatch::Dropped => dropped += 1,
            },
            Err(e) => warn!(error = %e, "Error reading event"),
        }
    }
    info!(handled, dropped, "event script replayed");

    transcript.flush().into_diagnostic()?;
    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    use swapdesk::infrastructure::rocksdb::RocksDBStore;

    let Some(path) = db_path else {
        return Ok(in_memory_stores());
    };
    let store = Arc::new(RocksDBStore::open(path).into_diagnostic()?);
    info!(path = %path.display(), "using RocksDB storage");
    Ok(Stores {
        users: store.clone(),
        transactions: store.clone(),
        settings: store,
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> Stores {
    Stores {
        users: Arc::new(InMemoryUserStore::new()),
        transactions: Arc::new(InMemoryTransactionStore::new()),
        settings: Arc::new(InMemorySettingsStore::new()),
    }
}
