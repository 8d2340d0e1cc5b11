use breakout::services::{
    BroadcastHub, FallbackHistory, HistoryProvider, JsonFileHistory, MemoryStrategyStore,
    SignalRunner, SymbolRepository, SyntheticHistory,
};
use breakout::Config;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "breakout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    config.validate()?;
    info!(
        "Starting breakout analysis for {} symbols ({} lookback)",
        config.symbols.len(),
        config.lookback.label()
    );

    let synthetic = SyntheticHistory::new(config.synthetic_seed);
    let history: Arc<dyn HistoryProvider> = match config.history_dir {
        Some(ref dir) => {
            info!("Reading history from {}", dir.display());
            Arc::new(FallbackHistory::new(
                Arc::new(JsonFileHistory::new(dir.clone())),
                synthetic,
            ))
        }
        None => {
            warn!("HISTORY_DIR not set, using synthetic history");
            Arc::new(synthetic)
        }
    };

    let store = MemoryStrategyStore::new();
    let hub = BroadcastHub::new();
    let repository = SymbolRepository::from_symbols(&config.symbols);
    let runner = SignalRunner::new(&config, history, store.clone(), hub.clone());

    // Print every published strategy as one JSON line
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let printer_id = hub.register_all(tx);
    let printer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            println!("{}", message);
        }
    });

    match config.refresh_interval {
        Some(interval) => {
            info!("Refreshing every {:?}", interval);
            tokio::select! {
                _ = runner.run_forever(repository, interval) => {}
                _ = tokio::signal::ctrl_c() => info!("Shutting down"),
            }
        }
        None => {
            let results = runner.run_all(&repository).await;
            info!("Analyzed {} symbols, {} stored", results.len(), store.len());
        }
    }

    hub.unregister(printer_id);
    printer.await?;

    Ok(())
}
