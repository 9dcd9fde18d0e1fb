//! Cashdesk main entry point

use anyhow::Context;
use cashdesk_api::{start_server, Outbox};
use cashdesk_config::{Config, ConfigError};
use cashdesk_core::{Dashboard, MemoryStore, Services, StaticSession};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "cashdesk")]
#[command(author = "Cashdesk Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Cash register dashboard with per-category statistics", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Load the config file; the flag is false when defaults were used
fn load_config(path: PathBuf) -> anyhow::Result<(Config, bool)> {
    match Config::load(path.clone()) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound { .. }) => Ok((Config::default(), false)),
        Err(e) => Err(e).with_context(|| format!("Failed to load configuration from {}", path.display())),
    }
}

fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filter) => builder.parse_filters(&filter),
        Err(_) => builder.parse_filters(level),
    };
    builder.init();
}

async fn load_store(config: &Config) -> MemoryStore {
    let path = &config.data.records_file;
    if !path.exists() {
        log::warn!("Records file not found: {}, every category will show zeros", path.display());
        return MemoryStore::new();
    }
    match MemoryStore::load(path).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to load records file {}: {}", path.display(), e);
            MemoryStore::new()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let (config, found) = load_config(args.config.clone())?;
    init_logging(&config.logging.level);
    if !found {
        log::warn!("Config file {} not found, using defaults", args.config.display());
    }
    log::info!(
        "Config loaded: {} categories, records file={}",
        config.dashboard.categories.len(),
        config.data.records_file.display()
    );

    let rt = Runtime::new()?;
    rt.block_on(async {
        let store = load_store(&config).await;
        let session = StaticSession::new(&config.session, store.context().cloned());
        let outbox = Arc::new(Outbox::new(config.dashboard.registered_actions.iter().cloned()));

        let services = Services {
            query: Arc::new(store),
            session: Arc::new(session),
            actions: outbox.clone(),
            notifier: outbox.clone(),
        };
        let dashboard = Arc::new(Dashboard::new(&config, services));
        dashboard.start().await;

        start_server(config, dashboard, outbox)
            .await
            .context("Server error")
    })
}
