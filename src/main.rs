//! `dcmem` command line tool
//!
//! Drives the Data Cloud memory store from the shell: ingest a memory, run a
//! vector search, or inspect the configured collection.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use datacloud_memory::config::{AppConfig, Cli, Command};
use datacloud_memory::vector_store::PAYLOAD_DATA_KEY;
use datacloud_memory::{Payload, VectorStore, create_vector_store, telemetry};
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before clap reads env-backed flags
    let _ = dotenv();

    telemetry::init();

    let cli = Cli::parse();
    let Some(command) = cli.command.clone() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = AppConfig::from_cli(&cli).context("Failed to load configuration")?;
    info!(
        name: "dcmem.config.loaded",
        instance_url = %config.datacloud.instance_url,
        object = %config.store.object_name,
        "Configuration loaded"
    );

    let store = create_vector_store(&config).context("Failed to create memory store")?;
    run(store.as_ref(), command).await
}

async fn run(store: &dyn VectorStore, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Insert { text, id } => {
            let mut payload = Payload::new();
            payload.insert(PAYLOAD_DATA_KEY.to_string(), serde_json::Value::String(text));
            let ids = id.map(|id| vec![id]);

            let inserted = store.insert(&[], &[payload], ids.as_deref()).await?;
            for id in inserted {
                println!("{id}");
            }
        }
        Command::Search { query, limit } => {
            for hit in store.search(&query, &[], limit, None).await? {
                println!("{}", serde_json::to_string(&hit)?);
            }
        }
        Command::Collections => {
            for name in store.list_collections().await? {
                println!("{name}");
            }
        }
        Command::Info => {
            let info = store.collection_info().await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
    }
    Ok(())
}
