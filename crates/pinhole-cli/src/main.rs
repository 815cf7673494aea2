mod cli;
mod commands;
mod logging;

use crate::cli::{Command, StorageBackendArg, CLI};
use crate::commands::Session;
use anyhow::Context;
use clap::Parser;
use pinhole_core::KeyValueStore;
use pinhole_generator::UuidGenerator;
use pinhole_redirector::ExpiryPolicy;
use pinhole_registry::{LinkRegistry, RegistrySettings};
use pinhole_storage::{FileStore, MemoryStore};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();
    logging::init(config.log_format);

    info!(
        storage_backend = %config.storage,
        store_path = %config.store_path.display(),
        base_url = %config.base_url,
        expiry_policy = %config.expiry_policy,
        "starting pinhole"
    );

    let settings = RegistrySettings::builder()
        .base_url(config.base_url.clone())
        .build();
    let policy = ExpiryPolicy::from(config.expiry_policy);

    match config.storage {
        StorageBackendArg::InMemory => {
            run(MemoryStore::new(), settings, policy, config.command).await?;
        }
        StorageBackendArg::File => {
            let store = FileStore::open(&config.store_path)
                .await
                .with_context(|| format!("failed to open store {}", config.store_path.display()))?;
            run(store, settings, policy, config.command).await?;
        }
    }

    Ok(())
}

async fn run<S: KeyValueStore>(
    store: S,
    settings: RegistrySettings,
    policy: ExpiryPolicy,
    command: Command,
) -> anyhow::Result<()> {
    let registry = LinkRegistry::open(store, UuidGenerator::new(), settings)
        .await
        .context("failed to load link registry")?;
    let session = Session::new(Arc::new(registry), policy);

    session.execute(command, &mut std::io::stdout()).await
}
