//! Worker loop commands.

use anyhow::Result;
use colored::Colorize;
use tokio::sync::watch;
use tracing::{error, info};

use interlink_core::Settings;

use super::Stores;
use crate::output;

/// Poll the outbox until ctrl-c.
pub async fn run(settings: &Settings) -> Result<()> {
    let stores = Stores::connect(settings).await?;
    let worker = stores.worker(settings);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested; finishing the current batch");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!(error = %e, "Failed to listen for ctrl-c"),
        }
    });

    println!(
        "{} polling every {}s (batch size {})",
        "Interlink worker".bold(),
        settings.poll_interval_secs,
        settings.batch_size
    );

    worker.run(shutdown_rx).await;
    stores.close().await;

    println!("{}", "Worker stopped.".dimmed());
    Ok(())
}

/// Process everything currently queued and print the totals.
pub async fn drain(settings: &Settings) -> Result<()> {
    let stores = Stores::connect(settings).await?;
    let worker = stores.worker(settings);

    let result = worker.drain().await;
    stores.close().await;

    output::print_report(&result?);
    Ok(())
}
