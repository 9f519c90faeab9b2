use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use stores::StoreCollection;

use crate::settings::Settings;

/// Runs the archiver only: subscribe to the services channel and forward
/// every parsed service to the archive queue. The stores are not populated
/// and nothing is persisted.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!("trainboard archiver starting");

    let archive = archive::ArchiveClient::connect(&settings.archive_config())
        .await
        .context("could not connect to the archive queue")?;

    let stores = Arc::new(StoreCollection::new(&settings.stores.location));
    let shutdown = CancellationToken::new();

    let receiver_config = settings.receiver_config(false, true);
    let receiver_task = tokio::spawn({
        let stores = stores.clone();
        let shutdown = shutdown.clone();
        let archive: Arc<dyn receiver::ServiceSink> = Arc::new(archive);
        async move {
            if let Err(error) =
                receiver::run_receiver(receiver_config, stores, Some(archive), shutdown).await
            {
                tracing::error!(error = %error, "receiver failed");
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("could not listen for signals")?;
    tracing::warn!("received termination signal, shutting down");

    shutdown.cancel();
    receiver_task
        .await
        .context("receiver did not shut down cleanly")?;

    tracing::info!("trainboard archiver stopped");

    Ok(())
}
