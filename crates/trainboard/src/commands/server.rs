use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use stores::StoreCollection;
use web::ApiState;

use crate::metrics;
use crate::scheduler;
use crate::settings::Settings;

/// Runs the full server: restore stores, start the dispatcher, the REST
/// API, the scheduler and (optionally) the metrics listener, then wait for
/// a termination signal. Shutdown is cancel, await every acknowledgement,
/// snapshot.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!("trainboard starting");

    let stores = Arc::new(StoreCollection::new(&settings.stores.location));

    tracing::info!("reading saved store contents");
    if let Err(error) = stores.restore() {
        tracing::warn!(error = %error, "error while loading stores");
    }

    let shutdown = CancellationToken::new();
    let mut tasks = Vec::new();

    // Upstream dispatcher. Failing to create the subscription is fatal.
    let receiver_config = settings.receiver_config(true, false);
    let receiver_task = tokio::spawn({
        let stores = stores.clone();
        let shutdown = shutdown.clone();
        let guard = shutdown.clone();
        async move {
            let result = receiver::run_receiver(receiver_config, stores, None, shutdown).await;
            if result.is_err() {
                guard.cancel();
            }
            result
        }
    });

    // REST API. A bind failure is fatal.
    let api_address = settings.api.address.clone();
    let api_shutdown = shutdown.clone();
    let api_state = ApiState {
        stores: stores.clone(),
    };
    let api_guard = shutdown.clone();
    let api_task = tokio::spawn(async move {
        let result = web::serve(&api_address, api_state, api_shutdown).await;
        if result.is_err() {
            // Without the API the process has no reason to stay up.
            api_guard.cancel();
        }
        result
    });

    // Periodic maintenance.
    tasks.extend(scheduler::start(stores.clone(), shutdown.clone()));

    // Optional metrics listener.
    if settings.prometheus.enabled {
        let address = settings.prometheus.address.clone();
        let metric_stores = stores.clone();
        let metric_shutdown = shutdown.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(error) = metrics::serve(address, metric_stores, metric_shutdown).await {
                tracing::error!(error = %error, "metrics listener failed");
            }
        }));
    }

    wait_for_termination(&shutdown).await;

    tracing::warn!("shutting down");
    shutdown.cancel();

    for task in tasks {
        if let Err(error) = task.await {
            tracing::error!(error = %error, "task did not shut down cleanly");
        }
    }

    let receiver_result = receiver_task
        .await
        .map_err(anyhow::Error::from)
        .and_then(|result| result.context("upstream subscription failed"));
    let api_result = api_task
        .await
        .map_err(anyhow::Error::from)
        .and_then(|result| result.context("REST API fatal error"));

    tracing::info!("saving store contents");
    stores.snapshot().context("error while saving stores")?;

    tracing::info!("trainboard stopped");

    receiver_result.and(api_result)
}

async fn wait_for_termination(shutdown: &CancellationToken) {
    tokio::select! {
        _ = shutdown.cancelled() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(error) = result {
                tracing::error!(error = %error, "could not listen for signals");
            } else {
                tracing::warn!("received termination signal");
            }
        }
    }
}
