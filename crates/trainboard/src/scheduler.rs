use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use stores::StoreCollection;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);
const MEASURE_INTERVAL: Duration = Duration::from_secs(20);
const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(12 * 60 * 60);

/// Launches the three recurring maintenance tasks. Each runs until the
/// token is cancelled; errors are logged, never propagated. The final
/// snapshot on shutdown is the caller's responsibility.
pub fn start(
    stores: Arc<StoreCollection>,
    shutdown: CancellationToken,
) -> Vec<JoinHandle<()>> {
    vec![
        spawn_ticker("cleanup", CLEANUP_INTERVAL, shutdown.clone(), {
            let stores = stores.clone();
            move || stores.cleanup(Utc::now())
        }),
        spawn_ticker("measure", MEASURE_INTERVAL, shutdown.clone(), {
            let stores = stores.clone();
            move || stores.take_measurements(Utc::now())
        }),
        spawn_ticker("autosave", AUTOSAVE_INTERVAL, shutdown, {
            move || {
                if let Err(error) = stores.snapshot() {
                    tracing::error!(error = %error, "autosave failed");
                }
            }
        }),
    ]
}

fn spawn_ticker<F>(
    name: &'static str,
    period: Duration,
    shutdown: CancellationToken,
    mut tick: F,
) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick of a tokio interval fires immediately; skip it so
        // the task only runs after a full period.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => tick(),
            }
        }

        tracing::debug!(task = name, "scheduler task stopped");
    })
}
