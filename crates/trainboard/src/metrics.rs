use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, IntGaugeVec, Opts, Registry, TextEncoder};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use stores::StoreCollection;

/// Per-store ingestion metrics, refreshed from the store counters on every
/// scrape.
pub struct StoreMetrics {
    registry: Registry,
    received: IntGaugeVec,
    processed: IntGaugeVec,
    error: IntGaugeVec,
    duplicates: IntGaugeVec,
    outdated: IntGaugeVec,
    late: IntGaugeVec,
    inventory: IntGaugeVec,
}

impl StoreMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let gauge = |name: &str, help: &str| -> anyhow::Result<IntGaugeVec> {
            let gauge = IntGaugeVec::new(
                Opts::new(name, help).namespace("trainboard"),
                &["store"],
            )?;
            registry.register(Box::new(gauge.clone()))?;
            Ok(gauge)
        };

        Ok(Self {
            received: gauge("received", "Number of received messages")?,
            processed: gauge("processed", "Number of processed messages")?,
            error: gauge("error", "Number of messages with an error")?,
            duplicates: gauge("duplicates", "Number of detected duplicates")?,
            outdated: gauge("outdated", "Number of outdated messages")?,
            late: gauge("late", "Number of too late messages")?,
            inventory: gauge("inventory", "Number of records in memory")?,
            registry,
        })
    }

    fn update(&self, stores: &StoreCollection) {
        let sets: [(&str, stores::CountersSnapshot, usize); 3] = [
            ("arrivals", stores.arrivals.counters().snapshot(), stores.arrivals.count()),
            (
                "departures",
                stores.departures.counters().snapshot(),
                stores.departures.count(),
            ),
            ("services", stores.services.counters().snapshot(), stores.services.count()),
        ];

        for (store, counters, inventory) in sets {
            self.received.with_label_values(&[store]).set(counters.received as i64);
            self.processed.with_label_values(&[store]).set(counters.processed as i64);
            self.error.with_label_values(&[store]).set(counters.error as i64);
            self.duplicates.with_label_values(&[store]).set(counters.duplicate as i64);
            self.outdated.with_label_values(&[store]).set(counters.outdated as i64);
            self.late.with_label_values(&[store]).set(counters.too_late as i64);
            self.inventory.with_label_values(&[store]).set(inventory as i64);
        }
    }

    pub fn render(&self, stores: &StoreCollection) -> anyhow::Result<String> {
        self.update(stores);

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[derive(Clone)]
struct MetricsState {
    metrics: Arc<StoreMetrics>,
    stores: Arc<StoreCollection>,
}

async fn render_metrics(State(state): State<MetricsState>) -> Result<String, StatusCode> {
    state.metrics.render(&state.stores).map_err(|error| {
        tracing::error!(error = %error, "could not render metrics");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Serves the text exposition on its own listener until cancellation.
pub async fn serve(
    address: String,
    stores: Arc<StoreCollection>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let state = MetricsState {
        metrics: Arc::new(StoreMetrics::new()?),
        stores,
    };
    let router = Router::new()
        .route("/metrics", get(render_metrics))
        .with_state(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("could not bind metrics listener on {address}"))?;

    tracing::info!(address, "prometheus interface started");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
