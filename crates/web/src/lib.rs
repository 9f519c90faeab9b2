//! The HTTP read façade: a thin mapping from URL patterns to store
//! operations. Every handler parses its parameters, calls one store
//! operation and serialises the result; all state lives in the stores.

pub mod arrivals;
pub mod common;
pub mod departures;
pub mod services;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use stores::StoreCollection;

pub const API_VERSION: u32 = 2;

#[derive(Clone)]
pub struct ApiState {
    pub stores: Arc<StoreCollection>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/version", get(api_version))
        .route("/v1", get(api_version))
        .route("/v2", get(api_version))
        .route("/v2/version", get(api_version))
        .route("/v2/status", get(api_status))
        .merge(arrivals::routes())
        .merge(departures::routes())
        .merge(services::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the listener and serves the API until the token is cancelled.
/// Returning is the cancellation acknowledgement.
pub async fn serve(
    address: &str,
    state: ApiState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(address).await?;
    tracing::info!(address, "REST API started");

    axum::serve(listener, router(state).into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("REST API shut down");

    Ok(())
}

async fn api_version() -> Json<serde_json::Value> {
    Json(json!({ "version": API_VERSION }))
}

async fn api_status(
    axum::extract::State(state): axum::extract::State<ApiState>,
) -> Json<serde_json::Value> {
    Json(json!({
        "arrivals": state.stores.arrivals.status().status,
        "departures": state.stores.departures.status().status,
        "services": state.stores.services.status().status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    pub(crate) async fn get_json(
        router: Router,
        uri: &str,
    ) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }

    fn state() -> ApiState {
        ApiState {
            stores: Arc::new(StoreCollection::new("/tmp/unused")),
        }
    }

    #[tokio::test]
    async fn version_endpoints() {
        for uri in ["/version", "/v1", "/v2", "/v2/version"] {
            let (status, value) = get_json(router(state()), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(value["version"], 2);
        }
    }

    #[tokio::test]
    async fn status_reports_all_stores() {
        let (status, value) = get_json(router(state()), "/v2/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["arrivals"], "UNKNOWN");
        assert_eq!(value["departures"], "UNKNOWN");
        assert_eq!(value["services"], "UNKNOWN");
    }
}
