use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use stores::{CountersSnapshot, StoreStatus};

/// Counters plus the inventory and liveness of one store, as served on the
/// `stats` endpoints.
#[derive(Debug, Serialize)]
pub struct Statistics {
    pub counters: CountersSnapshot,
    pub inventory: usize,
    pub status: stores::Status,
    pub average: f64,
}

impl Statistics {
    pub fn new(counters: CountersSnapshot, inventory: usize, status: StoreStatus) -> Self {
        Self {
            counters,
            inventory,
            status: status.status,
            average: status.average,
        }
    }
}

/// Common query parameters of the read endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    language: Option<String>,
    verbose: Option<bool>,
}

impl ReadQuery {
    /// Only Dutch and English are supported; everything else reads as Dutch.
    pub fn language(&self) -> &str {
        match self.language.as_deref() {
            Some("en") => "en",
            _ => "nl",
        }
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }
}

/// A typed error response; handlers only distinguish "not found" from
/// programmer errors.
#[derive(Debug)]
pub struct ApiError {
    pub status_code: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        Self {
            status_code: StatusCode::NOT_FOUND,
            message: format!("{what} not found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status_code, Json(body)).into_response()
    }
}

/// Times on the wire are ISO 8601 in the service-local zone.
pub fn local_time_string(time: Option<DateTime<Utc>>) -> Option<String> {
    time.map(|time| {
        time.with_timezone(&Local)
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    })
}

/// Empty strings serialise as null.
pub fn null_string(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_defaults_to_dutch() {
        let query = ReadQuery {
            language: None,
            verbose: None,
        };
        assert_eq!(query.language(), "nl");

        let query = ReadQuery {
            language: Some("en".to_owned()),
            verbose: None,
        };
        assert_eq!(query.language(), "en");

        let query = ReadQuery {
            language: Some("de".to_owned()),
            verbose: None,
        };
        assert_eq!(query.language(), "nl");
    }

    #[test]
    fn null_string_maps_empty() {
        assert_eq!(null_string(""), None);
        assert_eq!(null_string("4"), Some("4".to_owned()));
    }
}
