use std::process::ExitCode;
use std::time::Duration;

use serde::Deserialize;

use crate::settings::Settings;

/// Exit codes in the style of monitoring plugins.
const OK: u8 = 0;
const WARNING: u8 = 1;
const CRITICAL: u8 = 2;
const UNKNOWN: u8 = 3;

#[derive(Debug, Deserialize)]
struct StatusResponse {
    arrivals: String,
    departures: String,
    services: String,
}

/// Probes a running server's `/v2/status` endpoint: 0 when every store is
/// UP, 1 when any is RECOVERING, 2 when any is DOWN or UNKNOWN, 3 when the
/// server is unreachable.
pub async fn run(settings: Settings, url: Option<String>) -> ExitCode {
    let base_url = url.unwrap_or_else(|| format!("http://{}", settings.api.address));
    let url = format!("{base_url}/v2/status");

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            println!("UNKNOWN - could not build HTTP client: {error}");
            return ExitCode::from(UNKNOWN);
        }
    };

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(error) => {
            println!("UNKNOWN - Error while getting status: {error}");
            return ExitCode::from(UNKNOWN);
        }
    };

    if !response.status().is_success() {
        println!("CRITICAL - Wrong status code: {}", response.status().as_u16());
        return ExitCode::from(CRITICAL);
    }

    let status: StatusResponse = match response.json().await {
        Ok(status) => status,
        Err(error) => {
            println!("CRITICAL - Invalid status response: {error}");
            return ExitCode::from(CRITICAL);
        }
    };

    let summary = format!(
        "arrivals={}, departures={}, services={}",
        status.arrivals, status.departures, status.services
    );
    let states = [&status.arrivals, &status.departures, &status.services];

    if states.iter().all(|state| *state == "UP") {
        println!("OK - Status: {summary}");
        ExitCode::from(OK)
    } else if states
        .iter()
        .any(|state| *state == "DOWN" || *state == "UNKNOWN")
    {
        println!("CRITICAL - Status: {summary}");
        ExitCode::from(CRITICAL)
    } else if states.iter().any(|state| *state == "RECOVERING") {
        println!("WARNING - Status: {summary}");
        ExitCode::from(WARNING)
    } else {
        println!("CRITICAL - Status: {summary}");
        ExitCode::from(CRITICAL)
    }
}
