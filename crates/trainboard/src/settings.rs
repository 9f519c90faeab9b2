use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

/// All configuration of the process: defaults, overridden by an optional
/// TOML file, overridden by `TRAINBOARD_`-prefixed environment variables
/// (`TRAINBOARD_API__ADDRESS`, `TRAINBOARD_SOURCE__SERVER`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub source: SourceSettings,
    pub api: ApiSettings,
    pub archive: ArchiveSettings,
    pub stores: StoresSettings,
    pub prometheus: PrometheusSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    /// Upstream pub/sub endpoint.
    pub server: String,
    pub envelopes: EnvelopeSettings,
    /// Receive timeout in seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeSettings {
    pub arrivals: String,
    pub departures: String,
    pub services: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSettings {
    pub address: String,
    pub password: String,
    pub db: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoresSettings {
    /// Directory for the store snapshot files.
    pub location: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusSettings {
    pub enabled: bool,
    pub address: String,
}

pub fn load(path: Option<&Path>) -> Result<Settings, config::ConfigError> {
    let file = path
        .map(|path| File::from(path.to_path_buf()).required(true))
        .unwrap_or_else(|| File::with_name("config/trainboard").required(false));

    Config::builder()
        .set_default("source.server", "tcp://127.0.0.1:7664")?
        .set_default("source.envelopes.arrivals", "/RIG/InfoPlusDASInterface4")?
        .set_default("source.envelopes.departures", "/RIG/InfoPlusDVSInterface4")?
        .set_default("source.envelopes.services", "/RIG/InfoPlusRITInterface2")?
        .set_default("source.timeout", 60_i64)?
        .set_default("api.address", "127.0.0.1:8080")?
        .set_default("archive.address", "127.0.0.1:6379")?
        .set_default("archive.password", "")?
        .set_default("archive.db", 0_i64)?
        .set_default("stores.location", "data")?
        .set_default("prometheus.enabled", false)?
        .set_default("prometheus.address", "127.0.0.1:2112")?
        .add_source(file)
        .add_source(Environment::with_prefix("TRAINBOARD").separator("__"))
        .build()?
        .try_deserialize()
}

impl Settings {
    pub fn receiver_config(
        &self,
        process_stores: bool,
        archive_services: bool,
    ) -> receiver::ReceiverConfig {
        receiver::ReceiverConfig {
            server: self.source.server.clone(),
            envelopes: receiver::EnvelopeConfig {
                arrivals: self.source.envelopes.arrivals.clone(),
                departures: self.source.envelopes.departures.clone(),
                services: self.source.envelopes.services.clone(),
            },
            process_stores,
            archive_services,
            receive_timeout: std::time::Duration::from_secs(self.source.timeout),
        }
    }

    pub fn archive_config(&self) -> archive::ArchiveConfig {
        archive::ArchiveConfig {
            address: self.archive.address.clone(),
            password: self.archive.password.clone(),
            db: self.archive.db,
        }
    }
}
