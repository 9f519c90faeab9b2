use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use model::{Arrival, Departure, DepartureStatus, Service};

use crate::measurements::DowntimeConfig;

/// The capability set shared by the three record kinds. Reconciliation,
/// cleanup and snapshotting are written once against this trait and
/// parameterised by the kind-specific thresholds below.
pub trait StoreRecord:
    Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Store name, used for snapshot files, logging and metrics.
    const NAME: &'static str;

    /// Snapshot file name under the data directory.
    const SNAPSHOT_FILE: &'static str;

    fn id(&self) -> &str;
    fn timestamp(&self) -> Option<DateTime<Utc>>;
    fn product_id(&self) -> &str;
    fn hidden(&self) -> bool;
    fn set_hidden(&mut self, hidden: bool);

    /// Station this record is indexed under; services are not
    /// station-indexed.
    fn station_code(&self) -> Option<&str> {
        None
    }

    /// Kind-specific transform applied when a record is accepted into the
    /// store.
    fn on_accept(&mut self) {}

    /// Whether a visible record should be hidden at `now`.
    fn should_hide(&self, now: DateTime<Utc>) -> bool;

    /// Whether a hidden record should be evicted at `now`.
    fn should_evict(&self, now: DateTime<Utc>) -> bool;

    /// Downtime-detection thresholds for this record kind.
    fn downtime_config() -> DowntimeConfig;
}

/// Records without an event time age out immediately; this mirrors how a
/// zero time behaves against the thresholds.
fn or_epoch(time: Option<DateTime<Utc>>) -> DateTime<Utc> {
    time.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl StoreRecord for Arrival {
    const NAME: &'static str = "arrivals";
    const SNAPSHOT_FILE: &'static str = "arrivals.bin";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn station_code(&self) -> Option<&str> {
        Some(&self.station.code)
    }

    fn should_hide(&self, now: DateTime<Utc>) -> bool {
        or_epoch(self.real_arrival_time()) < now - Duration::minutes(30)
    }

    fn should_evict(&self, now: DateTime<Utc>) -> bool {
        or_epoch(self.real_arrival_time()) < now - Duration::hours(4)
    }

    fn downtime_config() -> DowntimeConfig {
        DowntimeConfig {
            min_average: 1.0 / 60.0,
            min_average_night: 1.0 / 600.0,
            night_start_hour: 2,
            night_end_hour: 5,
            recovery: Duration::minutes(70),
        }
    }
}

impl StoreRecord for Departure {
    const NAME: &'static str = "departures";
    const SNAPSHOT_FILE: &'static str = "departures.bin";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn station_code(&self) -> Option<&str> {
        Some(&self.station.code)
    }

    fn on_accept(&mut self) {
        // A train reported as departed is immediately taken off the boards.
        if self.status == DepartureStatus::Departed {
            self.hidden = true;
        }
    }

    fn should_hide(&self, now: DateTime<Utc>) -> bool {
        let real_departure = or_epoch(self.real_departure_time());

        if real_departure < now - Duration::minutes(10) {
            return true;
        }

        (self.not_real_time || self.cancelled)
            && real_departure < now - Duration::minutes(1)
    }

    fn should_evict(&self, now: DateTime<Utc>) -> bool {
        or_epoch(self.real_departure_time()) < now - Duration::hours(4)
    }

    fn downtime_config() -> DowntimeConfig {
        DowntimeConfig {
            min_average: 1.0 / 60.0,
            min_average_night: 1.0 / 600.0,
            night_start_hour: 2,
            night_end_hour: 5,
            recovery: Duration::minutes(70),
        }
    }
}

impl StoreRecord for Service {
    const NAME: &'static str = "services";
    const SNAPSHOT_FILE: &'static str = "services.bin";

    fn id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    fn product_id(&self) -> &str {
        &self.product_id
    }

    fn hidden(&self) -> bool {
        self.hidden
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn should_hide(&self, now: DateTime<Utc>) -> bool {
        or_epoch(self.valid_until) < now
    }

    fn should_evict(&self, now: DateTime<Utc>) -> bool {
        or_epoch(self.valid_until) < now - Duration::days(2)
    }

    fn downtime_config() -> DowntimeConfig {
        DowntimeConfig {
            min_average: 1.0 / 60.0,
            min_average_night: 1.0 / 1800.0,
            night_start_hour: 2,
            night_end_hour: 5,
            recovery: Duration::minutes(1),
        }
    }
}
