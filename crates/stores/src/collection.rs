use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{ArrivalStore, DepartureStore, ServiceStore, StoreError};

/// The three stores, constructed once at startup and threaded through the
/// dispatcher, the read façade and the scheduler as a shared dependency.
pub struct StoreCollection {
    pub arrivals: ArrivalStore,
    pub departures: DepartureStore,
    pub services: ServiceStore,

    data_directory: PathBuf,
}

impl StoreCollection {
    pub fn new(data_directory: impl Into<PathBuf>) -> Self {
        Self {
            arrivals: ArrivalStore::new(),
            departures: DepartureStore::new(),
            services: ServiceStore::new(),
            data_directory: data_directory.into(),
        }
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    /// Runs the hide/evict sweep on every store.
    pub fn cleanup(&self, now: DateTime<Utc>) {
        self.arrivals.cleanup(now);
        self.departures.cleanup(now);
        self.services.cleanup(now);
    }

    /// Takes a throughput measurement on every store.
    pub fn take_measurements(&self, now: DateTime<Utc>) {
        self.arrivals.take_measurement(now);
        self.departures.take_measurement(now);
        self.services.take_measurement(now);
    }

    /// Snapshots every store; the first failure is returned but does not
    /// stop the remaining stores from being attempted.
    pub fn snapshot(&self) -> Result<(), StoreError> {
        let results = [
            self.arrivals.snapshot(&self.data_directory),
            self.departures.snapshot(&self.data_directory),
            self.services.snapshot(&self.data_directory),
        ];

        results.into_iter().collect()
    }

    /// Restores every store from the data directory. Missing snapshot files
    /// leave the respective store empty.
    pub fn restore(&self) -> Result<(), StoreError> {
        self.arrivals.restore(&self.data_directory)?;
        self.departures.restore(&self.data_directory)?;
        self.services.restore(&self.data_directory)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use model::{Arrival, Departure, Service, Station};

    fn collection(directory: &Path) -> StoreCollection {
        let collection = StoreCollection::new(directory);

        let mut arrival = Arrival {
            product_id: "a1".to_owned(),
            timestamp: Some(Utc::now()),
            service_id: "2346".to_owned(),
            service_date: "2019-01-27".to_owned(),
            arrival_time: Some(Utc::now()),
            ..Arrival::default()
        };
        arrival.station = Station::new("RTD", "R'dam C.", "Rotterdam C.", "Rotterdam Centraal");
        arrival.generate_id();
        collection.arrivals.process(arrival);

        let mut departure = Departure {
            product_id: "d1".to_owned(),
            timestamp: Some(Utc::now()),
            service_id: "1234".to_owned(),
            service_date: "2019-01-27".to_owned(),
            departure_time: Some(Utc::now()),
            ..Departure::default()
        };
        departure.station = Station::new("UT", "Utrecht C.", "Utrecht C.", "Utrecht Centraal");
        departure.generate_id();
        collection.departures.process(departure);

        let mut service = Service {
            product_id: "s1".to_owned(),
            timestamp: Some(Utc::now()),
            service_date: "2019-01-27".to_owned(),
            service_number: "1234".to_owned(),
            valid_until: Some(Utc::now() + Duration::hours(4)),
            ..Service::default()
        };
        service.generate_id();
        collection.services.process(service);

        collection
    }

    #[test]
    fn snapshot_and_restore_all_stores() {
        let directory = tempfile::tempdir().unwrap();
        let original = collection(directory.path());

        original.snapshot().unwrap();

        let restored = StoreCollection::new(directory.path());
        restored.restore().unwrap();

        assert_eq!(restored.arrivals.count(), 1);
        assert_eq!(restored.departures.count(), 1);
        assert_eq!(restored.services.count(), 1);
        assert_eq!(
            restored.arrivals.list_by_station("RTD", true).len(),
            1
        );
    }

    #[test]
    fn restore_from_empty_directory_is_not_an_error() {
        let directory = tempfile::tempdir().unwrap();
        let collection = StoreCollection::new(directory.path());

        collection.restore().unwrap();
        assert_eq!(collection.arrivals.count(), 0);
    }

    #[test]
    fn cleanup_and_measurements_cover_every_store() {
        let directory = tempfile::tempdir().unwrap();
        let collection = collection(directory.path());
        let now = Utc::now();

        collection.take_measurements(now);

        // The first sweep far in the future hides everything, the second
        // one evicts the hidden records.
        collection.cleanup(now + Duration::days(7));
        collection.cleanup(now + Duration::days(7));

        assert_eq!(collection.arrivals.count(), 0);
        assert_eq!(collection.departures.count(), 0);
        assert_eq!(collection.services.count(), 0);
    }
}
