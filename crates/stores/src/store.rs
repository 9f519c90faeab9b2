use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::counters::Counters;
use crate::measurements::{Measurements, Status};
use crate::records::StoreRecord;
use crate::StoreError;

/// Messages older than this are still accepted, but counted as late.
const TOO_LATE_SECONDS: i64 = 10;

const SNAPSHOT_VERSION: u32 = 1;

/// Liveness information of a store as exposed on the API.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StoreStatus {
    pub status: Status,
    pub average: f64,
    pub last_status_change: DateTime<Utc>,
}

/// How `process` classified a message; only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Accepted,
    Duplicate,
    Outdated,
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile<R> {
    version: u32,
    records: Vec<R>,
}

/// Resident records plus the derived station index; the two are only ever
/// observed together, under one lock.
struct Inner<R> {
    records: HashMap<String, R>,
    station_index: HashMap<String, HashSet<String>>,
}

impl<R: StoreRecord> Inner<R> {
    fn index_insert(&mut self, record: &R) {
        if let Some(code) = record.station_code() {
            self.station_index
                .entry(code.to_owned())
                .or_default()
                .insert(record.id().to_owned());
        }
    }

    fn index_remove(&mut self, record: &R) {
        if let Some(code) = record.station_code() {
            if let Some(ids) = self.station_index.get_mut(code) {
                ids.remove(record.id());
                if ids.is_empty() {
                    self.station_index.remove(code);
                }
            }
        }
    }
}

/// One indexed store: the single source of truth for one record kind.
pub struct Store<R: StoreRecord> {
    inner: RwLock<Inner<R>>,
    counters: Counters,
    measurements: Mutex<Measurements>,
}

impl<R: StoreRecord> Default for Store<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: StoreRecord> Store<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: HashMap::new(),
                station_index: HashMap::new(),
            }),
            counters: Counters::default(),
            measurements: Mutex::new(Measurements::new(R::downtime_config())),
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Accepts a freshly parsed record, subject to the reconciliation rules.
    /// Never fails; duplicates and outdated versions are counted, not stored.
    pub fn process(&self, record: R) -> Classification {
        self.counters.increment_received();

        let classification = self.reconcile(record);

        match classification {
            Classification::Duplicate => self.counters.increment_duplicate(),
            Classification::Outdated => self.counters.increment_outdated(),
            Classification::Accepted => {}
        }
        self.counters.increment_processed();

        classification
    }

    fn reconcile(&self, mut record: R) -> Classification {
        let mut inner = self.inner.write();

        if let Some(existing) = inner.records.get(record.id()) {
            if existing.product_id() == record.product_id() {
                return Classification::Duplicate;
            }

            // Equal timestamps keep the incumbent: replace only when the
            // resident version is strictly older.
            if existing.timestamp() >= record.timestamp() {
                return Classification::Outdated;
            }
        }

        if let Some(timestamp) = record.timestamp() {
            if timestamp < Utc::now() - Duration::seconds(TOO_LATE_SECONDS) {
                self.counters.increment_too_late();
                tracing::debug!(
                    store = R::NAME,
                    id = record.id(),
                    "message older than {TOO_LATE_SECONDS} seconds"
                );
            }
        }

        record.on_accept();

        if let Some(previous) = inner.records.remove(record.id()) {
            inner.index_remove(&previous);
        }
        inner.index_insert(&record);
        inner.records.insert(record.id().to_owned(), record);

        Classification::Accepted
    }

    /// Looks up a record by its identity; hidden records are returned too.
    pub fn get(&self, id: &str) -> Option<R> {
        self.inner.read().records.get(id).cloned()
    }

    /// A snapshot of all records for one station, in unspecified order.
    pub fn list_by_station(&self, station_code: &str, include_hidden: bool) -> Vec<R> {
        let inner = self.inner.read();

        let Some(ids) = inner.station_index.get(station_code) else {
            return Vec::new();
        };

        ids.iter()
            .filter_map(|id| inner.records.get(id))
            .filter(|record| include_hidden || !record.hidden())
            .cloned()
            .collect()
    }

    /// A snapshot of all resident records, in unspecified order.
    pub fn all(&self, include_hidden: bool) -> Vec<R> {
        self.inner
            .read()
            .records
            .values()
            .filter(|record| include_hidden || !record.hidden())
            .cloned()
            .collect()
    }

    /// Current resident count, hidden records included.
    pub fn count(&self) -> usize {
        self.inner.read().records.len()
    }

    /// Hides records past the hide threshold and evicts hidden records past
    /// the eviction threshold. The lock is not held across the whole sweep;
    /// each mutation re-checks the resident version.
    pub fn cleanup(&self, now: DateTime<Utc>) {
        let candidates: Vec<(String, bool)> = {
            let inner = self.inner.read();
            inner
                .records
                .values()
                .filter_map(|record| {
                    if record.hidden() {
                        record
                            .should_evict(now)
                            .then(|| (record.id().to_owned(), true))
                    } else {
                        record
                            .should_hide(now)
                            .then(|| (record.id().to_owned(), false))
                    }
                })
                .collect()
        };

        let mut hidden = 0usize;
        let mut evicted = 0usize;

        for (id, evict) in candidates {
            let mut inner = self.inner.write();

            if evict {
                let confirmed = inner
                    .records
                    .get(&id)
                    .is_some_and(|record| record.hidden() && record.should_evict(now));
                if confirmed {
                    if let Some(record) = inner.records.remove(&id) {
                        inner.index_remove(&record);
                        evicted += 1;
                    }
                }
            } else if let Some(record) = inner.records.get_mut(&id) {
                if !record.hidden() && record.should_hide(now) {
                    record.set_hidden(true);
                    hidden += 1;
                }
            }
        }

        if hidden > 0 || evicted > 0 {
            tracing::debug!(store = R::NAME, hidden, evicted, "cleanup finished");
        }
    }

    /// Feeds the processed counter into the measurement ring and
    /// re-evaluates the liveness automaton.
    pub fn take_measurement(&self, now: DateTime<Utc>) {
        let processed = self.counters.processed();
        self.measurements.lock().record(now, processed);
    }

    pub fn status(&self) -> StoreStatus {
        let measurements = self.measurements.lock();
        StoreStatus {
            status: measurements.status(),
            average: measurements.messages_average(),
            last_status_change: measurements.last_status_change(),
        }
    }

    /// Resets counters, measurements and status; residents are kept.
    pub fn reset_status(&self) {
        self.counters.reset();
        self.measurements.lock().reset(Utc::now());
    }

    fn snapshot_path(directory: &Path) -> PathBuf {
        directory.join(R::SNAPSHOT_FILE)
    }

    /// Writes all resident records to the data directory. The file is
    /// written to a temporary name first and renamed into place, so a
    /// concurrent restore never observes a torn snapshot.
    pub fn snapshot(&self, directory: &Path) -> Result<(), StoreError> {
        fs::create_dir_all(directory)?;

        let path = Self::snapshot_path(directory);
        let temporary = path.with_extension("bin.tmp");

        {
            let inner = self.inner.read();
            let file = fs::File::create(&temporary)?;
            let snapshot = SnapshotFile {
                version: SNAPSHOT_VERSION,
                records: inner.records.values().cloned().collect::<Vec<_>>(),
            };
            bincode::serialize_into(BufWriter::new(file), &snapshot)?;
        }

        fs::rename(&temporary, &path)?;
        tracing::info!(store = R::NAME, path = %path.display(), "snapshot written");

        Ok(())
    }

    /// Replaces the in-memory set from the snapshot file, rebuilding the
    /// station index. A missing file is not an error: the store starts
    /// empty.
    pub fn restore(&self, directory: &Path) -> Result<usize, StoreError> {
        let path = Self::snapshot_path(directory);

        let file = match fs::File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(store = R::NAME, "no snapshot found, starting empty");
                return Ok(0);
            }
            Err(error) => return Err(error.into()),
        };

        let snapshot: SnapshotFile<R> = bincode::deserialize_from(BufReader::new(file))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedSnapshotVersion(snapshot.version));
        }

        let mut inner = self.inner.write();
        inner.records.clear();
        inner.station_index.clear();
        let count = snapshot.records.len();

        for record in snapshot.records {
            inner.index_insert(&record);
            inner.records.insert(record.id().to_owned(), record);
        }

        tracing::info!(store = R::NAME, records = count, "snapshot restored");

        Ok(count)
    }

    /// Invariant check used by the test suite: the station index must map
    /// exactly the resident records.
    #[cfg(test)]
    pub(crate) fn station_index_is_consistent(&self) -> bool {
        let inner = self.inner.read();

        let mut expected: HashMap<String, HashSet<String>> = HashMap::new();
        for record in inner.records.values() {
            if let Some(code) = record.station_code() {
                expected
                    .entry(code.to_owned())
                    .or_default()
                    .insert(record.id().to_owned());
            }
        }

        expected == inner.station_index
    }
}
