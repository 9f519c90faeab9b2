//! The three indexed in-memory stores: arrivals, departures and services.
//!
//! Each store owns the latest accepted version of every resident record,
//! reconciles out-of-order updates, ages records out in two steps (soft
//! hiding, then eviction), persists snapshots to disk and derives a liveness
//! status from its message-processing throughput.

mod collection;
mod counters;
mod measurements;
mod records;
mod store;

pub use collection::StoreCollection;
pub use counters::{Counters, CountersSnapshot};
pub use measurements::{DowntimeConfig, Status};
pub use records::StoreRecord;
pub use store::{Classification, Store, StoreStatus};

use thiserror::Error;

pub type ArrivalStore = Store<model::Arrival>;
pub type DepartureStore = Store<model::Departure>;
pub type ServiceStore = Store<model::Service>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("unsupported snapshot version {0}")]
    UnsupportedSnapshotVersion(u32),
}
