use chrono::{DateTime, Duration, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// The moving average is taken over at least this much history.
const MEASUREMENT_WINDOW_SECONDS: i64 = 600;

/// Sentinel average for "not yet enough data".
pub const AVERAGE_UNKNOWN: f64 = -1.0;

/// Liveness of a store, derived from its message throughput.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Unknown,
    Down,
    Recovering,
    Up,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unknown => "UNKNOWN",
            Status::Down => "DOWN",
            Status::Recovering => "RECOVERING",
            Status::Up => "UP",
        }
    }
}

/// Thresholds for the downtime detection of one store.
#[derive(Debug, Clone, Copy)]
pub struct DowntimeConfig {
    /// Minimum messages/second during the day to count as receiving.
    pub min_average: f64,
    /// Minimum messages/second during the night hours.
    pub min_average_night: f64,
    pub night_start_hour: u32,
    pub night_end_hour: u32,
    /// How long the store has to keep receiving before RECOVERING becomes UP.
    pub recovery: Duration,
}

impl DowntimeConfig {
    fn minimum_average_for(&self, now: DateTime<Utc>) -> f64 {
        let hour = now.with_timezone(&Local).hour();
        if hour >= self.night_start_hour && hour < self.night_end_hour {
            self.min_average_night
        } else {
            self.min_average
        }
    }
}

/// A bounded ring of `(timestamp, cumulative processed)` samples plus the
/// status automaton fed by it. Only the measurement task touches this.
#[derive(Debug)]
pub struct Measurements {
    config: DowntimeConfig,
    samples: Vec<(DateTime<Utc>, u64)>,
    status: Status,
    messages_average: f64,
    last_status_change: DateTime<Utc>,
}

impl Measurements {
    pub fn new(config: DowntimeConfig) -> Self {
        Self {
            config,
            samples: Vec::new(),
            status: Status::Unknown,
            messages_average: AVERAGE_UNKNOWN,
            last_status_change: Utc::now(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn messages_average(&self) -> f64 {
        self.messages_average
    }

    pub fn last_status_change(&self) -> DateTime<Utc> {
        self.last_status_change
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.samples.clear();
        self.status = Status::Unknown;
        self.messages_average = AVERAGE_UNKNOWN;
        self.last_status_change = now;
    }

    /// Appends a sample and re-evaluates the average and the automaton.
    pub fn record(&mut self, now: DateTime<Utc>, processed: u64) {
        self.samples.push((now, processed));
        self.update_average(now);
        self.update_status(now);
    }

    fn update_average(&mut self, now: DateTime<Utc>) {
        // The most recent sample that is at least a full window old anchors
        // the average; everything before it is history we no longer need.
        let anchor = self
            .samples
            .iter()
            .enumerate()
            .filter(|(_, (time, _))| (now - *time).num_seconds() >= MEASUREMENT_WINDOW_SECONDS)
            .map(|(index, _)| index)
            .last();

        match anchor {
            Some(index) => {
                let (anchor_time, anchor_processed) = self.samples[index];
                let (_, latest_processed) = self.samples[self.samples.len() - 1];
                let age = (now - anchor_time).num_seconds();

                self.messages_average =
                    latest_processed.saturating_sub(anchor_processed) as f64 / age as f64;
                self.samples.drain(..index);
            }
            None => self.messages_average = AVERAGE_UNKNOWN,
        }
    }

    fn update_status(&mut self, now: DateTime<Utc>) {
        if self.messages_average < 0.0 {
            self.transition(Status::Unknown, now);
            return;
        }

        let receiving = self.messages_average >= self.config.minimum_average_for(now);

        match self.status {
            Status::Unknown => {
                if receiving {
                    self.transition(Status::Recovering, now);
                } else {
                    self.transition(Status::Down, now);
                }
            }
            Status::Down => {
                if receiving {
                    self.transition(Status::Recovering, now);
                }
            }
            Status::Recovering => {
                if !receiving {
                    self.transition(Status::Down, now);
                } else if now - self.last_status_change >= self.config.recovery {
                    self.transition(Status::Up, now);
                }
            }
            Status::Up => {
                if !receiving {
                    self.transition(Status::Down, now);
                }
            }
        }
    }

    fn transition(&mut self, to: Status, now: DateTime<Utc>) {
        if self.status != to {
            tracing::info!(from = self.status.as_str(), to = to.as_str(), "store status changed");
            self.status = to;
            self.last_status_change = now;
        }
    }
}
