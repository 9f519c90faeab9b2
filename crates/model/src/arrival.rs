use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::modification::Modification;
use crate::station::{stations_long_string, Station};

/// An arriving train at a single station.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arrival {
    pub id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub product_id: String,

    pub service_id: String,
    pub service_date: String,
    pub service_name: String,
    pub station: Station,

    pub status: i32,
    pub service_number: String,
    pub service_type: String,
    pub service_type_code: String,
    pub company: String,
    pub line_number: String,

    pub arrival_time: Option<DateTime<Utc>>,
    pub delay: i32,

    pub reservation_required: bool,
    pub with_supplement: bool,
    pub special_ticket: bool,
    pub rear_part_remains: bool,
    pub do_not_board: bool,
    pub cancelled: bool,
    pub not_real_time: bool,

    pub origin_actual: Vec<Station>,
    pub origin_planned: Vec<Station>,
    pub via_actual: Vec<Station>,
    pub via_planned: Vec<Station>,

    pub platform_actual: String,
    pub platform_planned: String,

    pub modifications: Vec<Modification>,

    pub hidden: bool,
}

impl Arrival {
    /// Derives the store identity from the record fields.
    pub fn generate_id(&mut self) {
        self.id = format!("{}-{}-{}", self.service_date, self.service_id, self.station.code);
    }

    /// The actual arrival time, including delay.
    pub fn real_arrival_time(&self) -> Option<DateTime<Utc>> {
        self.arrival_time
            .map(|time| time + Duration::seconds(self.delay as i64))
    }

    pub fn platform_changed(&self) -> bool {
        self.platform_actual != self.platform_planned
    }

    pub fn actual_origin_string(&self) -> String {
        stations_long_string(&self.origin_actual, "/")
    }

    pub fn planned_origin_string(&self) -> String {
        stations_long_string(&self.origin_planned, "/")
    }
}
