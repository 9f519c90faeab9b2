use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::material::Material;
use crate::modification::Modification;
use crate::station::Station;

/// Marker on a service stop: does the train actually call here.
pub const STOP_TYPE_STOPPING: &str = "S";
pub const STOP_TYPE_PASS_THROUGH: &str = "D";

/// A train service over its whole journey, containing all parts and stops.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub product_id: String,

    pub valid_until: Option<DateTime<Utc>>,
    pub service_number: String,
    pub service_date: String,
    pub service_type: String,
    pub service_type_code: String,
    pub line_number: String,
    pub company: String,

    pub parts: Vec<ServicePart>,

    pub reservation_required: bool,
    pub with_supplement: bool,
    pub special_ticket: bool,
    pub journey_planner: bool,

    pub modifications: Vec<Modification>,

    pub hidden: bool,
}

/// A single part of a train service. A service usually contains just one
/// part, but may contain more when it splits or joins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServicePart {
    pub service_number: String,
    pub stops: Vec<ServiceStop>,
    pub modifications: Vec<Modification>,
}

/// A station which is passed or called at by a train service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceStop {
    pub station: Station,

    pub station_accessible: bool,
    pub assistance_available: bool,

    pub destination_actual: String,
    pub destination_planned: String,
    pub arrival_platform_actual: String,
    pub arrival_platform_planned: String,
    pub departure_platform_actual: String,
    pub departure_platform_planned: String,

    pub stopping_actual: bool,
    pub stopping_planned: bool,
    pub stop_type: String,
    pub do_not_board: bool,

    pub arrival_time: Option<DateTime<Utc>>,
    pub arrival_delay: i32,
    pub departure_time: Option<DateTime<Utc>>,
    pub departure_delay: i32,

    pub arrival_cancelled: bool,
    pub departure_cancelled: bool,

    pub modifications: Vec<Modification>,
    pub material: Vec<Material>,
}

impl Service {
    /// Derives the store identity from the record fields.
    pub fn generate_id(&mut self) {
        self.id = format!("{}-{}", self.service_date, self.service_number);
    }

    /// All stops the service actually calls at (from all parts), keyed by
    /// station code.
    pub fn stops(&self) -> HashMap<String, &ServiceStop> {
        let mut stops = HashMap::new();

        for part in &self.parts {
            for stop in &part.stops {
                if stop.is_stopping() {
                    stops.insert(stop.station.code.clone(), stop);
                }
            }
        }

        stops
    }
}

impl ServicePart {
    /// Filters out stops which are not called at by the service.
    pub fn stopping_stations(&self) -> Vec<&ServiceStop> {
        self.stops.iter().filter(|stop| stop.is_stopping()).collect()
    }
}

impl ServiceStop {
    /// Whether the service stops here, or was planned to do so.
    pub fn is_stopping(&self) -> bool {
        self.stopping_actual || self.stopping_planned
    }

    pub fn arrival_platform_changed(&self) -> bool {
        self.arrival_platform_planned != self.arrival_platform_actual
    }

    pub fn departure_platform_changed(&self) -> bool {
        self.departure_platform_planned != self.departure_platform_actual
    }

    /// The actual arrival time at this stop, including delay.
    pub fn real_arrival_time(&self) -> Option<DateTime<Utc>> {
        self.arrival_time
            .map(|time| time + Duration::seconds(self.arrival_delay as i64))
    }

    /// The actual departure time at this stop, including delay.
    pub fn real_departure_time(&self) -> Option<DateTime<Utc>> {
        self.departure_time
            .map(|time| time + Duration::seconds(self.departure_delay as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(code: &str, stopping: bool) -> ServiceStop {
        ServiceStop {
            station: Station::new(code, code, code, code),
            stopping_actual: stopping,
            stopping_planned: stopping,
            ..ServiceStop::default()
        }
    }

    #[test]
    fn service_id() {
        let mut service = Service {
            service_date: "2019-01-27".to_owned(),
            service_number: "1234".to_owned(),
            ..Service::default()
        };
        service.generate_id();

        assert_eq!(service.id, "2019-01-27-1234");
    }

    #[test]
    fn stopping_stations() {
        let part = ServicePart {
            service_number: "1234".to_owned(),
            stops: vec![stop("RTD", true), stop("RTN", false), stop("GD", true)],
            modifications: vec![],
        };

        let stopping = part.stopping_stations();
        assert_eq!(stopping.len(), 2);
        assert_eq!(stopping[0].station.code, "RTD");
        assert_eq!(stopping[1].station.code, "GD");
    }

    #[test]
    fn stops_spans_all_parts() {
        let mut service = Service::default();
        service.parts.push(ServicePart {
            service_number: "1234".to_owned(),
            stops: vec![stop("RTD", true)],
            modifications: vec![],
        });
        service.parts.push(ServicePart {
            service_number: "2345".to_owned(),
            stops: vec![stop("UT", true), stop("AMF", false)],
            modifications: vec![],
        });

        let stops = service.stops();
        assert_eq!(stops.len(), 2);
        assert!(stops.contains_key("RTD"));
        assert!(stops.contains_key("UT"));
        assert!(!stops.contains_key("AMF"));
    }

    #[test]
    fn stop_platform_changed() {
        let mut stop = stop("RTD", true);
        stop.arrival_platform_planned = "4".to_owned();
        stop.arrival_platform_actual = "4".to_owned();
        assert!(!stop.arrival_platform_changed());

        stop.arrival_platform_actual = "5".to_owned();
        assert!(stop.arrival_platform_changed());
    }
}
