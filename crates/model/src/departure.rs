use chrono::{DateTime, Duration, Local, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::material::Material;
use crate::modification::Modification;
use crate::station::{stations_long_string, stations_medium_string, station_codes, Station};
use crate::translations::{translate, translate_stations};

/// Position of the train relative to the departure station, as reported by
/// the upstream feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum DepartureStatus {
    #[default]
    Unknown = 0,
    Approaching = 1,
    Arriving = 2,
    Departed = 5,
}

/// A train service departing from a single station.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Departure {
    pub id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub product_id: String,

    pub service_id: String,
    pub service_date: String,
    pub service_name: String,
    pub station: Station,

    pub status: DepartureStatus,
    pub service_number: String,
    pub service_type: String,
    pub service_type_code: String,
    pub company: String,
    pub line_number: String,

    /// Which DVS dialect produced this record (2 = legacy, 3 = namespaced).
    pub dvs_version: i32,

    pub departure_time: Option<DateTime<Utc>>,
    pub delay: i32,

    pub reservation_required: bool,
    pub with_supplement: bool,
    pub special_ticket: bool,
    pub rear_part_remains: bool,
    pub do_not_board: bool,
    pub cancelled: bool,
    pub not_real_time: bool,

    pub destination_actual: Vec<Station>,
    pub destination_planned: Vec<Station>,
    pub via_actual: Vec<Station>,
    pub via_planned: Vec<Station>,

    pub platform_actual: String,
    pub platform_planned: String,

    pub wings: Vec<TrainWing>,

    pub boarding_tips: Vec<BoardingTip>,
    pub travel_tips: Vec<TravelTip>,
    pub change_tips: Vec<ChangeTip>,

    pub modifications: Vec<Modification>,

    pub hidden: bool,
}

/// A part of a departure with a single destination, used to model trains
/// that split or join along the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainWing {
    pub destination_actual: Vec<Station>,
    pub destination_planned: Vec<Station>,
    pub stations: Vec<Station>,
    pub stations_planned: Vec<Station>,
    pub material: Vec<Material>,
    pub modifications: Vec<Modification>,
}

/// A tip to board another train for certain destinations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardingTip {
    pub exit_station: Station,
    pub destination: Station,
    pub train_type: String,
    pub train_type_code: String,
    pub departure_platform: String,
    pub departure_time: Option<DateTime<Utc>>,
}

/// A tip that a service calls (or does not call) at specific stations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelTip {
    pub tip_code: String,
    pub stations: Vec<Station>,
}

/// A tip to change trains at `change_station` for the given destination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeTip {
    pub destination: Station,
    pub change_station: Station,
}

impl Departure {
    /// Derives the store identity from the record fields.
    pub fn generate_id(&mut self) {
        self.id = format!("{}-{}-{}", self.service_date, self.service_id, self.station.code);
    }

    /// The actual departure time, including delay.
    pub fn real_departure_time(&self) -> Option<DateTime<Utc>> {
        self.departure_time
            .map(|time| time + Duration::seconds(self.delay as i64))
    }

    pub fn platform_changed(&self) -> bool {
        self.platform_actual != self.platform_planned
    }

    pub fn actual_destination_string(&self) -> String {
        stations_long_string(&self.destination_actual, "/")
    }

    pub fn planned_destination_string(&self) -> String {
        stations_long_string(&self.destination_planned, "/")
    }

    pub fn actual_destination_codes(&self) -> Vec<String> {
        station_codes(&self.destination_actual)
    }

    pub fn via_stations_string(&self) -> String {
        stations_medium_string(&self.via_actual, ", ")
    }
}

impl BoardingTip {
    pub fn translation(&self, language: &str) -> String {
        let translation = translate(
            "%s %s naar %s (spoor %s) is eerder in %s",
            "%s %s to %s (platform %s) reaches %s sooner",
            language,
        );
        let time = self
            .departure_time
            .map(|time| time.with_timezone(&Local).format("%H:%M").to_string())
            .unwrap_or_default();

        let mut result = translation;
        for value in [
            self.train_type_code.as_str(),
            time.as_str(),
            self.destination.name_long.as_str(),
            self.departure_platform.as_str(),
            self.exit_station.name_long.as_str(),
        ] {
            result = result.replacen("%s", value, 1);
        }
        result
    }
}

impl ChangeTip {
    pub fn translation(&self, language: &str) -> String {
        let translation = translate("Voor %s overstappen in %s", "For %s, change at %s", language);

        translation
            .replacen("%s", &self.destination.name_long, 1)
            .replacen("%s", &self.change_station.name_long, 1)
    }
}

impl TravelTip {
    pub fn translation(&self, language: &str) -> String {
        match self.tip_code.as_str() {
            "STNS" => translate_stations(
                "Stopt niet in %s",
                "Does not call at %s",
                &self.stations,
                language,
            ),
            "STO" => translate_stations(
                "Stopt ook in %s",
                "Also calls at %s",
                &self.stations,
                language,
            ),
            "STVA" => translate_stations(
                "Stopt vanaf %s op alle tussengelegen stations",
                "Calls at all stations after %s",
                &self.stations,
                language,
            ),
            "STNVA" => translate_stations(
                "Stopt vanaf %s niet op tussengelegen stations",
                "Does not call at intermediate stations after %s",
                &self.stations,
                language,
            ),
            "STT" => translate_stations(
                "Stopt tot %s op alle tussengelegen stations",
                "Calls at all stations until %s",
                &self.stations,
                language,
            ),
            "STNT" => translate_stations(
                "Stopt tot %s niet op tussengelegen stations",
                "First stop at %s",
                &self.stations,
                language,
            ),
            "STAL" => translate(
                "Stopt op alle tussengelegen stations",
                "Calls at all stations",
                language,
            ),
            "STN" => translate(
                "Stopt niet op tussengelegen stations",
                "Does not call at intermediate stations",
                language,
            ),
            // Unknown tip codes fall back to the raw code.
            _ => self.tip_code.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_departure_time() {
        let mut departure = Departure {
            departure_time: Some("2019-01-27T12:34:00+01:00".parse().unwrap()),
            ..Departure::default()
        };

        assert_eq!(
            departure.real_departure_time(),
            Some("2019-01-27T12:34:00+01:00".parse().unwrap())
        );

        departure.delay = 30;
        assert_eq!(
            departure.real_departure_time(),
            Some("2019-01-27T12:34:30+01:00".parse().unwrap())
        );

        departure.delay = 3600;
        assert_eq!(
            departure.real_departure_time(),
            Some("2019-01-27T13:34:00+01:00".parse().unwrap())
        );

        departure.delay = -120;
        assert_eq!(
            departure.real_departure_time(),
            Some("2019-01-27T12:32:00+01:00".parse().unwrap())
        );
    }

    #[test]
    fn departure_platform_changed() {
        let tables = [
            ("", "", false),
            ("4", "4", false),
            ("4", "5", true),
            ("", "4", true),
            ("4", "", true),
        ];

        for (planned, actual, changed) in tables {
            let departure = Departure {
                platform_planned: planned.to_owned(),
                platform_actual: actual.to_owned(),
                ..Departure::default()
            };
            assert_eq!(
                departure.platform_changed(),
                changed,
                "planned={planned:?} actual={actual:?}"
            );
        }
    }

    #[test]
    fn departure_id() {
        let mut departure = Departure {
            service_date: "2019-01-27".to_owned(),
            service_number: "301234".to_owned(),
            service_id: "1234".to_owned(),
            ..Departure::default()
        };
        departure.station.code = "RTD".to_owned();
        departure.generate_id();

        assert_eq!(departure.id, "2019-01-27-1234-RTD");
    }

    #[test]
    fn travel_tip_translation() {
        let tip = TravelTip {
            tip_code: "STN".to_owned(),
            stations: vec![],
        };
        assert_eq!(tip.translation("en"), "Does not call at intermediate stations");
        assert_eq!(tip.translation("nl"), "Stopt niet op tussengelegen stations");

        let unknown = TravelTip {
            tip_code: "XYZ".to_owned(),
            stations: vec![],
        };
        assert_eq!(unknown.translation("en"), "XYZ");
    }

    #[test]
    fn change_tip_translation() {
        let tip = ChangeTip {
            destination: Station::new("GVC", "Den Haag C.", "Den Haag C.", "Den Haag Centraal"),
            change_station: Station::new("UT", "Utrecht C.", "Utrecht C.", "Utrecht Centraal"),
        };
        assert_eq!(
            tip.translation("en"),
            "For Den Haag Centraal, change at Utrecht Centraal"
        );
    }
}
