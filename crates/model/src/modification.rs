use serde::{Deserialize, Serialize};

use crate::station::Station;
use crate::translations::{translate, translate_cause};

/// A change to the schedule which is communicated to travellers.
///
/// Unknown modification codes are kept as [`ModificationKind::Unknown`] so a
/// message with a code this build does not know about still round-trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    #[serde(rename = "type")]
    pub kind: ModificationKind,
    pub cause_short: String,
    pub cause_long: String,
    pub station: Option<Station>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", from = "i32")]
pub enum ModificationKind {
    DelayedDeparture,
    DelayedArrival,
    ChangedDeparturePlatform,
    ChangedArrivalPlatform,
    DeparturePlatformAllocated,
    ArrivalPlatformAllocated,
    ExtraTrain,
    CancelledTrain,
    ChangedStopPattern,
    ExtraDeparture,
    CancelledDeparture,
    Diverted,
    RouteShortened,
    RouteExtended,
    OriginRouteShortened,
    OriginRouteExtended,
    ExtraArrival,
    CancelledArrival,
    StatusChange,
    ChangedDestination,
    ChangedOrigin,
    ExtraThroughTrain,
    CancelledThroughTrain,
    NotActual,
    BusReplacement,
    Unknown(i32),
}

impl ModificationKind {
    pub fn code(self) -> i32 {
        match self {
            Self::DelayedDeparture => 10,
            Self::DelayedArrival => 11,
            Self::ChangedDeparturePlatform => 20,
            Self::ChangedArrivalPlatform => 21,
            Self::DeparturePlatformAllocated => 22,
            Self::ArrivalPlatformAllocated => 23,
            Self::ExtraTrain => 24,
            Self::CancelledTrain => 25,
            Self::ChangedStopPattern => 30,
            Self::ExtraDeparture => 31,
            Self::CancelledDeparture => 32,
            Self::Diverted => 33,
            Self::RouteShortened => 34,
            Self::RouteExtended => 35,
            Self::OriginRouteShortened => 36,
            Self::OriginRouteExtended => 37,
            Self::ExtraArrival => 38,
            Self::CancelledArrival => 39,
            Self::StatusChange => 40,
            Self::ChangedDestination => 41,
            Self::ChangedOrigin => 42,
            Self::ExtraThroughTrain => 43,
            Self::CancelledThroughTrain => 44,
            Self::NotActual => 50,
            Self::BusReplacement => 51,
            Self::Unknown(code) => code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            10 => Self::DelayedDeparture,
            11 => Self::DelayedArrival,
            20 => Self::ChangedDeparturePlatform,
            21 => Self::ChangedArrivalPlatform,
            22 => Self::DeparturePlatformAllocated,
            23 => Self::ArrivalPlatformAllocated,
            24 => Self::ExtraTrain,
            25 => Self::CancelledTrain,
            30 => Self::ChangedStopPattern,
            31 => Self::ExtraDeparture,
            32 => Self::CancelledDeparture,
            33 => Self::Diverted,
            34 => Self::RouteShortened,
            35 => Self::RouteExtended,
            36 => Self::OriginRouteShortened,
            37 => Self::OriginRouteExtended,
            38 => Self::ExtraArrival,
            39 => Self::CancelledArrival,
            40 => Self::StatusChange,
            41 => Self::ChangedDestination,
            42 => Self::ChangedOrigin,
            43 => Self::ExtraThroughTrain,
            44 => Self::CancelledThroughTrain,
            50 => Self::NotActual,
            51 => Self::BusReplacement,
            other => Self::Unknown(other),
        }
    }
}

impl From<ModificationKind> for i32 {
    fn from(kind: ModificationKind) -> i32 {
        kind.code()
    }
}

impl From<i32> for ModificationKind {
    fn from(code: i32) -> ModificationKind {
        ModificationKind::from_code(code)
    }
}

impl Modification {
    pub fn new(kind: ModificationKind) -> Self {
        Self {
            kind,
            cause_short: String::new(),
            cause_long: String::new(),
            station: None,
        }
    }

    /// Translates this modification to a remark for travellers, if the kind
    /// has a displayable text.
    pub fn remark(&self, language: &str) -> Option<String> {
        match self.kind {
            ModificationKind::DelayedDeparture | ModificationKind::DelayedArrival => {
                // Only mention the delay when there is a cause for it; the
                // delay itself is already visible on the board.
                if self.cause_long.is_empty() {
                    None
                } else {
                    Some(self.remark_with_cause("Later vertrek", "Delayed", language))
                }
            }
            ModificationKind::ChangedDeparturePlatform => Some(self.remark_with_cause(
                "Vertrekspoor gewijzigd",
                "Departure platform changed",
                language,
            )),
            ModificationKind::ChangedArrivalPlatform => Some(self.remark_with_cause(
                "Aankomstspoor gewijzigd",
                "Arrival platform changed",
                language,
            )),
            ModificationKind::ExtraTrain | ModificationKind::ExtraDeparture | ModificationKind::ExtraArrival => {
                Some(self.remark_with_cause("Extra trein", "Extra train", language))
            }
            ModificationKind::CancelledTrain
            | ModificationKind::CancelledDeparture
            | ModificationKind::CancelledArrival => {
                Some(self.remark_with_cause("Trein rijdt niet", "Cancelled", language))
            }
            ModificationKind::ChangedStopPattern => Some(self.remark_with_cause(
                "Gewijzigde dienstregeling",
                "Schedule changed",
                language,
            )),
            ModificationKind::Diverted => Some(self.remark_with_cause(
                "Rijdt via een andere route",
                "Diverted",
                language,
            )),
            ModificationKind::RouteShortened => Some(self.remark_with_station(
                "Rijdt niet verder dan %s",
                "Terminates at %s",
                language,
            )),
            ModificationKind::RouteExtended => Some(self.remark_with_station(
                "Rijdt verder naar %s",
                "Continues to %s",
                language,
            )),
            ModificationKind::OriginRouteShortened => Some(self.remark_with_station(
                "Rijdt vanaf %s",
                "Starts at %s",
                language,
            )),
            ModificationKind::ChangedDestination => Some(self.remark_with_station(
                "Let op, rijdt naar %s",
                "Attention, train goes to %s",
                language,
            )),
            ModificationKind::ChangedOrigin => Some(self.remark_with_station(
                "Let op, komt uit %s",
                "Attention, train comes from %s",
                language,
            )),
            ModificationKind::NotActual => Some(translate(
                "Geen actuele informatie",
                "No real-time information",
                language,
            )),
            ModificationKind::BusReplacement => Some(translate(
                "Bus in plaats van trein",
                "Bus replaces train",
                language,
            )),
            _ => None,
        }
    }

    fn remark_with_cause(&self, remark_nl: &str, remark_en: &str, language: &str) -> String {
        let mut remark = translate(remark_nl, remark_en, language);

        if !self.cause_long.is_empty() {
            let cause = if language == "en" {
                translate_cause(&self.cause_long)
            } else {
                self.cause_long.clone()
            };
            remark.push(' ');
            remark.push_str(&cause);
        }

        remark
    }

    fn remark_with_station(&self, remark_nl: &str, remark_en: &str, language: &str) -> String {
        let station_name = self
            .station
            .as_ref()
            .map(|station| station.name_long.as_str())
            .unwrap_or("");
        let remark = self.remark_with_cause(remark_nl, remark_en, language);

        remark.replace("%s", station_name)
    }
}

/// Translates a list of modifications to remarks, skipping kinds without a
/// displayable text.
pub fn remarks(modifications: &[Modification], language: &str) -> Vec<String> {
    modifications
        .iter()
        .filter_map(|modification| modification.remark(language))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_code_round_trip() {
        for code in [10, 11, 20, 25, 33, 34, 41, 50, 51, 99] {
            assert_eq!(ModificationKind::from_code(code).code(), code);
        }
        assert_eq!(ModificationKind::from_code(99), ModificationKind::Unknown(99));
    }

    #[test]
    fn delay_remark_only_with_cause() {
        let bare = Modification::new(ModificationKind::DelayedDeparture);
        assert_eq!(bare.remark("nl"), None);

        let mut with_cause = Modification::new(ModificationKind::DelayedDeparture);
        with_cause.cause_long = "door een seinstoring".to_owned();
        assert_eq!(
            with_cause.remark("nl").as_deref(),
            Some("Later vertrek door een seinstoring")
        );
        assert_eq!(
            with_cause.remark("en").as_deref(),
            Some("Delayed due to signal failure")
        );
    }

    #[test]
    fn station_remark() {
        let mut modification = Modification::new(ModificationKind::RouteExtended);
        modification.station = Some(Station::new(
            "RTD",
            "R'dam C.",
            "Rotterdam C.",
            "Rotterdam Centraal",
        ));
        assert_eq!(
            modification.remark("en").as_deref(),
            Some("Continues to Rotterdam Centraal")
        );
        assert_eq!(
            modification.remark("nl").as_deref(),
            Some("Rijdt verder naar Rotterdam Centraal")
        );
    }

    #[test]
    fn remarks_skip_silent_kinds() {
        let modifications = vec![
            Modification::new(ModificationKind::StatusChange),
            Modification::new(ModificationKind::CancelledTrain),
        ];
        assert_eq!(remarks(&modifications, "en"), vec!["Cancelled".to_owned()]);
    }
}
