use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;

use model::modification::remarks;
use model::{Material, Service, ServiceStop, Station};

/// The archived form of a service. This schema is fixed and deliberately
/// not the same as the read API's: remarks are pre-rendered for both
/// supported languages, and only stopping stations are included.
#[derive(Debug, Serialize)]
pub struct ArchivedService {
    pub id: String,
    pub product: String,
    pub timestamp: Option<String>,
    pub service_date: String,
    pub service_number: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub type_code: String,
    pub company: String,

    pub journey_planner: bool,
    pub reservation_required: bool,
    pub special_ticket: bool,
    pub with_supplement: bool,

    pub parts: Vec<ArchivedServicePart>,
    pub remarks_nl: Vec<String>,
    pub remarks_en: Vec<String>,
    pub tips: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ArchivedServicePart {
    pub service_number: String,
    pub remarks_nl: Vec<String>,
    pub remarks_en: Vec<String>,
    pub tips: Vec<String>,
    pub stops: Vec<ArchivedStop>,
}

#[derive(Debug, Serialize)]
pub struct ArchivedStop {
    pub station: Station,
    pub station_accessible: bool,
    pub assistance_available: bool,
    pub stopping_actual: bool,
    pub stopping_planned: bool,
    pub stop_type: String,
    pub do_not_board: bool,

    pub arrival_time: Option<String>,
    pub arrival_platform_actual: Option<String>,
    pub arrival_platform_planned: Option<String>,
    pub arrival_delay: i32,
    pub arrival_cancelled: bool,

    pub departure_time: Option<String>,
    pub departure_platform_actual: Option<String>,
    pub departure_platform_planned: Option<String>,
    pub departure_delay: i32,
    pub departure_cancelled: bool,

    pub remarks_nl: Vec<String>,
    pub remarks_en: Vec<String>,
    pub tips: Vec<String>,
    pub material: Vec<ArchivedMaterial>,
}

#[derive(Debug, Serialize)]
pub struct ArchivedMaterial {
    #[serde(rename = "type")]
    pub kind: String,
    pub accessible: bool,
    pub number: Option<String>,
    pub position: i32,
    pub remains_behind: bool,
    pub destination: String,
    pub destination_code: String,
}

/// Flattens a service into its archive document.
pub fn archive_document(service: &Service) -> ArchivedService {
    ArchivedService {
        id: service.id.clone(),
        product: service.product_id.clone(),
        timestamp: service.timestamp.map(local_time_string),
        service_date: service.service_date.clone(),
        service_number: service.service_number.clone(),
        service_type: service.service_type.clone(),
        type_code: service.service_type_code.clone(),
        company: service.company.clone(),

        journey_planner: service.journey_planner,
        reservation_required: service.reservation_required,
        special_ticket: service.special_ticket,
        with_supplement: service.with_supplement,

        parts: service
            .parts
            .iter()
            .map(|part| ArchivedServicePart {
                service_number: part.service_number.clone(),
                remarks_nl: remarks(&part.modifications, "nl"),
                remarks_en: remarks(&part.modifications, "en"),
                tips: Vec::new(),
                stops: part
                    .stopping_stations()
                    .into_iter()
                    .map(archived_stop)
                    .collect(),
            })
            .collect(),
        remarks_nl: remarks(&service.modifications, "nl"),
        remarks_en: remarks(&service.modifications, "en"),
        tips: Vec::new(),
    }
}

fn archived_stop(stop: &ServiceStop) -> ArchivedStop {
    ArchivedStop {
        station: stop.station.clone(),
        station_accessible: stop.station_accessible,
        assistance_available: stop.assistance_available,
        stopping_actual: stop.stopping_actual,
        stopping_planned: stop.stopping_planned,
        stop_type: stop.stop_type.clone(),
        do_not_board: stop.do_not_board,

        arrival_time: stop.arrival_time.map(local_time_string),
        arrival_platform_actual: null_string(&stop.arrival_platform_actual),
        arrival_platform_planned: null_string(&stop.arrival_platform_planned),
        arrival_delay: stop.arrival_delay,
        arrival_cancelled: stop.arrival_cancelled,

        departure_time: stop.departure_time.map(local_time_string),
        departure_platform_actual: null_string(&stop.departure_platform_actual),
        departure_platform_planned: null_string(&stop.departure_platform_planned),
        departure_delay: stop.departure_delay,
        departure_cancelled: stop.departure_cancelled,

        remarks_nl: remarks(&stop.modifications, "nl"),
        remarks_en: remarks(&stop.modifications, "en"),
        tips: Vec::new(),
        material: stop.material.iter().map(archived_material).collect(),
    }
}

fn archived_material(material: &Material) -> ArchivedMaterial {
    ArchivedMaterial {
        kind: material.kind.clone(),
        accessible: material.accessible,
        number: material.normalized_number(),
        position: material.position,
        remains_behind: material.remains_behind,
        destination: material.destination_actual.name_long.clone(),
        destination_code: material.destination_actual.code.clone(),
    }
}

fn local_time_string(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn null_string(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}
