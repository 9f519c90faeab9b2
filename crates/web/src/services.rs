use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use model::modification::remarks;
use model::{Material, Service, ServicePart, ServiceStop, Station};

use crate::common::{local_time_string, null_string, ApiError, ReadQuery, Statistics};
use crate::ApiState;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/v2/services/stats", get(service_stats))
        .route("/v2/services/service/:id/:date", get(service_details))
}

#[derive(Debug, Serialize)]
struct ServiceResponse {
    id: String,
    timestamp: Option<String>,
    service_date: String,
    service_number: String,
    line_number: Option<String>,
    #[serde(rename = "type")]
    service_type: String,
    type_code: String,
    company: String,

    journey_planner: bool,
    reservation_required: bool,
    special_ticket: bool,
    with_supplement: bool,

    parts: Vec<ServicePartResponse>,
    remarks: Vec<String>,

    hidden: bool,
}

#[derive(Debug, Serialize)]
struct ServicePartResponse {
    service_number: String,
    remarks: Vec<String>,
    stops: Vec<ServiceStopResponse>,
}

#[derive(Debug, Serialize)]
struct ServiceStopResponse {
    station: Station,
    station_accessible: bool,
    assistance_available: bool,
    stopping_actual: bool,
    stopping_planned: bool,
    stop_type: Option<String>,
    do_not_board: bool,

    arrival_time: Option<String>,
    arrival_platform_actual: Option<String>,
    arrival_platform_planned: Option<String>,
    arrival_platform_changed: bool,
    arrival_delay: i32,
    arrival_cancelled: bool,

    departure_time: Option<String>,
    departure_platform_actual: Option<String>,
    departure_platform_planned: Option<String>,
    departure_platform_changed: bool,
    departure_delay: i32,
    departure_cancelled: bool,

    remarks: Vec<String>,
    material: Vec<ServiceMaterialResponse>,
}

#[derive(Debug, Serialize)]
struct ServiceMaterialResponse {
    #[serde(rename = "type")]
    kind: String,
    number: Option<String>,
    position: i32,
    accessible: bool,
    remains_behind: bool,
    destination: Option<String>,
    destination_code: Option<String>,
}

fn service_response(service: &Service, language: &str, verbose: bool) -> ServiceResponse {
    ServiceResponse {
        id: service.id.clone(),
        timestamp: local_time_string(service.timestamp),
        service_date: service.service_date.clone(),
        service_number: service.service_number.clone(),
        line_number: null_string(&service.line_number),
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
            .map(|part| service_part_response(part, language, verbose))
            .collect(),
        remarks: remarks(&service.modifications, language),

        hidden: service.hidden,
    }
}

fn service_part_response(
    part: &ServicePart,
    language: &str,
    verbose: bool,
) -> ServicePartResponse {
    // Non-verbose responses only list the stations the train calls at;
    // verbose responses include pass-through stations too.
    let stops: Vec<&ServiceStop> = if verbose {
        part.stops.iter().collect()
    } else {
        part.stopping_stations()
    };

    ServicePartResponse {
        service_number: part.service_number.clone(),
        remarks: remarks(&part.modifications, language),
        stops: stops
            .into_iter()
            .map(|stop| service_stop_response(stop, language))
            .collect(),
    }
}

fn service_stop_response(stop: &ServiceStop, language: &str) -> ServiceStopResponse {
    ServiceStopResponse {
        station: stop.station.clone(),
        station_accessible: stop.station_accessible,
        assistance_available: stop.assistance_available,
        stopping_actual: stop.stopping_actual,
        stopping_planned: stop.stopping_planned,
        stop_type: null_string(&stop.stop_type),
        do_not_board: stop.do_not_board,

        arrival_time: local_time_string(stop.arrival_time),
        arrival_platform_actual: null_string(&stop.arrival_platform_actual),
        arrival_platform_planned: null_string(&stop.arrival_platform_planned),
        arrival_platform_changed: stop.arrival_platform_changed(),
        arrival_delay: stop.arrival_delay,
        arrival_cancelled: stop.arrival_cancelled,

        departure_time: local_time_string(stop.departure_time),
        departure_platform_actual: null_string(&stop.departure_platform_actual),
        departure_platform_planned: null_string(&stop.departure_platform_planned),
        departure_platform_changed: stop.departure_platform_changed(),
        departure_delay: stop.departure_delay,
        departure_cancelled: stop.departure_cancelled,

        remarks: remarks(&stop.modifications, language),
        material: stop.material.iter().map(service_material_response).collect(),
    }
}

fn service_material_response(material: &Material) -> ServiceMaterialResponse {
    ServiceMaterialResponse {
        kind: material.kind.clone(),
        number: material.normalized_number(),
        position: material.position,
        accessible: material.accessible,
        remains_behind: material.remains_behind,
        destination: null_string(&material.destination_actual.name_long),
        destination_code: null_string(&material.destination_actual.code),
    }
}

async fn service_stats(State(state): State<ApiState>) -> Json<Statistics> {
    let store = &state.stores.services;
    Json(Statistics::new(
        store.counters().snapshot(),
        store.count(),
        store.status(),
    ))
}

async fn service_details(
    State(state): State<ApiState>,
    Path((id, date)): Path<(String, String)>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<ServiceResponse>, ApiError> {
    let service_id = format!("{date}-{id}");

    state
        .stores
        .services
        .get(&service_id)
        .map(|service| Json(service_response(&service, query.language(), query.verbose())))
        .ok_or_else(|| ApiError::not_found("service"))
}
