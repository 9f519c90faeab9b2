use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use itertools::Itertools;
use serde::Serialize;

use model::modification::remarks;
use model::{Arrival, Station};

use crate::common::{local_time_string, null_string, ApiError, ReadQuery, Statistics};
use crate::ApiState;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/v2/arrivals/stats", get(arrival_stats))
        .route("/v2/arrivals/station/:station", get(arrivals_for_station))
        .route(
            "/v2/arrivals/arrival/:id/:station/:date",
            get(arrival_details),
        )
}

#[derive(Debug, Serialize)]
struct ArrivalResponse {
    service_id: String,
    service_date: String,
    name: Option<String>,
    station: Station,

    status: i32,
    service_number: String,
    #[serde(rename = "type")]
    service_type: String,
    type_code: String,
    company: String,
    line_number: Option<String>,

    arrival_time: Option<String>,
    delay: i32,

    origin_actual: Option<String>,
    origin_planned: Option<String>,
    origin_actual_codes: Vec<String>,
    via: Option<String>,

    platform_actual: Option<String>,
    platform_planned: Option<String>,
    platform_changed: bool,

    cancelled: bool,
    remarks: Vec<String>,

    hidden: bool,
}

fn arrival_response(arrival: &Arrival, language: &str) -> ArrivalResponse {
    let mut remark_texts = remarks(&arrival.modifications, language);
    if arrival.not_real_time {
        remark_texts.push(model::translations::translate(
            "Geen actuele informatie",
            "No real-time information",
            language,
        ));
    }

    ArrivalResponse {
        service_id: arrival.service_id.clone(),
        service_date: arrival.service_date.clone(),
        name: null_string(&arrival.service_name),
        station: arrival.station.clone(),

        status: arrival.status,
        service_number: arrival.service_number.clone(),
        service_type: arrival.service_type.clone(),
        type_code: arrival.service_type_code.clone(),
        company: arrival.company.clone(),
        line_number: null_string(&arrival.line_number),

        arrival_time: local_time_string(arrival.arrival_time),
        delay: arrival.delay,

        origin_actual: null_string(&arrival.actual_origin_string()),
        origin_planned: null_string(&arrival.planned_origin_string()),
        origin_actual_codes: model::station::station_codes(&arrival.origin_actual),
        via: null_string(&model::station::stations_medium_string(
            &arrival.via_actual,
            ", ",
        )),

        platform_actual: null_string(&arrival.platform_actual),
        platform_planned: null_string(&arrival.platform_planned),
        platform_changed: arrival.platform_changed(),

        cancelled: arrival.cancelled,
        remarks: remark_texts,

        hidden: arrival.hidden,
    }
}

async fn arrival_stats(State(state): State<ApiState>) -> Json<Statistics> {
    let store = &state.stores.arrivals;
    Json(Statistics::new(
        store.counters().snapshot(),
        store.count(),
        store.status(),
    ))
}

async fn arrivals_for_station(
    State(state): State<ApiState>,
    Path(station): Path<String>,
    Query(query): Query<ReadQuery>,
) -> Json<Vec<ArrivalResponse>> {
    let station = station.to_uppercase();

    let arrivals = state
        .stores
        .arrivals
        .list_by_station(&station, false)
        .into_iter()
        .sorted_by(|a, b| {
            a.arrival_time
                .cmp(&b.arrival_time)
                .then_with(|| a.planned_origin_string().cmp(&b.planned_origin_string()))
        })
        .map(|arrival| arrival_response(&arrival, query.language()))
        .collect();

    Json(arrivals)
}

async fn arrival_details(
    State(state): State<ApiState>,
    Path((id, station, date)): Path<(String, String, String)>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<ArrivalResponse>, ApiError> {
    let arrival_id = format!("{}-{}-{}", date, id, station.to_uppercase());

    state
        .stores
        .arrivals
        .get(&arrival_id)
        .map(|arrival| Json(arrival_response(&arrival, query.language())))
        .ok_or_else(|| ApiError::not_found("arrival"))
}
