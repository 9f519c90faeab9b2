use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use itertools::Itertools;
use serde::Serialize;

use model::modification::remarks;
use model::{Departure, Material, Service, Station, TrainWing};

use crate::common::{local_time_string, null_string, ApiError, ReadQuery, Statistics};
use crate::ApiState;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/v2/departures/stats", get(departure_stats))
        .route("/v2/departures/station/:station", get(departures_for_station))
        .route(
            "/v2/departures/departure/:id/:station/:date",
            get(departure_details),
        )
}

#[derive(Debug, Serialize)]
struct DepartureResponse {
    service_id: String,
    service_date: String,
    name: Option<String>,
    station: Station,

    status: model::DepartureStatus,
    service_number: String,
    #[serde(rename = "type")]
    service_type: String,
    type_code: String,
    company: String,
    line_number: Option<String>,

    departure_time: Option<String>,
    delay: i32,

    destination_actual: Option<String>,
    destination_planned: Option<String>,
    destination_actual_codes: Vec<String>,
    via: Option<String>,

    platform_actual: Option<String>,
    platform_planned: Option<String>,
    platform_changed: bool,

    cancelled: bool,
    do_not_board: bool,
    reservation_required: bool,
    with_supplement: bool,
    special_ticket: bool,
    rear_part_remains: bool,

    remarks: Vec<String>,
    tips: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    wings: Option<Vec<WingResponse>>,

    hidden: bool,
}

#[derive(Debug, Serialize)]
struct WingResponse {
    destination_actual: Vec<Station>,
    destination_planned: Vec<Station>,
    remarks: Vec<String>,
    stops: Vec<StopResponse>,
    material: Vec<MaterialResponse>,
}

/// A wing stop; the service-level details are only present on verbose
/// requests, looked up from the service store.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize)]
struct StopResponse {
    #[serde(flatten)]
    station: Station,

    arrival_time: Option<String>,
    arrival_platform: Option<String>,
    arrival_delay: Option<i32>,
    arrival_cancelled: Option<bool>,

    departure_time: Option<String>,
    departure_platform: Option<String>,
    departure_delay: Option<i32>,
    departure_cancelled: Option<bool>,

    accessible: Option<bool>,
    assistance_available: Option<bool>,
}

#[derive(Debug, Serialize)]
struct MaterialResponse {
    #[serde(rename = "type")]
    kind: String,
    number: Option<String>,
    position: i32,
    accessible: bool,
    closed: bool,
    remains_behind: bool,
    added: bool,
    already_removed: bool,
    destination_actual: Option<String>,
    destination_planned: Option<String>,
}

fn departure_response(
    departure: &Departure,
    language: &str,
    wings: Option<Vec<WingResponse>>,
) -> DepartureResponse {
    let mut remark_texts = remarks(&departure.modifications, language);
    if departure.not_real_time {
        remark_texts.push(model::translations::translate(
            "Geen actuele informatie",
            "No real-time information",
            language,
        ));
    }

    let mut tips: Vec<String> = Vec::new();
    tips.extend(departure.boarding_tips.iter().map(|tip| tip.translation(language)));
    tips.extend(departure.travel_tips.iter().map(|tip| tip.translation(language)));
    tips.extend(departure.change_tips.iter().map(|tip| tip.translation(language)));

    DepartureResponse {
        service_id: departure.service_id.clone(),
        service_date: departure.service_date.clone(),
        name: null_string(&departure.service_name),
        station: departure.station.clone(),

        status: departure.status,
        service_number: departure.service_number.clone(),
        service_type: departure.service_type.clone(),
        type_code: departure.service_type_code.clone(),
        company: departure.company.clone(),
        line_number: null_string(&departure.line_number),

        departure_time: local_time_string(departure.departure_time),
        delay: departure.delay,

        destination_actual: null_string(&departure.actual_destination_string()),
        destination_planned: null_string(&departure.planned_destination_string()),
        destination_actual_codes: departure.actual_destination_codes(),
        via: null_string(&departure.via_stations_string()),

        platform_actual: null_string(&departure.platform_actual),
        platform_planned: null_string(&departure.platform_planned),
        platform_changed: departure.platform_changed(),

        cancelled: departure.cancelled,
        do_not_board: departure.do_not_board,
        reservation_required: departure.reservation_required,
        with_supplement: departure.with_supplement,
        special_ticket: departure.special_ticket,
        rear_part_remains: departure.rear_part_remains,

        remarks: remark_texts,
        tips,

        wings,

        hidden: departure.hidden,
    }
}

fn material_response(material: &Material) -> MaterialResponse {
    MaterialResponse {
        kind: material.kind.clone(),
        number: material.normalized_number(),
        position: material.position,
        accessible: material.accessible,
        closed: material.closed,
        remains_behind: material.remains_behind,
        added: material.added,
        already_removed: material.already_removed,
        destination_actual: null_string(&material.destination_actual.name_long),
        destination_planned: null_string(&material.destination_planned.name_long),
    }
}

/// Renders a wing; on verbose requests every stop is enriched with the
/// stop-level details of the corresponding service record, when resident.
fn wing_response(
    wing: &TrainWing,
    language: &str,
    service: Option<&Service>,
) -> WingResponse {
    let service_stops = service.map(|service| service.stops());

    WingResponse {
        destination_actual: wing.destination_actual.clone(),
        destination_planned: wing.destination_planned.clone(),
        remarks: remarks(&wing.modifications, language),
        stops: wing
            .stations
            .iter()
            .map(|station| {
                let details = service_stops
                    .as_ref()
                    .and_then(|stops| stops.get(&station.code).copied());
                stop_response(station, details)
            })
            .collect(),
        material: wing.material.iter().map(material_response).collect(),
    }
}

fn stop_response(station: &Station, details: Option<&model::ServiceStop>) -> StopResponse {
    StopResponse {
        station: station.clone(),

        arrival_time: details.and_then(|stop| local_time_string(stop.arrival_time)),
        arrival_platform: details.and_then(|stop| null_string(&stop.arrival_platform_actual)),
        arrival_delay: details.map(|stop| stop.arrival_delay),
        arrival_cancelled: details.map(|stop| stop.arrival_cancelled),

        departure_time: details.and_then(|stop| local_time_string(stop.departure_time)),
        departure_platform: details.and_then(|stop| null_string(&stop.departure_platform_actual)),
        departure_delay: details.map(|stop| stop.departure_delay),
        departure_cancelled: details.map(|stop| stop.departure_cancelled),

        accessible: details.map(|stop| stop.station_accessible),
        assistance_available: details.map(|stop| stop.assistance_available),
    }
}

async fn departure_stats(State(state): State<ApiState>) -> Json<Statistics> {
    let store = &state.stores.departures;
    Json(Statistics::new(
        store.counters().snapshot(),
        store.count(),
        store.status(),
    ))
}

async fn departures_for_station(
    State(state): State<ApiState>,
    Path(station): Path<String>,
    Query(query): Query<ReadQuery>,
) -> Json<Vec<DepartureResponse>> {
    let station = station.to_uppercase();

    let departures = state
        .stores
        .departures
        .list_by_station(&station, false)
        .into_iter()
        .sorted_by(|a, b| {
            a.departure_time
                .cmp(&b.departure_time)
                .then_with(|| {
                    a.planned_destination_string()
                        .cmp(&b.planned_destination_string())
                })
        })
        .map(|departure| {
            // Wings are only rendered on verbose requests; list responses
            // never enrich from the service store.
            let wings = query.verbose().then(|| {
                departure
                    .wings
                    .iter()
                    .map(|wing| wing_response(wing, query.language(), None))
                    .collect()
            });
            departure_response(&departure, query.language(), wings)
        })
        .collect();

    Json(departures)
}

async fn departure_details(
    State(state): State<ApiState>,
    Path((id, station, date)): Path<(String, String, String)>,
    Query(query): Query<ReadQuery>,
) -> Result<Json<DepartureResponse>, ApiError> {
    let departure_id = format!("{}-{}-{}", date, id, station.to_uppercase());

    let Some(departure) = state.stores.departures.get(&departure_id) else {
        return Err(ApiError::not_found("departure"));
    };

    // Verbose responses enrich every wing stop from the service store; a
    // missing service record leaves the stop-level fields null.
    let service = if query.verbose() {
        let service_id = format!("{}-{}", departure.service_date, departure.service_id);
        state.stores.services.get(&service_id)
    } else {
        None
    };

    let wings = query.verbose().then(|| {
        departure
            .wings
            .iter()
            .map(|wing| wing_response(wing, query.language(), service.as_ref()))
            .collect()
    });

    Ok(Json(departure_response(
        &departure,
        query.language(),
        wings,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{router, ApiState};
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use stores::StoreCollection;
    use model::{ServicePart, ServiceStop};

    fn departure(service_id: &str, minutes: i64) -> Departure {
        let mut departure = Departure {
            product_id: format!("product-{service_id}"),
            timestamp: Some(Utc::now()),
            service_id: service_id.to_owned(),
            service_date: "2019-04-06".to_owned(),
            service_type: "Intercity".to_owned(),
            service_type_code: "IC".to_owned(),
            company: "NS".to_owned(),
            departure_time: Some(Utc::now() + Duration::minutes(minutes)),
            ..Departure::default()
        };
        departure.station = Station::new("UT", "Utrecht C.", "Utrecht C.", "Utrecht Centraal");
        departure.destination_planned =
            vec![Station::new("RTD", "R'dam C.", "Rotterdam C.", "Rotterdam Centraal")];
        departure.destination_actual = departure.destination_planned.clone();

        let mut wing = TrainWing::default();
        wing.destination_actual = departure.destination_actual.clone();
        wing.stations = vec![
            Station::new("GD", "Gouda", "Gouda", "Gouda"),
            Station::new("RTD", "R'dam C.", "Rotterdam C.", "Rotterdam Centraal"),
        ];
        departure.wings.push(wing);

        departure.generate_id();
        departure
    }

    fn service_for(departure: &Departure) -> Service {
        let mut service = Service {
            product_id: "service-product".to_owned(),
            timestamp: Some(Utc::now()),
            service_date: departure.service_date.clone(),
            service_number: departure.service_id.clone(),
            valid_until: Some(Utc::now() + Duration::hours(6)),
            ..Service::default()
        };
        service.generate_id();

        let stop = ServiceStop {
            station: Station::new("RTD", "R'dam C.", "Rotterdam C.", "Rotterdam Centraal"),
            stopping_planned: true,
            arrival_time: Some("2019-04-06T22:40:00+03:00".parse().unwrap()),
            arrival_platform_actual: "2".to_owned(),
            arrival_delay: 60,
            ..ServiceStop::default()
        };

        service.parts.push(ServicePart {
            service_number: departure.service_id.clone(),
            stops: vec![stop],
            modifications: vec![],
        });

        service
    }

    fn state() -> ApiState {
        let stores = StoreCollection::new("/tmp/unused");
        let departure = departure("2265", 15);
        stores.services.process(service_for(&departure));
        stores.departures.process(departure);
        stores.departures.process(self::departure("660", 5));
        ApiState {
            stores: Arc::new(stores),
        }
    }

    #[tokio::test]
    async fn station_list_sorted_and_without_wings() {
        let (status, value) =
            crate::tests::get_json(router(state()), "/v2/departures/station/UT").await;

        assert_eq!(status, StatusCode::OK);
        let list = value.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["service_id"], "660");
        assert_eq!(list[1]["service_id"], "2265");
        assert!(list[0].get("wings").is_none());
        assert_eq!(list[0]["destination_actual"], "Rotterdam Centraal");
    }

    #[tokio::test]
    async fn verbose_detail_enriches_stops_from_the_service_store() {
        let (status, value) = crate::tests::get_json(
            router(state()),
            "/v2/departures/departure/2265/UT/2019-04-06?verbose=true",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let stops = value["wings"][0]["stops"].as_array().unwrap();
        assert_eq!(stops.len(), 2);

        // GD is not part of the service record: stop-level fields are null.
        assert_eq!(stops[0]["code"], "GD");
        assert!(stops[0].get("arrival_time").is_none() || stops[0]["arrival_time"].is_null());

        // RTD carries the service-level arrival details.
        assert_eq!(stops[1]["code"], "RTD");
        assert!(stops[1]["arrival_time"].is_string());
        assert_eq!(stops[1]["arrival_platform"], "2");
        assert_eq!(stops[1]["arrival_delay"], 60);
    }

    #[tokio::test]
    async fn non_verbose_detail_has_no_wings() {
        let (status, value) = crate::tests::get_json(
            router(state()),
            "/v2/departures/departure/2265/UT/2019-04-06",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(value.get("wings").is_none());
    }

    #[tokio::test]
    async fn missing_departure_is_404() {
        let (status, _) = crate::tests::get_json(
            router(state()),
            "/v2/departures/departure/1/UT/2019-04-06",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
