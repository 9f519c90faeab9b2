use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use clap::Subcommand;

use model::{Arrival, Departure, Service};

#[derive(Subcommand)]
pub enum InspectCommand {
    /// Inspect an arrival (DAS) message file.
    Arrival { file: PathBuf },
    /// Inspect a departure (DVS) message file.
    Departure { file: PathBuf },
    /// Inspect a service (RIT) message file.
    Service {
        file: PathBuf,
        /// Show all stops.
        #[arg(short, long)]
        stops: bool,
        /// Show all modifications.
        #[arg(short, long)]
        modifications: bool,
    },
}

/// Parses a message file and prints a summary; used to debug the parsers
/// against captured feed messages.
pub fn run(command: InspectCommand) -> anyhow::Result<()> {
    match command {
        InspectCommand::Arrival { file } => {
            let arrival = parse::<Arrival>(&file, parsers::parse_das_message)?;
            print_arrival(&arrival);
        }
        InspectCommand::Departure { file } => {
            let departure = parse::<Departure>(&file, parsers::parse_dvs_message)?;
            print_departure(&departure);
        }
        InspectCommand::Service {
            file,
            stops,
            modifications,
        } => {
            let service = parse::<Service>(&file, parsers::parse_rit_message)?;
            print_service(&service, stops, modifications);
        }
    }

    Ok(())
}

fn parse<T>(
    file: &PathBuf,
    parser: fn(&str) -> Result<T, parsers::ParseError>,
) -> anyhow::Result<T> {
    let document = fs::read_to_string(file)
        .with_context(|| format!("error opening {}", file.display()))?;
    parser(&document).with_context(|| format!("error parsing {}", file.display()))
}

fn local(time: Option<DateTime<Utc>>) -> String {
    time.map(|time| time.with_timezone(&Local).to_string())
        .unwrap_or_else(|| "-".to_owned())
}

fn print_arrival(arrival: &Arrival) {
    println!("Product ID: {}", arrival.product_id);
    println!("Timestamp: {}", local(arrival.timestamp));
    println!("Arrival ID: {}", arrival.id);
    println!("Service number: {}", arrival.service_number);
    println!("Type: {}/{}", arrival.service_type_code, arrival.service_type);
    println!("Company: {}", arrival.company);
    println!("Station: {}", arrival.station.name_long);
    println!("Arrival time: {} +{}s", local(arrival.arrival_time), arrival.delay);
    println!(
        "Platform: {} (planned: {})",
        arrival.platform_actual, arrival.platform_planned
    );
    println!("Origin: {}", arrival.actual_origin_string());
    println!("Cancelled: {}", arrival.cancelled);
    println!("Modifications: {}", arrival.modifications.len());
}

fn print_departure(departure: &Departure) {
    println!("Product ID: {}", departure.product_id);
    println!("Timestamp: {}", local(departure.timestamp));
    println!("Departure ID: {}", departure.id);
    println!("DVS version: {}", departure.dvs_version);
    println!("Service number: {}", departure.service_number);
    println!(
        "Type: {}/{}",
        departure.service_type_code, departure.service_type
    );
    println!("Company: {}", departure.company);
    println!("Station: {}", departure.station.name_long);
    println!(
        "Departure time: {} +{}s",
        local(departure.departure_time),
        departure.delay
    );
    println!(
        "Platform: {} (planned: {})",
        departure.platform_actual, departure.platform_planned
    );
    println!("Destination: {}", departure.actual_destination_string());
    println!("Cancelled: {}", departure.cancelled);

    for (index, wing) in departure.wings.iter().enumerate() {
        println!(
            "  ** Wing {}  destination={}",
            index + 1,
            model::station::stations_long_string(&wing.destination_actual, "/")
        );
        println!("     {} stop(s)", wing.stations.len());
        for material in &wing.material {
            println!(
                "     Material: {}[{}]>{}",
                material.kind,
                material.normalized_number().unwrap_or_default(),
                material.destination_actual.code
            );
        }
    }
}

fn print_service(service: &Service, show_stops: bool, show_modifications: bool) {
    println!("Product ID: {}", service.product_id);
    println!("Timestamp: {}", local(service.timestamp));
    println!("Validity: {}", local(service.valid_until));
    println!("Service ID: {}", service.id);
    println!("Service number: {}", service.service_number);
    println!("Service date: {}", service.service_date);
    println!("Type: {}/{}", service.service_type_code, service.service_type);
    println!("Company: {}", service.company);
    println!("JourneyPlanner: {}", service.journey_planner);
    println!("ReservationRequired: {}", service.reservation_required);
    println!("SpecialTicket: {}", service.special_ticket);
    println!("WithSupplement: {}", service.with_supplement);

    println!("Service parts:");
    for (index, part) in service.parts.iter().enumerate() {
        println!(
            "  ** Service part {}  service={}",
            index + 1,
            part.service_number
        );

        if show_stops {
            for (stop_index, stop) in part.stops.iter().enumerate() {
                println!(
                    "    ** Stop {:02} {:>7} = {}",
                    stop_index + 1,
                    stop.station.code,
                    stop.station.name_long
                );
                if let Some(arrival) = stop.arrival_time {
                    println!(
                        "       A: {} +{}",
                        arrival.with_timezone(&Local).format("%H:%M"),
                        stop.arrival_delay
                    );
                }
                if let Some(departure) = stop.departure_time {
                    println!(
                        "       V: {} +{}",
                        departure.with_timezone(&Local).format("%H:%M"),
                        stop.departure_delay
                    );
                }
                if !stop.material.is_empty() {
                    print!("       Material: ");
                    for material in &stop.material {
                        print!(
                            "{}[{}]>{} ",
                            material.kind, material.number, material.destination_actual.code
                        );
                    }
                    println!();
                }
            }
        } else {
            println!("     {} stop(s)", part.stops.len());
        }
    }

    println!("Modifications:");
    if show_modifications {
        for (index, modification) in service.modifications.iter().enumerate() {
            println!("   {}, {:?}", index, modification);
        }
    } else {
        println!("   {} modification(s)", service.modifications.len());
    }
}
