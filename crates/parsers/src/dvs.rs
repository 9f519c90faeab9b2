use roxmltree::{Document, Node};

use model::{Departure, DepartureStatus, ModificationKind, TrainWing};

use crate::dvs3;
use crate::helpers::*;
use crate::ParseError;

/// Namespace of the legacy DVS dialect.
pub const DVS2_NAMESPACE: &str = "urn:ndov:cdm:trein:reisinformatie:data:4";

/// Namespace of the newer DVS dialect.
pub const DVS3_NAMESPACE: &str = "urn:ns:cdm:reisinformatie:data:dvs:3";

/// Parses a DVS XML message to a [`Departure`]. The two coexisting dialects
/// are told apart by the namespace of the product element: the legacy layout
/// uses `ReisInformatieProductDVS`, the newer one `reisInformatieProductDVS`
/// under the `dvs:3` namespace.
pub fn parse_dvs_message(document: &str) -> Result<Departure, ParseError> {
    let doc = Document::parse(document)?;
    let envelope = doc.root_element();

    if let Some(product) = child(envelope, "reisInformatieProductDVS") {
        let namespace = product.tag_name().namespace().unwrap_or("");
        if namespace == DVS3_NAMESPACE {
            return dvs3::parse_dvs3_product(product);
        }
        return Err(ParseError::UnknownNamespace(namespace.to_owned()));
    }

    let product = required_child(envelope, "ReisInformatieProductDVS")?;
    match product.tag_name().namespace() {
        None | Some(DVS2_NAMESPACE) => parse_dvs2_product(product),
        Some(namespace) => Err(ParseError::UnknownNamespace(namespace.to_owned())),
    }
}

fn parse_dvs2_product(product: Node) -> Result<Departure, ParseError> {
    let administration = required_child(product, "RIPAdministratie")?;
    let info_product = required_child(product, "DynamischeVertrekStaat")?;
    let train = required_child(info_product, "Trein")?;

    let mut departure = Departure {
        timestamp: infoplus_datetime(child(administration, "ReisInformatieTijdstip")),
        product_id: required_text(administration, "ReisInformatieProductID")?,

        service_id: required_text(info_product, "RitId")?,
        service_date: required_text(info_product, "RitDatum")?,
        station: infoplus_station(required_child(info_product, "RitStation")?)?,

        service_number: required_text(train, "TreinNummer")?,
        service_type: required_text(train, "TreinSoort")?,
        service_type_code: attribute(required_child(train, "TreinSoort")?, "Code").to_owned(),
        company: required_text(train, "Vervoerder")?,

        dvs_version: 2,
        ..Departure::default()
    };
    departure.generate_id();

    departure.status = parse_train_status(&optional_text(train, "TreinStatus"));
    departure.line_number = optional_text(train, "LijnNummer");
    departure.service_name = optional_text(train, "TreinNaam");

    departure.departure_time =
        infoplus_datetime(when_attribute(train, "VertrekTijd", "InfoStatus", "Gepland"));
    departure.delay = infoplus_duration(child(train, "ExacteVertrekVertraging"));

    departure.reservation_required = infoplus_boolean(child(train, "Reserveren"));
    departure.with_supplement = infoplus_boolean(child(train, "Toeslag"));
    departure.special_ticket = infoplus_boolean(child(train, "SpeciaalKaartje"));
    departure.rear_part_remains =
        infoplus_boolean(child(train, "AchterBlijvenAchtersteTreinDeel"));
    departure.do_not_board = infoplus_boolean(child(train, "NietInstappen"));

    for destination in when_attribute_multi(train, "TreinEindBestemming", "InfoStatus", "Actueel") {
        departure.destination_actual.push(infoplus_station(destination)?);
    }
    for destination in when_attribute_multi(train, "TreinEindBestemming", "InfoStatus", "Gepland") {
        departure.destination_planned.push(infoplus_station(destination)?);
    }

    if let Some(route) = when_attribute(train, "VerkorteRoute", "InfoStatus", "Actueel") {
        for station in children(route, "Station") {
            departure.via_actual.push(infoplus_station(station)?);
        }
    }
    if let Some(route) = when_attribute(train, "VerkorteRoute", "InfoStatus", "Gepland") {
        for station in children(route, "Station") {
            departure.via_planned.push(infoplus_station(station)?);
        }
    }

    departure.platform_actual = infoplus_platform(&when_attribute_multi(
        train,
        "TreinVertrekSpoor",
        "InfoStatus",
        "Actueel",
    ));
    departure.platform_planned = infoplus_platform(&when_attribute_multi(
        train,
        "TreinVertrekSpoor",
        "InfoStatus",
        "Gepland",
    ));

    for wing in children(train, "TreinVleugel") {
        departure.wings.push(parse_train_wing(wing)?);
    }

    for tip in children(train, "InstapTip") {
        departure.boarding_tips.push(model::BoardingTip {
            exit_station: child(tip, "InstapTipUitstapStation")
                .and_then(|station| infoplus_station(station).ok())
                .unwrap_or_default(),
            destination: child(tip, "InstapTipTreinEindBestemming")
                .and_then(|station| infoplus_station(station).ok())
                .unwrap_or_default(),
            train_type: optional_text(tip, "InstapTipTreinSoort"),
            train_type_code: child(tip, "InstapTipTreinSoort")
                .map(|element| attribute(element, "Code").to_owned())
                .unwrap_or_default(),
            departure_platform: infoplus_platform(&when_attribute_multi(
                tip,
                "InstapTipVertrekSpoor",
                "InfoStatus",
                "Actueel",
            )),
            departure_time: infoplus_datetime(child(tip, "InstapTipVertrekTijd")),
        });
    }

    for tip in children(train, "ReisTip") {
        let mut stations = Vec::new();
        for station in children(tip, "ReisTipStation") {
            stations.push(infoplus_station(station)?);
        }
        departure.travel_tips.push(model::TravelTip {
            tip_code: optional_text(tip, "ReisTipCode"),
            stations,
        });
    }

    for tip in children(train, "OverstapTip") {
        departure.change_tips.push(model::ChangeTip {
            destination: child(tip, "OverstapTipBestemming")
                .and_then(|station| infoplus_station(station).ok())
                .unwrap_or_default(),
            change_station: child(tip, "OverstapTipOverstapStation")
                .and_then(|station| infoplus_station(station).ok())
                .unwrap_or_default(),
        });
    }

    departure.modifications = infoplus_modifications(train);
    apply_modification_flags(&mut departure);

    Ok(departure)
}

fn parse_train_wing(wing: Node) -> Result<TrainWing, ParseError> {
    let mut result = TrainWing::default();

    for destination in when_attribute_multi(wing, "TreinVleugelEindBestemming", "InfoStatus", "Actueel")
    {
        result.destination_actual.push(infoplus_station(destination)?);
    }
    for destination in when_attribute_multi(wing, "TreinVleugelEindBestemming", "InfoStatus", "Gepland")
    {
        result.destination_planned.push(infoplus_station(destination)?);
    }

    if let Some(stops) = when_attribute(wing, "StopStations", "InfoStatus", "Actueel") {
        for station in children(stops, "Station") {
            result.stations.push(infoplus_station(station)?);
        }
    }
    if let Some(stops) = when_attribute(wing, "StopStations", "InfoStatus", "Gepland") {
        for station in children(stops, "Station") {
            result.stations_planned.push(infoplus_station(station)?);
        }
    }

    for (position, material) in children(wing, "MaterieelDeelDVS").enumerate() {
        result.material.push(infoplus_material(material, position));
    }

    result.modifications = infoplus_modifications(wing);

    Ok(result)
}

pub(crate) fn apply_modification_flags(departure: &mut Departure) {
    for modification in &departure.modifications {
        match modification.kind {
            ModificationKind::CancelledDeparture | ModificationKind::CancelledTrain => {
                departure.cancelled = true;
            }
            ModificationKind::NotActual => departure.not_real_time = true,
            _ => {}
        }
    }
}

pub(crate) fn parse_train_status(value: &str) -> DepartureStatus {
    match value {
        "1" => DepartureStatus::Approaching,
        "2" => DepartureStatus::Arriving,
        "5" => DepartureStatus::Departed,
        _ => DepartureStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station_xml(tag: &str, attrs: &str, code: &str, long: &str) -> String {
        format!(
            "<{tag}{attrs}><StationCode>{code}</StationCode><KorteNaam>{long}</KorteNaam>\
             <MiddelNaam>{long}</MiddelNaam><LangeNaam>{long}</LangeNaam></{tag}>"
        )
    }

    fn dvs2_message() -> String {
        let mut train = String::new();
        train.push_str("<TreinNummer>1234</TreinNummer>");
        train.push_str("<TreinSoort Code=\"SPR\">Sprinter</TreinSoort>");
        train.push_str("<Vervoerder>NS</Vervoerder>");
        train.push_str("<TreinStatus>2</TreinStatus>");
        train.push_str(
            "<VertrekTijd InfoStatus=\"Gepland\">2019-01-27T12:34:00.000+01:00</VertrekTijd>",
        );
        train.push_str("<ExacteVertrekVertraging>PT1M</ExacteVertrekVertraging>");
        train.push_str(&station_xml(
            "TreinEindBestemming",
            " InfoStatus=\"Actueel\"",
            "UT",
            "Utrecht Centraal",
        ));
        train.push_str(&station_xml(
            "TreinEindBestemming",
            " InfoStatus=\"Gepland\"",
            "UT",
            "Utrecht Centraal",
        ));
        train.push_str("<Reserveren>N</Reserveren><Toeslag>N</Toeslag>");
        train.push_str("<NietInstappen>N</NietInstappen>");
        train.push_str(
            "<TreinVertrekSpoor InfoStatus=\"Actueel\"><SpoorNummer>11</SpoorNummer>\
             <SpoorFase>a</SpoorFase></TreinVertrekSpoor>",
        );
        train.push_str(
            "<TreinVertrekSpoor InfoStatus=\"Gepland\"><SpoorNummer>11</SpoorNummer>\
             <SpoorFase>a</SpoorFase></TreinVertrekSpoor>",
        );
        train.push_str("<TreinVleugel>");
        train.push_str(&station_xml(
            "TreinVleugelEindBestemming",
            " InfoStatus=\"Actueel\"",
            "UT",
            "Utrecht Centraal",
        ));
        train.push_str("<StopStations InfoStatus=\"Actueel\">");
        train.push_str(&station_xml("Station", "", "GD", "Gouda"));
        train.push_str(&station_xml("Station", "", "WD", "Woerden"));
        train.push_str("</StopStations>");
        train.push_str("<MaterieelDeelDVS>");
        train.push_str("<MaterieelDeelSoort>SLT</MaterieelDeelSoort>");
        train.push_str("<MaterieelDeelAanduiding>6</MaterieelDeelAanduiding>");
        train.push_str("<MaterieelNummer>000000-02633-0</MaterieelNummer>");
        train.push_str("<MaterieelDeelToegankelijk>J</MaterieelDeelToegankelijk>");
        train.push_str(&station_xml(
            "MaterieelDeelEindBestemming",
            " InfoStatus=\"Actueel\"",
            "UT",
            "Utrecht Centraal",
        ));
        train.push_str("</MaterieelDeelDVS>");
        train.push_str("</TreinVleugel>");
        train.push_str(
            "<Wijziging><WijzigingType>20</WijzigingType></Wijziging>",
        );

        format!(
            "<PutReisInformatieBoodschapIn>\
             <ReisInformatieProductDVS xmlns=\"{DVS2_NAMESPACE}\">\
             <RIPAdministratie>\
             <ReisInformatieProductID>54321</ReisInformatieProductID>\
             <ReisInformatieTijdstip>2019-01-27T12:30:00.000+01:00</ReisInformatieTijdstip>\
             </RIPAdministratie>\
             <DynamischeVertrekStaat>\
             <RitId>1234</RitId><RitDatum>2019-01-27</RitDatum>\
             {station}\
             <Trein>{train}</Trein>\
             </DynamischeVertrekStaat>\
             </ReisInformatieProductDVS>\
             </PutReisInformatieBoodschapIn>",
            station = station_xml("RitStation", "", "RTD", "Rotterdam Centraal"),
        )
    }

    #[test]
    fn parse_departure() {
        let departure = parse_dvs_message(&dvs2_message()).unwrap();

        assert_eq!(departure.id, "2019-01-27-1234-RTD");
        assert_eq!(departure.dvs_version, 2);
        assert_eq!(departure.product_id, "54321");
        assert_eq!(departure.status, DepartureStatus::Arriving);
        assert_eq!(departure.service_type_code, "SPR");
        assert_eq!(
            departure.departure_time,
            Some("2019-01-27T11:34:00Z".parse().unwrap())
        );
        assert_eq!(departure.delay, 60);
        assert_eq!(departure.platform_actual, "11a");
        assert!(!departure.platform_changed());
        assert_eq!(departure.actual_destination_string(), "Utrecht Centraal");

        assert_eq!(departure.wings.len(), 1);
        let wing = &departure.wings[0];
        assert_eq!(wing.stations.len(), 2);
        assert_eq!(wing.stations[0].code, "GD");
        assert_eq!(wing.material.len(), 1);
        assert_eq!(wing.material[0].kind, "SLT-6");
        assert_eq!(wing.material[0].position, 1);
        assert_eq!(wing.material[0].normalized_number().as_deref(), Some("2633"));
        assert!(wing.material[0].accessible);

        assert_eq!(departure.modifications.len(), 1);
        assert!(!departure.cancelled);
    }

    #[test]
    fn cancelled_departure_sets_flag() {
        let message = dvs2_message().replace(
            "<WijzigingType>20</WijzigingType>",
            "<WijzigingType>32</WijzigingType>",
        );
        let departure = parse_dvs_message(&message).unwrap();
        assert!(departure.cancelled);
    }

    #[test]
    fn unknown_namespace_is_an_error() {
        let message = dvs2_message().replace(DVS2_NAMESPACE, "urn:something:else");
        assert!(matches!(
            parse_dvs_message(&message),
            Err(ParseError::UnknownNamespace(_))
        ));
    }
}
