use roxmltree::Node;

use model::{Departure, DepartureStatus, Station};

use crate::dvs::apply_modification_flags;
use crate::helpers::*;
use crate::ParseError;

/// Parses the `dvs:3` product element to a [`Departure`].
///
/// The newer dialect uses lower-camel-case element names and carries the
/// message timestamp as an attribute of the product element. Wings, tips and
/// material are not part of this dialect; a parsed record is tagged with
/// `dvs_version = 3` so consumers can tell the dialects apart.
pub fn parse_dvs3_product(product: Node) -> Result<Departure, ParseError> {
    let administration = required_child(product, "ripAdministratie")?;
    let info_product = required_child(product, "dynamischeVertrekStaat")?;
    let train = required_child(info_product, "trein")?;

    let mut departure = Departure {
        timestamp: iso_datetime(attribute(product, "timestamp")),
        product_id: required_text(administration, "reisInformatieProductID")?,

        service_id: required_text(info_product, "ritNummer")?,
        service_date: required_text(info_product, "ritDatum")?,
        station: parse_dvs3_station(required_child(info_product, "vertrekStation")?)?,

        service_number: required_text(train, "nummer")?,
        company: required_text(train, "vervoerder")?,

        dvs_version: 3,
        ..Departure::default()
    };
    departure.generate_id();

    let service_type = required_child(train, "soort")?;
    departure.service_type_code = required_text(service_type, "code")?;
    departure.service_type = child(service_type, "presentatieTekstPerTaal")
        .map(|presentation| optional_text(presentation, "tekst"))
        .unwrap_or_default();

    departure.status = match optional_text(train, "status").as_str() {
        "NADERT" => DepartureStatus::Approaching,
        "BINNENKOMST" => DepartureStatus::Arriving,
        "VERTROKKEN" => DepartureStatus::Departed,
        _ => DepartureStatus::Unknown,
    };

    departure.line_number = optional_text(train, "lijnNummer");
    departure.service_name = optional_text(train, "naam");

    departure.departure_time =
        infoplus_datetime(when_attribute(train, "vertrekTijd", "infoStatus", "GEPLAND"));
    if let Some(delay) = child(train, "vertraging") {
        departure.delay = infoplus_duration(child(delay, "exact"));
    }

    if let Some(platform) = when_attribute(train, "vertrekSpoor", "infoStatus", "ACTUEEL") {
        departure.platform_actual = optional_text(platform, "nummer");
    }
    if let Some(platform) = when_attribute(train, "vertrekSpoor", "infoStatus", "GEPLAND") {
        departure.platform_planned = optional_text(platform, "nummer");
    }

    for destination in when_attribute_multi(train, "eindBestemming", "infoStatus", "ACTUEEL") {
        departure.destination_actual.push(parse_dvs3_station(destination)?);
    }
    for destination in when_attribute_multi(train, "eindBestemming", "infoStatus", "GEPLAND") {
        departure.destination_planned.push(parse_dvs3_station(destination)?);
    }

    departure.modifications = infoplus_modifications(train);
    apply_modification_flags(&mut departure);

    Ok(departure)
}

fn parse_dvs3_station(node: Node) -> Result<Station, ParseError> {
    Ok(Station {
        code: required_text(node, "code")?,
        name_short: optional_text(node, "korteNaam"),
        name_medium: optional_text(node, "middelNaam"),
        name_long: optional_text(node, "langeNaam"),
    })
}

#[cfg(test)]
mod tests {
    use crate::dvs::{parse_dvs_message, DVS3_NAMESPACE};
    use model::DepartureStatus;

    fn dvs3_message() -> String {
        format!(
            "<PutReisInformatieBoodschapIn>\
             <reisInformatieProductDVS xmlns=\"{DVS3_NAMESPACE}\" \
             timestamp=\"2024-03-02T18:05:00+01:00\">\
             <ripAdministratie>\
             <reisInformatieProductID>998877</reisInformatieProductID>\
             </ripAdministratie>\
             <dynamischeVertrekStaat>\
             <ritNummer>2265</ritNummer>\
             <ritDatum>2024-03-02</ritDatum>\
             <vertrekStation>\
             <code>ASD</code><korteNaam>A'dam C.</korteNaam>\
             <middelNaam>Amsterdam C.</middelNaam><langeNaam>Amsterdam Centraal</langeNaam>\
             </vertrekStation>\
             <trein>\
             <nummer>2265</nummer>\
             <soort><code>IC</code>\
             <presentatieTekstPerTaal><tekst>Intercity</tekst></presentatieTekstPerTaal>\
             </soort>\
             <vervoerder>NS</vervoerder>\
             <status>VERTROKKEN</status>\
             <vertrekTijd infoStatus=\"GEPLAND\">2024-03-02T18:07:00+01:00</vertrekTijd>\
             <vertraging><exact>PT3M</exact></vertraging>\
             <vertrekSpoor infoStatus=\"GEPLAND\"><nummer>8</nummer></vertrekSpoor>\
             <vertrekSpoor infoStatus=\"ACTUEEL\"><nummer>8</nummer></vertrekSpoor>\
             <eindBestemming infoStatus=\"ACTUEEL\"><code>RTD</code>\
             <langeNaam>Rotterdam Centraal</langeNaam></eindBestemming>\
             </trein>\
             </dynamischeVertrekStaat>\
             </reisInformatieProductDVS>\
             </PutReisInformatieBoodschapIn>"
        )
    }

    #[test]
    fn parse_dvs3_departure() {
        let departure = parse_dvs_message(&dvs3_message()).unwrap();

        assert_eq!(departure.dvs_version, 3);
        assert_eq!(departure.id, "2024-03-02-2265-ASD");
        assert_eq!(departure.product_id, "998877");
        assert_eq!(
            departure.timestamp,
            Some("2024-03-02T17:05:00Z".parse().unwrap())
        );
        assert_eq!(departure.status, DepartureStatus::Departed);
        assert_eq!(departure.service_type, "Intercity");
        assert_eq!(departure.service_type_code, "IC");
        assert_eq!(departure.delay, 180);
        assert_eq!(departure.platform_actual, "8");
        assert_eq!(departure.destination_actual[0].code, "RTD");
    }
}
