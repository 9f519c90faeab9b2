use roxmltree::Document;

use model::{Arrival, ModificationKind};

use crate::helpers::*;
use crate::ParseError;

/// Parses a DAS XML message to an [`Arrival`].
pub fn parse_das_message(document: &str) -> Result<Arrival, ParseError> {
    let doc = Document::parse(document)?;

    let envelope = doc.root_element();
    let product = required_child(envelope, "ReisInformatieProductDAS")?;
    let administration = required_child(product, "RIPAdministratie")?;
    let info_product = required_child(product, "DynamischeAankomstStaat")?;
    let train = required_child(info_product, "TreinAankomst")?;

    let mut arrival = Arrival {
        timestamp: infoplus_datetime(child(administration, "ReisInformatieTijdstip")),
        product_id: required_text(administration, "ReisInformatieProductID")?,

        service_id: required_text(info_product, "RitId")?,
        service_date: required_text(info_product, "RitDatum")?,
        station: infoplus_station(required_child(info_product, "RitStation")?)?,

        service_number: required_text(train, "TreinNummer")?,
        service_type: required_text(train, "TreinSoort")?,
        service_type_code: attribute(required_child(train, "TreinSoort")?, "Code").to_owned(),
        company: required_text(train, "Vervoerder")?,
        ..Arrival::default()
    };
    arrival.generate_id();

    arrival.status = optional_text(train, "TreinStatus").parse().unwrap_or(0);
    arrival.line_number = optional_text(train, "LijnNummer");
    arrival.service_name = optional_text(train, "TreinNaam");

    arrival.arrival_time =
        infoplus_datetime(when_attribute(train, "AankomstTijd", "InfoStatus", "Gepland"));
    arrival.delay = infoplus_duration(child(train, "ExacteAankomstVertraging"));

    arrival.reservation_required = infoplus_boolean(child(train, "Reserveren"));
    arrival.with_supplement = infoplus_boolean(child(train, "Toeslag"));
    arrival.special_ticket = infoplus_boolean(child(train, "SpeciaalKaartje"));
    arrival.rear_part_remains =
        infoplus_boolean(child(train, "AchterBlijvenAchtersteTreinDeel"));
    arrival.do_not_board = infoplus_boolean(child(train, "NietInstappen"));

    for origin in when_attribute_multi(train, "TreinHerkomst", "InfoStatus", "Actueel") {
        arrival.origin_actual.push(infoplus_station(origin)?);
    }
    for origin in when_attribute_multi(train, "TreinHerkomst", "InfoStatus", "Gepland") {
        arrival.origin_planned.push(infoplus_station(origin)?);
    }

    if let Some(route) = when_attribute(train, "VerkorteRoute", "InfoStatus", "Actueel") {
        for station in children(route, "Station") {
            arrival.via_actual.push(infoplus_station(station)?);
        }
    }
    if let Some(route) = when_attribute(train, "VerkorteRoute", "InfoStatus", "Gepland") {
        for station in children(route, "Station") {
            arrival.via_planned.push(infoplus_station(station)?);
        }
    }

    arrival.platform_actual = infoplus_platform(&when_attribute_multi(
        train,
        "TreinAankomstSpoor",
        "InfoStatus",
        "Actueel",
    ));
    arrival.platform_planned = infoplus_platform(&when_attribute_multi(
        train,
        "TreinAankomstSpoor",
        "InfoStatus",
        "Gepland",
    ));

    arrival.modifications = infoplus_modifications(train);

    for modification in &arrival.modifications {
        match modification.kind {
            ModificationKind::CancelledArrival | ModificationKind::CancelledTrain => {
                arrival.cancelled = true;
            }
            ModificationKind::NotActual => arrival.not_real_time = true,
            _ => {}
        }
    }

    Ok(arrival)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAS_MESSAGE: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8"?>"#,
        "<PutReisInformatieBoodschapIn>",
        "<ReisInformatieProductDAS TimeStamp=\"2019-01-27T12:34:56.000+01:00\">",
        "<RIPAdministratie>",
        "<ReisInformatieProductID>12345678</ReisInformatieProductID>",
        "<ReisInformatieTijdstip>2019-01-27T12:34:56.000+01:00</ReisInformatieTijdstip>",
        "</RIPAdministratie>",
        "<DynamischeAankomstStaat>",
        "<RitId>2346</RitId>",
        "<RitDatum>2019-01-27</RitDatum>",
        "<RitStation>",
        "<StationCode>RTD</StationCode>",
        "<KorteNaam>R'dam C.</KorteNaam>",
        "<MiddelNaam>Rotterdam C.</MiddelNaam>",
        "<LangeNaam>Rotterdam Centraal</LangeNaam>",
        "</RitStation>",
        "<TreinAankomst>",
        "<TreinNummer>2346</TreinNummer>",
        "<TreinSoort Code=\"IC\">Intercity</TreinSoort>",
        "<Vervoerder>NS</Vervoerder>",
        "<TreinStatus>0</TreinStatus>",
        "<AankomstTijd InfoStatus=\"Gepland\">2019-01-27T13:11:00.000+01:00</AankomstTijd>",
        "<AankomstTijd InfoStatus=\"Actueel\">2019-01-27T13:13:30.000+01:00</AankomstTijd>",
        "<ExacteAankomstVertraging>PT2M30S</ExacteAankomstVertraging>",
        "<TreinHerkomst InfoStatus=\"Actueel\">",
        "<StationCode>GVC</StationCode>",
        "<KorteNaam>Den Haag C.</KorteNaam>",
        "<MiddelNaam>Den Haag C.</MiddelNaam>",
        "<LangeNaam>Den Haag Centraal</LangeNaam>",
        "</TreinHerkomst>",
        "<TreinHerkomst InfoStatus=\"Gepland\">",
        "<StationCode>GVC</StationCode>",
        "<KorteNaam>Den Haag C.</KorteNaam>",
        "<MiddelNaam>Den Haag C.</MiddelNaam>",
        "<LangeNaam>Den Haag Centraal</LangeNaam>",
        "</TreinHerkomst>",
        "<TreinAankomstSpoor InfoStatus=\"Actueel\"><SpoorNummer>5</SpoorNummer></TreinAankomstSpoor>",
        "<TreinAankomstSpoor InfoStatus=\"Gepland\"><SpoorNummer>4</SpoorNummer></TreinAankomstSpoor>",
        "<Wijziging>",
        "<WijzigingType>10</WijzigingType>",
        "<WijzigingOorzaakLang>door een seinstoring</WijzigingOorzaakLang>",
        "</Wijziging>",
        "</TreinAankomst>",
        "</DynamischeAankomstStaat>",
        "</ReisInformatieProductDAS>",
        "</PutReisInformatieBoodschapIn>",
    );

    #[test]
    fn parse_arrival() {
        let arrival = parse_das_message(DAS_MESSAGE).unwrap();

        assert_eq!(arrival.id, "2019-01-27-2346-RTD");
        assert_eq!(arrival.product_id, "12345678");
        assert_eq!(
            arrival.timestamp,
            Some("2019-01-27T11:34:56Z".parse().unwrap())
        );
        assert_eq!(arrival.service_number, "2346");
        assert_eq!(arrival.service_type_code, "IC");
        assert_eq!(arrival.company, "NS");
        assert_eq!(
            arrival.arrival_time,
            Some("2019-01-27T12:11:00Z".parse().unwrap())
        );
        assert_eq!(arrival.delay, 150);
        assert_eq!(arrival.origin_actual.len(), 1);
        assert_eq!(arrival.origin_actual[0].code, "GVC");
        assert_eq!(arrival.platform_actual, "5");
        assert_eq!(arrival.platform_planned, "4");
        assert!(arrival.platform_changed());
        assert_eq!(arrival.modifications.len(), 1);
        assert!(!arrival.cancelled);
    }

    #[test]
    fn missing_element_is_an_error() {
        let result = parse_das_message("<PutReisInformatieBoodschapIn/>");
        assert!(matches!(
            result,
            Err(ParseError::MissingElement("ReisInformatieProductDAS"))
        ));
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(
            parse_das_message("this is not xml"),
            Err(ParseError::Xml(_))
        ));
    }
}
