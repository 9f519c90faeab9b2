use roxmltree::{Document, Node};

use model::{ModificationKind, Service, ServicePart, ServiceStop};

use crate::helpers::*;
use crate::ParseError;

/// Parses a RIT XML message to a [`Service`].
pub fn parse_rit_message(document: &str) -> Result<Service, ParseError> {
    let doc = Document::parse(document)?;

    let envelope = doc.root_element();
    let product = required_child(envelope, "ReisInformatieProductRitInfo")?;
    let administration = required_child(product, "RIPAdministratie")?;
    let info_product = required_child(product, "RitInfo")?;

    let mut service = Service {
        timestamp: infoplus_datetime(child(administration, "ReisInformatieTijdstip")),
        product_id: required_text(administration, "ReisInformatieProductID")?,
        valid_until: infoplus_datetime(child(administration, "GeldigTot")),

        service_number: required_text(info_product, "TreinNummer")?,
        service_date: required_text(info_product, "TreinDatum")?,

        service_type: required_text(info_product, "TreinSoort")?,
        service_type_code: attribute(required_child(info_product, "TreinSoort")?, "Code")
            .to_owned(),
        company: required_text(info_product, "Vervoerder")?,
        line_number: optional_text(info_product, "LijnNummer"),

        ..Service::default()
    };
    service.generate_id();

    service.reservation_required = infoplus_boolean(child(info_product, "Reserveren"));
    service.with_supplement = infoplus_boolean(child(info_product, "Toeslag"));
    service.special_ticket = infoplus_boolean(child(info_product, "SpeciaalKaartje"));
    service.journey_planner = infoplus_boolean(child(info_product, "Reisplanner"));

    let logical_service = required_child(info_product, "LogischeRit")?;
    service.modifications = infoplus_modifications(logical_service);

    for part_info in children(logical_service, "LogischeRitDeel") {
        let mut part = ServicePart {
            service_number: required_text(part_info, "LogischeRitDeelNummer")?,
            modifications: infoplus_modifications(part_info),
            ..ServicePart::default()
        };

        for stop_info in children(part_info, "LogischeRitDeelStation") {
            part.stops.push(parse_service_stop(stop_info)?);
        }

        service.parts.push(part);
    }

    Ok(service)
}

fn parse_service_stop(stop_info: Node) -> Result<ServiceStop, ParseError> {
    let mut stop = ServiceStop {
        station: infoplus_station(required_child(stop_info, "Station")?)?,
        modifications: infoplus_modifications(stop_info),

        stop_type: optional_text(stop_info, "StationnementType"),
        do_not_board: infoplus_boolean(child(stop_info, "NietInstappen")),

        station_accessible: infoplus_boolean(child(stop_info, "StationToegankelijk")),
        assistance_available: infoplus_boolean(child(stop_info, "StationReisAssistentie")),

        ..ServiceStop::default()
    };

    // Cancellation bits are carried as stop-level modifications.
    for modification in &stop.modifications {
        match modification.kind {
            ModificationKind::CancelledArrival => stop.arrival_cancelled = true,
            ModificationKind::CancelledDeparture => stop.departure_cancelled = true,
            _ => {}
        }
    }

    if child(stop_info, "Stopt").is_some() {
        stop.stopping_actual =
            infoplus_boolean(when_attribute(stop_info, "Stopt", "InfoStatus", "Actueel"));
        stop.stopping_planned =
            infoplus_boolean(when_attribute(stop_info, "Stopt", "InfoStatus", "Gepland"));
    }

    stop.destination_actual =
        when_attribute(stop_info, "TreinEindBestemming", "InfoStatus", "Actueel")
            .map(|destination| optional_text(destination, "LangeNaam"))
            .unwrap_or_default();
    stop.destination_planned =
        when_attribute(stop_info, "TreinEindBestemming", "InfoStatus", "Gepland")
            .map(|destination| optional_text(destination, "LangeNaam"))
            .unwrap_or_default();

    if child(stop_info, "AankomstTijd").is_some() {
        stop.arrival_time =
            infoplus_datetime(when_attribute(stop_info, "AankomstTijd", "InfoStatus", "Gepland"));
    }
    if child(stop_info, "VertrekTijd").is_some() {
        stop.departure_time =
            infoplus_datetime(when_attribute(stop_info, "VertrekTijd", "InfoStatus", "Gepland"));
    }

    if child(stop_info, "TreinAankomstSpoor").is_some() {
        stop.arrival_platform_actual = infoplus_platform(&when_attribute_multi(
            stop_info,
            "TreinAankomstSpoor",
            "InfoStatus",
            "Actueel",
        ));
        stop.arrival_platform_planned = infoplus_platform(&when_attribute_multi(
            stop_info,
            "TreinAankomstSpoor",
            "InfoStatus",
            "Gepland",
        ));
    }
    if child(stop_info, "TreinVertrekSpoor").is_some() {
        stop.departure_platform_actual = infoplus_platform(&when_attribute_multi(
            stop_info,
            "TreinVertrekSpoor",
            "InfoStatus",
            "Actueel",
        ));
        stop.departure_platform_planned = infoplus_platform(&when_attribute_multi(
            stop_info,
            "TreinVertrekSpoor",
            "InfoStatus",
            "Gepland",
        ));
    }

    stop.arrival_delay = infoplus_duration(child(stop_info, "ExacteAankomstVertraging"));
    stop.departure_delay = infoplus_duration(child(stop_info, "ExacteVertrekVertraging"));

    for (position, material_info) in children(stop_info, "MaterieelDeel").enumerate() {
        stop.material.push(infoplus_material(material_info, position));
    }

    Ok(stop)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station_xml(tag: &str, code: &str, long: &str) -> String {
        format!(
            "<{tag}><StationCode>{code}</StationCode><KorteNaam>{long}</KorteNaam>\
             <MiddelNaam>{long}</MiddelNaam><LangeNaam>{long}</LangeNaam></{tag}>"
        )
    }

    fn stop_xml(code: &str, long: &str, stops: bool, stop_type: &str) -> String {
        let stopping = if stops { "J" } else { "N" };
        format!(
            "<LogischeRitDeelStation>\
             {station}\
             <StationnementType>{stop_type}</StationnementType>\
             <Stopt InfoStatus=\"Actueel\">{stopping}</Stopt>\
             <Stopt InfoStatus=\"Gepland\">{stopping}</Stopt>\
             <StationToegankelijk>J</StationToegankelijk>\
             <StationReisAssistentie>N</StationReisAssistentie>\
             <AankomstTijd InfoStatus=\"Gepland\">2019-04-06T22:40:00.000+03:00</AankomstTijd>\
             <VertrekTijd InfoStatus=\"Gepland\">2019-04-06T22:42:00.000+03:00</VertrekTijd>\
             <ExacteAankomstVertraging>PT1M</ExacteAankomstVertraging>\
             <TreinAankomstSpoor InfoStatus=\"Actueel\"><SpoorNummer>2</SpoorNummer></TreinAankomstSpoor>\
             <TreinAankomstSpoor InfoStatus=\"Gepland\"><SpoorNummer>2</SpoorNummer></TreinAankomstSpoor>\
             <MaterieelDeel>\
             <MaterieelDeelSoort>VIRM</MaterieelDeelSoort>\
             <MaterieelDeelAanduiding>6</MaterieelDeelAanduiding>\
             <MaterieelNummer>000000-09547-0</MaterieelNummer>\
             <MaterieelDeelToegankelijk>J</MaterieelDeelToegankelijk>\
             {material_destination}\
             </MaterieelDeel>\
             </LogischeRitDeelStation>",
            station = station_xml("Station", code, long),
            material_destination = station_xml("MaterieelDeelEindBestemming", "UT", "Utrecht Centraal")
                .replace("<MaterieelDeelEindBestemming>", "<MaterieelDeelEindBestemming InfoStatus=\"Actueel\">"),
        )
    }

    fn rit_message() -> String {
        format!(
            "<PutReisInformatieBoodschapIn>\
             <ReisInformatieProductRitInfo>\
             <RIPAdministratie>\
             <ReisInformatieProductID>777777</ReisInformatieProductID>\
             <ReisInformatieTijdstip>2019-04-06T20:00:00.000+02:00</ReisInformatieTijdstip>\
             <GeldigTot>2019-04-07T02:00:00.000+02:00</GeldigTot>\
             </RIPAdministratie>\
             <RitInfo>\
             <TreinNummer>2265</TreinNummer>\
             <TreinDatum>2019-04-06</TreinDatum>\
             <TreinSoort Code=\"IC\">Intercity</TreinSoort>\
             <Vervoerder>NS</Vervoerder>\
             <Reisplanner>J</Reisplanner>\
             <LogischeRit>\
             <Wijziging><WijzigingType>40</WijzigingType></Wijziging>\
             <LogischeRitDeel>\
             <LogischeRitDeelNummer>2265</LogischeRitDeelNummer>\
             {stop_rtd}\
             {stop_rtn}\
             </LogischeRitDeel>\
             </LogischeRit>\
             </RitInfo>\
             </ReisInformatieProductRitInfo>\
             </PutReisInformatieBoodschapIn>",
            stop_rtd = stop_xml("RTD", "Rotterdam Centraal", true, "S"),
            stop_rtn = stop_xml("RTN", "Rotterdam Noord", false, "D"),
        )
    }

    #[test]
    fn parse_service() {
        let service = parse_rit_message(&rit_message()).unwrap();

        assert_eq!(service.id, "2019-04-06-2265");
        assert_eq!(service.product_id, "777777");
        assert_eq!(
            service.valid_until,
            Some("2019-04-07T00:00:00Z".parse().unwrap())
        );
        assert_eq!(service.service_type_code, "IC");
        assert!(service.journey_planner);
        assert_eq!(service.modifications.len(), 1);

        assert_eq!(service.parts.len(), 1);
        let part = &service.parts[0];
        assert_eq!(part.service_number, "2265");
        assert_eq!(part.stops.len(), 2);

        let stop = &part.stops[0];
        assert_eq!(stop.station.code, "RTD");
        assert!(stop.is_stopping());
        assert!(stop.station_accessible);
        assert!(!stop.assistance_available);
        assert_eq!(
            stop.arrival_time,
            Some("2019-04-06T19:40:00Z".parse().unwrap())
        );
        assert_eq!(stop.arrival_delay, 60);
        assert_eq!(stop.arrival_platform_actual, "2");
        assert_eq!(stop.material.len(), 1);
        assert_eq!(stop.material[0].kind, "VIRM-6");
        assert_eq!(stop.material[0].destination_actual.code, "UT");

        assert!(!part.stops[1].is_stopping());
        assert_eq!(part.stops[1].stop_type, "D");

        let stopping = part.stopping_stations();
        assert_eq!(stopping.len(), 1);
        assert_eq!(stopping[0].station.code, "RTD");
    }

    #[test]
    fn cancelled_stop_flags() {
        let message = rit_message().replace(
            "<StationnementType>S</StationnementType>",
            "<StationnementType>S</StationnementType>\
             <Wijziging><WijzigingType>39</WijzigingType></Wijziging>\
             <Wijziging><WijzigingType>32</WijzigingType></Wijziging>",
        );
        let service = parse_rit_message(&message).unwrap();
        let stop = &service.parts[0].stops[0];

        assert!(stop.arrival_cancelled);
        assert!(stop.departure_cancelled);
    }
}
