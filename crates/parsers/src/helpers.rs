//! Shared readers for the InfoPlus XML conventions: `J`/`N` booleans,
//! station blocks, attribute-discriminated repeated elements, RFC 3339
//! instants and ISO 8601 durations.

use chrono::{DateTime, Utc};
use roxmltree::Node;

use model::{Material, Modification, ModificationKind, Station};

use crate::ParseError;

/// Finds the first child element with the given tag name, ignoring its
/// namespace.
pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|candidate| candidate.is_element() && candidate.tag_name().name() == name)
}

pub fn required_child<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> Result<Node<'a, 'input>, ParseError> {
    child(node, name).ok_or(ParseError::MissingElement(name))
}

/// All child elements with the given tag name.
pub fn children<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |candidate| candidate.is_element() && candidate.tag_name().name() == name)
}

pub fn text(node: Node) -> Result<String, ParseError> {
    node.text()
        .map(|text| text.trim().to_owned())
        .ok_or_else(|| ParseError::MissingText {
            element: node.tag_name().name().to_owned(),
        })
}

pub fn required_text(node: Node, name: &'static str) -> Result<String, ParseError> {
    text(required_child(node, name)?)
}

/// Text of an optional child; absent elements read as the empty string.
pub fn optional_text(node: Node, name: &str) -> String {
    child(node, name)
        .and_then(|element| element.text())
        .map(|text| text.trim().to_owned())
        .unwrap_or_default()
}

/// The attribute value of the given tag, with an empty default.
pub fn attribute<'a>(node: Node<'a, '_>, name: &str) -> &'a str {
    node.attribute(name).unwrap_or("")
}

/// An InfoPlus boolean is the literal `J`; anything else (including an
/// absent element) is false.
pub fn infoplus_boolean(element: Option<Node>) -> bool {
    element
        .and_then(|node| node.text())
        .map(|text| text.trim() == "J")
        .unwrap_or(false)
}

/// Selects the child with `tag` whose attribute carries the wanted value,
/// e.g. `VertrekTijd[@InfoStatus="Gepland"]`.
pub fn when_attribute<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    attribute_name: &str,
    value: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|candidate| {
        candidate.is_element()
            && candidate.tag_name().name() == tag
            && candidate.attribute(attribute_name) == Some(value)
    })
}

/// All children with `tag` whose attribute carries the wanted value.
pub fn when_attribute_multi<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    attribute_name: &str,
    value: &str,
) -> Vec<Node<'a, 'input>> {
    node.children()
        .filter(|candidate| {
            candidate.is_element()
                && candidate.tag_name().name() == tag
                && candidate.attribute(attribute_name) == Some(value)
        })
        .collect()
}

/// Reads an RFC 3339 instant; absent or unparseable elements read as `None`.
pub fn infoplus_datetime(element: Option<Node>) -> Option<DateTime<Utc>> {
    let text = element.and_then(|node| node.text())?;

    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|datetime| datetime.with_timezone(&Utc))
}

/// Reads an RFC 3339 instant from a raw attribute or text value.
pub fn iso_datetime(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|datetime| datetime.with_timezone(&Utc))
}

/// Renders a platform from its track elements: track numbers joined with a
/// slash, each with its optional phase letter appended (`11a/11b`).
pub fn infoplus_platform(elements: &[Node]) -> String {
    let mut platform = String::new();

    for (index, element) in elements.iter().enumerate() {
        if index > 0 {
            platform.push('/');
        }
        platform.push_str(&optional_text(*element, "SpoorNummer"));
        if let Some(phase) = child(*element, "SpoorFase") {
            if let Some(text) = phase.text() {
                platform.push_str(text.trim());
            }
        }
    }

    platform
}

/// Reads an ISO 8601 duration as whole seconds; absent or unparseable
/// elements read as zero. Only the time designators are used by the feed
/// (delays like `PT2M30S`), but day fields parse too.
pub fn infoplus_duration(element: Option<Node>) -> i32 {
    element
        .and_then(|node| node.text())
        .and_then(|text| parse_iso_duration(text.trim()))
        .unwrap_or(0)
}

pub fn parse_iso_duration(value: &str) -> Option<i32> {
    let mut chars = value.chars().peekable();

    if chars.next()? != 'P' {
        return None;
    }

    let mut seconds: i64 = 0;
    let mut in_time = false;
    let mut number = String::new();

    for c in chars {
        match c {
            'T' => in_time = true,
            '0'..='9' | '.' => number.push(c),
            designator => {
                let amount: f64 = number.parse().ok()?;
                number.clear();
                let unit = match (designator, in_time) {
                    ('D', false) => 86_400,
                    ('H', true) => 3_600,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    // Years, months and weeks do not occur in delays.
                    _ => return None,
                };
                seconds += (amount * unit as f64) as i64;
            }
        }
    }

    if !number.is_empty() {
        return None;
    }

    Some(seconds as i32)
}

/// Reads an InfoPlus station block (code plus short/medium/long names).
pub fn infoplus_station(node: Node) -> Result<Station, ParseError> {
    Ok(Station {
        code: required_text(node, "StationCode")?,
        name_short: required_text(node, "KorteNaam")?,
        name_medium: required_text(node, "MiddelNaam")?,
        name_long: required_text(node, "LangeNaam")?,
    })
}

/// Reads all `Wijziging` children of the given element. Unknown modification
/// codes and unknown causes degrade to raw values, never to a parse failure.
pub fn infoplus_modifications(node: Node) -> Vec<Modification> {
    let mut modifications = Vec::new();

    for element in children(node, "Wijziging") {
        let kind = optional_text(element, "WijzigingType")
            .parse::<i32>()
            .map(ModificationKind::from_code)
            .unwrap_or(ModificationKind::Unknown(0));

        let station = child(element, "WijzigingStation")
            .and_then(|station| infoplus_station(station).ok());

        modifications.push(Modification {
            kind,
            cause_short: optional_text(element, "WijzigingOorzaakKort"),
            cause_long: optional_text(element, "WijzigingOorzaakLang"),
            station,
        });
    }

    modifications
}

/// Reads a material unit (`MaterieelDeel` block, DVS and RIT share the
/// layout).
pub fn infoplus_material(node: Node, position: usize) -> Material {
    let mut kind = optional_text(node, "MaterieelDeelSoort");
    let designation = optional_text(node, "MaterieelDeelAanduiding");
    if !designation.is_empty() {
        kind.push('-');
        kind.push_str(&designation);
    }

    Material {
        kind,
        number: optional_text(node, "MaterieelNummer"),
        position: position as i32 + 1,
        destination_actual: when_attribute(node, "MaterieelDeelEindBestemming", "InfoStatus", "Actueel")
            .and_then(|destination| infoplus_station(destination).ok())
            .unwrap_or_default(),
        destination_planned: when_attribute(node, "MaterieelDeelEindBestemming", "InfoStatus", "Gepland")
            .and_then(|destination| infoplus_station(destination).ok())
            .unwrap_or_default(),
        accessible: infoplus_boolean(child(node, "MaterieelDeelToegankelijk")),
        closed: infoplus_boolean(child(node, "MaterieelDeelGesloten")),
        remains_behind: infoplus_boolean(child(node, "AchterBlijvenMaterieelDeel")),
        added: infoplus_boolean(child(node, "MaterieelDeelToegevoegd")),
        already_removed: infoplus_boolean(child(node, "MaterieelDeelAlVerwijderd")),
    }
}
