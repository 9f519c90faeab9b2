use serde::{Deserialize, Serialize};

/// A station in the railway network: a code plus three display names
/// (short, medium, long).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub code: String,
    #[serde(rename = "short")]
    pub name_short: String,
    #[serde(rename = "medium")]
    pub name_medium: String,
    #[serde(rename = "long")]
    pub name_long: String,
}

impl Station {
    pub fn new(code: &str, short: &str, medium: &str, long: &str) -> Self {
        Self {
            code: code.to_owned(),
            name_short: short.to_owned(),
            name_medium: medium.to_owned(),
            name_long: long.to_owned(),
        }
    }
}

/// Joins the short names of all stations with the given separator.
pub fn stations_short_string(stations: &[Station], separator: &str) -> String {
    join_names(stations, separator, |station| &station.name_short)
}

/// Joins the medium names of all stations with the given separator.
pub fn stations_medium_string(stations: &[Station], separator: &str) -> String {
    join_names(stations, separator, |station| &station.name_medium)
}

/// Joins the long names of all stations with the given separator.
pub fn stations_long_string(stations: &[Station], separator: &str) -> String {
    join_names(stations, separator, |station| &station.name_long)
}

/// Returns the codes of all stations, in order.
pub fn station_codes(stations: &[Station]) -> Vec<String> {
    stations.iter().map(|station| station.code.clone()).collect()
}

fn join_names<'a, F>(stations: &'a [Station], separator: &str, name: F) -> String
where
    F: Fn(&'a Station) -> &'a str,
{
    stations
        .iter()
        .map(name)
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rtd() -> Station {
        Station::new("RTD", "R'dam C.", "Rotterdam C.", "Rotterdam Centraal")
    }

    fn asd() -> Station {
        Station::new("ASD", "A'dam C.", "Amsterdam C.", "Amsterdam Centraal")
    }

    fn ut() -> Station {
        Station::new("UT", "Utrecht C.", "Utrecht C.", "Utrecht Centraal")
    }

    #[test]
    fn stations_string() {
        let tables: &[(Vec<Station>, &str, &str, &str, &str)] = &[
            (vec![], "/", "", "", ""),
            (
                vec![rtd()],
                "/",
                "R'dam C.",
                "Rotterdam C.",
                "Rotterdam Centraal",
            ),
            (
                vec![rtd(), ut()],
                "/",
                "R'dam C./Utrecht C.",
                "Rotterdam C./Utrecht C.",
                "Rotterdam Centraal/Utrecht Centraal",
            ),
            (
                vec![rtd(), asd(), ut()],
                ", ",
                "R'dam C., A'dam C., Utrecht C.",
                "Rotterdam C., Amsterdam C., Utrecht C.",
                "Rotterdam Centraal, Amsterdam Centraal, Utrecht Centraal",
            ),
        ];

        for (stations, separator, short, medium, long) in tables {
            assert_eq!(stations_short_string(stations, separator), *short);
            assert_eq!(stations_medium_string(stations, separator), *medium);
            assert_eq!(stations_long_string(stations, separator), *long);

            let codes = station_codes(stations);
            assert_eq!(codes.len(), stations.len());
            for (index, station) in stations.iter().enumerate() {
                assert_eq!(codes[index], station.code);
            }
        }
    }
}
