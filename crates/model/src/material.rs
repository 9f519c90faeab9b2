use serde::{Deserialize, Serialize};

use crate::station::Station;

/// A physical train unit within a departure or service stop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(rename = "type")]
    pub kind: String,
    pub number: String,
    pub position: i32,
    pub destination_actual: Station,
    pub destination_planned: Station,
    pub accessible: bool,
    pub closed: bool,
    pub remains_behind: bool,
    pub added: bool,
    pub already_removed: bool,
}

impl Material {
    /// Normalizes the unit number as printed on the train itself: strips the
    /// `0`/`-` padding from both ends, drops the remaining dashes and inserts
    /// a dot into six-digit numbers (`000001-86012-0` becomes `186.012`).
    pub fn normalized_number(&self) -> Option<String> {
        if self.number.is_empty() {
            return None;
        }

        let trimmed = self
            .number
            .trim_start_matches(['0', '-'])
            .trim_end_matches(['0', '-']);
        let number: String = trimmed.chars().filter(|c| *c != '-').collect();

        if number.len() == 6 && number.chars().all(|c| c.is_ascii_digit()) {
            Some(format!("{}.{}", &number[..3], &number[3..]))
        } else {
            Some(number)
        }
    }
}
