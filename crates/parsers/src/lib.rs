//! Pure converters from decompressed InfoPlus XML messages to typed records.
//!
//! Three dialects are supported: DAS (arrivals), DVS (departures, in the
//! legacy and the `dvs:3` namespace) and RIT (services). Parsers hold no
//! state and do no I/O; a malformed message yields a [`ParseError`].

mod das;
mod dvs;
mod dvs3;
mod helpers;
mod rit;

pub use das::parse_das_message;
pub use dvs::{parse_dvs_message, DVS2_NAMESPACE, DVS3_NAMESPACE};
pub use rit::parse_rit_message;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid XML document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("missing element {0}")]
    MissingElement(&'static str),

    #[error("element {element} holds no text")]
    MissingText { element: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("unrecognized message namespace {0}")]
    UnknownNamespace(String),
}
