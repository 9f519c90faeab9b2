pub mod arrival;
pub mod departure;
pub mod material;
pub mod modification;
pub mod service;
pub mod station;
pub mod translations;

pub use arrival::Arrival;
pub use departure::{BoardingTip, ChangeTip, Departure, DepartureStatus, TrainWing, TravelTip};
pub use material::Material;
pub use modification::{Modification, ModificationKind};
pub use service::{Service, ServicePart, ServiceStop};
pub use station::Station;
