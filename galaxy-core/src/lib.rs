pub mod analytics;
pub mod booking;
pub mod flight;
pub mod identity;
pub mod passenger;
pub mod payment;
pub mod repository;
pub mod search;
pub mod validation;

pub use booking::{BookingRecord, BookingStatus};
pub use flight::{CabinClass, FareBucket, FlightOffer, FlightPatch, StopCategory};
pub use passenger::{PassengerField, PassengerKind, PassengerRecord};
pub use search::{LegQuery, PartyComposition, SearchCriteria, TripType};
pub use validation::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("Identity verification failed: {0}")]
    Identity(String),
}
