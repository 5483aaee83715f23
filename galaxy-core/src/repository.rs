use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::analytics::Analytics;
use crate::booking::BookingRecord;
use crate::flight::{FlightOffer, FlightPatch};
use crate::search::LegQuery;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        StoreError::Backend(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository trait for the flight catalog
#[async_trait]
pub trait FlightCatalog: Send + Sync {
    /// Exact route/date match with enough seats in the requested class.
    /// Returns an empty list, not an error, when nothing matches.
    async fn search_flights(&self, query: &LegQuery) -> StoreResult<Vec<FlightOffer>>;

    async fn list_flights(&self) -> StoreResult<Vec<FlightOffer>>;

    async fn get_flight(&self, id: &str) -> StoreResult<Option<FlightOffer>>;

    /// Origin code -> distinct destination codes served from it.
    async fn routes(&self) -> StoreResult<BTreeMap<String, Vec<String>>>;
}

/// Repository trait for admin mutations of the catalog
#[async_trait]
pub trait FlightAdmin: Send + Sync {
    /// Stores a new flight, assigning its id.
    async fn create_flight(&self, flight: FlightOffer) -> StoreResult<FlightOffer>;

    async fn update_flight(&self, id: &str, patch: &FlightPatch) -> StoreResult<FlightOffer>;
}

/// Repository trait for bookings
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Takes the record's seats from every leg, or from none of them.
    /// A shortfall is a `Conflict`.
    async fn reserve_seats(&self, record: &BookingRecord) -> StoreResult<()>;

    /// Gives back seats taken by `reserve_seats` for a booking that will not
    /// be stored.
    async fn release_seats(&self, record: &BookingRecord) -> StoreResult<()>;

    /// Stores a record whose seats are already reserved, together with the
    /// owner's booking index. Either both are written or neither is.
    async fn create_booking(&self, record: &BookingRecord) -> StoreResult<String>;

    async fn get_booking(&self, id: &str) -> StoreResult<Option<BookingRecord>>;

    async fn list_bookings(&self, user_id: &str) -> StoreResult<Vec<BookingRecord>>;

    async fn aggregate_analytics(&self) -> StoreResult<Analytics>;
}
