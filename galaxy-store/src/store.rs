use std::sync::Arc;

use galaxy_core::flight::FlightOffer;
use galaxy_core::repository::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::kv::KvStore;

pub(crate) const FLIGHTS_KEY: &str = "flights_data";
pub(crate) const BOOKING_PREFIX: &str = "booking:";

pub(crate) fn booking_key(booking_id: &str) -> String {
    format!("{}{}", BOOKING_PREFIX, booking_id)
}

pub(crate) fn user_bookings_key(user_id: &str) -> String {
    format!("user_bookings:{}", user_id)
}

/// Flights, bookings and per-user booking indexes on top of a [`KvStore`].
///
/// The flight list lives under a single key, so every read-modify-write of it
/// goes through `writes` to keep concurrent bookings from losing seat updates.
pub struct GalaxyStore {
    kv: Arc<dyn KvStore>,
    pub(crate) writes: Mutex<()>,
}

impl GalaxyStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv, writes: Mutex::new(()) }
    }

    pub(crate) async fn read_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.kv.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::Backend(format!("Corrupt value under {}: {}", key, e))),
            None => Ok(None),
        }
    }

    pub(crate) async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        self.kv.set(key, encode(value)?).await
    }

    /// Already encoded documents, written in one all-or-nothing call.
    pub(crate) async fn write_all(&self, entries: Vec<(String, String)>) -> StoreResult<()> {
        self.kv.set_many(entries).await
    }

    pub(crate) async fn read_all<T: DeserializeOwned>(&self, prefix: &str) -> StoreResult<Vec<T>> {
        self.kv
            .get_by_prefix(prefix)
            .await?
            .iter()
            .map(|raw| serde_json::from_str(raw).map_err(StoreError::backend))
            .collect()
    }

    pub(crate) async fn load_flights(&self) -> StoreResult<Vec<FlightOffer>> {
        Ok(self.read_json(FLIGHTS_KEY).await?.unwrap_or_default())
    }

    pub(crate) async fn save_flights(&self, flights: &[FlightOffer]) -> StoreResult<()> {
        self.write_json(FLIGHTS_KEY, flights).await
    }
}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(StoreError::backend)
}

/// `GA` followed by the next free sequence number, zero padded to three digits.
pub(crate) fn next_flight_id(flights: &[FlightOffer]) -> String {
    let highest = flights
        .iter()
        .filter_map(|f| f.id.strip_prefix("GA").and_then(|n| n.parse::<u32>().ok()))
        .max()
        .unwrap_or(0);
    format!("GA{:03}", highest + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::sample_flights;

    #[test]
    fn test_next_flight_id() {
        assert_eq!(next_flight_id(&[]), "GA001");
        assert_eq!(next_flight_id(&sample_flights()), "GA007");

        let mut flights = sample_flights();
        flights.remove(2);
        assert_eq!(next_flight_id(&flights), "GA007");
    }

    #[test]
    fn test_keys() {
        assert_eq!(booking_key("BK1"), "booking:BK1");
        assert_eq!(user_bookings_key("u-1"), "user_bookings:u-1");
    }
}
