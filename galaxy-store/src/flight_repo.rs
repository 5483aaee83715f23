use async_trait::async_trait;
use galaxy_catalog::listing::route_map;
use galaxy_catalog::pricing::is_selectable;
use galaxy_core::flight::{FlightOffer, FlightPatch};
use galaxy_core::repository::{FlightAdmin, FlightCatalog, StoreError, StoreResult};
use galaxy_core::search::LegQuery;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::store::{next_flight_id, GalaxyStore};

fn matches(flight: &FlightOffer, query: &LegQuery) -> bool {
    flight.from_code.eq_ignore_ascii_case(&query.origin)
        && flight.to_code.eq_ignore_ascii_case(&query.destination)
        && flight.date == query.date
        && is_selectable(flight, query.class, query.party_size)
}

#[async_trait]
impl FlightCatalog for GalaxyStore {
    async fn search_flights(&self, query: &LegQuery) -> StoreResult<Vec<FlightOffer>> {
        let flights: Vec<FlightOffer> = self
            .load_flights()
            .await?
            .into_iter()
            .filter(|flight| matches(flight, query))
            .collect();

        debug!(
            "{} -> {} on {} ({} x {}): {} matches",
            query.origin,
            query.destination,
            query.date,
            query.party_size,
            query.class,
            flights.len()
        );
        Ok(flights)
    }

    async fn list_flights(&self) -> StoreResult<Vec<FlightOffer>> {
        self.load_flights().await
    }

    async fn get_flight(&self, id: &str) -> StoreResult<Option<FlightOffer>> {
        Ok(self.load_flights().await?.into_iter().find(|f| f.id == id))
    }

    async fn routes(&self) -> StoreResult<BTreeMap<String, Vec<String>>> {
        Ok(route_map(&self.load_flights().await?))
    }
}

#[async_trait]
impl FlightAdmin for GalaxyStore {
    async fn create_flight(&self, mut flight: FlightOffer) -> StoreResult<FlightOffer> {
        let _guard = self.writes.lock().await;
        let mut flights = self.load_flights().await?;

        flight.id = next_flight_id(&flights);
        flights.push(flight.clone());
        self.save_flights(&flights).await?;

        info!("Created flight {} ({})", flight.id, flight.flight_number);
        Ok(flight)
    }

    async fn update_flight(&self, id: &str, patch: &FlightPatch) -> StoreResult<FlightOffer> {
        let _guard = self.writes.lock().await;
        let mut flights = self.load_flights().await?;

        let flight = flights
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Flight {}", id)))?;
        patch.apply_to(flight);
        let updated = flight.clone();

        self.save_flights(&flights).await?;
        info!("Updated flight {}", id);
        Ok(updated)
    }
}
