use async_trait::async_trait;
use galaxy_catalog::inventory::{consume_seats, release_seats};
use galaxy_core::analytics::Analytics;
use galaxy_core::booking::BookingRecord;
use galaxy_core::repository::{BookingStore, StoreError, StoreResult};
use tracing::{debug, info, warn};

use crate::analytics::compute_analytics;
use crate::store::{booking_key, encode, user_bookings_key, GalaxyStore, BOOKING_PREFIX};

#[async_trait]
impl BookingStore for GalaxyStore {
    async fn reserve_seats(&self, record: &BookingRecord) -> StoreResult<()> {
        let _guard = self.writes.lock().await;
        let mut flights = self.load_flights().await?;

        // Consume every leg before writing anything, so a shortfall on the
        // return leg leaves the outbound untouched.
        let class = record.class_type();
        let party = record.party_size();
        for leg in record.legs() {
            let flight = flights
                .iter_mut()
                .find(|f| f.id == leg.id)
                .ok_or_else(|| StoreError::Conflict(format!("Flight {} is no longer offered", leg.id)))?;
            consume_seats(flight, class, party).map_err(|e| {
                warn!("Booking {} rejected: {}", record.booking_id, e);
                StoreError::Conflict(e.to_string())
            })?;
        }

        self.save_flights(&flights).await?;
        debug!("Reserved {} x {} for booking {}", party, class, record.booking_id);
        Ok(())
    }

    async fn release_seats(&self, record: &BookingRecord) -> StoreResult<()> {
        let _guard = self.writes.lock().await;
        let mut flights = self.load_flights().await?;

        let class = record.class_type();
        let party = record.party_size();
        for leg in record.legs() {
            match flights.iter_mut().find(|f| f.id == leg.id) {
                Some(flight) => release_seats(flight, class, party),
                None => warn!("Flight {} vanished before seats of {} were released", leg.id, record.booking_id),
            }
        }

        self.save_flights(&flights).await?;
        info!("Released {} x {} held for booking {}", party, class, record.booking_id);
        Ok(())
    }

    async fn create_booking(&self, record: &BookingRecord) -> StoreResult<String> {
        let _guard = self.writes.lock().await;

        let index_key = user_bookings_key(&record.user_id);
        let mut ids: Vec<String> = self.read_json(&index_key).await?.unwrap_or_default();
        ids.push(record.booking_id.clone());

        self.write_all(vec![
            (booking_key(&record.booking_id), encode(record)?),
            (index_key, encode(&ids)?),
        ])
        .await?;

        info!(
            "Stored booking {} for user {} ({} x {})",
            record.booking_id,
            record.user_id,
            record.party_size(),
            record.class_type()
        );
        Ok(record.booking_id.clone())
    }

    async fn get_booking(&self, id: &str) -> StoreResult<Option<BookingRecord>> {
        self.read_json(&booking_key(id)).await
    }

    async fn list_bookings(&self, user_id: &str) -> StoreResult<Vec<BookingRecord>> {
        let ids: Vec<String> = self.read_json(&user_bookings_key(user_id)).await?.unwrap_or_default();
        let mut bookings = Vec::with_capacity(ids.len());
        for id in ids {
            // Index entries without a record are skipped.
            if let Some(booking) = self.get_booking(&id).await? {
                bookings.push(booking);
            }
        }
        Ok(bookings)
    }

    async fn aggregate_analytics(&self) -> StoreResult<Analytics> {
        let flights = self.load_flights().await?;
        let bookings: Vec<BookingRecord> = self.read_all(BOOKING_PREFIX).await?;
        Ok(compute_analytics(&flights, &bookings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{KvStore, MemoryKv};
    use crate::seed::seed_sample_flights;
    use chrono::Utc;
    use galaxy_core::booking::BookingStatus;
    use galaxy_core::flight::{CabinClass, FlightOffer};
    use galaxy_core::passenger::PassengerRecord;
    use galaxy_core::payment::PaymentMethod;
    use galaxy_core::repository::FlightCatalog;
    use galaxy_core::search::{PartyComposition, SearchCriteria, TripType};
    use std::sync::Arc;

    async fn seeded() -> GalaxyStore {
        let store = GalaxyStore::new(Arc::new(MemoryKv::new()));
        seed_sample_flights(&store).await.unwrap();
        store
    }

    fn record(id: &str, user: &str, outbound: FlightOffer, class: CabinClass, adults: u32) -> BookingRecord {
        BookingRecord {
            booking_id: id.to_string(),
            user_id: user.to_string(),
            search_data: SearchCriteria {
                origin: outbound.from_code.clone(),
                destination: outbound.to_code.clone(),
                depart_date: outbound.date,
                return_date: None,
                trip_type: TripType::OneWay,
                passengers: PartyComposition::new(adults, 0),
                class_type: class,
            },
            total_price: u64::from(outbound.fare(class).price) * u64::from(adults),
            selected_flight: outbound,
            return_flight: None,
            passengers: vec![PassengerRecord::default(); adults as usize],
            payment_method: PaymentMethod::Digital,
            payment_reference: None,
            status: BookingStatus::Confirmed,
            booking_date: Utc::now(),
        }
    }

    async fn book(store: &GalaxyStore, record: &BookingRecord) -> StoreResult<String> {
        store.reserve_seats(record).await?;
        store.create_booking(record).await
    }

    /// Memory backend whose multi-key writes always fail.
    #[derive(Default)]
    struct FailingBatchKv {
        inner: MemoryKv,
    }

    #[async_trait]
    impl KvStore for FailingBatchKv {
        async fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> StoreResult<()> {
            self.inner.set(key, value).await
        }

        async fn set_many(&self, _entries: Vec<(String, String)>) -> StoreResult<()> {
            Err(StoreError::backend("connection dropped"))
        }

        async fn get_by_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
            self.inner.get_by_prefix(prefix).await
        }
    }

    #[tokio::test]
    async fn test_create_stores_indexes_and_consumes() {
        let store = seeded().await;
        let ga001 = store.get_flight("GA001").await.unwrap().unwrap();

        let id = book(&store, &record("BK1", "user-1", ga001, CabinClass::Economy, 2))
            .await
            .unwrap();
        assert_eq!(id, "BK1");

        assert_eq!(store.get_booking("BK1").await.unwrap().unwrap().total_price, 598);
        assert_eq!(store.list_bookings("user-1").await.unwrap().len(), 1);
        assert!(store.list_bookings("someone-else").await.unwrap().is_empty());

        let after = store.get_flight("GA001").await.unwrap().unwrap();
        assert_eq!(after.economy.available, 118);
    }

    #[tokio::test]
    async fn test_insufficient_seats_reserves_nothing() {
        let store = seeded().await;
        let ga003 = store.get_flight("GA003").await.unwrap().unwrap();

        // GA003 has only 4 first class seats.
        let result = book(&store, &record("BK2", "user-1", ga003, CabinClass::First, 5)).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert!(store.get_booking("BK2").await.unwrap().is_none());
        assert!(store.list_bookings("user-1").await.unwrap().is_empty());
        assert_eq!(store.get_flight("GA003").await.unwrap().unwrap().first.available, 4);
    }

    #[tokio::test]
    async fn test_release_returns_reserved_seats() {
        let store = seeded().await;
        let ga001 = store.get_flight("GA001").await.unwrap().unwrap();
        let booking = record("BK3", "user-1", ga001, CabinClass::Economy, 2);

        store.reserve_seats(&booking).await.unwrap();
        assert_eq!(store.get_flight("GA001").await.unwrap().unwrap().economy.available, 118);

        store.release_seats(&booking).await.unwrap();
        assert_eq!(store.get_flight("GA001").await.unwrap().unwrap().economy.available, 120);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_partial_booking() {
        let store = GalaxyStore::new(Arc::new(FailingBatchKv::default()));
        seed_sample_flights(&store).await.unwrap();
        let ga001 = store.get_flight("GA001").await.unwrap().unwrap();
        let booking = record("BK4", "user-1", ga001, CabinClass::Economy, 2);

        store.reserve_seats(&booking).await.unwrap();
        let result = store.create_booking(&booking).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));

        assert!(store.get_booking("BK4").await.unwrap().is_none());
        assert!(store.list_bookings("user-1").await.unwrap().is_empty());

        store.release_seats(&booking).await.unwrap();
        assert_eq!(store.get_flight("GA001").await.unwrap().unwrap().economy.available, 120);
    }

    #[tokio::test]
    async fn test_analytics_over_stored_bookings() {
        let store = seeded().await;
        let ga001 = store.get_flight("GA001").await.unwrap().unwrap();
        let ga002 = store.get_flight("GA002").await.unwrap().unwrap();
        book(&store, &record("BK1", "user-1", ga001, CabinClass::Economy, 2))
            .await
            .unwrap();
        book(&store, &record("BK2", "user-2", ga002, CabinClass::Business, 1))
            .await
            .unwrap();

        let analytics = store.aggregate_analytics().await.unwrap();
        assert_eq!(analytics.total_bookings, 2);
        assert_eq!(analytics.total_revenue, 598 + 749);
        assert_eq!(analytics.class_revenue.business, 749);
        assert_eq!(analytics.flight_stats[0].seats_booked, 2);
    }
}
