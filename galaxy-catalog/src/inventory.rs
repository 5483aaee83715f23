use galaxy_core::flight::{CabinClass, FlightOffer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("Insufficient {class} seats on {flight_id}: requested {requested}, available {available}")]
    InsufficientSeats {
        flight_id: String,
        class: CabinClass,
        requested: u32,
        available: u32,
    },
}

/// Take `seats` out of the cabin's bucket. The bucket is left untouched on error.
pub fn consume_seats(
    offer: &mut FlightOffer,
    class: CabinClass,
    seats: u32,
) -> Result<(), InventoryError> {
    let flight_id = offer.id.clone();
    let bucket = offer.fare_mut(class);

    let remaining = bucket
        .available
        .checked_sub(seats)
        .ok_or(InventoryError::InsufficientSeats {
            flight_id,
            class,
            requested: seats,
            available: bucket.available,
        })?;

    bucket.available = remaining;
    tracing::debug!("Consumed {} {} seats on {}, {} left", seats, class, offer.id, remaining);
    Ok(())
}

/// Put `seats` back into the cabin's bucket after a reservation is abandoned.
pub fn release_seats(offer: &mut FlightOffer, class: CabinClass, seats: u32) {
    let bucket = offer.fare_mut(class);
    bucket.available = bucket.available.saturating_add(seats);
    let available = bucket.available;
    tracing::debug!("Released {} {} seats on {}, {} left", seats, class, offer.id, available);
}

/// Sold share of a flight in percent, one decimal.
pub fn occupancy_rate(seats_booked: u32, seats_remaining: u32) -> f64 {
    let capacity = seats_booked + seats_remaining;
    if capacity == 0 {
        return 0.0;
    }
    let rate = f64::from(seats_booked) / f64::from(capacity) * 100.0;
    (rate * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::fixtures;
    use galaxy_core::flight::FareBucket;

    #[test]
    fn test_release_restores_consumed_seats() {
        let mut offer = fixtures::offer("GA001", FareBucket::new(299, 120));
        consume_seats(&mut offer, CabinClass::Economy, 2).unwrap();
        release_seats(&mut offer, CabinClass::Economy, 2);
        assert_eq!(offer.economy.available, 120);
    }

    #[test]
    fn test_consume_decrements_bucket() {
        let mut offer = fixtures::offer("GA001", FareBucket::new(299, 120));
        consume_seats(&mut offer, CabinClass::Economy, 2).unwrap();
        assert_eq!(offer.economy.available, 118);
        assert_eq!(offer.business.available, 24);
    }

    #[test]
    fn test_consume_never_goes_negative() {
        let mut offer = fixtures::offer("GA001", FareBucket::new(299, 1));
        let err = consume_seats(&mut offer, CabinClass::Economy, 2).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientSeats {
                flight_id: "GA001".to_string(),
                class: CabinClass::Economy,
                requested: 2,
                available: 1,
            }
        );
        assert_eq!(offer.economy.available, 1);
    }

    #[test]
    fn test_occupancy_rate() {
        assert_eq!(occupancy_rate(0, 0), 0.0);
        assert_eq!(occupancy_rate(50, 150), 25.0);
        assert_eq!(occupancy_rate(1, 2), 33.3);
    }
}
