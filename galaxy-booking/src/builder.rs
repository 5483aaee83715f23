use chrono::{DateTime, Utc};
use galaxy_catalog::pricing::total_price;
use galaxy_core::booking::{generate_booking_id, BookingRecord, BookingStatus};
use galaxy_core::passenger::PassengerRecord;
use galaxy_core::payment::PaymentMethod;
use galaxy_core::search::SearchCriteria;

use crate::models::Selection;

/// Inputs that come from outside the flow: who pays, and how.
///
/// The record is built before the charge, so it carries no payment reference
/// yet; checkout fills that in once the charge is captured.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub user_id: String,
    pub payment_method: PaymentMethod,
    pub booked_at: DateTime<Utc>,
}

impl BuildContext {
    pub fn new(user_id: impl Into<String>, payment_method: PaymentMethod) -> Self {
        Self {
            user_id: user_id.into(),
            payment_method,
            booked_at: Utc::now(),
        }
    }
}

/// Broken preconditions. These indicate a bug in the caller, not bad user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Booking has no outbound flight")]
    MissingOutbound,
    #[error("Round trip booking has no return flight")]
    MissingReturn,
    #[error("One-way booking carries a return flight")]
    UnexpectedReturn,
    #[error("Expected {expected} passengers, got {actual}")]
    PassengerCountMismatch { expected: u32, actual: usize },
}

/// Assemble the confirmed record. The total is recomputed from exactly the
/// offers in `selection`; nothing is re-fetched.
pub fn build_booking(
    criteria: &SearchCriteria,
    selection: &Selection,
    passengers: &[PassengerRecord],
    context: BuildContext,
) -> Result<BookingRecord, BuildError> {
    let outbound = selection.outbound.as_ref().ok_or(BuildError::MissingOutbound)?;

    let return_leg = match (criteria.is_round_trip(), selection.return_leg.as_ref()) {
        (true, None) => return Err(BuildError::MissingReturn),
        (false, Some(_)) => return Err(BuildError::UnexpectedReturn),
        (_, leg) => leg,
    };

    let party_size = criteria.party_size();
    if passengers.len() != party_size as usize {
        return Err(BuildError::PassengerCountMismatch {
            expected: party_size,
            actual: passengers.len(),
        });
    }

    let total = total_price(outbound, return_leg, criteria.class_type, party_size);

    Ok(BookingRecord {
        booking_id: generate_booking_id(context.booked_at),
        user_id: context.user_id,
        search_data: criteria.clone(),
        selected_flight: outbound.clone(),
        return_flight: return_leg.cloned(),
        passengers: passengers.to_vec(),
        total_price: total,
        payment_method: context.payment_method,
        payment_reference: None,
        status: BookingStatus::Confirmed,
        booking_date: context.booked_at,
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveTime};
    use galaxy_core::flight::{CabinClass, FareBucket, FlightOffer, StopCategory};
    use galaxy_core::passenger::PassengerRecord;
    use galaxy_core::search::{PartyComposition, SearchCriteria, TripType};

    pub fn offer(id: &str, from: &str, to: &str, economy: FareBucket) -> FlightOffer {
        FlightOffer {
            id: id.to_string(),
            flight_number: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            from_code: from.to_string(),
            to_code: to.to_string(),
            departure: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            arrival: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
            duration: "5h 30m".to_string(),
            aircraft: "Boeing 777".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            stops: StopCategory::NonStop,
            economy,
            business: FareBucket::new(899, 24),
            first: FareBucket::new(1599, 8),
        }
    }

    pub fn criteria(trip_type: TripType, adults: u32, children: u32) -> SearchCriteria {
        SearchCriteria {
            origin: "JFK".to_string(),
            destination: "LAX".to_string(),
            depart_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            return_date: match trip_type {
                TripType::RoundTrip => NaiveDate::from_ymd_opt(2024, 1, 20),
                TripType::OneWay => None,
            },
            trip_type,
            passengers: PartyComposition::new(adults, children),
            class_type: CabinClass::Economy,
        }
    }

    pub fn passenger(name: &str) -> PassengerRecord {
        PassengerRecord {
            name: name.to_string(),
            phone: "+1 555-123-4567".to_string(),
            email: "jane@example.com".to_string(),
            address: "123 Main St, Springfield, IL 62704".to_string(),
        }
    }
}
