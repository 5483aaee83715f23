use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::flight::{CabinClass, FlightOffer};
use crate::passenger::PassengerRecord;
use crate::payment::PaymentMethod;
use crate::search::SearchCriteria;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

/// A paid booking. Built once after payment succeeds and never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub booking_id: String,
    pub user_id: String,
    pub search_data: SearchCriteria,
    pub selected_flight: FlightOffer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_flight: Option<FlightOffer>,
    pub passengers: Vec<PassengerRecord>,
    pub total_price: u64,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    pub status: BookingStatus,
    pub booking_date: DateTime<Utc>,
}

impl BookingRecord {
    pub fn class_type(&self) -> CabinClass {
        self.search_data.class_type
    }

    pub fn party_size(&self) -> u32 {
        self.passengers.len() as u32
    }

    /// Outbound leg first, then the return leg if there is one.
    pub fn legs(&self) -> impl Iterator<Item = &FlightOffer> {
        std::iter::once(&self.selected_flight).chain(self.return_flight.iter())
    }
}

/// `BK{unix-millis}{5 uppercase alphanumerics}`.
pub fn generate_booking_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("BK{}{}", now.timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_id_shape() {
        let now = Utc::now();
        let id = generate_booking_id(now);
        let millis = now.timestamp_millis().to_string();
        assert!(id.starts_with(&format!("BK{}", millis)));
        let suffix = &id[2 + millis.len()..];
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_booking_ids_differ() {
        let now = Utc::now();
        assert_ne!(generate_booking_id(now), generate_booking_id(now));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(BookingStatus::Confirmed).unwrap(), "confirmed");
        let parsed: BookingStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, BookingStatus::Completed);
    }
}
