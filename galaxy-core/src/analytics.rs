use serde::{Deserialize, Serialize};

use crate::flight::CabinClass;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassRevenue {
    pub economy: u64,
    pub business: u64,
    pub first: u64,
}

impl ClassRevenue {
    pub fn add(&mut self, class: CabinClass, amount: u64) {
        match class {
            CabinClass::Economy => self.economy += amount,
            CabinClass::Business => self.business += amount,
            CabinClass::First => self.first += amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightStats {
    pub flight_id: String,
    pub flight_number: String,
    pub bookings: u32,
    pub seats_booked: u32,
    pub revenue: u64,
    /// Percent of the flight's seats sold, `0.0` when the flight has no seats at all.
    pub occupancy_rate: f64,
}

/// Admin dashboard figures, derived from stored bookings only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_revenue: u64,
    pub total_bookings: u32,
    pub class_revenue: ClassRevenue,
    pub flight_stats: Vec<FlightStats>,
    pub average_booking_value: f64,
}
