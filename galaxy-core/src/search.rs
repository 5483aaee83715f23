use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::flight::CabinClass;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

/// Most travellers of one kind a single booking may carry.
pub const MAX_PER_KIND: u32 = 9;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartyComposition {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
}

impl PartyComposition {
    pub fn new(adults: u32, children: u32) -> Self {
        Self { adults, children }
    }

    pub fn size(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }
}

/// What the traveller asked for on the search form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    #[serde(rename = "from")]
    pub origin: String,
    #[serde(rename = "to")]
    pub destination: String,
    pub depart_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<NaiveDate>,
    pub trip_type: TripType,
    pub passengers: PartyComposition,
    pub class_type: CabinClass,
}

impl SearchCriteria {
    pub fn party_size(&self) -> u32 {
        self.passengers.size()
    }

    pub fn is_round_trip(&self) -> bool {
        self.trip_type == TripType::RoundTrip
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.origin.trim().is_empty() {
            errors.add("from", "Origin is required");
        }
        if self.destination.trim().is_empty() {
            errors.add("to", "Destination is required");
        }
        if !self.origin.trim().is_empty() && self.origin.trim().eq_ignore_ascii_case(self.destination.trim()) {
            errors.add("to", "Destination must differ from origin");
        }
        if self.passengers.adults < 1 {
            errors.add("passengers.adults", "At least one adult is required");
        } else if self.passengers.adults > MAX_PER_KIND {
            errors.add("passengers.adults", "At most 9 adults per booking");
        }
        if self.passengers.children > MAX_PER_KIND {
            errors.add("passengers.children", "At most 9 children per booking");
        }

        match (self.trip_type, self.return_date) {
            (TripType::RoundTrip, None) => {
                errors.add("returnDate", "Please select return date for round trip");
            }
            (TripType::RoundTrip, Some(ret)) if ret < self.depart_date => {
                errors.add("returnDate", "Return date cannot be before departure date");
            }
            (TripType::OneWay, Some(_)) => {
                errors.add("returnDate", "One-way trips cannot have a return date");
            }
            _ => {}
        }

        errors.into_result()
    }

    pub fn outbound_query(&self) -> LegQuery {
        LegQuery {
            origin: self.origin.trim().to_string(),
            destination: self.destination.trim().to_string(),
            date: self.depart_date,
            party_size: self.party_size(),
            class: self.class_type,
        }
    }

    /// The reversed route on the return date, for round trips only.
    pub fn return_query(&self) -> Option<LegQuery> {
        match (self.trip_type, self.return_date) {
            (TripType::RoundTrip, Some(date)) => Some(LegQuery {
                origin: self.destination.trim().to_string(),
                destination: self.origin.trim().to_string(),
                date,
                party_size: self.party_size(),
                class: self.class_type,
            }),
            _ => None,
        }
    }
}

/// One catalog lookup: an exact route on an exact date with enough seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub party_size: u32,
    pub class: CabinClass,
}
