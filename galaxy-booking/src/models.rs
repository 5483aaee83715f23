use galaxy_core::flight::FlightOffer;
use serde::{Deserialize, Serialize};

/// Where a traveller currently is in the booking journey.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStep {
    Searching,
    SelectingOutbound,
    SelectingReturn,
    Reviewing,
    EnteringPassengers,
    Paying,
    Confirmed,
}

/// The chosen legs. `return_leg` stays empty for one-way trips.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Selection {
    pub outbound: Option<FlightOffer>,
    #[serde(rename = "return")]
    pub return_leg: Option<FlightOffer>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.outbound.is_none() && self.return_leg.is_none()
    }
}

/// Catalog answers for both directions of a search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    pub outbound: Vec<FlightOffer>,
    #[serde(rename = "return")]
    pub inbound: Vec<FlightOffer>,
}
