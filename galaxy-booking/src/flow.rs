//! The booking journey as an explicit state machine.
//!
//! `BookingFlow` is a plain value. Every transition borrows the current flow
//! and returns a new one, so a rejected transition leaves the caller holding
//! the flow exactly as it was.
//!
//! ```text
//! Searching -> SelectingOutbound -> (SelectingReturn) -> Reviewing
//!           -> EnteringPassengers -> Paying -> Confirmed
//! ```

use galaxy_catalog::listing::{present, OfferListing, SortKey, StopFilter};
use galaxy_catalog::pricing::{is_selectable, total_price, Quote};
use galaxy_core::booking::BookingRecord;
use galaxy_core::flight::{CabinClass, FlightOffer};
use galaxy_core::passenger::{validate_passengers, PassengerField, PassengerRecord};
use galaxy_core::search::SearchCriteria;
use galaxy_core::validation::ValidationErrors;
use tracing::{info, warn};

use crate::builder::{build_booking, BuildContext, BuildError};
use crate::models::{FlowStep, SearchResults, Selection};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("Cannot {action} while in step {step:?}")]
    InvalidTransition { step: FlowStep, action: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Flight {flight_id} has {available} {class} seats left, party needs {requested}")]
    Unavailable {
        flight_id: String,
        class: CabinClass,
        requested: u32,
        available: u32,
    },

    #[error("Flight {0} is not among the current search results")]
    UnknownOffer(String),

    #[error("No passenger at position {index}, party has {party_size}")]
    PassengerOutOfRange { index: usize, party_size: u32 },

    #[error("Booking invariant violated: {0}")]
    Invariant(#[from] BuildError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingFlow {
    step: FlowStep,
    criteria: Option<SearchCriteria>,
    results: SearchResults,
    selection: Selection,
    passengers: Vec<PassengerRecord>,
    frozen_total: Option<u64>,
    payment_error: Option<String>,
    booking: Option<BookingRecord>,
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingFlow {
    pub fn new() -> Self {
        Self {
            step: FlowStep::Searching,
            criteria: None,
            results: SearchResults::default(),
            selection: Selection::default(),
            passengers: Vec::new(),
            frozen_total: None,
            payment_error: None,
            booking: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn criteria(&self) -> Option<&SearchCriteria> {
        self.criteria.as_ref()
    }

    pub fn results(&self) -> &SearchResults {
        &self.results
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn passengers(&self) -> &[PassengerRecord] {
        &self.passengers
    }

    /// Total fixed when payment started. `None` outside `Paying`.
    pub fn frozen_total(&self) -> Option<u64> {
        self.frozen_total
    }

    pub fn payment_error(&self) -> Option<&str> {
        self.payment_error.as_deref()
    }

    pub fn booking(&self) -> Option<&BookingRecord> {
        self.booking.as_ref()
    }

    /// Live total for the current selection, recomputed on every call.
    pub fn current_total(&self) -> Option<u64> {
        let criteria = self.criteria.as_ref()?;
        let outbound = self.selection.outbound.as_ref()?;
        Some(total_price(
            outbound,
            self.selection.return_leg.as_ref(),
            criteria.class_type,
            criteria.party_size(),
        ))
    }

    pub fn quote(&self) -> Option<Quote> {
        let criteria = self.criteria.as_ref()?;
        let outbound = self.selection.outbound.as_ref()?;
        Some(Quote::new(
            outbound,
            self.selection.return_leg.as_ref(),
            criteria.class_type,
            criteria.party_size(),
        ))
    }

    /// Candidates for the leg currently being chosen; empty in other steps.
    pub fn listings(&self, filter: StopFilter, sort: SortKey) -> Vec<OfferListing> {
        let Some(criteria) = self.criteria.as_ref() else {
            return Vec::new();
        };
        let candidates = match self.step {
            FlowStep::SelectingOutbound => &self.results.outbound,
            FlowStep::SelectingReturn => &self.results.inbound,
            _ => return Vec::new(),
        };
        present(candidates, criteria.class_type, criteria.party_size(), filter, sort)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Searching -> SelectingOutbound, once the catalog has answered.
    pub fn submit_search(
        &self,
        criteria: SearchCriteria,
        results: SearchResults,
    ) -> Result<Self, FlowError> {
        self.expect(FlowStep::Searching, "submit a search")?;
        criteria.validate()?;

        let results = if criteria.is_round_trip() {
            results
        } else {
            SearchResults { outbound: results.outbound, inbound: Vec::new() }
        };

        info!(
            "Search {} -> {} on {}: {} outbound, {} return candidates",
            criteria.origin,
            criteria.destination,
            criteria.depart_date,
            results.outbound.len(),
            results.inbound.len()
        );

        Ok(Self {
            step: FlowStep::SelectingOutbound,
            criteria: Some(criteria),
            results,
            ..Self::new()
        })
    }

    /// One-way trips go straight to review; round trips pick a return leg next.
    pub fn select_outbound(&self, flight_id: &str) -> Result<Self, FlowError> {
        self.expect(FlowStep::SelectingOutbound, "select an outbound flight")?;
        let criteria = self.require_criteria()?;
        let offer = self.pick(&self.results.outbound, flight_id, criteria)?;

        let step = if criteria.is_round_trip() {
            FlowStep::SelectingReturn
        } else {
            FlowStep::Reviewing
        };
        info!("Outbound {} selected, moving to {:?}", offer.id, step);

        Ok(Self {
            step,
            selection: Selection { outbound: Some(offer), return_leg: None },
            ..self.clone()
        })
    }

    pub fn select_return(&self, flight_id: &str) -> Result<Self, FlowError> {
        self.expect(FlowStep::SelectingReturn, "select a return flight")?;
        let criteria = self.require_criteria()?;
        let offer = self.pick(&self.results.inbound, flight_id, criteria)?;
        info!("Return {} selected, moving to review", offer.id);

        Ok(Self {
            step: FlowStep::Reviewing,
            selection: Selection {
                outbound: self.selection.outbound.clone(),
                return_leg: Some(offer),
            },
            ..self.clone()
        })
    }

    /// Back to outbound selection. Both legs are dropped: a return leg is
    /// meaningless without its outbound.
    pub fn clear_outbound(&self) -> Result<Self, FlowError> {
        match self.step {
            FlowStep::SelectingOutbound | FlowStep::SelectingReturn | FlowStep::Reviewing => {
                Ok(Self {
                    step: FlowStep::SelectingOutbound,
                    selection: Selection::default(),
                    ..self.clone()
                })
            }
            step => Err(FlowError::InvalidTransition { step, action: "clear the outbound flight" }),
        }
    }

    /// Reviewing -> EnteringPassengers with one blank record per traveller.
    pub fn proceed_to_passengers(&self) -> Result<Self, FlowError> {
        self.expect(FlowStep::Reviewing, "enter passenger details")?;
        let criteria = self.require_criteria()?;

        if self.selection.outbound.is_none() {
            return Err(BuildError::MissingOutbound.into());
        }
        if criteria.is_round_trip() && self.selection.return_leg.is_none() {
            return Err(BuildError::MissingReturn.into());
        }

        Ok(Self {
            step: FlowStep::EnteringPassengers,
            passengers: vec![PassengerRecord::blank(); criteria.party_size() as usize],
            ..self.clone()
        })
    }

    pub fn update_passenger(
        &self,
        index: usize,
        field: PassengerField,
        value: impl Into<String>,
    ) -> Result<Self, FlowError> {
        self.expect(FlowStep::EnteringPassengers, "edit passenger details")?;
        if index >= self.passengers.len() {
            return Err(FlowError::PassengerOutOfRange {
                index,
                party_size: self.passengers.len() as u32,
            });
        }

        let mut next = self.clone();
        next.passengers[index].set(field, value);
        Ok(next)
    }

    /// Replace the whole list at once, e.g. from a submitted form.
    pub fn replace_passengers(&self, passengers: Vec<PassengerRecord>) -> Result<Self, FlowError> {
        self.expect(FlowStep::EnteringPassengers, "edit passenger details")?;
        if passengers.len() != self.passengers.len() {
            return Err(ValidationErrors::single(
                "passengers",
                format!("Expected details for {} passengers", self.passengers.len()),
            )
            .into());
        }
        Ok(Self { passengers, ..self.clone() })
    }

    /// EnteringPassengers -> Paying. Freezes the total shown on the payment screen.
    pub fn submit_passengers(&self) -> Result<Self, FlowError> {
        self.expect(FlowStep::EnteringPassengers, "continue to payment")?;
        validate_passengers(&self.passengers)?;

        let total = self.current_total().ok_or(BuildError::MissingOutbound)?;
        info!("Passenger details complete, total frozen at {}", total);

        Ok(Self {
            step: FlowStep::Paying,
            frozen_total: Some(total),
            payment_error: None,
            ..self.clone()
        })
    }

    /// A failed charge keeps the flow in `Paying` and remembers why.
    pub fn record_payment_failure(&self, reason: impl Into<String>) -> Result<Self, FlowError> {
        self.expect(FlowStep::Paying, "record a payment failure")?;
        let reason = reason.into();
        warn!("Payment failed: {}", reason);
        Ok(Self { payment_error: Some(reason), ..self.clone() })
    }

    /// Assemble the booking after a successful charge. Only valid in `Paying`.
    pub fn build_booking(&self, context: BuildContext) -> Result<BookingRecord, FlowError> {
        self.expect(FlowStep::Paying, "build a booking")?;
        let criteria = self.require_criteria()?;
        let record = build_booking(criteria, &self.selection, &self.passengers, context).map_err(|e| {
            tracing::error!("Refusing to build booking: {}", e);
            FlowError::Invariant(e)
        })?;

        if Some(record.total_price) != self.frozen_total {
            tracing::error!(
                "Booking total {} differs from frozen total {:?}",
                record.total_price,
                self.frozen_total
            );
        }
        Ok(record)
    }

    /// Paying -> Confirmed once the booking is persisted.
    pub fn confirm(&self, booking: BookingRecord) -> Result<Self, FlowError> {
        self.expect(FlowStep::Paying, "confirm a booking")?;
        info!("Booking {} confirmed", booking.booking_id);

        Ok(Self {
            step: FlowStep::Confirmed,
            passengers: Vec::new(),
            payment_error: None,
            booking: Some(booking),
            ..self.clone()
        })
    }

    /// Explicit "new search": drops every piece of transient state.
    pub fn restart(&self) -> Self {
        Self::new()
    }

    /// Logout from any step. Nothing in progress is persisted.
    pub fn logout(&self) -> Self {
        if !matches!(self.step, FlowStep::Searching | FlowStep::Confirmed) {
            info!("Discarding in-progress booking at step {:?}", self.step);
        }
        Self::new()
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn expect(&self, step: FlowStep, action: &'static str) -> Result<(), FlowError> {
        if self.step == step {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition { step: self.step, action })
        }
    }

    fn require_criteria(&self) -> Result<&SearchCriteria, FlowError> {
        self.criteria.as_ref().ok_or(FlowError::InvalidTransition {
            step: self.step,
            action: "continue without search criteria",
        })
    }

    fn pick(
        &self,
        candidates: &[FlightOffer],
        flight_id: &str,
        criteria: &SearchCriteria,
    ) -> Result<FlightOffer, FlowError> {
        let offer = candidates
            .iter()
            .find(|offer| offer.id == flight_id)
            .ok_or_else(|| FlowError::UnknownOffer(flight_id.to_string()))?;

        let party_size = criteria.party_size();
        if !is_selectable(offer, criteria.class_type, party_size) {
            let available = offer.fare(criteria.class_type).available;
            warn!(
                "Rejected {}: {} {} seats left for party of {}",
                offer.id, available, criteria.class_type, party_size
            );
            return Err(FlowError::Unavailable {
                flight_id: offer.id.clone(),
                class: criteria.class_type,
                requested: party_size,
                available,
            });
        }
        Ok(offer.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::fixtures;
    use galaxy_core::booking::BookingStatus;
    use galaxy_core::flight::FareBucket;
    use galaxy_core::payment::PaymentMethod;
    use galaxy_core::search::TripType;

    fn one_way_flow(adults: u32, economy: FareBucket) -> BookingFlow {
        let results = SearchResults {
            outbound: vec![fixtures::offer("GA001", "JFK", "LAX", economy)],
            inbound: Vec::new(),
        };
        BookingFlow::new()
            .submit_search(fixtures::criteria(TripType::OneWay, adults, 0), results)
            .unwrap()
    }

    fn round_trip_flow() -> BookingFlow {
        let results = SearchResults {
            outbound: vec![fixtures::offer("GA001", "JFK", "LAX", FareBucket::new(299, 120))],
            inbound: vec![fixtures::offer("GA007", "LAX", "JFK", FareBucket::new(189, 90))],
        };
        BookingFlow::new()
            .submit_search(fixtures::criteria(TripType::RoundTrip, 1, 1), results)
            .unwrap()
    }

    #[test]
    fn test_one_way_end_to_end() {
        let flow = one_way_flow(2, FareBucket::new(299, 120));
        assert_eq!(flow.step(), FlowStep::SelectingOutbound);

        let flow = flow.select_outbound("GA001").unwrap();
        assert_eq!(flow.step(), FlowStep::Reviewing);
        assert_eq!(flow.selection().outbound.as_ref().unwrap().id, "GA001");
        assert!(flow.selection().return_leg.is_none());
        assert_eq!(flow.current_total(), Some(598));

        let flow = flow.proceed_to_passengers().unwrap();
        assert_eq!(flow.passengers().len(), 2);

        let flow = flow
            .replace_passengers(vec![fixtures::passenger("Jane Doe"), fixtures::passenger("John Doe")])
            .unwrap()
            .submit_passengers()
            .unwrap();
        assert_eq!(flow.step(), FlowStep::Paying);
        assert_eq!(flow.frozen_total(), Some(598));

        let record = flow
            .build_booking(BuildContext::new("user-1", PaymentMethod::Card))
            .unwrap();
        assert_eq!(record.total_price, 598);
        assert_eq!(record.passengers.len(), 2);
        assert_eq!(record.status, BookingStatus::Confirmed);
        assert!(record.return_flight.is_none());

        let flow = flow.confirm(record).unwrap();
        assert_eq!(flow.step(), FlowStep::Confirmed);
        assert!(flow.passengers().is_empty());
        assert_eq!(flow.booking().unwrap().total_price, 598);
    }

    #[test]
    fn test_one_way_never_reaches_return_selection() {
        let flow = one_way_flow(1, FareBucket::new(299, 120));
        assert!(flow.select_return("GA001").is_err());
        let flow = flow.select_outbound("GA001").unwrap();
        assert_ne!(flow.step(), FlowStep::SelectingReturn);
        assert!(matches!(
            flow.select_return("GA001"),
            Err(FlowError::InvalidTransition { step: FlowStep::Reviewing, .. })
        ));
    }

    #[test]
    fn test_oversized_party_never_leaves_search() {
        let results = SearchResults {
            outbound: vec![fixtures::offer("GA001", "JFK", "LAX", FareBucket::new(299, 120))],
            inbound: Vec::new(),
        };
        let mut criteria = fixtures::criteria(TripType::OneWay, u32::MAX, 0);
        criteria.passengers.children = 1;

        let err = BookingFlow::new().submit_search(criteria, results).unwrap_err();
        match err {
            FlowError::Validation(errors) => assert!(errors.contains("passengers.adults")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_one_way_drops_stray_return_results() {
        let results = SearchResults {
            outbound: vec![fixtures::offer("GA001", "JFK", "LAX", FareBucket::new(299, 120))],
            inbound: vec![fixtures::offer("GA007", "LAX", "JFK", FareBucket::new(189, 90))],
        };
        let flow = BookingFlow::new()
            .submit_search(fixtures::criteria(TripType::OneWay, 1, 0), results)
            .unwrap();
        assert!(flow.results().inbound.is_empty());
    }

    #[test]
    fn test_rejected_selection_leaves_flow_unchanged() {
        let flow = one_way_flow(2, FareBucket::new(299, 1));
        let before = flow.clone();

        let err = flow.select_outbound("GA001").unwrap_err();
        assert_eq!(
            err,
            FlowError::Unavailable {
                flight_id: "GA001".to_string(),
                class: CabinClass::Economy,
                requested: 2,
                available: 1,
            }
        );
        assert_eq!(flow, before);
        assert_eq!(flow.step(), FlowStep::SelectingOutbound);
    }

    #[test]
    fn test_unknown_offer_rejected() {
        let flow = one_way_flow(1, FareBucket::new(299, 120));
        assert_eq!(
            flow.select_outbound("GA999").unwrap_err(),
            FlowError::UnknownOffer("GA999".to_string())
        );
    }

    #[test]
    fn test_disabled_offer_still_listed() {
        let flow = one_way_flow(2, FareBucket::new(299, 1));
        let listings = flow.listings(StopFilter::All, SortKey::Price);
        assert_eq!(listings.len(), 1);
        assert!(!listings[0].selectable);
    }

    #[test]
    fn test_round_trip_selection_and_total() {
        let flow = round_trip_flow().select_outbound("GA001").unwrap();
        assert_eq!(flow.step(), FlowStep::SelectingReturn);
        assert_eq!(flow.listings(StopFilter::All, SortKey::Price)[0].offer.id, "GA007");

        let flow = flow.select_return("GA007").unwrap();
        assert_eq!(flow.step(), FlowStep::Reviewing);
        assert_eq!(flow.current_total(), Some((299 + 189) * 2));
        let quote = flow.quote().unwrap();
        assert_eq!(quote.return_unit_price, Some(189));
    }

    #[test]
    fn test_clearing_outbound_during_return_selection() {
        let flow = round_trip_flow().select_outbound("GA001").unwrap();
        let flow = flow.clear_outbound().unwrap();
        assert_eq!(flow.step(), FlowStep::SelectingOutbound);
        assert!(flow.selection().is_empty());
    }

    #[test]
    fn test_back_from_review_clears_both_legs() {
        let flow = round_trip_flow()
            .select_outbound("GA001")
            .unwrap()
            .select_return("GA007")
            .unwrap();
        let flow = flow.clear_outbound().unwrap();
        assert_eq!(flow.step(), FlowStep::SelectingOutbound);
        assert!(flow.selection().outbound.is_none());
        assert!(flow.selection().return_leg.is_none());
        assert_eq!(flow.current_total(), None);
    }

    #[test]
    fn test_empty_return_results_are_not_an_error() {
        let results = SearchResults {
            outbound: vec![fixtures::offer("GA001", "JFK", "LAX", FareBucket::new(299, 120))],
            inbound: Vec::new(),
        };
        let flow = BookingFlow::new()
            .submit_search(fixtures::criteria(TripType::RoundTrip, 1, 0), results)
            .unwrap()
            .select_outbound("GA001")
            .unwrap();
        assert_eq!(flow.step(), FlowStep::SelectingReturn);
        assert!(flow.listings(StopFilter::All, SortKey::Price).is_empty());
    }

    #[test]
    fn test_invalid_passengers_block_payment() {
        let flow = one_way_flow(1, FareBucket::new(299, 120))
            .select_outbound("GA001")
            .unwrap()
            .proceed_to_passengers()
            .unwrap()
            .update_passenger(0, PassengerField::Name, "A")
            .unwrap();

        match flow.submit_passengers() {
            Err(FlowError::Validation(errors)) => {
                assert_eq!(errors.get("0-name"), Some("Name must be at least 2 characters"));
                assert!(errors.contains("0-email"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(flow.step(), FlowStep::EnteringPassengers);
    }

    #[test]
    fn test_field_by_field_entry() {
        let mut flow = one_way_flow(1, FareBucket::new(299, 120))
            .select_outbound("GA001")
            .unwrap()
            .proceed_to_passengers()
            .unwrap();
        let jane = fixtures::passenger("Jane Doe");
        for (field, value) in [
            (PassengerField::Name, &jane.name),
            (PassengerField::Phone, &jane.phone),
            (PassengerField::Email, &jane.email),
            (PassengerField::Address, &jane.address),
        ] {
            flow = flow.update_passenger(0, field, value.as_str()).unwrap();
        }
        assert_eq!(flow.passengers()[0], jane);
        assert!(matches!(
            flow.update_passenger(1, PassengerField::Name, "Bob"),
            Err(FlowError::PassengerOutOfRange { index: 1, party_size: 1 })
        ));
        assert_eq!(flow.submit_passengers().unwrap().step(), FlowStep::Paying);
    }

    #[test]
    fn test_wrong_passenger_count_rejected() {
        let flow = one_way_flow(2, FareBucket::new(299, 120))
            .select_outbound("GA001")
            .unwrap()
            .proceed_to_passengers()
            .unwrap();
        assert!(matches!(
            flow.replace_passengers(vec![fixtures::passenger("Jane Doe")]),
            Err(FlowError::Validation(_))
        ));
    }

    #[test]
    fn test_payment_failure_is_recoverable() {
        let flow = one_way_flow(1, FareBucket::new(299, 120))
            .select_outbound("GA001")
            .unwrap()
            .proceed_to_passengers()
            .unwrap()
            .replace_passengers(vec![fixtures::passenger("Jane Doe")])
            .unwrap()
            .submit_passengers()
            .unwrap();

        let failed = flow.record_payment_failure("card declined").unwrap();
        assert_eq!(failed.step(), FlowStep::Paying);
        assert_eq!(failed.payment_error(), Some("card declined"));
        assert_eq!(failed.frozen_total(), Some(299));

        let record = failed.build_booking(BuildContext::new("u", PaymentMethod::Digital)).unwrap();
        let confirmed = failed.confirm(record).unwrap();
        assert_eq!(confirmed.step(), FlowStep::Confirmed);
        assert_eq!(confirmed.payment_error(), None);
    }

    #[test]
    fn test_build_outside_paying_is_rejected() {
        let flow = one_way_flow(1, FareBucket::new(299, 120)).select_outbound("GA001").unwrap();
        assert!(matches!(
            flow.build_booking(BuildContext::new("u", PaymentMethod::Card)),
            Err(FlowError::InvalidTransition { step: FlowStep::Reviewing, .. })
        ));
    }

    #[test]
    fn test_logout_discards_everything() {
        let flow = round_trip_flow().select_outbound("GA001").unwrap();
        let flow = flow.logout();
        assert_eq!(flow, BookingFlow::new());
        assert!(flow.criteria().is_none());
    }

    #[test]
    fn test_search_only_from_searching() {
        let flow = one_way_flow(1, FareBucket::new(299, 120));
        let again = flow.submit_search(fixtures::criteria(TripType::OneWay, 1, 0), SearchResults::default());
        assert!(matches!(again, Err(FlowError::InvalidTransition { .. })));
        assert_eq!(flow.restart().step(), FlowStep::Searching);
    }

    #[test]
    fn test_invalid_criteria_rejected() {
        let mut criteria = fixtures::criteria(TripType::RoundTrip, 1, 0);
        criteria.return_date = None;
        let result = BookingFlow::new().submit_search(criteria, SearchResults::default());
        assert!(matches!(result, Err(FlowError::Validation(_))));
    }
}
