//! Fare lookup, seat-availability checks and the trip total.
//!
//! Every price shown or charged comes from [`total_price`]: the sum of the
//! selected legs' unit fares in the requested cabin, times the party size.
//! No taxes, fees or discounts are applied.

use galaxy_core::flight::{CabinClass, FlightOffer};
use serde::Serialize;

/// Per-person fare for one cabin on one flight.
pub fn unit_price(offer: &FlightOffer, class: CabinClass) -> u32 {
    offer.fare(class).price
}

/// True when the cabin still has a seat for everyone in the party.
pub fn is_selectable(offer: &FlightOffer, class: CabinClass, party_size: u32) -> bool {
    offer.fare(class).available >= party_size
}

pub fn total_price(
    outbound: &FlightOffer,
    return_leg: Option<&FlightOffer>,
    class: CabinClass,
    party_size: u32,
) -> u64 {
    let per_person = u64::from(unit_price(outbound, class))
        + return_leg.map_or(0, |leg| u64::from(unit_price(leg, class)));
    per_person * u64::from(party_size)
}

/// Price breakdown for review and payment screens.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub class_type: CabinClass,
    pub outbound_unit_price: u32,
    pub return_unit_price: Option<u32>,
    pub party_size: u32,
    pub total_price: u64,
}

impl Quote {
    pub fn new(
        outbound: &FlightOffer,
        return_leg: Option<&FlightOffer>,
        class: CabinClass,
        party_size: u32,
    ) -> Self {
        Self {
            class_type: class,
            outbound_unit_price: unit_price(outbound, class),
            return_unit_price: return_leg.map(|leg| unit_price(leg, class)),
            party_size,
            total_price: total_price(outbound, return_leg, class, party_size),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use galaxy_core::flight::FareBucket;

    #[test]
    fn test_selectable_matches_available_seats() {
        let offer = fixtures::offer("GA001", FareBucket::new(299, 2));
        for party in 0..5 {
            assert_eq!(is_selectable(&offer, CabinClass::Economy, party), 2 >= party);
        }
        assert!(is_selectable(&offer, CabinClass::First, 8));
        assert!(!is_selectable(&offer, CabinClass::First, 9));
    }

    #[test]
    fn test_one_way_total() {
        let offer = fixtures::offer("GA001", FareBucket::new(299, 120));
        assert_eq!(total_price(&offer, None, CabinClass::Economy, 2), 598);
    }

    #[test]
    fn test_round_trip_total() {
        let outbound = fixtures::offer("GA001", FareBucket::new(299, 120));
        let inbound = fixtures::offer("GA007", FareBucket::new(189, 130));
        assert_eq!(
            total_price(&outbound, Some(&inbound), CabinClass::Economy, 3),
            (299 + 189) * 3
        );
        assert_eq!(
            total_price(&outbound, Some(&inbound), CabinClass::Business, 1),
            899 + 899
        );
    }

    #[test]
    fn test_pricing_is_repeatable() {
        let offer = fixtures::offer("GA001", FareBucket::new(299, 120));
        let first = total_price(&offer, None, CabinClass::Economy, 4);
        let second = total_price(&offer, None, CabinClass::Economy, 4);
        assert_eq!(first, second);
        assert_eq!(
            Quote::new(&offer, None, CabinClass::Economy, 4),
            Quote::new(&offer, None, CabinClass::Economy, 4)
        );
    }

    #[test]
    fn test_quote_breakdown() {
        let outbound = fixtures::offer("GA001", FareBucket::new(299, 120));
        let quote = Quote::new(&outbound, None, CabinClass::Economy, 2);
        assert_eq!(quote.outbound_unit_price, 299);
        assert_eq!(quote.return_unit_price, None);
        assert_eq!(quote.total_price, 598);
    }
}
