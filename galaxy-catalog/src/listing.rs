use galaxy_core::flight::{CabinClass, FlightOffer, StopCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::pricing::{is_selectable, unit_price};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Price,
    Duration,
    Departure,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopFilter {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "non-stop")]
    NonStop,
    #[serde(rename = "1-stop")]
    OneStop,
    #[serde(rename = "2-stops")]
    TwoStops,
}

impl StopFilter {
    pub fn admits(&self, stops: StopCategory) -> bool {
        match self {
            StopFilter::All => true,
            StopFilter::NonStop => stops == StopCategory::NonStop,
            StopFilter::OneStop => stops == StopCategory::OneStop,
            StopFilter::TwoStops => stops == StopCategory::TwoStops,
        }
    }
}

/// A search result as shown to the traveller.
///
/// Offers without enough seats stay in the list with `selectable: false`
/// so the traveller can see why they cannot pick them.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferListing {
    pub offer: FlightOffer,
    pub unit_price: u32,
    pub available: u32,
    pub selectable: bool,
}

pub fn present(
    offers: &[FlightOffer],
    class: CabinClass,
    party_size: u32,
    filter: StopFilter,
    sort: SortKey,
) -> Vec<OfferListing> {
    let mut listings: Vec<OfferListing> = offers
        .iter()
        .filter(|offer| filter.admits(offer.stops))
        .map(|offer| OfferListing {
            offer: offer.clone(),
            unit_price: unit_price(offer, class),
            available: offer.fare(class).available,
            selectable: is_selectable(offer, class, party_size),
        })
        .collect();

    match sort {
        SortKey::Price => listings.sort_by_key(|l| l.unit_price),
        // Unparseable durations sink to the bottom.
        SortKey::Duration => listings.sort_by_key(|l| l.offer.duration_minutes().unwrap_or(u32::MAX)),
        SortKey::Departure => listings.sort_by_key(|l| l.offer.departure),
    }
    listings
}

/// Origin code -> sorted, de-duplicated destination codes.
pub fn route_map(offers: &[FlightOffer]) -> BTreeMap<String, Vec<String>> {
    let mut routes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for offer in offers {
        let destinations = routes.entry(offer.from_code.clone()).or_default();
        if !destinations.contains(&offer.to_code) {
            destinations.push(offer.to_code.clone());
        }
    }
    for destinations in routes.values_mut() {
        destinations.sort();
    }
    routes
}
