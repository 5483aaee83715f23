use chrono::{NaiveDate, NaiveTime};
use galaxy_core::flight::{FareBucket, FlightOffer, StopCategory};
use galaxy_core::repository::StoreResult;
use tracing::info;

use crate::store::GalaxyStore;

struct SampleFlight {
    id: &'static str,
    from: (&'static str, &'static str),
    to: (&'static str, &'static str),
    times: ((u32, u32), (u32, u32)),
    duration: &'static str,
    aircraft: &'static str,
    day: u32,
    fares: [(u32, u32); 3],
}

const SAMPLES: [SampleFlight; 6] = [
    SampleFlight {
        id: "GA001",
        from: ("New York", "JFK"),
        to: ("Los Angeles", "LAX"),
        times: ((8, 0), (11, 30)),
        duration: "5h 30m",
        aircraft: "Boeing 777",
        day: 15,
        fares: [(299, 120), (899, 24), (1599, 8)],
    },
    SampleFlight {
        id: "GA002",
        from: ("Los Angeles", "LAX"),
        to: ("Miami", "MIA"),
        times: ((14, 15), (22, 45)),
        duration: "4h 30m",
        aircraft: "Airbus A320",
        day: 15,
        fares: [(249, 150), (749, 20), (1299, 6)],
    },
    SampleFlight {
        id: "GA003",
        from: ("Chicago", "ORD"),
        to: ("Seattle", "SEA"),
        times: ((10, 30), (12, 45)),
        duration: "4h 15m",
        aircraft: "Boeing 737",
        day: 15,
        fares: [(199, 140), (649, 18), (1099, 4)],
    },
    SampleFlight {
        id: "GA004",
        from: ("Boston", "BOS"),
        to: ("Denver", "DEN"),
        times: ((16, 20), (19, 10)),
        duration: "4h 50m",
        aircraft: "Airbus A321",
        day: 15,
        fares: [(279, 135), (799, 22), (1399, 10)],
    },
    SampleFlight {
        id: "GA005",
        from: ("San Francisco", "SFO"),
        to: ("New York", "JFK"),
        times: ((7, 45), (16, 30)),
        duration: "5h 45m",
        aircraft: "Boeing 787",
        day: 15,
        fares: [(329, 160), (949, 28), (1699, 12)],
    },
    SampleFlight {
        id: "GA006",
        from: ("Miami", "MIA"),
        to: ("Chicago", "ORD"),
        times: ((9, 15), (11, 30)),
        duration: "3h 15m",
        aircraft: "Boeing 737",
        day: 16,
        fares: [(189, 130), (589, 16), (999, 6)],
    },
];

fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// The demo schedule: six non-stop flights in January 2024.
pub fn sample_flights() -> Vec<FlightOffer> {
    SAMPLES
        .iter()
        .map(|s| {
            let [economy, business, first] = s.fares;
            FlightOffer {
                id: s.id.to_string(),
                flight_number: s.id.to_string(),
                from: s.from.0.to_string(),
                to: s.to.0.to_string(),
                from_code: s.from.1.to_string(),
                to_code: s.to.1.to_string(),
                departure: clock(s.times.0 .0, s.times.0 .1),
                arrival: clock(s.times.1 .0, s.times.1 .1),
                duration: s.duration.to_string(),
                aircraft: s.aircraft.to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, s.day).unwrap_or_default(),
                stops: StopCategory::NonStop,
                economy: FareBucket::new(economy.0, economy.1),
                business: FareBucket::new(business.0, business.1),
                first: FareBucket::new(first.0, first.1),
            }
        })
        .collect()
}

/// Loads the sample schedule into an empty catalog. Returns how many flights were added.
pub async fn seed_sample_flights(store: &GalaxyStore) -> StoreResult<usize> {
    let _guard = store.writes.lock().await;
    if !store.load_flights().await?.is_empty() {
        info!("Catalog already populated, skipping seed");
        return Ok(0);
    }

    let flights = sample_flights();
    store.save_flights(&flights).await?;
    info!("Seeded {} sample flights", flights.len());
    Ok(flights.len())
}
