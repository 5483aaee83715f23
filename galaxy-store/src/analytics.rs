use galaxy_catalog::inventory::occupancy_rate;
use galaxy_core::analytics::{Analytics, ClassRevenue, FlightStats};
use galaxy_core::booking::BookingRecord;
use galaxy_core::flight::FlightOffer;

/// Revenue and occupancy figures from stored bookings.
///
/// A leg's revenue is its booked unit fare times the party size, so the
/// per-flight figures add up to `total_revenue`. Occupancy compares seats
/// booked against seats booked plus seats still open on the flight.
pub fn compute_analytics(flights: &[FlightOffer], bookings: &[BookingRecord]) -> Analytics {
    let mut class_revenue = ClassRevenue::default();
    let mut total_revenue = 0u64;

    for booking in bookings {
        total_revenue += booking.total_price;
        class_revenue.add(booking.class_type(), booking.total_price);
    }

    let flight_stats = flights
        .iter()
        .map(|flight| {
            let mut stats = FlightStats {
                flight_id: flight.id.clone(),
                flight_number: flight.flight_number.clone(),
                bookings: 0,
                seats_booked: 0,
                revenue: 0,
                occupancy_rate: 0.0,
            };
            for booking in bookings {
                let party = booking.party_size();
                for leg in booking.legs().filter(|leg| leg.id == flight.id) {
                    stats.bookings += 1;
                    stats.seats_booked += party;
                    stats.revenue += u64::from(leg.fare(booking.class_type()).price) * u64::from(party);
                }
            }
            stats.occupancy_rate = occupancy_rate(stats.seats_booked, flight.total_available());
            stats
        })
        .collect();

    let total_bookings = bookings.len() as u32;
    let average_booking_value = if total_bookings == 0 {
        0.0
    } else {
        (total_revenue as f64 / f64::from(total_bookings) * 100.0).round() / 100.0
    };

    Analytics {
        total_revenue,
        total_bookings,
        class_revenue,
        flight_stats,
        average_booking_value,
    }
}
