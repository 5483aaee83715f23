pub mod pricing;
pub mod inventory;
pub mod listing;

pub use pricing::{is_selectable, total_price, unit_price, Quote};
pub use inventory::{consume_seats, InventoryError};
pub use listing::{present, route_map, OfferListing, SortKey, StopFilter};
