use chrono::NaiveDate;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmedEvent {
    pub booking_id: String,
    pub user_id: String,
    pub flight_ids: Vec<String>,
    pub class_type: String,
    pub passenger_count: u32,
    pub total_price: u64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightChangedEvent {
    pub flight_id: String,
    pub flight_number: String,
    pub date: NaiveDate,
    pub change: FlightChange,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightChange {
    Created,
    Updated,
    SeatsConsumed,
}

/// Everything the API fans out to subscribers after a committed write.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    BookingConfirmed(BookingConfirmedEvent),
    FlightChanged(FlightChangedEvent),
}
