use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CabinClass {
    Economy,
    Business,
    First,
}

impl CabinClass {
    pub const ALL: [CabinClass; 3] = [CabinClass::Economy, CabinClass::Business, CabinClass::First];

    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StopCategory {
    #[serde(rename = "non-stop")]
    NonStop,
    #[serde(rename = "1-stop")]
    OneStop,
    #[serde(rename = "2-stops")]
    TwoStops,
}

/// Price and remaining seats for one cabin class on one flight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FareBucket {
    pub price: u32,
    pub available: u32,
}

impl FareBucket {
    pub fn new(price: u32, available: u32) -> Self {
        Self { price, available }
    }
}

/// A scheduled flight as served by the catalog.
///
/// `id` is assigned by the catalog on creation; an incoming admin payload may
/// leave it empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    #[serde(default)]
    pub id: String,
    pub flight_number: String,
    pub from: String,
    pub to: String,
    pub from_code: String,
    pub to_code: String,
    #[serde(with = "clock_time")]
    pub departure: NaiveTime,
    #[serde(with = "clock_time")]
    pub arrival: NaiveTime,
    pub duration: String,
    pub aircraft: String,
    pub date: NaiveDate,
    pub stops: StopCategory,
    pub economy: FareBucket,
    pub business: FareBucket,
    pub first: FareBucket,
}

impl FlightOffer {
    pub fn fare(&self, class: CabinClass) -> &FareBucket {
        match class {
            CabinClass::Economy => &self.economy,
            CabinClass::Business => &self.business,
            CabinClass::First => &self.first,
        }
    }

    pub fn fare_mut(&mut self, class: CabinClass) -> &mut FareBucket {
        match class {
            CabinClass::Economy => &mut self.economy,
            CabinClass::Business => &mut self.business,
            CabinClass::First => &mut self.first,
        }
    }

    /// Seats still open across all three cabins.
    pub fn total_available(&self) -> u32 {
        CabinClass::ALL.iter().map(|c| self.fare(*c).available).sum()
    }

    /// Parses durations written as `"5h 30m"`, `"4h"` or `"45m"`.
    pub fn duration_minutes(&self) -> Option<u32> {
        parse_duration(&self.duration)
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.flight_number.trim().is_empty() {
            errors.add("flightNumber", "Flight number is required");
        }
        if self.from_code.trim().is_empty() {
            errors.add("fromCode", "Origin code is required");
        }
        if self.to_code.trim().is_empty() {
            errors.add("toCode", "Destination code is required");
        }
        if !self.from_code.trim().is_empty() && self.from_code.eq_ignore_ascii_case(&self.to_code) {
            errors.add("toCode", "Destination must differ from origin");
        }
        if self.duration_minutes().is_none() {
            errors.add("duration", "Duration must look like \"5h 30m\"");
        }
        errors.into_result()
    }
}

fn parse_duration(raw: &str) -> Option<u32> {
    let mut total = 0u32;
    let mut seen = false;
    for part in raw.split_whitespace() {
        let (number, scale) = if let Some(hours) = part.strip_suffix('h') {
            (hours, 60)
        } else if let Some(minutes) = part.strip_suffix('m') {
            (minutes, 1)
        } else {
            return None;
        };
        let value: u32 = number.parse().ok()?;
        total = total.checked_add(value.checked_mul(scale)?)?;
        seen = true;
    }
    seen.then_some(total)
}

/// Partial update applied by the admin surface. Absent fields are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightPatch {
    pub flight_number: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub from_code: Option<String>,
    pub to_code: Option<String>,
    #[serde(with = "clock_time::option")]
    pub departure: Option<NaiveTime>,
    #[serde(with = "clock_time::option")]
    pub arrival: Option<NaiveTime>,
    pub duration: Option<String>,
    pub aircraft: Option<String>,
    pub date: Option<NaiveDate>,
    pub stops: Option<StopCategory>,
    pub economy: Option<FareBucket>,
    pub business: Option<FareBucket>,
    pub first: Option<FareBucket>,
}

impl FlightPatch {
    pub fn apply_to(&self, flight: &mut FlightOffer) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(value) = &self.$field {
                    flight.$field = value.clone();
                })*
            };
        }
        take!(
            flight_number, from, to, from_code, to_code, departure, arrival, duration, aircraft,
            date, stops, economy, business, first
        );
    }
}

/// `HH:MM` wall-clock times, the format schedules are published in.
pub mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::FORMAT;
        use chrono::NaiveTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => serializer.serialize_some(&t.format(FORMAT).to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn offer(id: &str, from_code: &str, to_code: &str, date: &str) -> FlightOffer {
        FlightOffer {
            id: id.to_string(),
            flight_number: id.to_string(),
            from: format!("{} city", from_code),
            to: format!("{} city", to_code),
            from_code: from_code.to_string(),
            to_code: to_code.to_string(),
            departure: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            arrival: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
            duration: "5h 30m".to_string(),
            aircraft: "Boeing 777".to_string(),
            date: date.parse().unwrap(),
            stops: StopCategory::NonStop,
            economy: FareBucket::new(299, 120),
            business: FareBucket::new(899, 24),
            first: FareBucket::new(1599, 8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_wire_shape() {
        let json = r#"
            {
                "id": "GA001",
                "flightNumber": "GA001",
                "from": "New York",
                "to": "Los Angeles",
                "fromCode": "JFK",
                "toCode": "LAX",
                "departure": "08:00",
                "arrival": "11:30",
                "duration": "5h 30m",
                "aircraft": "Boeing 777",
                "date": "2024-01-15",
                "stops": "non-stop",
                "economy": { "price": 299, "available": 120 },
                "business": { "price": 899, "available": 24 },
                "first": { "price": 1599, "available": 8 }
            }
        "#;
        let offer: FlightOffer = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(offer.fare(CabinClass::Economy).price, 299);
        assert_eq!(offer.fare(CabinClass::First).available, 8);
        assert_eq!(offer.stops, StopCategory::NonStop);
        assert_eq!(offer.duration_minutes(), Some(330));

        let back = serde_json::to_value(&offer).unwrap();
        assert_eq!(back["departure"], "08:00");
        assert_eq!(back["fromCode"], "JFK");
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_duration("4h"), Some(240));
        assert_eq!(parse_duration("45m"), Some(45));
        assert_eq!(parse_duration("1h 5m"), Some(65));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("five hours"), None);
    }

    #[test]
    fn test_oversized_duration_rejected() {
        assert_eq!(parse_duration("80000000h"), None);
        assert_eq!(parse_duration("71582788h 4294967295m"), None);

        let mut offer = fixtures::offer("GA001", "JFK", "LAX", "2024-01-15");
        offer.duration = "80000000h".to_string();
        assert!(offer.validate().unwrap_err().contains("duration"));
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut offer = fixtures::offer("GA001", "JFK", "LAX", "2024-01-15");
        let patch: FlightPatch = serde_json::from_str(
            r#"{ "aircraft": "Airbus A350", "economy": { "price": 199, "available": 100 }, "departure": "09:15" }"#,
        )
        .unwrap();
        patch.apply_to(&mut offer);

        assert_eq!(offer.aircraft, "Airbus A350");
        assert_eq!(offer.economy, FareBucket::new(199, 100));
        assert_eq!(offer.departure, NaiveTime::from_hms_opt(9, 15, 0).unwrap());
        assert_eq!(offer.business, FareBucket::new(899, 24));
        assert_eq!(offer.from_code, "JFK");
    }

    #[test]
    fn test_validate_rejects_same_endpoints() {
        let offer = fixtures::offer("GA009", "JFK", "jfk", "2024-01-15");
        let errors = offer.validate().unwrap_err();
        assert!(errors.contains("toCode"));
    }
}
