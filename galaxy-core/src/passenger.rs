use serde::{Deserialize, Serialize};

use crate::validation::{is_valid_email, is_valid_phone, trimmed_len, ValidationErrors};

const MIN_NAME_LEN: usize = 2;
const MIN_ADDRESS_LEN: usize = 10;

/// Contact details for one member of the party.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassengerRecord {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PassengerField {
    Name,
    Phone,
    Email,
    Address,
}

impl PassengerField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerField::Name => "name",
            PassengerField::Phone => "phone",
            PassengerField::Email => "email",
            PassengerField::Address => "address",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PassengerKind {
    Adult,
    Child,
}

impl PassengerKind {
    /// Adults fill the first `adults` slots of the list, children the rest.
    pub fn for_index(index: usize, adults: u32) -> Self {
        if index < adults as usize {
            PassengerKind::Adult
        } else {
            PassengerKind::Child
        }
    }
}

impl PassengerRecord {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: PassengerField, value: impl Into<String>) {
        let value = value.into();
        match field {
            PassengerField::Name => self.name = value,
            PassengerField::Phone => self.phone = value,
            PassengerField::Email => self.email = value,
            PassengerField::Address => self.address = value,
        }
    }

    /// Checks every field, reporting failures under `"{index}-{field}"` keys.
    pub fn validate(&self, index: usize) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let key = |field: PassengerField| format!("{}-{}", index, field.as_str());

        if self.name.trim().is_empty() {
            errors.add(key(PassengerField::Name), "Name is required");
        } else if trimmed_len(&self.name) < MIN_NAME_LEN {
            errors.add(key(PassengerField::Name), "Name must be at least 2 characters");
        }

        if self.phone.trim().is_empty() {
            errors.add(key(PassengerField::Phone), "Phone number is required");
        } else if !is_valid_phone(&self.phone) {
            errors.add(key(PassengerField::Phone), "Please enter a valid phone number");
        }

        if self.email.trim().is_empty() {
            errors.add(key(PassengerField::Email), "Email is required");
        } else if !is_valid_email(&self.email) {
            errors.add(key(PassengerField::Email), "Please enter a valid email address");
        }

        if self.address.trim().is_empty() {
            errors.add(key(PassengerField::Address), "Address is required");
        } else if trimmed_len(&self.address) < MIN_ADDRESS_LEN {
            errors.add(key(PassengerField::Address), "Please provide a complete address");
        }

        errors
    }
}

pub fn validate_passengers(passengers: &[PassengerRecord]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for (index, passenger) in passengers.iter().enumerate() {
        errors.merge(passenger.validate(index));
    }
    errors.into_result()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_passenger_passes() {
        assert!(fixtures::jane().validate(0).is_empty());
    }

    #[test]
    fn test_each_bad_field_is_reported() {
        let passenger = PassengerRecord {
            name: "A".to_string(),
            phone: "123".to_string(),
            email: "not-an-email".to_string(),
            address: "short".to_string(),
        };
        let errors = passenger.validate(1);
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get("1-name"), Some("Name must be at least 2 characters"));
        assert_eq!(errors.get("1-phone"), Some("Please enter a valid phone number"));
        assert_eq!(errors.get("1-email"), Some("Please enter a valid email address"));
        assert_eq!(errors.get("1-address"), Some("Please provide a complete address"));
    }

    #[test]
    fn test_blank_fields_are_required() {
        let errors = PassengerRecord::blank().validate(0);
        assert_eq!(errors.get("0-name"), Some("Name is required"));
        assert_eq!(errors.get("0-email"), Some("Email is required"));
    }

    #[test]
    fn test_list_validation_collects_all_indices() {
        let list = vec![fixtures::jane(), PassengerRecord::blank()];
        let errors = validate_passengers(&list).unwrap_err();
        assert!(errors.contains("1-phone"));
        assert!(!errors.contains("0-phone"));
    }

    #[test]
    fn test_kind_by_position() {
        assert_eq!(PassengerKind::for_index(0, 2), PassengerKind::Adult);
        assert_eq!(PassengerKind::for_index(1, 2), PassengerKind::Adult);
        assert_eq!(PassengerKind::for_index(2, 2), PassengerKind::Child);
    }

    #[test]
    fn test_set_field() {
        let mut passenger = PassengerRecord::blank();
        passenger.set(PassengerField::Email, "jane@example.com");
        assert_eq!(passenger.email, "jane@example.com");
    }
}
