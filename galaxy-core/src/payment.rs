use async_trait::async_trait;
use chrono::{DateTime, Utc};
use galaxy_shared::Masked;
use serde::{Deserialize, Serialize};

use crate::validation::{is_valid_expiry, ValidationErrors};

const MIN_CARD_DIGITS: usize = 16;
const MIN_CVV_DIGITS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Digital,
    Bank,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CardDetails {
    pub number: Masked<String>,
    pub expiry: Masked<String>,
    pub cvv: Masked<String>,
    pub name: String,
}

/// Method plus, for cards, the card fields typed on the payment form.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    #[serde(default)]
    pub card: Option<CardDetails>,
}

impl PaymentDetails {
    pub fn card(card: CardDetails) -> Self {
        Self { method: PaymentMethod::Card, card: Some(card) }
    }

    pub fn without_card(method: PaymentMethod) -> Self {
        Self { method, card: None }
    }

    /// Card payments need every card field; other methods need nothing.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        if self.method != PaymentMethod::Card {
            return Ok(());
        }

        let card = self.card.clone().unwrap_or_default();
        let mut errors = ValidationErrors::new();

        let digits: String = card.number.expose().chars().filter(|c| !c.is_whitespace()).collect();
        if digits.is_empty() {
            errors.add("number", "Card number is required");
        } else if digits.len() < MIN_CARD_DIGITS || !digits.chars().all(|c| c.is_ascii_digit()) {
            errors.add("number", "Please enter a valid card number");
        }

        if card.expiry.expose().is_empty() {
            errors.add("expiry", "Expiry date is required");
        } else if !is_valid_expiry(card.expiry.expose()) {
            errors.add("expiry", "Please enter MM/YY format");
        }

        let cvv = card.cvv.expose();
        if cvv.is_empty() {
            errors.add("cvv", "CVV is required");
        } else if cvv.len() < MIN_CVV_DIGITS || !cvv.chars().all(|c| c.is_ascii_digit()) {
            errors.add("cvv", "Please enter a valid CVV");
        }

        if card.name.trim().is_empty() {
            errors.add("name", "Cardholder name is required");
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    pub reference: String,
    pub amount: u64,
    pub method: PaymentMethod,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Payment declined: {0}")]
    Declined(String),
    #[error("Payment gateway unavailable: {0}")]
    Gateway(String),
}

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Charge `amount` using the given method. Never called with invalid details.
    async fn charge(
        &self,
        amount: u64,
        details: &PaymentDetails,
    ) -> Result<PaymentReceipt, PaymentError>;

    /// Reverse a captured charge whose booking could not be stored.
    async fn refund(&self, receipt: &PaymentReceipt) -> Result<(), PaymentError>;
}
