//! Payment method types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of payment instrument behind a stored token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    /// Tokenized card
    Card,
    /// Tokenized check (ACH)
    Check,
}

impl Default for PaymentMethodType {
    fn default() -> Self {
        Self::Card
    }
}

impl PaymentMethodType {
    /// Storage name for this type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Check => "check",
        }
    }

    /// Parse a storage name, defaulting to card for unknown values
    pub fn from_str_or_card(s: &str) -> Self {
        match s {
            "check" => Self::Check,
            _ => Self::Card,
        }
    }
}

/// A stored payment method
///
/// Holds only the opaque gateway token plus display metadata; raw card or
/// account data never lands here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Payment method ID
    pub id: Uuid,
    /// Owning customer ID
    pub customer_id: Uuid,
    /// Opaque gateway token
    pub token: String,
    /// Instrument kind
    pub method_type: PaymentMethodType,
    /// Last four digits, for display
    pub last_four: Option<String>,
    /// Card brand, for display
    pub brand: Option<String>,
    /// Whether this is the customer's default method
    pub is_default: bool,
    /// When the method was stored
    pub created_at: DateTime<Utc>,
    /// When the method was last updated
    pub updated_at: DateTime<Utc>,
}
