//! Payment instrument details
//!
//! Raw card/check data accepted at the tokenization boundary. These types
//! never reach the local database; they exist only long enough to be
//! exchanged for an opaque gateway token.

use serde::{Deserialize, Serialize};

/// Format requested for newly issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenFormat {
    /// Opaque unique identifier (the gateway default)
    Uid,
    /// Format-preserving token resembling a card number
    FormatPreserving,
}

impl Default for TokenFormat {
    fn default() -> Self {
        Self::Uid
    }
}

impl TokenFormat {
    /// Gateway wire name for this format
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uid => "Uid",
            Self::FormatPreserving => "FormatPreserving",
        }
    }
}

/// Bank account type for check tokenization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Checking account
    Checking,
    /// Savings account
    Savings,
}

impl AccountType {
    /// Gateway wire name for this account type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Checking => "Checking",
            Self::Savings => "Savings",
        }
    }
}

/// Check classification for check tokenization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckType {
    /// Personal check
    Personal,
    /// Business check
    Business,
}

impl CheckType {
    /// Gateway wire name for this check type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Business => "Business",
        }
    }
}

/// Card details supplied by the caller for tokenization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardDetails {
    /// Primary account number
    pub number: String,
    /// Two-digit expiration month (1-12)
    pub exp_month: u8,
    /// Two-digit expiration year (e.g. 27 for 2027)
    pub exp_year: u8,
    /// Cardholder name
    pub name: Option<String>,
    /// Billing street address
    pub street: Option<String>,
    /// Billing postal code
    pub postal_code: Option<String>,
}

impl CardDetails {
    /// Create card details from the required fields
    pub fn new(number: impl Into<String>, exp_month: u8, exp_year: u8) -> Self {
        Self {
            number: number.into(),
            exp_month,
            exp_year,
            ..Default::default()
        }
    }

    /// Set the cardholder name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the billing street address
    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    /// Set the billing postal code
    pub fn with_postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    /// Four-digit `MMYY` expiration string the gateway expects
    pub fn expiration(&self) -> String {
        format!("{:02}{:02}", self.exp_month, self.exp_year)
    }
}

/// Check details supplied by the caller for tokenization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckDetails {
    /// Bank routing number
    pub routing_number: String,
    /// Bank account number
    pub account_number: String,
    /// Account holder name
    pub name: Option<String>,
    /// Account type
    pub account_type: Option<AccountType>,
    /// Check type
    pub check_type: Option<CheckType>,
    /// Billing street address; loose input may call this `line1`
    #[serde(alias = "line1")]
    pub street: Option<String>,
    /// Billing city
    pub city: Option<String>,
    /// Billing state or province
    pub state: Option<String>,
    /// Billing postal code; loose input may call this `zip`
    #[serde(alias = "zip")]
    pub postal_code: Option<String>,
    /// Billing country (defaults to "USA" on the wire)
    pub country: Option<String>,
}

impl CheckDetails {
    /// Create check details from the required fields
    pub fn new(routing_number: impl Into<String>, account_number: impl Into<String>) -> Self {
        Self {
            routing_number: routing_number.into(),
            account_number: account_number.into(),
            ..Default::default()
        }
    }

    /// Set the account holder name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the account type
    pub fn with_account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = Some(account_type);
        self
    }

    /// Set the check type
    pub fn with_check_type(mut self, check_type: CheckType) -> Self {
        self.check_type = Some(check_type);
        self
    }
}
