//! Billing errors
//!
//! The orchestration layer catches broadly and re-wraps: charge-path
//! failures become `PaymentFailed`, billing-relationship setup failures
//! become `Api`. Raw transport errors never leak to callers.

use thiserror::Error;

/// Billing errors
#[derive(Error, Debug)]
pub enum BillingError {
    /// A charge attempt or payment-method operation failed
    #[error("payment failed: {0}")]
    PaymentFailed(String),

    /// Setting up the billing relationship with the gateway failed
    /// (customer or recurring-contract creation)
    #[error("billing api error: {0}")]
    Api(String),

    /// Payment method not found for this customer
    #[error("payment method not found")]
    PaymentMethodNotFound,

    /// Subscription not found
    #[error("subscription not found")]
    SubscriptionNotFound,

    /// Resume is only valid while a cancelled subscription is inside its
    /// grace period
    #[error("subscription is not on its grace period")]
    NotOnGracePeriod,

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] mpc_db::DbError),
}

impl BillingError {
    /// Check if this is a payment failure
    pub fn is_payment_failure(&self) -> bool {
        matches!(self, Self::PaymentFailed(_))
    }

    /// Check if this is a billing-relationship (API) failure
    pub fn is_api_failure(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}
