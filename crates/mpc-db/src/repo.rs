//! Repository traits
//!
//! Async repository interfaces consumed by the billing orchestration
//! layer; backed by Postgres in production and by in-memory doubles in
//! tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{PaymentMethodRow, SubscriptionRow};

/// Payment method repository trait
#[async_trait]
pub trait PaymentMethodRepository: Send + Sync {
    /// Find a payment method by ID, scoped to the owning customer
    async fn find_by_id(&self, customer_id: Uuid, id: Uuid) -> DbResult<Option<PaymentMethodRow>>;

    /// Find the customer's default payment method
    async fn find_default(&self, customer_id: Uuid) -> DbResult<Option<PaymentMethodRow>>;

    /// List all payment methods for a customer
    async fn list_for_customer(&self, customer_id: Uuid) -> DbResult<Vec<PaymentMethodRow>>;

    /// Count payment methods for a customer
    async fn count_for_customer(&self, customer_id: Uuid) -> DbResult<i64>;

    /// Create a new payment method
    async fn create(&self, method: CreatePaymentMethod) -> DbResult<PaymentMethodRow>;

    /// Make one payment method the default, clearing the flag on all
    /// siblings in the same atomic unit.
    async fn make_default(&self, customer_id: Uuid, id: Uuid) -> DbResult<()>;

    /// Delete a payment method, scoped to the owning customer
    async fn delete(&self, customer_id: Uuid, id: Uuid) -> DbResult<()>;
}

/// Create payment method input
#[derive(Debug, Clone)]
pub struct CreatePaymentMethod {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub token: String,
    pub method_type: String,
    pub last_four: Option<String>,
    pub brand: Option<String>,
    pub is_default: bool,
}

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by ID
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SubscriptionRow>>;

    /// Find a customer's subscription by its customer-scoped name
    async fn find_by_name(&self, customer_id: Uuid, name: &str)
        -> DbResult<Option<SubscriptionRow>>;

    /// List all subscriptions for a customer
    async fn list_for_customer(&self, customer_id: Uuid) -> DbResult<Vec<SubscriptionRow>>;

    /// Create a new subscription
    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow>;

    /// Update the end timestamp (set on cancel, cleared on resume)
    async fn update_ends_at(&self, id: Uuid, ends_at: Option<DateTime<Utc>>) -> DbResult<()>;
}

/// Create subscription input
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub plan: String,
    pub contract_id: Option<String>,
    pub trial_ends_at: Option<DateTime<Utc>>,
}
