//! Subscription builder
//!
//! Accumulates recurring-billing parameters fluently before one terminal
//! `create` call against the billing service.

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use mpc_db::{PaymentMethodRepository, SubscriptionRepository};
use mpc_types::Subscription;

use crate::customer::Billable;
use crate::error::BillingError;
use crate::provider::PaymentGateway;
use crate::service::BillingService;

/// Fluent builder for a recurring-billing subscription
#[derive(Debug, Clone)]
pub struct SubscriptionBuilder {
    pub(crate) name: String,
    pub(crate) plan: String,
    pub(crate) amount_minor: i64,
    pub(crate) frequency: String,
    pub(crate) description: Option<String>,
    pub(crate) trial_days: Option<i64>,
    pub(crate) trial_until: Option<DateTime<Utc>>,
    pub(crate) metadata: Map<String, Value>,
}

impl SubscriptionBuilder {
    /// Start building a subscription on a plan with a minor-unit amount
    pub fn new(plan: impl Into<String>, amount_minor: i64) -> Self {
        Self {
            name: "default".to_string(),
            plan: plan.into(),
            amount_minor,
            frequency: "Monthly".to_string(),
            description: None,
            trial_days: None,
            trial_until: None,
            metadata: Map::new(),
        }
    }

    /// Customer-scoped subscription label; distinguishes concurrent
    /// subscriptions per customer
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Billing frequency, `"Monthly"` unless overridden
    pub fn frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = frequency.into();
        self
    }

    /// Contract description; defaults to the subscription name
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Trial ending `days` from now at creation time
    pub fn trial_days(mut self, days: i64) -> Self {
        self.trial_days = Some(days);
        self
    }

    /// Explicit trial end; wins over `trial_days` when both are set
    pub fn trial_until(mut self, until: DateTime<Utc>) -> Self {
        self.trial_until = Some(until);
        self
    }

    /// Clear any configured trial
    pub fn skip_trial(mut self) -> Self {
        self.trial_days = None;
        self.trial_until = None;
        self
    }

    /// Extra fields merged into the contract-creation payload
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    /// Effective trial end: the explicit timestamp when set, else now plus
    /// the configured trial days.
    pub(crate) fn trial_end(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.trial_until
            .or_else(|| self.trial_days.map(|days| now + Duration::days(days)))
    }

    /// Create the subscription.
    ///
    /// Attaches `token` as the new default payment method when supplied;
    /// without one, fails with [`BillingError::Api`] before any remote
    /// call when the customer has no default method. Ensures the remote
    /// customer exists before the contract is created.
    pub async fn create<G, P, S, C>(
        self,
        service: &BillingService<G, P, S>,
        customer: &mut C,
        token: Option<&str>,
    ) -> Result<Subscription, BillingError>
    where
        G: PaymentGateway,
        P: PaymentMethodRepository,
        S: SubscriptionRepository,
        C: Billable,
    {
        service.create_subscription(customer, self, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_trial_timestamp_wins_over_days() {
        let explicit = Utc::now() + Duration::days(3);
        let now = Utc::now();

        let days_then_until = SubscriptionBuilder::new("plan", 1000)
            .trial_days(14)
            .trial_until(explicit);
        assert_eq!(days_then_until.trial_end(now), Some(explicit));

        let until_then_days = SubscriptionBuilder::new("plan", 1000)
            .trial_until(explicit)
            .trial_days(14);
        assert_eq!(until_then_days.trial_end(now), Some(explicit));
    }

    #[test]
    fn trial_days_count_from_now() {
        let now = Utc::now();
        let builder = SubscriptionBuilder::new("plan", 1000).trial_days(14);
        assert_eq!(builder.trial_end(now), Some(now + Duration::days(14)));
    }

    #[test]
    fn skip_trial_clears_both_settings() {
        let builder = SubscriptionBuilder::new("plan", 1000)
            .trial_days(14)
            .trial_until(Utc::now())
            .skip_trial();
        assert_eq!(builder.trial_end(Utc::now()), None);
    }

    #[test]
    fn defaults_name_and_frequency() {
        let builder = SubscriptionBuilder::new("plan", 1000);
        assert_eq!(builder.name, "default");
        assert_eq!(builder.frequency, "Monthly");
        assert!(builder.metadata.is_empty());
    }
}
