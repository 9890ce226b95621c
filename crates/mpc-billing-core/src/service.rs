//! Billing service
//!
//! Customer-facing operations composed from the gateway seam plus local
//! persistence. Heterogeneous underlying failures (transport, validation,
//! missing field) are wrapped into [`BillingError::PaymentFailed`] here;
//! subscription setup uses the distinct [`BillingError::Api`] kind.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use mpc_db::{
    CreatePaymentMethod, DbError, PaymentMethodRepository, PaymentMethodRow, SubscriptionRepository,
    SubscriptionRow,
};
use mpc_types::{minor_to_major, CardDetails, CheckDetails, PaymentMethodType};

use crate::customer::Billable;
use crate::error::BillingError;
use crate::provider::PaymentGateway;

/// Options for registering a payment method
#[derive(Debug, Clone, Default)]
pub struct AddPaymentMethodOptions {
    /// Explicit default-ness; when unset, the first method for the
    /// customer becomes the default
    pub default: Option<bool>,
    /// Instrument kind, card unless stated otherwise
    pub method_type: Option<PaymentMethodType>,
    /// Last four digits for display
    pub last_four: Option<String>,
    /// Card brand for display
    pub brand: Option<String>,
}

/// Options for a charge
#[derive(Debug, Clone, Default)]
pub struct ChargeOptions {
    /// Explicit token override; when unset the customer's stored default
    /// is used
    pub token: Option<String>,
    /// Currency override; when unset the gateway default applies
    pub currency: Option<String>,
    /// Extra fields merged into the transaction payload
    pub extra: Map<String, Value>,
}

/// A payment method reference: a stored identifier or a loaded row
pub enum MethodRef<'a> {
    /// Resolve by identifier, scoped to the owning customer
    Id(Uuid),
    /// Use an already-loaded row
    Entity(&'a PaymentMethodRow),
}

impl<'a> From<Uuid> for MethodRef<'a> {
    fn from(id: Uuid) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a PaymentMethodRow> for MethodRef<'a> {
    fn from(row: &'a PaymentMethodRow) -> Self {
        Self::Entity(row)
    }
}

/// Outcome of a tokenize call
#[derive(Debug, Clone)]
pub enum Tokenized {
    /// Bare reusable token, not registered locally
    Bare(String),
    /// Token registered as a stored payment method
    Saved(PaymentMethodRow),
}

impl Tokenized {
    /// The reusable token string in either outcome
    pub fn token(&self) -> &str {
        match self {
            Self::Bare(token) => token,
            Self::Saved(row) => &row.mpc_token,
        }
    }
}

/// Billing service
///
/// Generic over the gateway seam and the repository traits so tests can
/// substitute in-memory doubles.
pub struct BillingService<G, P, S> {
    gateway: Arc<G>,
    payment_methods: Arc<P>,
    subscriptions: Arc<S>,
}

impl<G, P, S> BillingService<G, P, S>
where
    G: PaymentGateway,
    P: PaymentMethodRepository,
    S: SubscriptionRepository,
{
    /// Create a new billing service
    pub fn new(gateway: Arc<G>, payment_methods: Arc<P>, subscriptions: Arc<S>) -> Self {
        Self {
            gateway,
            payment_methods,
            subscriptions,
        }
    }

    /// The subscription repository, for direct queries
    pub fn subscriptions(&self) -> &S {
        &self.subscriptions
    }

    /// The payment method repository, for direct queries
    pub fn payment_methods(&self) -> &P {
        &self.payment_methods
    }

    pub(crate) fn gateway(&self) -> &G {
        &self.gateway
    }

    // =========================================================================
    // Remote customers
    // =========================================================================

    /// Create the remote gateway customer for this entity.
    ///
    /// Posts name/email merged with caller overrides. When the response
    /// carries a `CustomerId` it is stored through the customer's
    /// persistence hook; when it does not, the call is a logged no-op.
    #[instrument(skip(self, customer, overrides), fields(customer = %customer.billing_id()))]
    pub async fn create_as_remote_customer<C: Billable>(
        &self,
        customer: &mut C,
        overrides: Map<String, Value>,
    ) -> Result<Option<String>, BillingError> {
        let mut payload = Map::new();
        if let Some(name) = customer.billing_name() {
            payload.insert("Name".into(), Value::String(name.into()));
        }
        if let Some(email) = customer.billing_email() {
            payload.insert("Email".into(), Value::String(email.into()));
        }
        payload.extend(overrides);

        let body = self
            .gateway
            .create_customer(Value::Object(payload))
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))?;

        match scalar_field(&body, "CustomerId") {
            Some(remote_id) => {
                customer.store_remote_customer_id(remote_id.clone()).await?;
                debug!(remote_id = %remote_id, "remote customer created");
                Ok(Some(remote_id))
            }
            None => {
                warn!("customer creation response carried no CustomerId");
                Ok(None)
            }
        }
    }

    /// Return the remote customer id, creating the remote customer when
    /// none exists yet.
    async fn ensure_remote_customer<C: Billable>(
        &self,
        customer: &mut C,
    ) -> Result<String, BillingError> {
        if let Some(remote_id) = customer.remote_customer_id() {
            return Ok(remote_id.to_string());
        }
        match self.create_as_remote_customer(customer, Map::new()).await? {
            Some(remote_id) => Ok(remote_id),
            None => Err(BillingError::PaymentFailed(
                "gateway did not return a customer id".into(),
            )),
        }
    }

    // =========================================================================
    // Payment methods
    // =========================================================================

    /// Register a gateway token as a stored payment method.
    ///
    /// Creates the remote customer lazily. The first method for a customer
    /// becomes the default unless `options.default` says otherwise; a
    /// default method goes through the make-default transition so sibling
    /// flags clear atomically.
    #[instrument(skip(self, customer, options), fields(customer = %customer.billing_id()))]
    pub async fn add_payment_method<C: Billable>(
        &self,
        customer: &mut C,
        token: &str,
        options: AddPaymentMethodOptions,
    ) -> Result<PaymentMethodRow, BillingError> {
        self.ensure_remote_customer(customer).await?;

        let customer_id = customer.billing_id();
        let existing = self.payment_methods.count_for_customer(customer_id).await?;
        let is_default = options.default.unwrap_or(existing == 0);

        let row = self
            .payment_methods
            .create(CreatePaymentMethod {
                id: Uuid::new_v4(),
                customer_id,
                token: token.to_string(),
                method_type: options.method_type.unwrap_or_default().as_str().to_string(),
                last_four: options.last_four,
                brand: options.brand,
                is_default: false,
            })
            .await?;

        if is_default {
            self.payment_methods
                .make_default(customer_id, row.id)
                .await?;
            return Ok(PaymentMethodRow {
                is_default: true,
                ..row
            });
        }
        Ok(row)
    }

    /// Make a payment method the customer's default, clearing the flag on
    /// all siblings in the same operation.
    pub async fn update_default_payment_method<'a, C: Billable>(
        &self,
        customer: &C,
        method: impl Into<MethodRef<'a>>,
    ) -> Result<(), BillingError> {
        let id = self.resolve_method_id(customer, method.into()).await?;
        self.payment_methods
            .make_default(customer.billing_id(), id)
            .await
            .map_err(|e| match e {
                DbError::NotFound => BillingError::PaymentMethodNotFound,
                other => other.into(),
            })
    }

    /// Delete a stored payment method.
    ///
    /// Deletion does not cascade to the remote gateway token.
    pub async fn delete_payment_method<'a, C: Billable>(
        &self,
        customer: &C,
        method: impl Into<MethodRef<'a>>,
    ) -> Result<(), BillingError> {
        let id = self.resolve_method_id(customer, method.into()).await?;
        self.payment_methods
            .delete(customer.billing_id(), id)
            .await
            .map_err(|e| match e {
                DbError::NotFound => BillingError::PaymentMethodNotFound,
                other => other.into(),
            })
    }

    async fn resolve_method_id<C: Billable>(
        &self,
        customer: &C,
        method: MethodRef<'_>,
    ) -> Result<Uuid, BillingError> {
        match method {
            MethodRef::Entity(row) => Ok(row.id),
            MethodRef::Id(id) => {
                let row = self
                    .payment_methods
                    .find_by_id(customer.billing_id(), id)
                    .await?
                    .ok_or(BillingError::PaymentMethodNotFound)?;
                Ok(row.id)
            }
        }
    }

    // =========================================================================
    // Charges and refunds
    // =========================================================================

    /// Charge the customer.
    ///
    /// `amount_minor` is in minor units (cents); the gateway receives the
    /// major-unit decimal. Resolves an explicit token override or the
    /// stored default method.
    #[instrument(skip(self, customer, options), fields(customer = %customer.billing_id(), amount_minor))]
    pub async fn charge<C: Billable>(
        &self,
        customer: &C,
        amount_minor: i64,
        options: ChargeOptions,
    ) -> Result<Value, BillingError> {
        let token = match &options.token {
            Some(token) => token.clone(),
            None => self
                .payment_methods
                .find_default(customer.billing_id())
                .await?
                .map(|row| row.mpc_token)
                .ok_or_else(|| {
                    BillingError::PaymentFailed(
                        "customer has no default payment method".into(),
                    )
                })?,
        };

        let currency = options
            .currency
            .clone()
            .unwrap_or_else(|| self.gateway.default_currency().to_string());

        let mut payload = options.extra;
        payload.insert("Token".into(), Value::String(token));
        payload.insert("Amount".into(), decimal_amount(amount_minor)?);
        payload.insert("Currency".into(), Value::String(currency));

        self.gateway
            .sale(Value::Object(payload))
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))
    }

    /// Refund a prior transaction; full refund when no amount is given.
    #[instrument(skip(self))]
    pub async fn refund(
        &self,
        transaction_id: &str,
        amount_minor: Option<i64>,
    ) -> Result<Value, BillingError> {
        let mut payload = Map::new();
        payload.insert("PnRef".into(), Value::String(transaction_id.to_string()));
        if let Some(minor) = amount_minor {
            payload.insert("Amount".into(), decimal_amount(minor)?);
        }
        self.gateway
            .refund(Value::Object(payload))
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))
    }

    // =========================================================================
    // QuickPayments
    // =========================================================================

    /// Create a one-time QuickPayments token from card details.
    ///
    /// Returns an empty string when the response carries no
    /// `QuickPaymentsToken`; absence is logged, not fatal.
    pub async fn create_quick_payments_token(
        &self,
        card: &CardDetails,
    ) -> Result<String, BillingError> {
        let body = self
            .gateway
            .create_qp_token(card)
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))?;
        Ok(extract_qp_token(&body))
    }

    /// Create a one-time QuickPayments token from check details.
    pub async fn create_quick_payments_token_from_check(
        &self,
        check: &CheckDetails,
    ) -> Result<String, BillingError> {
        let body = self
            .gateway
            .create_qp_token_from_check(check)
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))?;
        Ok(extract_qp_token(&body))
    }

    /// Charge directly with a QuickPayments token.
    #[instrument(skip(self, options))]
    pub async fn charge_with_quick_payments(
        &self,
        qp_token: &str,
        amount_minor: i64,
        options: Map<String, Value>,
    ) -> Result<Value, BillingError> {
        self.gateway
            .qp_charge(qp_token, minor_to_major(amount_minor), &options)
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))
    }

    /// Exchange a QuickPayments token for a reusable token and register it
    /// as a payment method.
    #[instrument(skip(self, customer, options), fields(customer = %customer.billing_id()))]
    pub async fn add_payment_method_from_quick_payments<C: Billable>(
        &self,
        customer: &mut C,
        qp_token: &str,
        options: AddPaymentMethodOptions,
    ) -> Result<PaymentMethodRow, BillingError> {
        let body = self
            .gateway
            .token_from_qp_token(qp_token)
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))?;

        let token = scalar_field(&body, "Token").ok_or_else(|| {
            BillingError::PaymentFailed("QuickPayments exchange returned no Token".into())
        })?;
        self.add_payment_method(customer, &token, options).await
    }

    // =========================================================================
    // Tokenization
    // =========================================================================

    /// Tokenize a card; optionally register the token as a payment method.
    ///
    /// When saving, the last four digits come from the card number echoed
    /// back by the gateway, the brand from its `Brand` field.
    #[instrument(skip(self, customer, card, options), fields(customer = %customer.billing_id(), save))]
    pub async fn tokenize_card<C: Billable>(
        &self,
        customer: &mut C,
        card: &CardDetails,
        save: bool,
        mut options: AddPaymentMethodOptions,
    ) -> Result<Tokenized, BillingError> {
        let customer_key = customer.remote_customer_id().map(str::to_string);
        let body = self
            .gateway
            .create_card_token(card, customer_key.as_deref())
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))?;

        let token = scalar_field(&body, "Token").ok_or_else(|| {
            BillingError::PaymentFailed("tokenization returned no Token".into())
        })?;

        if !save {
            return Ok(Tokenized::Bare(token));
        }

        options.method_type = Some(PaymentMethodType::Card);
        if options.last_four.is_none() {
            options.last_four = scalar_field(&body, "CardNumber").map(|n| last_four(&n));
        }
        if options.brand.is_none() {
            options.brand = scalar_field(&body, "Brand");
        }
        let row = self.add_payment_method(customer, &token, options).await?;
        Ok(Tokenized::Saved(row))
    }

    /// Tokenize a check; optionally register the token as a payment
    /// method, with the last four of the account number as display
    /// metadata.
    #[instrument(skip(self, customer, check, options), fields(customer = %customer.billing_id(), save))]
    pub async fn tokenize_check<C: Billable>(
        &self,
        customer: &mut C,
        check: &CheckDetails,
        save: bool,
        mut options: AddPaymentMethodOptions,
    ) -> Result<Tokenized, BillingError> {
        let customer_key = customer.remote_customer_id().map(str::to_string);
        let body = self
            .gateway
            .create_check_token(check, customer_key.as_deref())
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))?;

        let token = scalar_field(&body, "Token").ok_or_else(|| {
            BillingError::PaymentFailed("tokenization returned no Token".into())
        })?;

        if !save {
            return Ok(Tokenized::Bare(token));
        }

        options.method_type = Some(PaymentMethodType::Check);
        if options.last_four.is_none() {
            options.last_four = Some(last_four(&check.account_number));
        }
        let row = self.add_payment_method(customer, &token, options).await?;
        Ok(Tokenized::Saved(row))
    }

    /// List all gateway tokens stored for the customer.
    ///
    /// A customer without a remote identifier has no tokens; that is an
    /// empty result, not an error.
    pub async fn get_tokens<C: Billable>(&self, customer: &C) -> Result<Value, BillingError> {
        let Some(customer_key) = customer.remote_customer_id() else {
            return Ok(Value::Array(Vec::new()));
        };
        self.gateway
            .customer_tokens(customer_key)
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))
    }

    /// Generate reusable tokens from a prior transaction reference.
    pub async fn tokenize_from_transaction<C: Billable>(
        &self,
        customer: &C,
        pn_ref: &str,
    ) -> Result<Value, BillingError> {
        self.gateway
            .token_from_pn_ref(pn_ref, customer.remote_customer_id())
            .await
            .map_err(|e| BillingError::PaymentFailed(e.to_string()))
    }

    // =========================================================================
    // Subscription lifecycle
    // =========================================================================

    /// Cancel a subscription at the end of its current period.
    ///
    /// Idempotent: a second cancel does not move the recorded end date.
    #[instrument(skip(self, sub), fields(subscription = %sub.id))]
    pub async fn cancel(&self, sub: &SubscriptionRow) -> Result<SubscriptionRow, BillingError> {
        let domain = sub.to_domain();
        if domain.cancelled() {
            debug!("subscription already cancelled");
            return Ok(sub.clone());
        }
        let ends_at = domain.current_period_end(Utc::now());
        self.subscriptions.update_ends_at(sub.id, Some(ends_at)).await?;
        Ok(SubscriptionRow {
            ends_at: Some(ends_at),
            ..sub.clone()
        })
    }

    /// Cancel a subscription immediately, skipping any grace period.
    #[instrument(skip(self, sub), fields(subscription = %sub.id))]
    pub async fn cancel_now(&self, sub: &SubscriptionRow) -> Result<SubscriptionRow, BillingError> {
        if sub.to_domain().ended() {
            return Ok(sub.clone());
        }
        let now = Utc::now();
        self.subscriptions.update_ends_at(sub.id, Some(now)).await?;
        Ok(SubscriptionRow {
            ends_at: Some(now),
            ..sub.clone()
        })
    }

    /// Resume a cancelled subscription while it is still inside its grace
    /// period; invalid in any other state.
    #[instrument(skip(self, sub), fields(subscription = %sub.id))]
    pub async fn resume(&self, sub: &SubscriptionRow) -> Result<SubscriptionRow, BillingError> {
        if !sub.to_domain().on_grace_period() {
            return Err(BillingError::NotOnGracePeriod);
        }
        self.subscriptions.update_ends_at(sub.id, None).await?;
        Ok(SubscriptionRow {
            ends_at: None,
            ..sub.clone()
        })
    }

    // =========================================================================
    // Subscription creation (driven by SubscriptionBuilder)
    // =========================================================================

    pub(crate) async fn create_subscription<C: Billable>(
        &self,
        customer: &mut C,
        builder: crate::builder::SubscriptionBuilder,
        token: Option<&str>,
    ) -> Result<mpc_types::Subscription, BillingError> {
        // The contract needs a funding source; without a token to attach,
        // bail before any remote call when no default method exists.
        match token {
            Some(token) => {
                self.add_payment_method(
                    customer,
                    token,
                    AddPaymentMethodOptions {
                        default: Some(true),
                        ..Default::default()
                    },
                )
                .await
                .map_err(as_api_failure)?;
            }
            None => {
                if self
                    .payment_methods
                    .find_default(customer.billing_id())
                    .await?
                    .is_none()
                {
                    return Err(BillingError::Api(
                        "cannot create a subscription without a default payment method".into(),
                    ));
                }
            }
        }

        let remote_id = self
            .ensure_remote_customer(customer)
            .await
            .map_err(as_api_failure)?;

        let now = Utc::now();
        let trial_end = builder.trial_end(now);
        let start_date = trial_end.unwrap_or(now).format("%Y-%m-%d").to_string();

        let mut payload = builder.metadata.clone();
        payload.insert("CustomerId".into(), Value::String(remote_id));
        payload.insert("Amount".into(), decimal_amount(builder.amount_minor)?);
        payload.insert(
            "Frequency".into(),
            Value::String(builder.frequency.clone()),
        );
        payload.insert("StartDate".into(), Value::String(start_date));
        payload.insert(
            "Description".into(),
            Value::String(
                builder
                    .description
                    .clone()
                    .unwrap_or_else(|| builder.name.clone()),
            ),
        );

        let body = self
            .gateway
            .create_contract(Value::Object(payload))
            .await
            .map_err(|e| BillingError::Api(e.to_string()))?;

        let contract_id = scalar_field(&body, "ContractId");
        if contract_id.is_none() {
            warn!("contract creation response carried no ContractId");
        }

        let row = self
            .subscriptions
            .create(mpc_db::CreateSubscription {
                id: Uuid::new_v4(),
                customer_id: customer.billing_id(),
                name: builder.name,
                plan: builder.plan,
                contract_id,
                trial_ends_at: trial_end,
            })
            .await?;

        Ok(row.to_domain())
    }
}

/// Read a response field that may arrive as a string or a number.
fn scalar_field(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn last_four(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}

fn extract_qp_token(body: &Value) -> String {
    match scalar_field(body, "QuickPaymentsToken") {
        Some(token) => token,
        None => {
            warn!("response carried no QuickPaymentsToken");
            String::new()
        }
    }
}

fn decimal_amount(minor: i64) -> Result<Value, BillingError> {
    serde_json::Number::from_f64(minor_to_major(minor))
        .map(Value::Number)
        .ok_or_else(|| BillingError::PaymentFailed(format!("invalid amount {minor}")))
}

/// Re-wrap payment failures from setup sub-steps into the API failure
/// kind used by subscription creation.
fn as_api_failure(err: BillingError) -> BillingError {
    match err {
        BillingError::PaymentFailed(msg) => BillingError::Api(msg),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_field_reads_strings_and_numbers() {
        let body = json!({ "CustomerId": "cus-1", "ContractId": 42, "Nested": {} });
        assert_eq!(scalar_field(&body, "CustomerId"), Some("cus-1".into()));
        assert_eq!(scalar_field(&body, "ContractId"), Some("42".into()));
        assert_eq!(scalar_field(&body, "Nested"), None);
        assert_eq!(scalar_field(&body, "Missing"), None);
    }

    #[test]
    fn last_four_handles_masked_and_short_values() {
        assert_eq!(last_four("************1111"), "1111");
        assert_eq!(last_four("123456789"), "6789");
        assert_eq!(last_four("12"), "12");
    }
}
