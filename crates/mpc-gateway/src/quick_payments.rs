//! QuickPayments: short-lived one-time tokenization
//!
//! QuickPayments tokens represent payment details without a pre-existing
//! customer relationship. Issuance is authorized by a per-merchant key;
//! when no key is configured it is looked up per call.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use mpc_types::{CardDetails, CheckDetails, TokenFormat};

use crate::client::ApiClient;
use crate::error::{GatewayError, GatewayResult};

/// Nested card data for QP token issuance
#[derive(Debug, Serialize)]
struct QpCardData<'a> {
    #[serde(rename = "CardNumber")]
    card_number: &'a str,
    #[serde(rename = "Expiration")]
    expiration: String,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(rename = "Street", skip_serializing_if = "Option::is_none")]
    street: Option<&'a str>,
    #[serde(rename = "PostalCode", skip_serializing_if = "Option::is_none")]
    postal_code: Option<&'a str>,
}

/// Normalized check address; country always present on the wire
#[derive(Debug, Serialize)]
struct QpAddress<'a> {
    #[serde(rename = "Line1", skip_serializing_if = "Option::is_none")]
    line1: Option<&'a str>,
    #[serde(rename = "City", skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,
    #[serde(rename = "State", skip_serializing_if = "Option::is_none")]
    state: Option<&'a str>,
    #[serde(rename = "PostalCode", skip_serializing_if = "Option::is_none")]
    postal_code: Option<&'a str>,
    #[serde(rename = "Country")]
    country: &'a str,
}

/// Nested check data for QP token issuance
#[derive(Debug, Serialize)]
struct QpCheckData<'a> {
    #[serde(rename = "RoutingNumber")]
    routing_number: &'a str,
    #[serde(rename = "AccountNumber")]
    account_number: &'a str,
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(rename = "AccountType", skip_serializing_if = "Option::is_none")]
    account_type: Option<&'static str>,
    #[serde(rename = "CheckType", skip_serializing_if = "Option::is_none")]
    check_type: Option<&'static str>,
    #[serde(rename = "Address", skip_serializing_if = "Option::is_none")]
    address: Option<QpAddress<'a>>,
}

/// QuickPayments service
#[derive(Clone)]
pub struct QuickPaymentsService {
    client: Arc<ApiClient>,
}

impl QuickPaymentsService {
    /// Create a new QuickPayments service sharing an API client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn keys_path(&self) -> String {
        format!(
            "quickpayments/merchants/{}/keys",
            self.client.config().merchant_key
        )
    }

    /// Resolve the QuickPayments key: explicit argument, configured key,
    /// else a per-call merchant key lookup.
    async fn resolve_key(&self, key: Option<&str>) -> GatewayResult<String> {
        if let Some(key) = key {
            return Ok(key.to_string());
        }
        if let Some(key) = &self.client.config().quick_payments_key {
            return Ok(key.clone());
        }
        debug!("no QuickPayments key configured, fetching merchant key");
        let body = self.get_merchant_key().await?;
        match body.get("QuickPaymentsKey").and_then(Value::as_str) {
            Some(key) => Ok(key.to_string()),
            None => Err(GatewayError::missing_field("QuickPaymentsKey", body)),
        }
    }

    /// Issue a one-time QP token from card details
    #[instrument(skip(self, card, key))]
    pub async fn create_qp_token(
        &self,
        card: &CardDetails,
        key: Option<&str>,
    ) -> GatewayResult<Value> {
        if card.number.trim().is_empty() {
            return Err(GatewayError::Validation("card number is required".into()));
        }
        let key = self.resolve_key(key).await?;
        let data = QpCardData {
            card_number: &card.number,
            expiration: card.expiration(),
            name: card.name.as_deref(),
            street: card.street.as_deref(),
            postal_code: card.postal_code.as_deref(),
        };
        let payload = serde_json::json!({
            "QuickPaymentsKey": key,
            "CardData": data,
        });
        self.client.post("quickpayments/qp-tokens", &payload).await
    }

    /// Issue a one-time QP token from check details
    #[instrument(skip(self, check, key))]
    pub async fn create_qp_token_from_check(
        &self,
        check: &CheckDetails,
        key: Option<&str>,
    ) -> GatewayResult<Value> {
        if check.routing_number.trim().is_empty() || check.account_number.trim().is_empty() {
            return Err(GatewayError::Validation(
                "routing and account numbers are required".into(),
            ));
        }
        let key = self.resolve_key(key).await?;
        let data = QpCheckData {
            routing_number: &check.routing_number,
            account_number: &check.account_number,
            name: check.name.as_deref(),
            account_type: check.account_type.map(|t| t.as_str()),
            check_type: check.check_type.map(|t| t.as_str()),
            address: check_address(check),
        };
        let payload = serde_json::json!({
            "QuickPaymentsKey": key,
            "CheckData": data,
        });
        self.client.post("quickpayments/qp-tokens", &payload).await
    }

    /// Exchange a one-time QP token for a reusable token.
    ///
    /// The response carries a `Token` field on success.
    #[instrument(skip(self, key))]
    pub async fn create_token_from_qp_token(
        &self,
        qp_token: &str,
        key: Option<&str>,
        token_format: TokenFormat,
    ) -> GatewayResult<Value> {
        let key = self.resolve_key(key).await?;
        let payload = serde_json::json!({
            "QuickPaymentsKey": key,
            "QuickPaymentsToken": qp_token,
            "TokenFormat": token_format.as_str(),
        });
        self.client.post("quickpayments/tokens", &payload).await
    }

    /// Issue a direct sale transaction keyed by a QP token.
    ///
    /// `amount` is a decimal major-unit currency amount; minor-unit
    /// conversion happens in the orchestration layer above.
    #[instrument(skip(self, options))]
    pub async fn charge(
        &self,
        qp_token: &str,
        amount: f64,
        options: &Map<String, Value>,
    ) -> GatewayResult<Value> {
        let mut payload = options.clone();
        payload.insert("QuickPaymentsToken".into(), Value::String(qp_token.into()));
        payload.insert(
            "Amount".into(),
            serde_json::Number::from_f64(amount)
                .map(Value::Number)
                .ok_or_else(|| GatewayError::Validation(format!("invalid amount {amount}")))?,
        );
        self.client
            .post("api/v2/transactions/bcp", &Value::Object(payload))
            .await
    }

    /// Fetch the merchant's QuickPayments key
    pub async fn get_merchant_key(&self) -> GatewayResult<Value> {
        self.client.get(&self.keys_path(), None).await
    }

    /// Create a QuickPayments key for the merchant.
    ///
    /// Thin pass-through; duplicate-key handling is the gateway's
    /// responsibility.
    pub async fn create_merchant_key(&self) -> GatewayResult<Value> {
        self.client
            .post(&self.keys_path(), &crate::error::empty_body())
            .await
    }

    /// Delete the merchant's QuickPayments key
    pub async fn delete_merchant_key(&self) -> GatewayResult<Value> {
        self.client.delete(&self.keys_path(), None).await
    }
}

/// Build the normalized wire address from check details, defaulting the
/// country to `"USA"`. Returns `None` when no address field is set.
fn check_address(check: &CheckDetails) -> Option<QpAddress<'_>> {
    if check.street.is_none()
        && check.city.is_none()
        && check.state.is_none()
        && check.postal_code.is_none()
        && check.country.is_none()
    {
        return None;
    }
    Some(QpAddress {
        line1: check.street.as_deref(),
        city: check.city.as_deref(),
        state: check.state.as_deref(),
        postal_code: check.postal_code.as_deref(),
        country: check.country.as_deref().unwrap_or("USA"),
    })
}
