//! Reusable token CRUD
//!
//! Card and check tokenization scoped to a merchant. Payloads are typed
//! structs that omit unset optional fields, preserving the gateway's
//! "send only what's provided" contract.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use mpc_types::{CardDetails, CheckDetails, TokenFormat};

use crate::client::ApiClient;
use crate::error::{GatewayError, GatewayResult};

/// Card token creation/replacement payload
#[derive(Debug, Serialize)]
struct CardTokenRequest<'a> {
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
    #[serde(rename = "CustomerKey", skip_serializing_if = "Option::is_none")]
    customer_key: Option<&'a str>,
    #[serde(rename = "TokenFormat")]
    token_format: &'static str,
}

/// Check token creation/replacement payload
#[derive(Debug, Serialize)]
struct CheckTokenRequest<'a> {
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
    #[serde(rename = "CustomerKey", skip_serializing_if = "Option::is_none")]
    customer_key: Option<&'a str>,
    #[serde(rename = "TokenFormat")]
    token_format: &'static str,
}

/// PnRef conversion payload
#[derive(Debug, Serialize)]
struct PnRefTokenRequest<'a> {
    #[serde(rename = "PnRef")]
    pn_ref: &'a str,
    #[serde(rename = "CustomerKey", skip_serializing_if = "Option::is_none")]
    customer_key: Option<&'a str>,
    #[serde(rename = "TokenFormat")]
    token_format: &'static str,
}

/// Reusable card/check token service
#[derive(Clone)]
pub struct TokenService {
    client: Arc<ApiClient>,
}

impl TokenService {
    /// Create a new token service sharing an API client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn cards_path(&self) -> String {
        format!(
            "merchants/{}/tokens/cards",
            self.client.config().merchant_key
        )
    }

    fn checks_path(&self) -> String {
        format!(
            "merchants/{}/tokens/checks",
            self.client.config().merchant_key
        )
    }

    fn card_payload<'a>(
        card: &'a CardDetails,
        customer_key: Option<&'a str>,
        token_format: TokenFormat,
    ) -> GatewayResult<CardTokenRequest<'a>> {
        if card.number.trim().is_empty() {
            return Err(GatewayError::Validation("card number is required".into()));
        }
        if !(1..=12).contains(&card.exp_month) {
            return Err(GatewayError::Validation(format!(
                "invalid expiration month {}",
                card.exp_month
            )));
        }
        Ok(CardTokenRequest {
            card_number: &card.number,
            expiration: card.expiration(),
            name: card.name.as_deref(),
            street: card.street.as_deref(),
            postal_code: card.postal_code.as_deref(),
            customer_key,
            token_format: token_format.as_str(),
        })
    }

    fn check_payload<'a>(
        check: &'a CheckDetails,
        customer_key: Option<&'a str>,
        token_format: TokenFormat,
    ) -> GatewayResult<CheckTokenRequest<'a>> {
        if check.routing_number.trim().is_empty() {
            return Err(GatewayError::Validation("routing number is required".into()));
        }
        if check.account_number.trim().is_empty() {
            return Err(GatewayError::Validation("account number is required".into()));
        }
        Ok(CheckTokenRequest {
            routing_number: &check.routing_number,
            account_number: &check.account_number,
            name: check.name.as_deref(),
            account_type: check.account_type.map(|t| t.as_str()),
            check_type: check.check_type.map(|t| t.as_str()),
            customer_key,
            token_format: token_format.as_str(),
        })
    }

    /// Create a reusable card token.
    ///
    /// The response carries a `Token` field on success.
    #[instrument(skip(self, card))]
    pub async fn create_card_token(
        &self,
        card: &CardDetails,
        customer_key: Option<&str>,
        token_format: TokenFormat,
    ) -> GatewayResult<Value> {
        let payload = Self::card_payload(card, customer_key, token_format)?;
        debug!("creating card token");
        self.client
            .post(&self.cards_path(), &to_body(&payload)?)
            .await
    }

    /// Create a reusable check token.
    #[instrument(skip(self, check))]
    pub async fn create_check_token(
        &self,
        check: &CheckDetails,
        customer_key: Option<&str>,
        token_format: TokenFormat,
    ) -> GatewayResult<Value> {
        let payload = Self::check_payload(check, customer_key, token_format)?;
        debug!("creating check token");
        self.client
            .post(&self.checks_path(), &to_body(&payload)?)
            .await
    }

    /// Fetch a single card token
    pub async fn get_card_token(&self, token: &str) -> GatewayResult<Value> {
        self.client
            .get(&format!("{}/{token}", self.cards_path()), None)
            .await
    }

    /// Fetch a single check token
    pub async fn get_check_token(&self, token: &str) -> GatewayResult<Value> {
        self.client
            .get(&format!("{}/{token}", self.checks_path()), None)
            .await
    }

    /// List all card tokens for the merchant
    pub async fn get_card_tokens(&self) -> GatewayResult<Value> {
        self.client.get(&self.cards_path(), None).await
    }

    /// List all check tokens for the merchant
    pub async fn get_check_tokens(&self) -> GatewayResult<Value> {
        self.client.get(&self.checks_path(), None).await
    }

    /// Partially update a card token (merge semantics)
    #[instrument(skip(self, fields))]
    pub async fn update_card_token(&self, token: &str, fields: &Value) -> GatewayResult<Value> {
        self.client
            .patch(&format!("{}/{token}", self.cards_path()), fields)
            .await
    }

    /// Partially update a check token (merge semantics)
    #[instrument(skip(self, fields))]
    pub async fn update_check_token(&self, token: &str, fields: &Value) -> GatewayResult<Value> {
        self.client
            .patch(&format!("{}/{token}", self.checks_path()), fields)
            .await
    }

    /// Fully replace a card token
    #[instrument(skip(self, card))]
    pub async fn replace_card_token(
        &self,
        token: &str,
        card: &CardDetails,
        customer_key: Option<&str>,
        token_format: TokenFormat,
    ) -> GatewayResult<Value> {
        let payload = Self::card_payload(card, customer_key, token_format)?;
        self.client
            .put(
                &format!("{}/{token}", self.cards_path()),
                &to_body(&payload)?,
            )
            .await
    }

    /// Fully replace a check token
    #[instrument(skip(self, check))]
    pub async fn replace_check_token(
        &self,
        token: &str,
        check: &CheckDetails,
        customer_key: Option<&str>,
        token_format: TokenFormat,
    ) -> GatewayResult<Value> {
        let payload = Self::check_payload(check, customer_key, token_format)?;
        self.client
            .put(
                &format!("{}/{token}", self.checks_path()),
                &to_body(&payload)?,
            )
            .await
    }

    /// Delete one or more card tokens in a single call.
    ///
    /// Identifiers are joined into a comma-separated list; a failure
    /// aborts the whole call, with no partial-success reporting.
    #[instrument(skip(self, tokens))]
    pub async fn delete_card_tokens(&self, tokens: &[&str]) -> GatewayResult<Value> {
        let joined = join_tokens(tokens)?;
        self.client
            .delete(&format!("{}/{joined}", self.cards_path()), None)
            .await
    }

    /// Delete one or more check tokens in a single call
    #[instrument(skip(self, tokens))]
    pub async fn delete_check_tokens(&self, tokens: &[&str]) -> GatewayResult<Value> {
        let joined = join_tokens(tokens)?;
        self.client
            .delete(&format!("{}/{joined}", self.checks_path()), None)
            .await
    }

    /// List all tokens (card and check) stored for a customer
    pub async fn get_customer_tokens(&self, customer_key: &str) -> GatewayResult<Value> {
        self.client
            .get(
                &format!(
                    "merchants/{}/customers/{customer_key}/tokens",
                    self.client.config().merchant_key
                ),
                None,
            )
            .await
    }

    /// Convert a prior transaction reference into reusable tokens.
    ///
    /// The response may contain `CardToken` and/or `CheckToken`
    /// sub-objects depending on the original transaction.
    #[instrument(skip(self))]
    pub async fn create_token_from_pn_ref(
        &self,
        pn_ref: &str,
        customer_key: Option<&str>,
        token_format: TokenFormat,
    ) -> GatewayResult<Value> {
        if pn_ref.trim().is_empty() {
            return Err(GatewayError::Validation("pn_ref is required".into()));
        }
        let payload = PnRefTokenRequest {
            pn_ref,
            customer_key,
            token_format: token_format.as_str(),
        };
        self.client
            .post(
                &format!("merchants/{}/tokens", self.client.config().merchant_key),
                &to_body(&payload)?,
            )
            .await
    }

    /// Legacy alias for [`create_card_token`](Self::create_card_token)
    pub async fn create_token(
        &self,
        card: &CardDetails,
        customer_key: Option<&str>,
        token_format: TokenFormat,
    ) -> GatewayResult<Value> {
        self.create_card_token(card, customer_key, token_format).await
    }

    /// Legacy lookup: try the card path first, fall back to the check
    /// path on failure. Accepts the double round trip by policy.
    #[instrument(skip(self))]
    pub async fn get_token(&self, token: &str) -> GatewayResult<Value> {
        match self.get_card_token(token).await {
            Ok(body) => Ok(body),
            Err(card_err) => {
                warn!(error = %card_err, "card token lookup failed, trying check path");
                self.get_check_token(token).await
            }
        }
    }

    /// Legacy delete: try the card path first, fall back to the check
    /// path on failure.
    #[instrument(skip(self))]
    pub async fn delete_token(&self, token: &str) -> GatewayResult<Value> {
        match self.delete_card_tokens(&[token]).await {
            Ok(body) => Ok(body),
            Err(card_err) => {
                warn!(error = %card_err, "card token delete failed, trying check path");
                self.delete_check_tokens(&[token]).await
            }
        }
    }
}

fn to_body<T: Serialize>(payload: &T) -> GatewayResult<Value> {
    serde_json::to_value(payload).map_err(|e| GatewayError::Validation(e.to_string()))
}

fn join_tokens(tokens: &[&str]) -> GatewayResult<String> {
    if tokens.is_empty() {
        return Err(GatewayError::Validation(
            "at least one token is required".into(),
        ));
    }
    Ok(tokens.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn card_payload_omits_unset_optionals() {
        let card = CardDetails::new("4111111111111111", 12, 29);
        let payload = TokenService::card_payload(&card, None, TokenFormat::Uid).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "CardNumber": "4111111111111111",
                "Expiration": "1229",
                "TokenFormat": "Uid",
            })
        );
    }

    #[test]
    fn card_payload_includes_customer_key_when_provided() {
        let card = CardDetails::new("4111111111111111", 4, 30).with_name("Ada Lovelace");
        let payload =
            TokenService::card_payload(&card, Some("cust-1"), TokenFormat::Uid).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["CustomerKey"], "cust-1");
        assert_eq!(value["Name"], "Ada Lovelace");
        assert_eq!(value["Expiration"], "0430");
    }

    #[test]
    fn card_payload_rejects_missing_number() {
        let card = CardDetails::new("", 12, 29);
        let err = TokenService::card_payload(&card, None, TokenFormat::Uid).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn card_payload_rejects_bad_month() {
        let card = CardDetails::new("4111111111111111", 13, 29);
        let err = TokenService::card_payload(&card, None, TokenFormat::Uid).unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[test]
    fn check_payload_maps_enums_to_wire_names() {
        use mpc_types::{AccountType, CheckType};
        let check = CheckDetails::new("021000021", "123456789")
            .with_account_type(AccountType::Checking)
            .with_check_type(CheckType::Personal);
        let payload = TokenService::check_payload(&check, None, TokenFormat::Uid).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["AccountType"], "Checking");
        assert_eq!(value["CheckType"], "Personal");
        assert!(value.get("Name").is_none());
    }

    #[test]
    fn join_tokens_builds_comma_list() {
        assert_eq!(join_tokens(&["a", "b", "c"]).unwrap(), "a,b,c");
        assert_eq!(join_tokens(&["only"]).unwrap(), "only");
        assert!(join_tokens(&[]).is_err());
    }
}
