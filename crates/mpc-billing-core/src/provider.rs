//! Payment gateway abstraction
//!
//! Narrow seam between the orchestration layer and the concrete gateway
//! client, so tests can substitute a recording double and the endpoint
//! paths stay out of the core design.

use async_trait::async_trait;
use serde_json::{Map, Value};

use mpc_gateway::GatewayResult;
use mpc_types::{CardDetails, CheckDetails};

/// Remote operations the billing orchestration depends on
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Default ISO currency code for charges lacking an override
    fn default_currency(&self) -> &str;

    /// Create a remote customer
    async fn create_customer(&self, payload: Value) -> GatewayResult<Value>;

    /// Issue a sale transaction
    async fn sale(&self, payload: Value) -> GatewayResult<Value>;

    /// Issue a refund
    async fn refund(&self, payload: Value) -> GatewayResult<Value>;

    /// Create a recurring-billing contract
    async fn create_contract(&self, payload: Value) -> GatewayResult<Value>;

    /// Create a reusable card token
    async fn create_card_token(
        &self,
        card: &CardDetails,
        customer_key: Option<&str>,
    ) -> GatewayResult<Value>;

    /// Create a reusable check token
    async fn create_check_token(
        &self,
        check: &CheckDetails,
        customer_key: Option<&str>,
    ) -> GatewayResult<Value>;

    /// List all tokens stored for a remote customer
    async fn customer_tokens(&self, customer_key: &str) -> GatewayResult<Value>;

    /// Convert a prior transaction reference into reusable tokens
    async fn token_from_pn_ref(
        &self,
        pn_ref: &str,
        customer_key: Option<&str>,
    ) -> GatewayResult<Value>;

    /// Issue a one-time QuickPayments token from card details
    async fn create_qp_token(&self, card: &CardDetails) -> GatewayResult<Value>;

    /// Issue a one-time QuickPayments token from check details
    async fn create_qp_token_from_check(&self, check: &CheckDetails) -> GatewayResult<Value>;

    /// Exchange a QuickPayments token for a reusable token
    async fn token_from_qp_token(&self, qp_token: &str) -> GatewayResult<Value>;

    /// Charge directly against a QuickPayments token
    async fn qp_charge(
        &self,
        qp_token: &str,
        amount: f64,
        options: &Map<String, Value>,
    ) -> GatewayResult<Value>;
}
