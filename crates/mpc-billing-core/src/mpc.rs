//! MPC gateway provider implementation

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use mpc_gateway::{
    ApiClient, GatewayConfig, GatewayResult, QuickPaymentsService, TokenService,
};
use mpc_types::{CardDetails, CheckDetails, TokenFormat};

use crate::provider::PaymentGateway;

/// MPC payment gateway
///
/// Thin composition of the gateway services behind the
/// [`PaymentGateway`] seam.
#[derive(Clone)]
pub struct MpcGateway {
    client: Arc<ApiClient>,
    tokens: TokenService,
    quick_payments: QuickPaymentsService,
}

impl MpcGateway {
    /// Create a gateway from a shared API client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            tokens: TokenService::new(Arc::clone(&client)),
            quick_payments: QuickPaymentsService::new(Arc::clone(&client)),
            client,
        }
    }

    /// Create a gateway directly from config
    pub fn from_config(config: GatewayConfig) -> GatewayResult<Self> {
        Ok(Self::new(Arc::new(ApiClient::new(config)?)))
    }

    /// The underlying token service, for direct token CRUD
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// The underlying QuickPayments service
    pub fn quick_payments(&self) -> &QuickPaymentsService {
        &self.quick_payments
    }
}

#[async_trait]
impl PaymentGateway for MpcGateway {
    fn default_currency(&self) -> &str {
        &self.client.config().currency
    }

    async fn create_customer(&self, payload: Value) -> GatewayResult<Value> {
        self.client.post("api/customers", &payload).await
    }

    async fn sale(&self, payload: Value) -> GatewayResult<Value> {
        self.client.post("api/v2/transaction", &payload).await
    }

    async fn refund(&self, payload: Value) -> GatewayResult<Value> {
        self.client.post("api/v2/refund", &payload).await
    }

    async fn create_contract(&self, payload: Value) -> GatewayResult<Value> {
        self.client
            .post("api/recurringbillingcontracts", &payload)
            .await
    }

    async fn create_card_token(
        &self,
        card: &CardDetails,
        customer_key: Option<&str>,
    ) -> GatewayResult<Value> {
        self.tokens
            .create_card_token(card, customer_key, TokenFormat::Uid)
            .await
    }

    async fn create_check_token(
        &self,
        check: &CheckDetails,
        customer_key: Option<&str>,
    ) -> GatewayResult<Value> {
        self.tokens
            .create_check_token(check, customer_key, TokenFormat::Uid)
            .await
    }

    async fn customer_tokens(&self, customer_key: &str) -> GatewayResult<Value> {
        self.tokens.get_customer_tokens(customer_key).await
    }

    async fn token_from_pn_ref(
        &self,
        pn_ref: &str,
        customer_key: Option<&str>,
    ) -> GatewayResult<Value> {
        self.tokens
            .create_token_from_pn_ref(pn_ref, customer_key, TokenFormat::Uid)
            .await
    }

    async fn create_qp_token(&self, card: &CardDetails) -> GatewayResult<Value> {
        self.quick_payments.create_qp_token(card, None).await
    }

    async fn create_qp_token_from_check(&self, check: &CheckDetails) -> GatewayResult<Value> {
        self.quick_payments
            .create_qp_token_from_check(check, None)
            .await
    }

    async fn token_from_qp_token(&self, qp_token: &str) -> GatewayResult<Value> {
        self.quick_payments
            .create_token_from_qp_token(qp_token, None, TokenFormat::Uid)
            .await
    }

    async fn qp_charge(
        &self,
        qp_token: &str,
        amount: f64,
        options: &Map<String, Value>,
    ) -> GatewayResult<Value> {
        self.quick_payments.charge(qp_token, amount, options).await
    }
}
