//! Recording mock gateway
//!
//! Records every call with its payload and replays canned responses;
//! individual operations can be overridden or made to fail.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use mpc_billing_core::PaymentGateway;
use mpc_gateway::{GatewayError, GatewayResult};
use mpc_types::{CardDetails, CheckDetails};

pub struct MockGateway {
    calls: Mutex<Vec<(String, Value)>>,
    responses: Mutex<HashMap<String, Value>>,
    failures: Mutex<HashMap<String, GatewayError>>,
}

impl MockGateway {
    pub fn new() -> Self {
        let mut responses = HashMap::new();
        responses.insert("create_customer".into(), json!({ "CustomerId": "cus-1" }));
        responses.insert("sale".into(), json!({ "PnRef": "pn-1" }));
        responses.insert("refund".into(), json!({}));
        responses.insert(
            "create_contract".into(),
            json!({ "ContractId": "contract-1" }),
        );
        responses.insert(
            "create_card_token".into(),
            json!({ "Token": "tok-card-1", "CardNumber": "************1111", "Brand": "Visa" }),
        );
        responses.insert("create_check_token".into(), json!({ "Token": "tok-check-1" }));
        responses.insert("customer_tokens".into(), json!({ "Tokens": [] }));
        responses.insert(
            "token_from_pn_ref".into(),
            json!({ "CardToken": { "Token": "tok-pn" } }),
        );
        responses.insert(
            "create_qp_token".into(),
            json!({ "QuickPaymentsToken": "qp-1" }),
        );
        responses.insert(
            "create_qp_token_from_check".into(),
            json!({ "QuickPaymentsToken": "qp-2" }),
        );
        responses.insert("token_from_qp_token".into(), json!({ "Token": "tok-from-qp" }));
        responses.insert("qp_charge".into(), json!({ "PnRef": "pn-qp" }));

        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Override the canned response for an operation
    pub fn respond_with(&self, op: &str, body: Value) {
        self.responses.lock().unwrap().insert(op.to_string(), body);
    }

    /// Make an operation fail
    pub fn fail_with(&self, op: &str, err: GatewayError) {
        self.failures.lock().unwrap().insert(op.to_string(), err);
    }

    /// Payloads recorded for an operation
    pub fn calls_for(&self, op: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == op)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Number of calls recorded for an operation
    pub fn call_count(&self, op: &str) -> usize {
        self.calls_for(op).len()
    }

    fn invoke(&self, op: &str, payload: Value) -> GatewayResult<Value> {
        self.calls.lock().unwrap().push((op.to_string(), payload));
        if let Some(err) = self.failures.lock().unwrap().get(op) {
            return Err(err.clone());
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(op)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    fn default_currency(&self) -> &str {
        "USD"
    }

    async fn create_customer(&self, payload: Value) -> GatewayResult<Value> {
        self.invoke("create_customer", payload)
    }

    async fn sale(&self, payload: Value) -> GatewayResult<Value> {
        self.invoke("sale", payload)
    }

    async fn refund(&self, payload: Value) -> GatewayResult<Value> {
        self.invoke("refund", payload)
    }

    async fn create_contract(&self, payload: Value) -> GatewayResult<Value> {
        self.invoke("create_contract", payload)
    }

    async fn create_card_token(
        &self,
        card: &CardDetails,
        customer_key: Option<&str>,
    ) -> GatewayResult<Value> {
        self.invoke(
            "create_card_token",
            json!({ "CardNumber": card.number, "CustomerKey": customer_key }),
        )
    }

    async fn create_check_token(
        &self,
        check: &CheckDetails,
        customer_key: Option<&str>,
    ) -> GatewayResult<Value> {
        self.invoke(
            "create_check_token",
            json!({ "AccountNumber": check.account_number, "CustomerKey": customer_key }),
        )
    }

    async fn customer_tokens(&self, customer_key: &str) -> GatewayResult<Value> {
        self.invoke("customer_tokens", json!({ "CustomerKey": customer_key }))
    }

    async fn token_from_pn_ref(
        &self,
        pn_ref: &str,
        customer_key: Option<&str>,
    ) -> GatewayResult<Value> {
        self.invoke(
            "token_from_pn_ref",
            json!({ "PnRef": pn_ref, "CustomerKey": customer_key }),
        )
    }

    async fn create_qp_token(&self, card: &CardDetails) -> GatewayResult<Value> {
        self.invoke("create_qp_token", json!({ "CardNumber": card.number }))
    }

    async fn create_qp_token_from_check(&self, check: &CheckDetails) -> GatewayResult<Value> {
        self.invoke(
            "create_qp_token_from_check",
            json!({ "AccountNumber": check.account_number }),
        )
    }

    async fn token_from_qp_token(&self, qp_token: &str) -> GatewayResult<Value> {
        self.invoke("token_from_qp_token", json!({ "QuickPaymentsToken": qp_token }))
    }

    async fn qp_charge(
        &self,
        qp_token: &str,
        amount: f64,
        options: &Map<String, Value>,
    ) -> GatewayResult<Value> {
        self.invoke(
            "qp_charge",
            json!({
                "QuickPaymentsToken": qp_token,
                "Amount": amount,
                "Options": Value::Object(options.clone()),
            }),
        )
    }
}
