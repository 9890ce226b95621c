//! Gateway API client
//!
//! All remote calls funnel through [`ApiClient::request`], which attaches
//! the cached bearer token, serializes the JSON body and query, parses the
//! response, and normalizes every failure into [`GatewayError`].

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use crate::config::GatewayConfig;
use crate::error::{empty_body, GatewayError, GatewayResult};

/// Fixed cache key for the bearer token
const AUTH_TOKEN_CACHE_KEY: &str = "mpc_bearer_token";

/// Bearer tokens are cached for one hour
const AUTH_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Gateway API client
///
/// Cheap to clone through an `Arc`; the token cache is shared, so all
/// services hanging off one client reuse a single authenticated session.
pub struct ApiClient {
    http: reqwest::Client,
    config: GatewayConfig,
    // Single-entry cache; moka's `try_get_with` guarantees at most one
    // in-flight authenticate call resolves a cold cache.
    token_cache: Cache<&'static str, String>,
}

impl ApiClient {
    /// Create a new client from the gateway config
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Validation(format!("http client: {e}")))?;

        let token_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(AUTH_TOKEN_TTL)
            .build();

        Ok(Self {
            http,
            config,
            token_cache,
        })
    }

    /// The config this client was built with
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Drop the cached bearer token, forcing re-authentication on the
    /// next call.
    pub async fn invalidate_token(&self) {
        self.token_cache.invalidate(&AUTH_TOKEN_CACHE_KEY).await;
    }

    /// GET a path with optional query parameters
    pub async fn get(&self, path: &str, query: Option<&[(String, String)]>) -> GatewayResult<Value> {
        self.request(Method::GET, path, None, query).await
    }

    /// POST a JSON body to a path
    pub async fn post(&self, path: &str, body: &Value) -> GatewayResult<Value> {
        self.request(Method::POST, path, Some(body), None).await
    }

    /// PUT a JSON body to a path (full replacement semantics)
    pub async fn put(&self, path: &str, body: &Value) -> GatewayResult<Value> {
        self.request(Method::PUT, path, Some(body), None).await
    }

    /// PATCH a JSON body to a path (partial merge semantics)
    pub async fn patch(&self, path: &str, body: &Value) -> GatewayResult<Value> {
        self.request(Method::PATCH, path, Some(body), None).await
    }

    /// DELETE a path with optional query parameters
    pub async fn delete(
        &self,
        path: &str,
        query: Option<&[(String, String)]>,
    ) -> GatewayResult<Value> {
        self.request(Method::DELETE, path, None, query).await
    }

    /// Send an authenticated request and parse the JSON response.
    ///
    /// Attaches `Authorization: Bearer <token>` plus JSON content-type and
    /// accept headers; the body is serialized only when non-empty; the
    /// response body parses to an empty mapping when empty or unparseable.
    #[instrument(skip(self, body, query), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: Option<&[(String, String)]>,
    ) -> GatewayResult<Value> {
        let token = self.bearer_token().await?;
        let url = self.url(path);

        let mut request = self
            .http
            .request(method, &url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if let Some(body) = body {
            if !is_empty_mapping(body) {
                request = request.json(body);
            }
        }
        if let Some(query) = query {
            if !query.is_empty() {
                request = request.query(query);
            }
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "gateway request failed");
            GatewayError::transport(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let parsed = parse_body(&text);

        if !status.is_success() {
            error!(status = %status, "gateway returned error response");
            return Err(GatewayError::from_response(
                format!("gateway request failed with HTTP {status}"),
                parsed,
            ));
        }

        debug!(status = %status, "gateway request succeeded");
        Ok(parsed)
    }

    /// Get the cached bearer token, authenticating on a cold cache.
    ///
    /// Concurrent callers racing on an empty cache share one authenticate
    /// round trip; the losers await the winner's result.
    async fn bearer_token(&self) -> GatewayResult<String> {
        self.token_cache
            .try_get_with(AUTH_TOKEN_CACHE_KEY, self.authenticate())
            .await
            .map_err(|e: Arc<GatewayError>| (*e).clone())
    }

    /// Exchange the configured credentials for a bearer token.
    #[instrument(skip(self))]
    async fn authenticate(&self) -> GatewayResult<String> {
        debug!("authenticating with gateway");

        let response = self
            .http
            .post(self.url("api/authenticate"))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&json!({
                "Username": self.config.username,
                "Password": self.config.password,
            }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "authentication request failed");
                GatewayError::transport(e.to_string())
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let parsed = parse_body(&text);

        if !status.is_success() {
            error!(status = %status, "authentication rejected");
            return Err(GatewayError::from_response(
                format!("authentication failed with HTTP {status}"),
                parsed,
            ));
        }

        match parsed.get("Token").and_then(Value::as_str) {
            Some(token) => Ok(token.to_string()),
            None => {
                error!("authentication response missing Token field");
                Err(GatewayError::missing_field("Token", parsed))
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }
}

/// Parse a response body, yielding an empty mapping when the body is empty
/// or not valid JSON.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return empty_body();
    }
    serde_json::from_str(text).unwrap_or_else(|_| empty_body())
}

fn is_empty_mapping(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
