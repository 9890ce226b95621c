//! Gateway errors
//!
//! Every failed remote call is normalized into a single typed failure
//! carrying a human-readable message and the full parsed response body, so
//! callers can inspect gateway-specific error codes.

use serde_json::Value;
use thiserror::Error;

/// Result alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway errors
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// A remote call failed (non-2xx status, network error, or a response
    /// missing a required field). `body` is the parsed response body, or
    /// an empty mapping when it was unparseable.
    #[error("gateway error: {message}")]
    Api {
        /// Human-readable message, preferring the gateway's
        /// `ResponseStatus.Message` field
        message: String,
        /// Full parsed response body
        body: Value,
    },

    /// The caller supplied an incomplete or malformed payload; no remote
    /// call was made.
    #[error("invalid request: {0}")]
    Validation(String),
}

impl GatewayError {
    /// Build an `Api` error from a transport-level failure with no body.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            body: empty_body(),
        }
    }

    /// Build an `Api` error from a failed response.
    ///
    /// Prefers the nested `ResponseStatus.Message` field of the parsed
    /// body when present, else falls back to `fallback` (typically the
    /// HTTP status line).
    pub fn from_response(fallback: impl Into<String>, body: Value) -> Self {
        let message = response_status_message(&body)
            .map(str::to_string)
            .unwrap_or_else(|| fallback.into());
        Self::Api { message, body }
    }

    /// Build an `Api` error for a 2xx response missing an expected field.
    pub fn missing_field(field: &str, body: Value) -> Self {
        Self::Api {
            message: format!("gateway response missing expected field `{field}`"),
            body,
        }
    }

    /// The parsed response body for `Api` errors, when one exists.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Api { body, .. } => Some(body),
            Self::Validation(_) => None,
        }
    }
}

/// Extract the gateway's nested `ResponseStatus.Message` field, if present.
pub fn response_status_message(body: &Value) -> Option<&str> {
    body.get("ResponseStatus")?.get("Message")?.as_str()
}

pub(crate) fn empty_body() -> Value {
    Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_response_status_message() {
        let body = json!({
            "ResponseStatus": { "ErrorCode": "card_declined", "Message": "Card declined" }
        });
        let err = GatewayError::from_response("HTTP 402", body.clone());
        assert_eq!(err.to_string(), "gateway error: Card declined");
        assert_eq!(err.body(), Some(&body));
    }

    #[test]
    fn falls_back_to_transport_text() {
        let err = GatewayError::from_response("HTTP 500 Internal Server Error", json!({}));
        assert_eq!(
            err.to_string(),
            "gateway error: HTTP 500 Internal Server Error"
        );
    }

    #[test]
    fn ignores_non_string_message() {
        let body = json!({ "ResponseStatus": { "Message": 42 } });
        let err = GatewayError::from_response("HTTP 400", body);
        assert_eq!(err.to_string(), "gateway error: HTTP 400");
    }
}
