//! MPC Gateway - API client for the MPC payment gateway
//!
//! Single chokepoint for all remote gateway calls: bearer-token
//! authentication with a cached, single-flight renewal; a uniform
//! request/response/error pipeline; reusable card/check tokenization;
//! and short-lived QuickPayments tokenization with direct charging.
//!
//! # Example
//!
//! ```rust,ignore
//! use mpc_gateway::{ApiClient, GatewayConfig, TokenService};
//! use mpc_types::CardDetails;
//! use std::sync::Arc;
//!
//! let config = GatewayConfig::new("user", "pass", 123456, "https://gateway.example.com");
//! let client = Arc::new(ApiClient::new(config)?);
//! let tokens = TokenService::new(Arc::clone(&client));
//!
//! let card = CardDetails::new("4111111111111111", 12, 29).with_name("Ada Lovelace");
//! let response = tokens.create_card_token(&card, None, Default::default()).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod quick_payments;
pub mod tokens;

pub use client::ApiClient;
pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use quick_payments::QuickPaymentsService;
pub use tokens::TokenService;
