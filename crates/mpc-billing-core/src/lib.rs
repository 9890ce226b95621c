//! MPC Billing Core - Billing business logic
//!
//! Customer-facing billing operations composed from the gateway services
//! and local persistence: remote customer creation, payment-method
//! management, charges and refunds, QuickPayments delegation, and
//! recurring-billing subscriptions.
//!
//! # Example
//!
//! ```rust,ignore
//! use mpc_billing_core::{BillingService, MpcGateway, SubscriptionBuilder};
//! use mpc_gateway::{ApiClient, GatewayConfig};
//! use std::sync::Arc;
//!
//! let client = Arc::new(ApiClient::new(config)?);
//! let gateway = Arc::new(MpcGateway::new(client));
//! let billing = BillingService::new(gateway, payment_methods, subscriptions);
//!
//! billing.add_payment_method(&mut customer, "tok_1", Default::default()).await?;
//! billing.charge(&customer, 500, Default::default()).await?;
//!
//! SubscriptionBuilder::new("monthly-10", 1000)
//!     .trial_days(14)
//!     .create(&billing, &mut customer, None)
//!     .await?;
//! ```

pub mod builder;
pub mod customer;
pub mod error;
pub mod mpc;
pub mod provider;
pub mod service;

pub use builder::SubscriptionBuilder;
pub use customer::Billable;
pub use error::BillingError;
pub use mpc::MpcGateway;
pub use provider::PaymentGateway;
pub use service::{AddPaymentMethodOptions, BillingService, ChargeOptions, MethodRef, Tokenized};
