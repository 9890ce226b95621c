//! MPC Types - Shared domain types
//!
//! Domain types shared between the gateway client, the persistence layer,
//! and the billing orchestration: payment instrument details, tokenization
//! formats, payment methods, and subscriptions with their derived state.

pub mod instrument;
pub mod money;
pub mod payment;
pub mod subscription;

pub use instrument::{AccountType, CardDetails, CheckDetails, CheckType, TokenFormat};
pub use money::minor_to_major;
pub use payment::{PaymentMethod, PaymentMethodType};
pub use subscription::Subscription;
