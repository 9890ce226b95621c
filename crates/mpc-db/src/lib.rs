//! MPC DB - Database abstractions
//!
//! SQLx-based persistence for payment-method and subscription records.
//!
//! # Example
//!
//! ```rust,ignore
//! use mpc_db::{create_pool, Repositories};
//!
//! let pool = create_pool("postgres://localhost/billing").await?;
//! let repos = Repositories::new(pool);
//!
//! let methods = repos.payment_methods.list_for_customer(customer_id).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::{PaymentMethodRow, SubscriptionRow};
pub use pg::Repositories;
pub use pool::{create_pool, DbPool};
pub use repo::{
    CreatePaymentMethod, CreateSubscription, PaymentMethodRepository, SubscriptionRepository,
};
