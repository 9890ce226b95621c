//! PostgreSQL repository implementations

mod payment_method;
mod subscription;

pub use payment_method::PgPaymentMethodRepository;
pub use subscription::PgSubscriptionRepository;

use sqlx::PgPool;

/// All repositories bundled together for convenience
#[derive(Clone)]
pub struct Repositories {
    /// Payment method repository
    pub payment_methods: PgPaymentMethodRepository,
    /// Subscription repository
    pub subscriptions: PgSubscriptionRepository,
}

impl Repositories {
    /// Create all repositories from a shared pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            payment_methods: PgPaymentMethodRepository::new(pool.clone()),
            subscriptions: PgSubscriptionRepository::new(pool),
        }
    }
}
