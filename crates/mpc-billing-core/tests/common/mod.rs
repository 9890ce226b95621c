//! Shared test doubles

pub mod customer;
pub mod mock_gateway;
pub mod mock_repos;

use std::sync::Arc;

use mpc_billing_core::BillingService;

pub use customer::TestCustomer;
pub use mock_gateway::MockGateway;
pub use mock_repos::{MockPaymentMethodRepository, MockSubscriptionRepository};

/// A billing service wired up with in-memory doubles
pub type TestBillingService =
    BillingService<MockGateway, MockPaymentMethodRepository, MockSubscriptionRepository>;

pub struct TestHarness {
    pub gateway: Arc<MockGateway>,
    pub payment_methods: Arc<MockPaymentMethodRepository>,
    pub subscriptions: Arc<MockSubscriptionRepository>,
    pub service: TestBillingService,
}

impl TestHarness {
    pub fn new() -> Self {
        let gateway = Arc::new(MockGateway::new());
        let payment_methods = Arc::new(MockPaymentMethodRepository::new());
        let subscriptions = Arc::new(MockSubscriptionRepository::new());
        let service = BillingService::new(
            Arc::clone(&gateway),
            Arc::clone(&payment_methods),
            Arc::clone(&subscriptions),
        );
        Self {
            gateway,
            payment_methods,
            subscriptions,
            service,
        }
    }
}
