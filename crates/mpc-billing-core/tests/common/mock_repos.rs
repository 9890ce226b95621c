//! In-memory repositories for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use mpc_db::{
    CreatePaymentMethod, CreateSubscription, DbError, DbResult, PaymentMethodRepository,
    PaymentMethodRow, SubscriptionRepository, SubscriptionRow,
};

/// In-memory payment method repository
#[derive(Default, Clone)]
pub struct MockPaymentMethodRepository {
    methods: Arc<DashMap<Uuid, PaymentMethodRow>>,
}

impl MockPaymentMethodRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows flagged default for a customer; the invariant says
    /// this never exceeds one.
    pub fn default_count(&self, customer_id: Uuid) -> usize {
        self.methods
            .iter()
            .filter(|r| r.user_id == customer_id && r.is_default)
            .count()
    }
}

#[async_trait]
impl PaymentMethodRepository for MockPaymentMethodRepository {
    async fn find_by_id(&self, customer_id: Uuid, id: Uuid) -> DbResult<Option<PaymentMethodRow>> {
        Ok(self
            .methods
            .get(&id)
            .filter(|r| r.user_id == customer_id)
            .map(|r| r.value().clone()))
    }

    async fn find_default(&self, customer_id: Uuid) -> DbResult<Option<PaymentMethodRow>> {
        Ok(self
            .methods
            .iter()
            .find(|r| r.user_id == customer_id && r.is_default)
            .map(|r| r.value().clone()))
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> DbResult<Vec<PaymentMethodRow>> {
        let mut rows: Vec<_> = self
            .methods
            .iter()
            .filter(|r| r.user_id == customer_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn count_for_customer(&self, customer_id: Uuid) -> DbResult<i64> {
        Ok(self
            .methods
            .iter()
            .filter(|r| r.user_id == customer_id)
            .count() as i64)
    }

    async fn create(&self, method: CreatePaymentMethod) -> DbResult<PaymentMethodRow> {
        let row = PaymentMethodRow {
            id: method.id,
            user_id: method.customer_id,
            mpc_token: method.token,
            method_type: method.method_type,
            last_four: method.last_four,
            brand: method.brand,
            is_default: method.is_default,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.methods.insert(row.id, row.clone());
        Ok(row)
    }

    async fn make_default(&self, customer_id: Uuid, id: Uuid) -> DbResult<()> {
        if !self
            .methods
            .get(&id)
            .is_some_and(|r| r.user_id == customer_id)
        {
            return Err(DbError::NotFound);
        }
        for mut entry in self.methods.iter_mut() {
            if entry.user_id == customer_id {
                entry.is_default = entry.id == id;
                entry.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn delete(&self, customer_id: Uuid, id: Uuid) -> DbResult<()> {
        match self.methods.remove_if(&id, |_, r| r.user_id == customer_id) {
            Some(_) => Ok(()),
            None => Err(DbError::NotFound),
        }
    }
}

/// In-memory subscription repository
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subscriptions: Arc<DashMap<Uuid, SubscriptionRow>>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pre-existing subscription row directly
    #[allow(dead_code)]
    pub fn insert(&self, row: SubscriptionRow) {
        self.subscriptions.insert(row.id, row);
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SubscriptionRow>> {
        Ok(self.subscriptions.get(&id).map(|r| r.value().clone()))
    }

    async fn find_by_name(
        &self,
        customer_id: Uuid,
        name: &str,
    ) -> DbResult<Option<SubscriptionRow>> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|r| r.user_id == customer_id && r.name == name)
            .max_by_key(|r| r.created_at)
            .map(|r| r.value().clone()))
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> DbResult<Vec<SubscriptionRow>> {
        let mut rows: Vec<_> = self
            .subscriptions
            .iter()
            .filter(|r| r.user_id == customer_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        let row = SubscriptionRow {
            id: sub.id,
            user_id: sub.customer_id,
            name: sub.name,
            mpc_plan: sub.plan,
            mpc_contract_id: sub.contract_id,
            trial_ends_at: sub.trial_ends_at,
            ends_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.subscriptions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_ends_at(&self, id: Uuid, ends_at: Option<DateTime<Utc>>) -> DbResult<()> {
        match self.subscriptions.get_mut(&id) {
            Some(mut row) => {
                row.ends_at = ends_at;
                row.updated_at = Utc::now();
                Ok(())
            }
            None => Err(DbError::NotFound),
        }
    }
}
