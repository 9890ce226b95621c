//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::SubscriptionRow;
use crate::repo::{CreateSubscription, SubscriptionRepository};

const COLUMNS: &str = "id, user_id, name, mpc_plan, mpc_contract_id, trial_ends_at, ends_at, \
                       created_at, updated_at";

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn find_by_id(&self, id: Uuid) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn find_by_name(
        &self,
        customer_id: Uuid,
        name: &str,
    ) -> DbResult<Option<SubscriptionRow>> {
        let sub = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            SELECT {COLUMNS} FROM subscriptions
            WHERE user_id = $1 AND name = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(customer_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sub)
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> DbResult<Vec<SubscriptionRow>> {
        let subs = sqlx::query_as::<_, SubscriptionRow>(&format!(
            "SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subs)
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        let row = sqlx::query_as::<_, SubscriptionRow>(&format!(
            r#"
            INSERT INTO subscriptions (id, user_id, name, mpc_plan, mpc_contract_id, trial_ends_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(sub.id)
        .bind(sub.customer_id)
        .bind(&sub.name)
        .bind(&sub.plan)
        .bind(&sub.contract_id)
        .bind(sub.trial_ends_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_ends_at(&self, id: Uuid, ends_at: Option<DateTime<Utc>>) -> DbResult<()> {
        sqlx::query("UPDATE subscriptions SET ends_at = $1, updated_at = NOW() WHERE id = $2")
            .bind(ends_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
