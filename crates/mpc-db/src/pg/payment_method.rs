//! PostgreSQL payment method repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::PaymentMethodRow;
use crate::repo::{CreatePaymentMethod, PaymentMethodRepository};

const COLUMNS: &str = "id, user_id, mpc_token, type, last_four, brand, is_default, \
                       created_at, updated_at";

/// PostgreSQL payment method repository
#[derive(Clone)]
pub struct PgPaymentMethodRepository {
    pool: PgPool,
}

impl PgPaymentMethodRepository {
    /// Create a new payment method repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentMethodRepository for PgPaymentMethodRepository {
    async fn find_by_id(&self, customer_id: Uuid, id: Uuid) -> DbResult<Option<PaymentMethodRow>> {
        let row = sqlx::query_as::<_, PaymentMethodRow>(&format!(
            "SELECT {COLUMNS} FROM payment_methods WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_default(&self, customer_id: Uuid) -> DbResult<Option<PaymentMethodRow>> {
        let row = sqlx::query_as::<_, PaymentMethodRow>(&format!(
            "SELECT {COLUMNS} FROM payment_methods WHERE user_id = $1 AND is_default"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> DbResult<Vec<PaymentMethodRow>> {
        let rows = sqlx::query_as::<_, PaymentMethodRow>(&format!(
            "SELECT {COLUMNS} FROM payment_methods WHERE user_id = $1 ORDER BY created_at"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_for_customer(&self, customer_id: Uuid) -> DbResult<i64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM payment_methods WHERE user_id = $1")
                .bind(customer_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.0)
    }

    async fn create(&self, method: CreatePaymentMethod) -> DbResult<PaymentMethodRow> {
        let row = sqlx::query_as::<_, PaymentMethodRow>(&format!(
            r#"
            INSERT INTO payment_methods (id, user_id, mpc_token, type, last_four, brand, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(method.id)
        .bind(method.customer_id)
        .bind(&method.token)
        .bind(&method.method_type)
        .bind(&method.last_four)
        .bind(&method.brand)
        .bind(method.is_default)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn make_default(&self, customer_id: Uuid, id: Uuid) -> DbResult<()> {
        // Clear-all-then-set-one inside one transaction, so readers never
        // observe zero or multiple defaults.
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE payment_methods SET is_default = FALSE WHERE user_id = $1")
            .bind(customer_id)
            .execute(&mut *tx)
            .await?;

        let updated =
            sqlx::query("UPDATE payment_methods SET is_default = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(customer_id)
                .execute(&mut *tx)
                .await?;

        if updated.rows_affected() != 1 {
            // Rolls back on drop, leaving the previous default intact.
            return Err(DbError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, customer_id: Uuid, id: Uuid) -> DbResult<()> {
        let deleted = sqlx::query("DELETE FROM payment_methods WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}
