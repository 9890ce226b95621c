//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use mpc_types::{PaymentMethod, PaymentMethodType, Subscription};

/// Payment method row from the database
#[derive(Debug, Clone, FromRow)]
pub struct PaymentMethodRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mpc_token: String,
    #[sqlx(rename = "type")]
    pub method_type: String,
    pub last_four: Option<String>,
    pub brand: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub mpc_plan: String,
    pub mpc_contract_id: Option<String>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentMethodRow {
    /// Convert to the domain payment method type
    pub fn to_domain(&self) -> PaymentMethod {
        PaymentMethod {
            id: self.id,
            customer_id: self.user_id,
            token: self.mpc_token.clone(),
            method_type: PaymentMethodType::from_str_or_card(&self.method_type),
            last_four: self.last_four.clone(),
            brand: self.brand.clone(),
            is_default: self.is_default,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl SubscriptionRow {
    /// Convert to the domain subscription type
    pub fn to_domain(&self) -> Subscription {
        Subscription {
            id: self.id,
            customer_id: self.user_id,
            name: self.name.clone(),
            plan: self.mpc_plan.clone(),
            contract_id: self.mpc_contract_id.clone(),
            trial_ends_at: self.trial_ends_at,
            ends_at: self.ends_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
