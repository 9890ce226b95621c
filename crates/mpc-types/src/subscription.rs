//! Subscription type and derived state
//!
//! Only `trial_ends_at` and `ends_at` are stored; everything else
//! (active, on trial, grace period, cancelled, ended) is derived from
//! those two timestamps at query time.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A recurring-billing subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription ID
    pub id: Uuid,
    /// Owning customer ID
    pub customer_id: Uuid,
    /// Customer-scoped label, defaults to "default"
    pub name: String,
    /// Plan identifier
    pub plan: String,
    /// Remote recurring-billing contract ID, once the gateway confirms
    pub contract_id: Option<String>,
    /// When the trial ends, if any
    pub trial_ends_at: Option<DateTime<Utc>>,
    /// When the subscription ends; null means uncancelled
    pub ends_at: Option<DateTime<Utc>>,
    /// When the subscription was created
    pub created_at: DateTime<Utc>,
    /// When the subscription was last updated
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Whether the subscription is usable: never cancelled, or cancelled
    /// but still inside the grace period.
    pub fn active(&self) -> bool {
        self.active_at(Utc::now())
    }

    /// Whether the subscription is in its trial period.
    pub fn on_trial(&self) -> bool {
        self.on_trial_at(Utc::now())
    }

    /// Whether a cancellation has been recorded but has not taken effect.
    pub fn on_grace_period(&self) -> bool {
        self.on_grace_period_at(Utc::now())
    }

    /// Whether a cancellation has been recorded at all.
    pub fn cancelled(&self) -> bool {
        self.ends_at.is_some()
    }

    /// Whether the subscription has fully ended.
    pub fn ended(&self) -> bool {
        self.ended_at_time(Utc::now())
    }

    pub(crate) fn active_at(&self, now: DateTime<Utc>) -> bool {
        match self.ends_at {
            None => true,
            Some(ends_at) => ends_at > now,
        }
    }

    pub(crate) fn on_trial_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.trial_ends_at, Some(t) if t > now)
    }

    pub(crate) fn on_grace_period_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.ends_at, Some(t) if t > now)
    }

    pub(crate) fn ended_at_time(&self, now: DateTime<Utc>) -> bool {
        matches!(self.ends_at, Some(t) if t <= now)
    }

    /// The date a cancellation takes effect: the trial end while on trial,
    /// otherwise the next monthly anniversary of the creation date.
    pub fn current_period_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        if let Some(trial_end) = self.trial_ends_at {
            if trial_end > now {
                return trial_end;
            }
        }
        let mut anniversary = self.created_at;
        while anniversary <= now {
            anniversary = anniversary
                .checked_add_months(Months::new(1))
                .unwrap_or(anniversary + chrono::Duration::days(30));
        }
        anniversary
    }
}
