//! Billable customer abstraction
//!
//! Any customer-like host entity implements this trait; the orchestration
//! logic is written once against it. The remote customer identifier lives
//! wherever the host application keeps it; absence signals that no remote
//! customer exists yet.

use async_trait::async_trait;
use uuid::Uuid;

use mpc_db::DbResult;

/// A customer entity that can be billed
#[async_trait]
pub trait Billable: Send + Sync {
    /// Local customer identifier, the owner of payment methods and
    /// subscriptions
    fn billing_id(&self) -> Uuid;

    /// Display name sent on remote customer creation
    fn billing_name(&self) -> Option<&str>;

    /// Email sent on remote customer creation
    fn billing_email(&self) -> Option<&str>;

    /// Remote gateway customer identifier, if one has been created
    fn remote_customer_id(&self) -> Option<&str>;

    /// Persist a newly assigned remote customer identifier
    async fn store_remote_customer_id(&mut self, remote_id: String) -> DbResult<()>;
}
