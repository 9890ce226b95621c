//! Test customer entity

use async_trait::async_trait;
use uuid::Uuid;

use mpc_billing_core::Billable;
use mpc_db::DbResult;

/// Minimal host-application customer for tests
#[derive(Debug, Clone)]
pub struct TestCustomer {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub mpc_customer_id: Option<String>,
}

impl TestCustomer {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            mpc_customer_id: None,
        }
    }

    #[allow(dead_code)]
    pub fn with_remote_id(mut self, remote_id: &str) -> Self {
        self.mpc_customer_id = Some(remote_id.to_string());
        self
    }
}

#[async_trait]
impl Billable for TestCustomer {
    fn billing_id(&self) -> Uuid {
        self.id
    }

    fn billing_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn billing_email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn remote_customer_id(&self) -> Option<&str> {
        self.mpc_customer_id.as_deref()
    }

    async fn store_remote_customer_id(&mut self, remote_id: String) -> DbResult<()> {
        self.mpc_customer_id = Some(remote_id);
        Ok(())
    }
}
