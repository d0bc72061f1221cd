//! Account information

use crate::api::client::{VultrClient, ACCOUNT};
use crate::error::Result;

/// Account wrapper (no catalog)
#[derive(Debug, Clone)]
pub struct Account {
    client: VultrClient,
}

impl Account {
    pub fn new(client: VultrClient) -> Self {
        Self { client }
    }

    /// Account name, email, balance and ACLs
    pub async fn info(&self) -> Result<String> {
        self.client.get(ACCOUNT).await
    }
}
