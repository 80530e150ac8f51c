//! Driving port resolving the account behind a session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, User, UserId, UserRole};

/// Account projection returned to inbound adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayload {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub role: UserRole,
}

impl From<&User> for AccountPayload {
    fn from(value: &User) -> Self {
        Self {
            id: *value.id(),
            username: value.username().as_str().to_owned(),
            display_name: value.display_name().to_owned(),
            role: value.role(),
        }
    }
}

/// Driving port for account lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Resolve a session's account; unknown ids are `unauthorized`.
    async fn fetch_account(&self, user_id: &UserId) -> Result<AccountPayload, Error>;
}
