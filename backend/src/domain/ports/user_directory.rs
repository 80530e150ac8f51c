//! Port for reading accounts from the user directory.
//!
//! The registrar never mutates accounts through this port.

use async_trait::async_trait;

use crate::domain::{User, UserId, Username};
#[cfg(test)]
use crate::domain::fixture_accounts;

use super::define_port_error;

define_port_error! {
    /// Errors raised by user directory adapters.
    pub enum UserDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } => "user directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } => "user directory query failed: {message}",
    }
}

/// Read-only account lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError>;

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserDirectoryError>;
}

/// Directory serving the built-in fixture accounts to unit tests.
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserDirectory;

#[cfg(test)]
#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError> {
        Ok(fixture_accounts().into_iter().find(|user| user.id() == id))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserDirectoryError> {
        Ok(fixture_accounts()
            .into_iter()
            .find(|user| user.username() == username))
    }
}
