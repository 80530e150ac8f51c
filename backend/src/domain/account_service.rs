//! Session login stand-in backed by the user directory.
//!
//! Every directory account shares one development password taken from
//! configuration; production deployments front the registrar with the
//! institution's identity provider instead.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{AccountPayload, AccountQuery, LoginService, UserDirectory};
use crate::domain::store_error_mapping::map_directory_error;
use crate::domain::{Error, LoginCredentials, UserId, Username};

/// Directory-backed implementation of [`LoginService`] and [`AccountQuery`].
#[derive(Clone)]
pub struct AccountService<U> {
    directory: Arc<U>,
    shared_password: Arc<Zeroizing<String>>,
}

impl<U> AccountService<U> {
    pub fn new(directory: Arc<U>, shared_password: impl Into<String>) -> Self {
        Self {
            directory,
            shared_password: Arc::new(Zeroizing::new(shared_password.into())),
        }
    }
}

#[async_trait]
impl<U> LoginService for AccountService<U>
where
    U: UserDirectory,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let rejected = || Error::unauthorized("invalid credentials");
        let Ok(username) = Username::new(credentials.username()) else {
            return Err(rejected());
        };
        let user = self
            .directory
            .find_by_username(&username)
            .await
            .map_err(map_directory_error)?;
        match user {
            Some(user) if credentials.password() == self.shared_password.as_str() => {
                Ok(*user.id())
            }
            _ => {
                debug!(%username, "login rejected");
                Err(rejected())
            }
        }
    }
}

#[async_trait]
impl<U> AccountQuery for AccountService<U>
where
    U: UserDirectory,
{
    async fn fetch_account(&self, user_id: &UserId) -> Result<AccountPayload, Error> {
        self.directory
            .find_by_id(user_id)
            .await
            .map_err(map_directory_error)?
            .map(|user| AccountPayload::from(&user))
            .ok_or_else(|| Error::unauthorized("session account no longer exists"))
    }
}
