//! Signed-in account carried in the registrar's session cookie.
//!
//! The cookie stores only the account id. Roles are looked up per request
//! through `AccountQuery`, so a role change made by an administrator applies
//! to the next request instead of the next login.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use serde_json::json;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Session cookie view used by the registrar's handlers.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Record `user_id` as signed in under a fresh session key.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The signed-in account id, if any.
    ///
    /// A cookie holding something other than an account id is purged and
    /// treated as anonymous.
    pub fn signed_in_user(&self) -> Result<Option<UserId>, Error> {
        let stored = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw) = stored else {
            return Ok(None);
        };
        match UserId::new(raw) {
            Ok(id) => Ok(Some(id)),
            Err(error) => {
                warn!(%error, "purging session with malformed account id");
                self.0.purge();
                Ok(None)
            }
        }
    }

    /// The signed-in account id, or `401 Unauthorized` with reason
    /// `login_required`.
    pub fn require_signed_in(&self) -> Result<UserId, Error> {
        self.signed_in_user()?.ok_or_else(|| {
            Error::unauthorized("login required")
                .with_details(json!({ "reason": "login_required" }))
        })
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await.map(SessionContext::new) })
    }
}
