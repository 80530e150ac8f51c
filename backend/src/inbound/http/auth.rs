//! Authorisation helpers used by HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! session resolution and role checks here. A missing or stale session is
//! `401 Unauthorized`; a signed-in account without the required role is
//! `403 Forbidden`.

use serde_json::json;
use tracing::debug;

use crate::domain::ports::{AccountPayload, AccountQuery};
use crate::domain::{Error, UserRole};

use super::ApiResult;
use super::session::SessionContext;

/// Roles allowed to manage courses and registrations.
pub(crate) const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Roles allowed to read course rosters and record grades.
pub(crate) const TEACHING_STAFF: &[UserRole] = &[UserRole::Instructor, UserRole::Admin];

/// Resolve the signed-in account.
pub(crate) async fn current_account(
    accounts: &dyn AccountQuery,
    session: &SessionContext,
) -> ApiResult<AccountPayload> {
    let user_id = session.require_signed_in()?;
    accounts.fetch_account(&user_id).await
}

/// Reject `account` unless it holds one of `roles`.
pub(crate) fn authorise(account: &AccountPayload, roles: &[UserRole]) -> ApiResult<()> {
    if roles.contains(&account.role) {
        return Ok(());
    }
    debug!(user_id = %account.id, role = %account.role, "role check failed");
    let required: Vec<&str> = roles.iter().map(|role| role.as_str()).collect();
    Err(Error::forbidden("insufficient role for this operation")
        .with_details(json!({ "requiredRoles": required })))
}

/// Resolve the signed-in account and require one of `roles`.
pub(crate) async fn require_role(
    accounts: &dyn AccountQuery,
    session: &SessionContext,
    roles: &[UserRole],
) -> ApiResult<AccountPayload> {
    let account = current_account(accounts, session).await?;
    authorise(&account, roles)?;
    Ok(account)
}
