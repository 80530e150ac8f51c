//! Session login and account handlers.
//!
//! ```text
//! POST /api/v1/login {"username":"admin","password":"password"}
//! GET /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::AccountPayload;
use crate::domain::{Error, LoginCredentials, LoginValidationError, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_account;
use crate::inbound::http::schemas::{ErrorSchema, UserRoleSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// The signed-in account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[schema(example = "123e4567-e89b-12d3-a456-426614174002")]
    pub id: String,
    #[schema(example = "student1")]
    pub username: String,
    #[schema(example = "First Student")]
    pub display_name: String,
    #[schema(value_type = UserRoleSchema)]
    pub role: UserRole,
}

impl From<AccountPayload> for AccountResponse {
    fn from(value: AccountPayload) -> Self {
        Self {
            id: value.id.to_string(),
            username: value.username,
            display_name: value.display_name,
            role: value.role,
        }
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": err.field(),
        "code": err.code(),
    }))
}

/// Authenticate a directory account and establish a cookie session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AccountResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Directory unavailable", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    let account = state.accounts.fetch_account(&user_id).await?;
    session.sign_in(&user_id)?;
    info!(%user_id, role = %account.role, "session established");
    Ok(HttpResponse::Ok().json(AccountResponse::from(account)))
}

/// Return the signed-in account.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current account", body = AccountResponse),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "currentAccount"
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AccountResponse>> {
    let account = current_account(state.accounts.as_ref(), &session).await?;
    Ok(web::Json(AccountResponse::from(account)))
}
