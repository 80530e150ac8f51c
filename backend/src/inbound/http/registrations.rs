//! Registration HTTP handlers.
//!
//! ```text
//! GET /api/v1/registrations/me
//! GET /api/v1/registrations/{registration_id}
//! PUT /api/v1/registrations/{registration_id}/grade {"grade":"B+"}
//! PUT /api/v1/registrations/{registration_id}/status {"status":"withdrawn"}
//! DELETE /api/v1/registrations/{registration_id}
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{RegistrationPayload, UpdateGradeRequest, UpdateStatusRequest};
use crate::domain::{Error, PaymentStatus, RegistrationId, RegistrationStatus, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{ADMIN_ONLY, TEACHING_STAFF, current_account, require_role};
use crate::inbound::http::schemas::{ErrorSchema, PaymentStatusSchema, RegistrationStatusSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, parse_value, require};

const REGISTRATION_ID: FieldName = FieldName::new("registrationId");
const GRADE: FieldName = FieldName::new("grade");
const STATUS: FieldName = FieldName::new("status");

/// Path parameters for registration routes.
#[derive(Debug, Deserialize)]
pub struct RegistrationPath {
    registration_id: String,
}

impl RegistrationPath {
    fn parse(self) -> ApiResult<RegistrationId> {
        parse_uuid(&self.registration_id, REGISTRATION_ID).map(RegistrationId::from_uuid)
    }
}

/// A registration as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    #[schema(value_type = RegistrationStatusSchema)]
    pub status: RegistrationStatus,
    #[schema(example = "B+")]
    pub grade: Option<String>,
    #[schema(value_type = PaymentStatusSchema)]
    pub payment_status: PaymentStatus,
    pub amount_paid_cents: u32,
    /// RFC 3339 timestamp set once at enrollment.
    pub registration_date: String,
    pub updated_at: String,
}

impl From<RegistrationPayload> for RegistrationResponse {
    fn from(value: RegistrationPayload) -> Self {
        Self {
            id: value.id.to_string(),
            user_id: value.user_id.to_string(),
            course_id: value.course_id.to_string(),
            status: value.status,
            grade: value.grade,
            payment_status: value.payment.status,
            amount_paid_cents: value.payment.amount_paid_cents,
            registration_date: value.registration_date.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

pub(crate) fn to_responses(payloads: Vec<RegistrationPayload>) -> Vec<RegistrationResponse> {
    payloads.into_iter().map(RegistrationResponse::from).collect()
}

/// Request body for recording a grade. An empty grade clears it.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequestBody {
    pub grade: Option<String>,
}

/// Request body for an administrative status change.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatusRequestBody {
    #[schema(example = "withdrawn")]
    pub status: Option<String>,
}

/// List the signed-in user's registrations, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/registrations/me",
    responses(
        (status = 200, description = "Own registrations", body = [RegistrationResponse]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "listMyRegistrations",
    security(("SessionCookie" = []))
)]
#[get("/registrations/me")]
pub async fn my_registrations(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<RegistrationResponse>>> {
    let account = current_account(state.accounts.as_ref(), &session).await?;
    let registrations = state
        .registrations
        .list_registrations_for_user(account.id)
        .await?;
    Ok(web::Json(to_responses(registrations)))
}

/// Fetch one registration. Students may only read their own.
#[utoipa::path(
    get,
    path = "/api/v1/registrations/{registration_id}",
    params(("registration_id" = String, Path, description = "Registration identifier")),
    responses(
        (status = 200, description = "Registration", body = RegistrationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "getRegistration",
    security(("SessionCookie" = []))
)]
#[get("/registrations/{registration_id}")]
pub async fn get_registration(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RegistrationPath>,
) -> ApiResult<web::Json<RegistrationResponse>> {
    let registration_id = path.into_inner().parse()?;
    let account = current_account(state.accounts.as_ref(), &session).await?;
    let registration = state.registrations.get_registration(registration_id).await?;
    if account.role == UserRole::Student && registration.user_id != account.id {
        return Err(Error::forbidden("registration belongs to another student"));
    }
    Ok(web::Json(RegistrationResponse::from(registration)))
}

/// Record or clear a grade. A non-empty grade completes the registration.
#[utoipa::path(
    put,
    path = "/api/v1/registrations/{registration_id}/grade",
    params(("registration_id" = String, Path, description = "Registration identifier")),
    request_body = GradeRequestBody,
    responses(
        (status = 200, description = "Registration graded", body = RegistrationResponse),
        (status = 400, description = "Invalid grade", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Instructor or admin role required", body = ErrorSchema),
        (status = 404, description = "Registration not found", body = ErrorSchema),
        (status = 409, description = "Status cannot change or was modified concurrently", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "updateGrade",
    security(("SessionCookie" = []))
)]
#[put("/registrations/{registration_id}/grade")]
pub async fn update_grade(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RegistrationPath>,
    payload: web::Json<GradeRequestBody>,
) -> ApiResult<web::Json<RegistrationResponse>> {
    require_role(state.accounts.as_ref(), &session, TEACHING_STAFF).await?;
    let registration_id = path.into_inner().parse()?;
    let grade = require(payload.into_inner().grade, GRADE)?;
    let updated = state
        .enrollment
        .update_grade(UpdateGradeRequest {
            registration_id,
            grade,
        })
        .await?;
    Ok(web::Json(RegistrationResponse::from(updated)))
}

/// Move a registration to another status.
#[utoipa::path(
    put,
    path = "/api/v1/registrations/{registration_id}/status",
    params(("registration_id" = String, Path, description = "Registration identifier")),
    request_body = RegistrationStatusRequestBody,
    responses(
        (status = 200, description = "Status updated", body = RegistrationResponse),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Registration not found", body = ErrorSchema),
        (status = 409, description = "Transition not allowed or stale", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "updateRegistrationStatus",
    security(("SessionCookie" = []))
)]
#[put("/registrations/{registration_id}/status")]
pub async fn update_registration_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RegistrationPath>,
    payload: web::Json<RegistrationStatusRequestBody>,
) -> ApiResult<web::Json<RegistrationResponse>> {
    require_role(state.accounts.as_ref(), &session, ADMIN_ONLY).await?;
    let registration_id = path.into_inner().parse()?;
    let raw = require(payload.into_inner().status, STATUS)?;
    let status = parse_value::<RegistrationStatus>(&raw, STATUS)?;
    let updated = state
        .enrollment
        .update_status(UpdateStatusRequest {
            registration_id,
            status,
        })
        .await?;
    Ok(web::Json(RegistrationResponse::from(updated)))
}

/// Hard-delete a registration.
#[utoipa::path(
    delete,
    path = "/api/v1/registrations/{registration_id}",
    params(("registration_id" = String, Path, description = "Registration identifier")),
    responses(
        (status = 204, description = "Registration deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Registration not found", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "deleteRegistration",
    security(("SessionCookie" = []))
)]
#[delete("/registrations/{registration_id}")]
pub async fn delete_registration(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<RegistrationPath>,
) -> ApiResult<HttpResponse> {
    require_role(state.accounts.as_ref(), &session, ADMIN_ONLY).await?;
    let registration_id = path.into_inner().parse()?;
    state.enrollment.delete_registration(registration_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "registrations_tests.rs"]
mod tests;
