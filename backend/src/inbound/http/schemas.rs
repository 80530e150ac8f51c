//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with the current state of a resource.
    #[schema(rename = "conflict")]
    Conflict,
    /// The course has no remaining seats.
    #[schema(rename = "capacity_exceeded")]
    CapacityExceeded,
    /// A downstream dependency is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message. Rejections carry a stable `details.reason`; validation failures
/// carry `details.field` and `details.code`.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "capacity_exceeded")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "course PHYS-101 is full")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "0a0b0c0d-0000-4000-8000-000000000001")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::CourseStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CourseStatus)]
pub enum CourseStatusSchema {
    #[schema(rename = "draft")]
    Draft,
    /// The only status that accepts enrollments.
    #[schema(rename = "active")]
    Active,
    #[schema(rename = "closed")]
    Closed,
    #[schema(rename = "cancelled")]
    Cancelled,
    #[schema(rename = "completed")]
    Completed,
}

/// OpenAPI schema for [`crate::domain::RegistrationStatus`].
///
/// `pending` and `enrolled` hold a seat.
#[derive(ToSchema)]
#[schema(as = crate::domain::RegistrationStatus)]
pub enum RegistrationStatusSchema {
    #[schema(rename = "pending")]
    Pending,
    #[schema(rename = "enrolled")]
    Enrolled,
    #[schema(rename = "completed")]
    Completed,
    #[schema(rename = "dropped")]
    Dropped,
    #[schema(rename = "withdrawn")]
    Withdrawn,
    #[schema(rename = "failed")]
    Failed,
    #[schema(rename = "transferred")]
    Transferred,
}

/// OpenAPI schema for [`crate::domain::PaymentStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PaymentStatus)]
pub enum PaymentStatusSchema {
    #[schema(rename = "unpaid")]
    Unpaid,
    #[schema(rename = "paid")]
    Paid,
    #[schema(rename = "waived")]
    Waived,
    #[schema(rename = "refunded")]
    Refunded,
}

/// OpenAPI schema for [`crate::domain::UserRole`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserRole)]
pub enum UserRoleSchema {
    #[schema(rename = "student")]
    Student,
    #[schema(rename = "instructor")]
    Instructor,
    #[schema(rename = "admin")]
    Admin,
}
