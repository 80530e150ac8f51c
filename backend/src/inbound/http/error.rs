//! Registrar error responses.
//!
//! Every rejection leaves as the JSON form of [`Error`] with the `trace-id`
//! header echoed. Enrollment and lifecycle rejections keep their
//! `details.reason` so clients can branch on `course_full`,
//! `duplicate_registration`, `stale_course` and the rest without parsing the
//! message.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result type returned by registrar handlers.
pub type ApiResult<T> = Result<T, Error>;

/// HTTP status for an error code.
///
/// `CapacityExceeded` shares `409` with `Conflict`: a full course is a clash
/// with the course's current state, and the distinct code in the body lets a
/// client tell "no seat left" apart from a duplicate or stale request.
fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict | ErrorCode::CapacityExceeded => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Strip message and details from internal errors, keeping only the trace id
/// an operator needs to find the logged cause.
fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_internal(self))
    }
}

/// Framework failures surface as a redacted `500`. Malformed JSON bodies
/// never reach this path; `validation::json_config` turns them into `400`.
impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error surfaced as internal error");
        Error::internal("Internal server error")
    }
}
