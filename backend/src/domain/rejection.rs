//! Business-rule rejections raised by the enrollment and course services.
//!
//! Each rejection converts into a transport-agnostic [`Error`] whose
//! `details.reason` carries a stable snake_case identifier clients can branch
//! on without parsing messages.

use serde_json::json;

use crate::domain::{CourseId, CourseStatus, Error, RegistrationId, RegistrationStatus, UserId};

/// Rejections raised while enrolling, dropping or updating registrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollmentError {
    #[error("course {course_id} not found")]
    CourseNotFound { course_id: CourseId },
    #[error("user {user} not found")]
    UserNotFound { user: String },
    #[error("registration {reference} not found")]
    RegistrationNotFound { reference: String },
    #[error("user {user_id} already holds an active registration for course {course_id}")]
    DuplicateRegistration { user_id: UserId, course_id: CourseId },
    #[error("course {course_id} is full ({max_students} seats)")]
    CourseFull { course_id: CourseId, max_students: u32 },
    #[error("course {course_id} is not open for enrollment (status {status})")]
    CourseNotOpen {
        course_id: CourseId,
        status: CourseStatus,
    },
    #[error("registration cannot move from {from} to {to}")]
    InvalidStatusTransition {
        from: RegistrationStatus,
        to: RegistrationStatus,
    },
    #[error("registration {registration_id} was modified concurrently")]
    StaleRegistration { registration_id: RegistrationId },
}

impl EnrollmentError {
    /// Stable machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::CourseNotFound { .. } => "course_not_found",
            Self::UserNotFound { .. } => "user_not_found",
            Self::RegistrationNotFound { .. } => "registration_not_found",
            Self::DuplicateRegistration { .. } => "duplicate_registration",
            Self::CourseFull { .. } => "course_full",
            Self::CourseNotOpen { .. } => "course_not_open",
            Self::InvalidStatusTransition { .. } => "invalid_status_transition",
            Self::StaleRegistration { .. } => "stale_registration",
        }
    }

    pub fn registration_not_found(reference: impl ToString) -> Self {
        Self::RegistrationNotFound {
            reference: reference.to_string(),
        }
    }
}

impl From<EnrollmentError> for Error {
    fn from(value: EnrollmentError) -> Self {
        let reason = value.reason();
        let message = value.to_string();
        match value {
            EnrollmentError::CourseNotFound { course_id } => Error::not_found(message)
                .with_details(json!({ "reason": reason, "courseId": course_id })),
            EnrollmentError::UserNotFound { user } => {
                Error::not_found(message).with_details(json!({ "reason": reason, "user": user }))
            }
            EnrollmentError::RegistrationNotFound { .. } => {
                Error::not_found(message).with_details(json!({ "reason": reason }))
            }
            EnrollmentError::DuplicateRegistration { user_id, course_id } => {
                Error::conflict(message).with_details(json!({
                    "reason": reason,
                    "userId": user_id,
                    "courseId": course_id,
                }))
            }
            EnrollmentError::CourseFull {
                course_id,
                max_students,
            } => Error::capacity_exceeded(message).with_details(json!({
                "reason": reason,
                "courseId": course_id,
                "maxStudents": max_students,
            })),
            EnrollmentError::CourseNotOpen { course_id, status } => {
                Error::conflict(message).with_details(json!({
                    "reason": reason,
                    "courseId": course_id,
                    "status": status,
                }))
            }
            EnrollmentError::InvalidStatusTransition { from, to } => Error::conflict(message)
                .with_details(json!({ "reason": reason, "from": from, "to": to })),
            EnrollmentError::StaleRegistration { registration_id } => Error::conflict(message)
                .with_details(json!({ "reason": reason, "registrationId": registration_id })),
        }
    }
}

/// Rejections raised by course lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseLifecycleError {
    #[error("course {course_id} not found")]
    CourseNotFound { course_id: CourseId },
    #[error("course code {code} is already in use")]
    CourseAlreadyExists { code: String },
    #[error("course {course_id} has {active} active registrations")]
    HasActiveRegistrations { course_id: CourseId, active: u64 },
    #[error(
        "course {course_id} cannot shrink to {requested} seats with {active} active registrations"
    )]
    CapacityBelowEnrollment {
        course_id: CourseId,
        requested: u32,
        active: u64,
    },
    #[error("course cannot move from {from} to {to}")]
    InvalidStatusTransition { from: CourseStatus, to: CourseStatus },
    #[error("course {course_id} was modified concurrently")]
    StaleCourse { course_id: CourseId },
}

impl CourseLifecycleError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::CourseNotFound { .. } => "course_not_found",
            Self::CourseAlreadyExists { .. } => "course_code_taken",
            Self::HasActiveRegistrations { .. } => "course_has_active_registrations",
            Self::CapacityBelowEnrollment { .. } => "capacity_below_enrollment",
            Self::InvalidStatusTransition { .. } => "invalid_course_status_transition",
            Self::StaleCourse { .. } => "stale_course",
        }
    }
}

impl From<CourseLifecycleError> for Error {
    fn from(value: CourseLifecycleError) -> Self {
        let reason = value.reason();
        let message = value.to_string();
        match value {
            CourseLifecycleError::CourseNotFound { course_id } => Error::not_found(message)
                .with_details(json!({ "reason": reason, "courseId": course_id })),
            CourseLifecycleError::CourseAlreadyExists { code } => {
                Error::conflict(message).with_details(json!({ "reason": reason, "code": code }))
            }
            CourseLifecycleError::HasActiveRegistrations { course_id, active } => {
                Error::conflict(message).with_details(json!({
                    "reason": reason,
                    "courseId": course_id,
                    "activeRegistrations": active,
                }))
            }
            CourseLifecycleError::CapacityBelowEnrollment {
                course_id,
                requested,
                active,
            } => Error::conflict(message).with_details(json!({
                "reason": reason,
                "courseId": course_id,
                "requestedMaxStudents": requested,
                "activeRegistrations": active,
            })),
            CourseLifecycleError::InvalidStatusTransition { from, to } => Error::conflict(message)
                .with_details(json!({ "reason": reason, "from": from, "to": to })),
            CourseLifecycleError::StaleCourse { course_id } => Error::conflict(message)
                .with_details(json!({ "reason": reason, "courseId": course_id })),
        }
    }
}
