//! Driving port for enrollment mutations.
//!
//! Inbound adapters call this port to enroll, drop, grade and administer
//! registrations without knowing which stores back the coordinator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    CourseId, Error, PaymentInfo, Registration, RegistrationId, RegistrationStatus, UserId,
    Username,
};

/// How the enrolling student is identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StudentRef {
    Id(UserId),
    Username(Username),
}

impl std::fmt::Display for StudentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => id.fmt(f),
            Self::Username(name) => name.fmt(f),
        }
    }
}

/// Serializable registration payload for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub id: RegistrationId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub status: RegistrationStatus,
    pub grade: Option<String>,
    pub payment: PaymentInfo,
    pub registration_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Registration> for RegistrationPayload {
    fn from(value: Registration) -> Self {
        Self {
            id: value.id(),
            user_id: *value.user_id(),
            course_id: value.course_id(),
            status: value.status(),
            grade: value.grade().map(|grade| grade.as_str().to_owned()),
            payment: value.payment(),
            registration_date: value.registration_date(),
            updated_at: value.updated_at(),
        }
    }
}

/// Request to enroll a student in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub student: StudentRef,
    pub course_id: CourseId,
}

/// Request to drop a student's active registration in a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropRequest {
    pub student: StudentRef,
    pub course_id: CourseId,
}

/// Request to set or clear a grade.
///
/// A blank grade clears the stored grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGradeRequest {
    pub registration_id: RegistrationId,
    pub grade: String,
}

/// Request to move a registration to another status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub registration_id: RegistrationId,
    pub status: RegistrationStatus,
}

/// Driving port for registration write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentCommand: Send + Sync {
    /// Enroll a student, enforcing capacity and active-pair uniqueness.
    ///
    /// Rejections surface as `not_found`, `conflict` or `capacity_exceeded`
    /// errors carrying `details.reason`.
    async fn enroll(&self, request: EnrollRequest) -> Result<RegistrationPayload, Error>;

    /// Move the student's active registration to `dropped`.
    async fn drop_enrollment(&self, request: DropRequest) -> Result<(), Error>;

    /// Set or clear a grade; a grade completes the registration.
    async fn update_grade(&self, request: UpdateGradeRequest)
    -> Result<RegistrationPayload, Error>;

    /// Administrative status change, validated against the transition table.
    async fn update_status(
        &self,
        request: UpdateStatusRequest,
    ) -> Result<RegistrationPayload, Error>;

    /// Administrative hard delete.
    async fn delete_registration(&self, registration_id: RegistrationId) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn student_ref_uses_tagged_camel_case() {
        let by_name = StudentRef::Username(Username::new("student1").expect("valid username"));
        assert_eq!(
            serde_json::to_value(&by_name).expect("serialise"),
            json!({ "username": "student1" })
        );
    }

    #[rstest]
    fn payload_mirrors_registration() {
        let registration = Registration::enroll(
            RegistrationId::random(),
            UserId::random(),
            CourseId::random(),
            Utc::now(),
        );
        let payload = RegistrationPayload::from(registration.clone());
        assert_eq!(payload.id, registration.id());
        assert_eq!(payload.status, RegistrationStatus::Enrolled);
        assert!(payload.grade.is_none());
    }
}
