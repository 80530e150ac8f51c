//! Driving port for registration reads.

use async_trait::async_trait;

use crate::domain::{CourseId, Error, RegistrationId, UserId};

use super::RegistrationPayload;

/// Driving port for registration read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationQuery: Send + Sync {
    async fn get_registration(
        &self,
        registration_id: RegistrationId,
    ) -> Result<RegistrationPayload, Error>;

    /// The user's registrations, newest first.
    async fn list_registrations_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RegistrationPayload>, Error>;

    /// Every registration held in a course; fails when the course is unknown.
    async fn list_registrations_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<RegistrationPayload>, Error>;
}
