//! Port for the registration ledger, the source of truth for enrollment state.
//!
//! The capacity check and the insert happen inside a single adapter call,
//! [`RegistrationLedger::insert_within_capacity`], so concurrent enrollments
//! cannot both observe a free seat. The same call re-checks that the course
//! is still open for enrollment. Status updates are compare-and-set on the
//! previously observed status.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{
    CourseId, CourseStatus, Registration, RegistrationId, RegistrationStatus, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by registration ledger adapters.
    pub enum RegistrationLedgerError {
        /// Ledger connection could not be established.
        Connection { message: String } => "registration ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "registration ledger query failed: {message}",
        /// The registration does not exist.
        NotFound { registration_id: RegistrationId } =>
            "registration {registration_id} not found",
        /// The stored status no longer matches the expected one.
        StaleStatus { registration_id: RegistrationId, expected: RegistrationStatus } =>
            "registration {registration_id} is no longer {expected}",
    }
}

/// Result of an atomic capacity-checked insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The registration was written.
    Inserted,
    /// The user already holds an active registration for the course.
    Duplicate,
    /// Every seat is taken.
    CourseFull { max_students: u32 },
    /// The course disappeared before the insert.
    CourseMissing,
    /// The course left `active` before the insert.
    CourseNotOpen { status: CourseStatus },
}

/// Registration persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationLedger: Send + Sync {
    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, RegistrationLedgerError>;

    /// The active registration for the pair, if any.
    async fn find_active_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Registration>, RegistrationLedgerError>;

    async fn exists_active_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, RegistrationLedgerError>;

    async fn count_active_by_course(
        &self,
        course_id: &CourseId,
    ) -> Result<u64, RegistrationLedgerError>;

    /// Active counts for several courses in one round trip.
    ///
    /// Courses without active registrations may be absent from the map.
    async fn count_active_by_courses(
        &self,
        course_ids: &[CourseId],
    ) -> Result<HashMap<CourseId, u64>, RegistrationLedgerError>;

    /// A user's registrations, newest first.
    async fn list_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Registration>, RegistrationLedgerError>;

    /// A course's registrations in registration order.
    async fn list_by_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<Registration>, RegistrationLedgerError>;

    /// Insert `registration` only if the pair has no active registration and
    /// the course has a free seat, all within one atomic unit.
    async fn insert_within_capacity(
        &self,
        registration: &Registration,
    ) -> Result<InsertOutcome, RegistrationLedgerError>;

    /// Persist `registration` if the stored status still equals `expected`.
    async fn update(
        &self,
        registration: &Registration,
        expected: RegistrationStatus,
    ) -> Result<(), RegistrationLedgerError>;

    async fn delete(&self, id: &RegistrationId) -> Result<(), RegistrationLedgerError>;
}
