//! Port for the course catalogue store.
//!
//! Adapters own code uniqueness and the guarded update/delete checks that
//! depend on live registration counts, so those checks run atomically with
//! the write. Writes are compare-and-set on the stored course status.

use async_trait::async_trait;

use crate::domain::{Course, CourseCode, CourseId, CourseStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by course catalogue adapters.
    pub enum CourseCatalogError {
        /// Store connection could not be established.
        Connection { message: String } => "course catalogue connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course catalogue query failed: {message}",
        /// Another course already uses the code.
        DuplicateCode { code: String } => "course code {code} already exists",
        /// The course does not exist.
        NotFound { course_id: CourseId } => "course {course_id} not found",
        /// The new capacity is below the live active count.
        CapacityBelowEnrollment { active: u64 } =>
            "capacity is below the {active} active registrations",
        /// The course still has active registrations.
        HasActiveRegistrations { active: u64 } =>
            "course still has {active} active registrations",
        /// The stored status no longer matches the expected one.
        StaleStatus { course_id: CourseId, expected: CourseStatus } =>
            "course {course_id} is no longer {expected}",
    }
}

/// Course catalogue persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseCatalogRepository: Send + Sync {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseCatalogError>;

    async fn find_by_code(&self, code: &CourseCode) -> Result<Option<Course>, CourseCatalogError>;

    async fn exists_by_code(&self, code: &CourseCode) -> Result<bool, CourseCatalogError>;

    /// All courses ordered by code.
    async fn list(&self) -> Result<Vec<Course>, CourseCatalogError>;

    /// Insert a new course.
    ///
    /// Fails with `DuplicateCode` when the code is taken.
    async fn insert(&self, course: &Course) -> Result<(), CourseCatalogError>;

    /// Write the editable attributes of `course` while the stored status
    /// still equals `expected`. The stored status is left untouched.
    ///
    /// Fails with `NotFound`, `StaleStatus`, `DuplicateCode` when the code
    /// belongs to another course, or `CapacityBelowEnrollment` when
    /// `max_students` would drop below the active registration count.
    async fn update(
        &self,
        course: &Course,
        expected: CourseStatus,
    ) -> Result<(), CourseCatalogError>;

    /// Move a course from `expected` to `next`.
    ///
    /// Fails with `NotFound` or `StaleStatus`.
    async fn update_status(
        &self,
        id: &CourseId,
        expected: CourseStatus,
        next: CourseStatus,
    ) -> Result<(), CourseCatalogError>;

    /// Remove a course together with its inactive registration history.
    ///
    /// Fails with `NotFound` or `HasActiveRegistrations`.
    async fn delete(&self, id: &CourseId) -> Result<(), CourseCatalogError>;
}
