//! Driving port for catalogue reads.
//!
//! Counts are aggregated from the registration ledger at query time and use
//! the same active-status rule as the enrollment capacity check.

use async_trait::async_trait;

use crate::domain::{CourseId, Error};

use super::CourseSummaryPayload;

/// Driving port for course read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseQuery: Send + Sync {
    async fn get_course(&self, course_id: CourseId) -> Result<CourseSummaryPayload, Error>;

    /// Every course, ordered by code.
    async fn list_courses(&self) -> Result<Vec<CourseSummaryPayload>, Error>;

    /// Active courses that still have a free seat.
    async fn available_courses(&self) -> Result<Vec<CourseSummaryPayload>, Error>;
}
