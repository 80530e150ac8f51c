//! Driving port for course lifecycle mutations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Course, CourseDraft, CourseId, CourseStatus, Error};

/// Serializable course payload for driving ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayload {
    pub id: CourseId,
    pub code: String,
    pub title: String,
    pub max_students: u32,
    pub min_students: u32,
    pub status: CourseStatus,
    pub fee_cents: u32,
    pub schedule: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Course> for CoursePayload {
    fn from(value: &Course) -> Self {
        Self {
            id: value.id(),
            code: value.code().as_str().to_owned(),
            title: value.title().to_owned(),
            max_students: value.capacity().max_students(),
            min_students: value.capacity().min_students(),
            status: value.status(),
            fee_cents: value.fee_cents(),
            schedule: value.schedule().map(str::to_owned),
            created_at: value.created_at(),
        }
    }
}

/// A course together with its live enrollment count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummaryPayload {
    pub course: CoursePayload,
    pub enrolled_count: u64,
    pub available: bool,
}

impl CourseSummaryPayload {
    pub fn new(course: &Course, enrolled_count: u64) -> Self {
        Self {
            course: CoursePayload::from(course),
            enrolled_count,
            available: course.is_available(enrolled_count),
        }
    }
}

/// Request to replace a course's editable attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub course_id: CourseId,
    pub draft: CourseDraft,
}

/// Request to move a course to another administrative status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeCourseStatusRequest {
    pub course_id: CourseId,
    pub status: CourseStatus,
}

/// Driving port for course write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseCommand: Send + Sync {
    /// Create a course; codes are unique case-insensitively.
    async fn create_course(&self, draft: CourseDraft) -> Result<CourseSummaryPayload, Error>;

    async fn update_course(
        &self,
        request: UpdateCourseRequest,
    ) -> Result<CourseSummaryPayload, Error>;

    async fn change_status(
        &self,
        request: ChangeCourseStatusRequest,
    ) -> Result<CourseSummaryPayload, Error>;

    /// Delete a course that has no active registrations.
    async fn delete_course(&self, course_id: CourseId) -> Result<(), Error>;
}
