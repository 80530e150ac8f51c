//! Course lifecycle management.
//!
//! Course CRUD plus the guards that depend on live enrollment: codes stay
//! unique, capacity never drops below the active count, and a course with
//! active registrations cannot be deleted. The store enforces the last two
//! atomically with its write; the service translates the outcome. Every
//! write names the status it was decided against, so a course that changed
//! status in the meantime is reported as stale instead of overwritten.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    ChangeCourseStatusRequest, CourseCatalogError, CourseCatalogRepository, CourseCommand,
    CourseQuery, CourseSummaryPayload, RegistrationLedger, UpdateCourseRequest,
};
use crate::domain::store_error_mapping::{map_catalog_error, map_ledger_error};
use crate::domain::{
    Course, CourseAttributes, CourseCode, CourseDraft, CourseId, CourseLifecycleError,
    CourseStatus, CourseValidationError, Error,
};

fn invalid_course(err: CourseValidationError) -> Error {
    let field = match &err {
        CourseValidationError::CodeLength { .. } | CourseValidationError::CodeCharacters => "code",
        CourseValidationError::EmptyTitle | CourseValidationError::TitleTooLong { .. } => "title",
        CourseValidationError::ScheduleTooLong { .. } => "schedule",
        CourseValidationError::InvalidCapacity { .. } => "maxStudents",
        CourseValidationError::UnknownStatus(_) => "status",
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": "invalid_course",
    }))
}

/// Course service implementing the course driving ports.
#[derive(Clone)]
pub struct CourseLifecycleService<C, L> {
    catalog: Arc<C>,
    ledger: Arc<L>,
    clock: Arc<dyn Clock>,
}

impl<C, L> CourseLifecycleService<C, L> {
    pub fn new(catalog: Arc<C>, ledger: Arc<L>, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            ledger,
            clock,
        }
    }
}

impl<C, L> CourseLifecycleService<C, L>
where
    C: CourseCatalogRepository,
    L: RegistrationLedger,
{
    async fn load_course(&self, course_id: CourseId) -> Result<Course, Error> {
        self.catalog
            .find_by_id(&course_id)
            .await
            .map_err(map_catalog_error)?
            .ok_or_else(|| CourseLifecycleError::CourseNotFound { course_id }.into())
    }

    async fn summarise(&self, course: &Course) -> Result<CourseSummaryPayload, Error> {
        let active = self
            .ledger
            .count_active_by_course(&course.id())
            .await
            .map_err(map_ledger_error)?;
        Ok(CourseSummaryPayload::new(course, active))
    }

    async fn summarise_all(
        &self,
        courses: Vec<Course>,
    ) -> Result<Vec<CourseSummaryPayload>, Error> {
        let ids: Vec<CourseId> = courses.iter().map(Course::id).collect();
        let counts = self
            .ledger
            .count_active_by_courses(&ids)
            .await
            .map_err(map_ledger_error)?;
        Ok(courses
            .iter()
            .map(|course| {
                let active = counts.get(&course.id()).copied().unwrap_or(0);
                CourseSummaryPayload::new(course, active)
            })
            .collect())
    }

    /// Reject `code` when another course already holds it.
    async fn ensure_code_free(
        &self,
        code: &CourseCode,
        owner: Option<CourseId>,
    ) -> Result<(), Error> {
        let holder = self
            .catalog
            .find_by_code(code)
            .await
            .map_err(map_catalog_error)?;
        match holder {
            Some(existing) if Some(existing.id()) != owner => {
                debug!(%code, "course code already taken");
                Err(CourseLifecycleError::CourseAlreadyExists {
                    code: code.to_string(),
                }
                .into())
            }
            _ => Ok(()),
        }
    }

    fn map_write_error(&self, course: &Course, err: CourseCatalogError) -> Error {
        match err {
            CourseCatalogError::DuplicateCode { code } => {
                CourseLifecycleError::CourseAlreadyExists { code }.into()
            }
            CourseCatalogError::NotFound { course_id } => {
                CourseLifecycleError::CourseNotFound { course_id }.into()
            }
            CourseCatalogError::CapacityBelowEnrollment { active } => {
                debug!(course_id = %course.id(), active, "capacity below enrollment");
                CourseLifecycleError::CapacityBelowEnrollment {
                    course_id: course.id(),
                    requested: course.capacity().max_students(),
                    active,
                }
                .into()
            }
            CourseCatalogError::StaleStatus { course_id, expected } => {
                warn!(%course_id, %expected, "concurrent course update");
                CourseLifecycleError::StaleCourse { course_id }.into()
            }
            CourseCatalogError::HasActiveRegistrations { active } => {
                CourseLifecycleError::HasActiveRegistrations {
                    course_id: course.id(),
                    active,
                }
                .into()
            }
            other => map_catalog_error(other),
        }
    }
}

#[async_trait]
impl<C, L> CourseCommand for CourseLifecycleService<C, L>
where
    C: CourseCatalogRepository,
    L: RegistrationLedger,
{
    async fn create_course(&self, draft: CourseDraft) -> Result<CourseSummaryPayload, Error> {
        let course =
            Course::create(CourseId::random(), &draft, self.clock.utc()).map_err(invalid_course)?;
        if !matches!(course.status(), CourseStatus::Draft | CourseStatus::Active) {
            return Err(Error::invalid_request(format!(
                "new courses must start as draft or active, not {}",
                course.status()
            ))
            .with_details(json!({ "field": "status", "code": "invalid_initial_status" })));
        }
        self.ensure_code_free(course.code(), None).await?;
        self.catalog
            .insert(&course)
            .await
            .map_err(|err| self.map_write_error(&course, err))?;
        info!(course_id = %course.id(), code = %course.code(), "course created");
        Ok(CourseSummaryPayload::new(&course, 0))
    }

    async fn update_course(
        &self,
        request: UpdateCourseRequest,
    ) -> Result<CourseSummaryPayload, Error> {
        let attributes = CourseAttributes::try_from(&request.draft).map_err(invalid_course)?;
        let current = self.load_course(request.course_id).await?;
        self.ensure_code_free(&attributes.code, Some(current.id()))
            .await?;
        let expected = current.status();
        let updated = current.with_attributes(attributes);
        self.catalog
            .update(&updated, expected)
            .await
            .map_err(|err| self.map_write_error(&updated, err))?;
        info!(course_id = %updated.id(), code = %updated.code(), "course updated");
        self.summarise(&updated).await
    }

    async fn change_status(
        &self,
        request: ChangeCourseStatusRequest,
    ) -> Result<CourseSummaryPayload, Error> {
        let current = self.load_course(request.course_id).await?;
        let from = current.status();
        if from == request.status {
            return self.summarise(&current).await;
        }
        if !from.can_transition_to(request.status) {
            debug!(
                course_id = %current.id(),
                %from,
                to = %request.status,
                "course status rejected"
            );
            return Err(CourseLifecycleError::InvalidStatusTransition {
                from,
                to: request.status,
            }
            .into());
        }
        let updated = current.with_status(request.status);
        self.catalog
            .update_status(&updated.id(), from, request.status)
            .await
            .map_err(|err| self.map_write_error(&updated, err))?;
        info!(course_id = %updated.id(), %from, to = %updated.status(), "course status changed");
        self.summarise(&updated).await
    }

    async fn delete_course(&self, course_id: CourseId) -> Result<(), Error> {
        let course = self.load_course(course_id).await?;
        self.catalog
            .delete(&course_id)
            .await
            .map_err(|err| self.map_write_error(&course, err))?;
        info!(%course_id, code = %course.code(), "course deleted");
        Ok(())
    }
}

#[async_trait]
impl<C, L> CourseQuery for CourseLifecycleService<C, L>
where
    C: CourseCatalogRepository,
    L: RegistrationLedger,
{
    async fn get_course(&self, course_id: CourseId) -> Result<CourseSummaryPayload, Error> {
        let course = self.load_course(course_id).await?;
        self.summarise(&course).await
    }

    async fn list_courses(&self) -> Result<Vec<CourseSummaryPayload>, Error> {
        let courses = self.catalog.list().await.map_err(map_catalog_error)?;
        self.summarise_all(courses).await
    }

    async fn available_courses(&self) -> Result<Vec<CourseSummaryPayload>, Error> {
        let open: Vec<Course> = self
            .catalog
            .list()
            .await
            .map_err(map_catalog_error)?
            .into_iter()
            .filter(|course| course.status().is_open())
            .collect();
        let summaries = self.summarise_all(open).await?;
        Ok(summaries
            .into_iter()
            .filter(|summary| summary.available)
            .collect())
    }
}

#[cfg(test)]
#[path = "course_lifecycle_service_tests.rs"]
mod tests;
