//! Enrollment coordinator.
//!
//! Validates that the course exists, the student exists and the course is
//! open, then hands the duplicate check, the capacity check and the insert to
//! the ledger as one atomic operation. Every later status change is checked
//! against the registration transition table and written compare-and-set.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CourseCatalogRepository, DropRequest, EnrollRequest, EnrollmentCommand, EnrollmentMetrics,
    EnrollmentOutcome, InsertOutcome, RegistrationLedger, RegistrationLedgerError,
    RegistrationPayload, RegistrationQuery, StudentRef, UpdateGradeRequest, UpdateStatusRequest,
    UserDirectory,
};
use crate::domain::store_error_mapping::{
    map_catalog_error, map_directory_error, map_ledger_error,
};
use crate::domain::{
    Course, CourseId, EnrollmentError, Error, Grade, Registration, RegistrationId,
    RegistrationStatus, RegistrationTransitionError, User, UserId,
};

/// Why an enroll attempt failed, split so metrics can tell rejections from
/// infrastructure trouble.
enum EnrollFailure {
    Rejected(EnrollmentError),
    Store(Error),
}

impl EnrollFailure {
    fn outcome(&self) -> EnrollmentOutcome {
        match self {
            Self::Rejected(EnrollmentError::CourseNotFound { .. }) => {
                EnrollmentOutcome::CourseNotFound
            }
            Self::Rejected(EnrollmentError::UserNotFound { .. }) => EnrollmentOutcome::UserNotFound,
            Self::Rejected(EnrollmentError::CourseNotOpen { .. }) => {
                EnrollmentOutcome::CourseNotOpen
            }
            Self::Rejected(EnrollmentError::DuplicateRegistration { .. }) => {
                EnrollmentOutcome::Duplicate
            }
            Self::Rejected(EnrollmentError::CourseFull { .. }) => EnrollmentOutcome::CourseFull,
            Self::Rejected(_) | Self::Store(_) => EnrollmentOutcome::Unavailable,
        }
    }
}

impl From<EnrollFailure> for Error {
    fn from(value: EnrollFailure) -> Self {
        match value {
            EnrollFailure::Rejected(rejection) => rejection.into(),
            EnrollFailure::Store(error) => error,
        }
    }
}

impl From<EnrollmentError> for EnrollFailure {
    fn from(value: EnrollmentError) -> Self {
        Self::Rejected(value)
    }
}

impl From<Error> for EnrollFailure {
    fn from(value: Error) -> Self {
        Self::Store(value)
    }
}

fn transition_rejected(err: RegistrationTransitionError) -> Error {
    EnrollmentError::InvalidStatusTransition {
        from: err.from,
        to: err.to,
    }
    .into()
}

/// Enrollment service implementing the registration driving ports.
#[derive(Clone)]
pub struct EnrollmentService<C, U, L> {
    catalog: Arc<C>,
    directory: Arc<U>,
    ledger: Arc<L>,
    metrics: Arc<dyn EnrollmentMetrics>,
    clock: Arc<dyn Clock>,
}

impl<C, U, L> EnrollmentService<C, U, L> {
    /// Create a coordinator over the three stores.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use registrar::domain::EnrollmentService;
    /// # use registrar::domain::ports::NoOpEnrollmentMetrics;
    /// # use registrar::outbound::memory::MemoryStore;
    /// let store = MemoryStore::with_fixture_accounts();
    /// let service = EnrollmentService::new(
    ///     Arc::new(store.course_catalog()),
    ///     Arc::new(store.user_directory()),
    ///     Arc::new(store.registration_ledger()),
    ///     Arc::new(NoOpEnrollmentMetrics),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        catalog: Arc<C>,
        directory: Arc<U>,
        ledger: Arc<L>,
        metrics: Arc<dyn EnrollmentMetrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            directory,
            ledger,
            metrics,
            clock,
        }
    }
}

impl<C, U, L> EnrollmentService<C, U, L>
where
    C: CourseCatalogRepository,
    U: UserDirectory,
    L: RegistrationLedger,
{
    async fn load_course(&self, course_id: CourseId) -> Result<Course, EnrollFailure> {
        self.catalog
            .find_by_id(&course_id)
            .await
            .map_err(map_catalog_error)?
            .ok_or(EnrollFailure::Rejected(EnrollmentError::CourseNotFound {
                course_id,
            }))
    }

    async fn resolve_student(&self, student: &StudentRef) -> Result<User, EnrollFailure> {
        let found = match student {
            StudentRef::Id(id) => self.directory.find_by_id(id).await,
            StudentRef::Username(name) => self.directory.find_by_username(name).await,
        }
        .map_err(map_directory_error)?;
        found.ok_or_else(|| {
            EnrollFailure::Rejected(EnrollmentError::UserNotFound {
                user: student.to_string(),
            })
        })
    }

    async fn load_registration(&self, id: RegistrationId) -> Result<Registration, Error> {
        self.ledger
            .find_by_id(&id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| EnrollmentError::registration_not_found(id).into())
    }

    async fn try_enroll(&self, request: &EnrollRequest) -> Result<Registration, EnrollFailure> {
        let course = self.load_course(request.course_id).await?;
        let user = self.resolve_student(&request.student).await?;
        if !course.status().is_open() {
            return Err(EnrollmentError::CourseNotOpen {
                course_id: course.id(),
                status: course.status(),
            }
            .into());
        }

        let registration = Registration::enroll(
            RegistrationId::random(),
            *user.id(),
            course.id(),
            self.clock.utc(),
        );
        let outcome = self
            .ledger
            .insert_within_capacity(&registration)
            .await
            .map_err(map_ledger_error)?;
        match outcome {
            InsertOutcome::Inserted => Ok(registration),
            InsertOutcome::Duplicate => Err(EnrollmentError::DuplicateRegistration {
                user_id: *user.id(),
                course_id: course.id(),
            }
            .into()),
            InsertOutcome::CourseFull { max_students } => Err(EnrollmentError::CourseFull {
                course_id: course.id(),
                max_students,
            }
            .into()),
            InsertOutcome::CourseMissing => Err(EnrollmentError::CourseNotFound {
                course_id: course.id(),
            }
            .into()),
            InsertOutcome::CourseNotOpen { status } => Err(EnrollmentError::CourseNotOpen {
                course_id: course.id(),
                status,
            }
            .into()),
        }
    }

    async fn record(&self, outcome: EnrollmentOutcome) {
        if let Err(err) = self.metrics.record_enrollment(outcome).await {
            warn!(error = %err, %outcome, "failed to record enrollment metric");
        }
    }

    /// Write `updated` if the stored status still equals `previous`.
    async fn commit(
        &self,
        updated: Registration,
        previous: RegistrationStatus,
    ) -> Result<RegistrationPayload, Error> {
        match self.ledger.update(&updated, previous).await {
            Ok(()) => Ok(RegistrationPayload::from(updated)),
            Err(err) => {
                if matches!(err, RegistrationLedgerError::StaleStatus { .. }) {
                    warn!(registration_id = %updated.id(), "concurrent registration update");
                }
                Err(map_ledger_error(err))
            }
        }
    }
}

#[async_trait]
impl<C, U, L> EnrollmentCommand for EnrollmentService<C, U, L>
where
    C: CourseCatalogRepository,
    U: UserDirectory,
    L: RegistrationLedger,
{
    async fn enroll(&self, request: EnrollRequest) -> Result<RegistrationPayload, Error> {
        match self.try_enroll(&request).await {
            Ok(registration) => {
                self.record(EnrollmentOutcome::Enrolled).await;
                info!(
                    registration_id = %registration.id(),
                    user_id = %registration.user_id(),
                    course_id = %registration.course_id(),
                    "student enrolled"
                );
                Ok(RegistrationPayload::from(registration))
            }
            Err(failure) => {
                let outcome = failure.outcome();
                self.record(outcome).await;
                debug!(
                    course_id = %request.course_id,
                    student = %request.student,
                    %outcome,
                    "enrollment rejected"
                );
                Err(failure.into())
            }
        }
    }

    async fn drop_enrollment(&self, request: DropRequest) -> Result<(), Error> {
        let user = self
            .resolve_student(&request.student)
            .await
            .map_err(Error::from)?;
        let current = self
            .ledger
            .find_active_by_user_and_course(user.id(), &request.course_id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| {
                debug!(user_id = %user.id(), course_id = %request.course_id, "nothing to drop");
                Error::from(EnrollmentError::registration_not_found(format!(
                    "for user {} in course {}",
                    user.id(),
                    request.course_id
                )))
            })?;
        let dropped = current
            .transition_to(RegistrationStatus::Dropped, self.clock.utc())
            .map_err(transition_rejected)?;
        self.commit(dropped, current.status()).await?;
        info!(
            registration_id = %current.id(),
            user_id = %user.id(),
            course_id = %request.course_id,
            "enrollment dropped"
        );
        Ok(())
    }

    async fn update_grade(
        &self,
        request: UpdateGradeRequest,
    ) -> Result<RegistrationPayload, Error> {
        let grade = match request.grade.trim() {
            "" => None,
            raw => Some(Grade::new(raw).map_err(|err| {
                Error::invalid_request(err.to_string()).with_details(serde_json::json!({
                    "field": "grade",
                    "value": raw,
                    "code": "invalid_grade",
                }))
            })?),
        };
        let current = self.load_registration(request.registration_id).await?;
        let graded = current
            .apply_grade(grade, self.clock.utc())
            .map_err(|err| {
                debug!(registration_id = %current.id(), error = %err, "grade rejected");
                transition_rejected(err)
            })?;
        let payload = self.commit(graded, current.status()).await?;
        info!(
            registration_id = %payload.id,
            status = %payload.status,
            graded = payload.grade.is_some(),
            "grade updated"
        );
        Ok(payload)
    }

    async fn update_status(
        &self,
        request: UpdateStatusRequest,
    ) -> Result<RegistrationPayload, Error> {
        let current = self.load_registration(request.registration_id).await?;
        if current.status() == request.status {
            return Ok(RegistrationPayload::from(current));
        }
        let updated = current
            .transition_to(request.status, self.clock.utc())
            .map_err(|err| {
                debug!(registration_id = %current.id(), error = %err, "status change rejected");
                transition_rejected(err)
            })?;
        let payload = self.commit(updated, current.status()).await?;
        info!(
            registration_id = %payload.id,
            from = %current.status(),
            to = %payload.status,
            "registration status changed"
        );
        Ok(payload)
    }

    async fn delete_registration(&self, registration_id: RegistrationId) -> Result<(), Error> {
        self.ledger
            .delete(&registration_id)
            .await
            .map_err(map_ledger_error)?;
        info!(%registration_id, "registration deleted");
        Ok(())
    }
}

#[async_trait]
impl<C, U, L> RegistrationQuery for EnrollmentService<C, U, L>
where
    C: CourseCatalogRepository,
    U: UserDirectory,
    L: RegistrationLedger,
{
    async fn get_registration(
        &self,
        registration_id: RegistrationId,
    ) -> Result<RegistrationPayload, Error> {
        self.load_registration(registration_id)
            .await
            .map(RegistrationPayload::from)
    }

    async fn list_registrations_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<RegistrationPayload>, Error> {
        let registrations = self
            .ledger
            .list_by_user(&user_id)
            .await
            .map_err(map_ledger_error)?;
        Ok(registrations
            .into_iter()
            .map(RegistrationPayload::from)
            .collect())
    }

    async fn list_registrations_for_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<RegistrationPayload>, Error> {
        self.load_course(course_id).await.map_err(Error::from)?;
        let registrations = self
            .ledger
            .list_by_course(&course_id)
            .await
            .map_err(map_ledger_error)?;
        Ok(registrations
            .into_iter()
            .map(RegistrationPayload::from)
            .collect())
    }
}

#[cfg(test)]
#[path = "enrollment_service_tests.rs"]
mod tests;
