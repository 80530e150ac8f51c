//! In-memory registration ledger.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::ports::{InsertOutcome, RegistrationLedger, RegistrationLedgerError};
use crate::domain::{CourseId, Registration, RegistrationId, RegistrationStatus, UserId};

use super::MemoryStore;

/// Ledger adapter over a [`MemoryStore`].
///
/// Capacity checks share the store lock with the insert they guard.
#[derive(Debug, Clone)]
pub struct MemoryRegistrationLedger {
    store: MemoryStore,
}

impl MemoryRegistrationLedger {
    pub(super) fn new(store: MemoryStore) -> Self {
        Self { store }
    }

    fn collect(
        &self,
        keep: impl Fn(&Registration) -> bool,
    ) -> Result<Vec<Registration>, RegistrationLedgerError> {
        let state = self.store.lock().map_err(RegistrationLedgerError::query)?;
        Ok(state
            .registrations
            .values()
            .filter(|registration| keep(registration))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RegistrationLedger for MemoryRegistrationLedger {
    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, RegistrationLedgerError> {
        let state = self.store.lock().map_err(RegistrationLedgerError::query)?;
        Ok(state.registrations.get(id).cloned())
    }

    async fn find_active_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Registration>, RegistrationLedgerError> {
        Ok(self
            .collect(|r| r.user_id() == user_id && r.course_id() == *course_id && r.is_active())?
            .into_iter()
            .next())
    }

    async fn exists_active_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, RegistrationLedgerError> {
        let state = self.store.lock().map_err(RegistrationLedgerError::query)?;
        Ok(state.has_active_pair(user_id, *course_id))
    }

    async fn count_active_by_course(
        &self,
        course_id: &CourseId,
    ) -> Result<u64, RegistrationLedgerError> {
        let state = self.store.lock().map_err(RegistrationLedgerError::query)?;
        Ok(state.active_count(*course_id))
    }

    async fn count_active_by_courses(
        &self,
        course_ids: &[CourseId],
    ) -> Result<HashMap<CourseId, u64>, RegistrationLedgerError> {
        let state = self.store.lock().map_err(RegistrationLedgerError::query)?;
        Ok(course_ids
            .iter()
            .map(|id| (*id, state.active_count(*id)))
            .filter(|(_, count)| *count > 0)
            .collect())
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Registration>, RegistrationLedgerError> {
        let mut registrations = self.collect(|r| r.user_id() == user_id)?;
        registrations.sort_by_key(|r| std::cmp::Reverse(r.registration_date()));
        Ok(registrations)
    }

    async fn list_by_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<Registration>, RegistrationLedgerError> {
        let mut registrations = self.collect(|r| r.course_id() == *course_id)?;
        registrations.sort_by_key(Registration::registration_date);
        Ok(registrations)
    }

    async fn insert_within_capacity(
        &self,
        registration: &Registration,
    ) -> Result<InsertOutcome, RegistrationLedgerError> {
        let mut state = self.store.lock().map_err(RegistrationLedgerError::query)?;
        let Some(course) = state.courses.get(&registration.course_id()) else {
            return Ok(InsertOutcome::CourseMissing);
        };
        if !course.status().is_open() {
            return Ok(InsertOutcome::CourseNotOpen {
                status: course.status(),
            });
        }
        let capacity = course.capacity();
        if state.has_active_pair(registration.user_id(), registration.course_id()) {
            return Ok(InsertOutcome::Duplicate);
        }
        if !capacity.has_seat_for(state.active_count(registration.course_id())) {
            return Ok(InsertOutcome::CourseFull {
                max_students: capacity.max_students(),
            });
        }
        state
            .registrations
            .insert(registration.id(), registration.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn update(
        &self,
        registration: &Registration,
        expected: RegistrationStatus,
    ) -> Result<(), RegistrationLedgerError> {
        let mut state = self.store.lock().map_err(RegistrationLedgerError::query)?;
        let Some(stored) = state.registrations.get_mut(&registration.id()) else {
            return Err(RegistrationLedgerError::not_found(registration.id()));
        };
        if stored.status() != expected {
            return Err(RegistrationLedgerError::stale_status(
                registration.id(),
                expected,
            ));
        }
        *stored = registration.clone();
        Ok(())
    }

    async fn delete(&self, id: &RegistrationId) -> Result<(), RegistrationLedgerError> {
        let mut state = self.store.lock().map_err(RegistrationLedgerError::query)?;
        state
            .registrations
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RegistrationLedgerError::not_found(*id))
    }
}
