//! In-memory course catalogue.

use async_trait::async_trait;

use crate::domain::ports::{CourseCatalogError, CourseCatalogRepository};
use crate::domain::{Course, CourseCode, CourseId, CourseStatus};

use super::MemoryStore;

/// Catalogue adapter over a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryCourseCatalog {
    store: MemoryStore,
}

impl MemoryCourseCatalog {
    pub(super) fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CourseCatalogRepository for MemoryCourseCatalog {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseCatalogError> {
        let state = self.store.lock().map_err(CourseCatalogError::query)?;
        Ok(state.courses.get(id).cloned())
    }

    async fn find_by_code(&self, code: &CourseCode) -> Result<Option<Course>, CourseCatalogError> {
        let state = self.store.lock().map_err(CourseCatalogError::query)?;
        Ok(state
            .courses
            .values()
            .find(|course| course.code() == code)
            .cloned())
    }

    async fn exists_by_code(&self, code: &CourseCode) -> Result<bool, CourseCatalogError> {
        let state = self.store.lock().map_err(CourseCatalogError::query)?;
        Ok(state.courses.values().any(|course| course.code() == code))
    }

    async fn list(&self) -> Result<Vec<Course>, CourseCatalogError> {
        let state = self.store.lock().map_err(CourseCatalogError::query)?;
        let mut courses: Vec<Course> = state.courses.values().cloned().collect();
        courses.sort_by(|a, b| a.code().as_str().cmp(b.code().as_str()));
        Ok(courses)
    }

    async fn insert(&self, course: &Course) -> Result<(), CourseCatalogError> {
        let mut state = self.store.lock().map_err(CourseCatalogError::query)?;
        if state
            .courses
            .values()
            .any(|existing| existing.code() == course.code())
        {
            return Err(CourseCatalogError::duplicate_code(course.code().as_str()));
        }
        state.courses.insert(course.id(), course.clone());
        Ok(())
    }

    async fn update(
        &self,
        course: &Course,
        expected: CourseStatus,
    ) -> Result<(), CourseCatalogError> {
        let mut state = self.store.lock().map_err(CourseCatalogError::query)?;
        let Some(stored_status) = state.courses.get(&course.id()).map(Course::status) else {
            return Err(CourseCatalogError::not_found(course.id()));
        };
        if stored_status != expected {
            return Err(CourseCatalogError::stale_status(course.id(), expected));
        }
        if state
            .courses
            .values()
            .any(|existing| existing.id() != course.id() && existing.code() == course.code())
        {
            return Err(CourseCatalogError::duplicate_code(course.code().as_str()));
        }
        let active = state.active_count(course.id());
        if u64::from(course.capacity().max_students()) < active {
            return Err(CourseCatalogError::capacity_below_enrollment(active));
        }
        state
            .courses
            .insert(course.id(), course.clone().with_status(stored_status));
        Ok(())
    }

    async fn update_status(
        &self,
        id: &CourseId,
        expected: CourseStatus,
        next: CourseStatus,
    ) -> Result<(), CourseCatalogError> {
        let mut state = self.store.lock().map_err(CourseCatalogError::query)?;
        let Some(stored) = state.courses.get_mut(id) else {
            return Err(CourseCatalogError::not_found(*id));
        };
        if stored.status() != expected {
            return Err(CourseCatalogError::stale_status(*id, expected));
        }
        *stored = stored.clone().with_status(next);
        Ok(())
    }

    async fn delete(&self, id: &CourseId) -> Result<(), CourseCatalogError> {
        let mut state = self.store.lock().map_err(CourseCatalogError::query)?;
        if !state.courses.contains_key(id) {
            return Err(CourseCatalogError::not_found(*id));
        }
        let active = state.active_count(*id);
        if active > 0 {
            return Err(CourseCatalogError::has_active_registrations(active));
        }
        state.courses.remove(id);
        state
            .registrations
            .retain(|_, registration| registration.course_id() != *id);
        Ok(())
    }
}
