//! PostgreSQL-backed `CourseCatalogRepository`.
//!
//! Updates and deletes lock the course row (`SELECT ... FOR UPDATE`) before
//! counting active registrations. Enrollment inserts take the same lock, so
//! a capacity change and a concurrent enrollment are serialised. Attribute
//! updates leave `status` alone; status changes are a single
//! `UPDATE ... WHERE status = $expected`.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{CourseCatalogError, CourseCatalogRepository};
use crate::domain::{Course, CourseCode, CourseId, CourseStatus};

use super::diesel_basic_error_mapping::{
    COURSE_CODE_CONSTRAINT, is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_registration_ledger::active_statuses;
use super::models::{CourseRow, CourseUpdate, NewCourseRow};
use super::pool::{DbPool, PoolError};
use super::schema::{courses, registrations};

/// Diesel implementation of [`CourseCatalogRepository`].
#[derive(Clone)]
pub struct DieselCourseCatalogRepository {
    pool: DbPool,
}

impl DieselCourseCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CourseCatalogError {
    map_basic_pool_error(error, CourseCatalogError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CourseCatalogError {
    map_basic_diesel_error(error, CourseCatalogError::query, CourseCatalogError::connection)
}

/// Map a write failure, recognising the course code constraint.
fn map_write_error(error: diesel::result::Error, course: &Course) -> CourseCatalogError {
    if is_unique_violation(&error, COURSE_CODE_CONSTRAINT) {
        CourseCatalogError::duplicate_code(course.code().as_str())
    } else {
        map_diesel_error(error)
    }
}

fn to_course(row: CourseRow) -> Result<Course, CourseCatalogError> {
    Course::try_from(row).map_err(CourseCatalogError::query)
}

/// Stored status and active registration count of a locked course row.
struct LockedCourse {
    status: String,
    active: u64,
}

/// Lock the course row and count its active registrations.
///
/// Returns `None` when the course does not exist.
async fn lock_and_count_active(
    conn: &mut AsyncPgConnection,
    id: &CourseId,
) -> Result<Option<LockedCourse>, diesel::result::Error> {
    let locked: Option<String> = courses::table
        .find(id.as_uuid())
        .select(courses::status)
        .for_update()
        .first(conn)
        .await
        .optional()?;
    let Some(status) = locked else {
        return Ok(None);
    };
    let active: i64 = registrations::table
        .filter(registrations::course_id.eq(id.as_uuid()))
        .filter(registrations::status.eq_any(active_statuses()))
        .count()
        .get_result(conn)
        .await?;
    Ok(Some(LockedCourse {
        status,
        active: u64::try_from(active).unwrap_or_default(),
    }))
}

#[async_trait]
impl CourseCatalogRepository for DieselCourseCatalogRepository {
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CourseRow> = courses::table
            .find(id.as_uuid())
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_course).transpose()
    }

    async fn find_by_code(&self, code: &CourseCode) -> Result<Option<Course>, CourseCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CourseRow> = courses::table
            .filter(courses::code.eq(code.as_str()))
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_course).transpose()
    }

    async fn exists_by_code(&self, code: &CourseCode) -> Result<bool, CourseCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(courses::table.filter(courses::code.eq(code.as_str()))))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn list(&self) -> Result<Vec<Course>, CourseCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CourseRow> = courses::table
            .select(CourseRow::as_select())
            .order_by(courses::code.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_course).collect()
    }

    async fn insert(&self, course: &Course) -> Result<(), CourseCatalogError> {
        let row = NewCourseRow::new(course).map_err(CourseCatalogError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(courses::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, course))
    }

    async fn update(
        &self,
        course: &Course,
        expected: CourseStatus,
    ) -> Result<(), CourseCatalogError> {
        let changes = CourseUpdate::new(course, Utc::now()).map_err(CourseCatalogError::query)?;
        let requested = u64::from(course.capacity().max_students());
        let id = course.id();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let Some(locked) = lock_and_count_active(conn, &id).await? else {
                        return Ok(Err(CourseCatalogError::not_found(id)));
                    };
                    if locked.status != expected.as_str() {
                        return Ok(Err(CourseCatalogError::stale_status(id, expected)));
                    }
                    if requested < locked.active {
                        return Ok(Err(CourseCatalogError::capacity_below_enrollment(
                            locked.active,
                        )));
                    }
                    diesel::update(
                        courses::table
                            .find(id.as_uuid())
                            .filter(courses::status.eq(expected.as_str())),
                    )
                    .set(&changes)
                    .execute(conn)
                    .await?;
                    Ok(Ok(()))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_write_error(err, course))?
    }

    async fn update_status(
        &self,
        id: &CourseId,
        expected: CourseStatus,
        next: CourseStatus,
    ) -> Result<(), CourseCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            courses::table
                .find(id.as_uuid())
                .filter(courses::status.eq(expected.as_str())),
        )
        .set((
            courses::status.eq(next.as_str()),
            courses::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let still_exists: bool = diesel::select(exists(courses::table.find(id.as_uuid())))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if still_exists {
            Err(CourseCatalogError::stale_status(*id, expected))
        } else {
            Err(CourseCatalogError::not_found(*id))
        }
    }

    async fn delete(&self, id: &CourseId) -> Result<(), CourseCatalogError> {
        let id = *id;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let Some(locked) = lock_and_count_active(conn, &id).await? else {
                        return Ok(Err(CourseCatalogError::not_found(id)));
                    };
                    if locked.active > 0 {
                        return Ok(Err(CourseCatalogError::has_active_registrations(
                            locked.active,
                        )));
                    }
                    // Inactive history goes with the course via ON DELETE CASCADE.
                    diesel::delete(courses::table.find(id.as_uuid()))
                        .execute(conn)
                        .await?;
                    Ok(Ok(()))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?
    }
}
