//! PostgreSQL-backed `RegistrationLedger`.
//!
//! `insert_within_capacity` runs in one transaction:
//!
//! 1. lock the course row with `SELECT ... FOR UPDATE` and reject unless it
//!    is `active`;
//! 2. reject when the pair already holds an active registration;
//! 3. count active registrations against `max_students`;
//! 4. insert.
//!
//! The row lock serialises concurrent enrollments for the same course. The
//! partial unique index `registrations_active_user_course_key` backs step 2;
//! a violation of it is reported as a duplicate.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{InsertOutcome, RegistrationLedger, RegistrationLedgerError};
use crate::domain::{
    CourseId, CourseStatus, Registration, RegistrationId, RegistrationStatus, UserId,
};

use super::diesel_basic_error_mapping::{
    ACTIVE_REGISTRATION_CONSTRAINT, is_unique_violation, map_basic_diesel_error,
    map_basic_pool_error,
};
use super::models::{NewRegistrationRow, RegistrationRow, RegistrationUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{courses, registrations};

/// Stored values of the statuses that hold a seat.
pub(crate) fn active_statuses() -> [&'static str; 2] {
    RegistrationStatus::ACTIVE.map(RegistrationStatus::as_str)
}

/// Diesel implementation of [`RegistrationLedger`].
#[derive(Clone)]
pub struct DieselRegistrationLedger {
    pool: DbPool,
}

impl DieselRegistrationLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> RegistrationLedgerError {
    map_basic_pool_error(error, RegistrationLedgerError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> RegistrationLedgerError {
    map_basic_diesel_error(
        error,
        RegistrationLedgerError::query,
        RegistrationLedgerError::connection,
    )
}

fn to_registrations(
    rows: Vec<RegistrationRow>,
) -> Result<Vec<Registration>, RegistrationLedgerError> {
    rows.into_iter()
        .map(|row| Registration::try_from(row).map_err(RegistrationLedgerError::query))
        .collect()
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[async_trait]
impl RegistrationLedger for DieselRegistrationLedger {
    async fn find_by_id(
        &self,
        id: &RegistrationId,
    ) -> Result<Option<Registration>, RegistrationLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RegistrationRow> = registrations::table
            .find(id.as_uuid())
            .select(RegistrationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|row| Registration::try_from(row).map_err(RegistrationLedgerError::query))
            .transpose()
    }

    async fn find_active_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Registration>, RegistrationLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RegistrationRow> = registrations::table
            .filter(registrations::user_id.eq(user_id.as_uuid()))
            .filter(registrations::course_id.eq(course_id.as_uuid()))
            .filter(registrations::status.eq_any(active_statuses()))
            .select(RegistrationRow::as_select())
            .limit(1)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_registrations(rows)?.into_iter().next())
    }

    async fn exists_active_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, RegistrationLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            registrations::table
                .filter(registrations::user_id.eq(user_id.as_uuid()))
                .filter(registrations::course_id.eq(course_id.as_uuid()))
                .filter(registrations::status.eq_any(active_statuses())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn count_active_by_course(
        &self,
        course_id: &CourseId,
    ) -> Result<u64, RegistrationLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = registrations::table
            .filter(registrations::course_id.eq(course_id.as_uuid()))
            .filter(registrations::status.eq_any(active_statuses()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(to_count(count))
    }

    async fn count_active_by_courses(
        &self,
        course_ids: &[CourseId],
    ) -> Result<HashMap<CourseId, u64>, RegistrationLedgerError> {
        if course_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<Uuid> = course_ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let counts: Vec<(Uuid, i64)> = registrations::table
            .filter(registrations::course_id.eq_any(&ids))
            .filter(registrations::status.eq_any(active_statuses()))
            .group_by(registrations::course_id)
            .select((registrations::course_id, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(counts
            .into_iter()
            .map(|(id, count)| (CourseId::from_uuid(id), to_count(count)))
            .collect())
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Registration>, RegistrationLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RegistrationRow> = registrations::table
            .filter(registrations::user_id.eq(user_id.as_uuid()))
            .select(RegistrationRow::as_select())
            .order_by(registrations::registration_date.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_registrations(rows)
    }

    async fn list_by_course(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<Registration>, RegistrationLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<RegistrationRow> = registrations::table
            .filter(registrations::course_id.eq(course_id.as_uuid()))
            .select(RegistrationRow::as_select())
            .order_by(registrations::registration_date.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_registrations(rows)
    }

    async fn insert_within_capacity(
        &self,
        registration: &Registration,
    ) -> Result<InsertOutcome, RegistrationLedgerError> {
        let row = NewRegistrationRow::new(registration).map_err(RegistrationLedgerError::query)?;
        let course_id = *registration.course_id().as_uuid();
        let user_id = *registration.user_id().as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let locked: Option<(i32, String)> = courses::table
                        .find(course_id)
                        .select((courses::max_students, courses::status))
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some((max_students, status)) = locked else {
                        return Ok(InsertOutcome::CourseMissing);
                    };
                    let status = status
                        .parse::<CourseStatus>()
                        .map_err(|err| diesel::result::Error::DeserializationError(Box::new(err)))?;
                    if !status.is_open() {
                        return Ok(InsertOutcome::CourseNotOpen { status });
                    }

                    let duplicate: bool = diesel::select(exists(
                        registrations::table
                            .filter(registrations::user_id.eq(user_id))
                            .filter(registrations::course_id.eq(course_id))
                            .filter(registrations::status.eq_any(active_statuses())),
                    ))
                    .get_result(conn)
                    .await?;
                    if duplicate {
                        return Ok(InsertOutcome::Duplicate);
                    }

                    let active: i64 = registrations::table
                        .filter(registrations::course_id.eq(course_id))
                        .filter(registrations::status.eq_any(active_statuses()))
                        .count()
                        .get_result(conn)
                        .await?;
                    if active >= i64::from(max_students) {
                        return Ok(InsertOutcome::CourseFull {
                            max_students: u32::try_from(max_students).unwrap_or_default(),
                        });
                    }

                    diesel::insert_into(registrations::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(InsertOutcome::Inserted)
                }
                .scope_boxed()
            })
            .await;

        match result {
            Ok(outcome) => Ok(outcome),
            Err(error) if is_unique_violation(&error, ACTIVE_REGISTRATION_CONSTRAINT) => {
                debug!(%course_id, %user_id, "active registration index rejected insert");
                Ok(InsertOutcome::Duplicate)
            }
            Err(error) => Err(map_diesel_error(error)),
        }
    }

    async fn update(
        &self,
        registration: &Registration,
        expected: RegistrationStatus,
    ) -> Result<(), RegistrationLedgerError> {
        let changes =
            RegistrationUpdate::new(registration).map_err(RegistrationLedgerError::query)?;
        let id = registration.id();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(
            registrations::table
                .find(id.as_uuid())
                .filter(registrations::status.eq(expected.as_str())),
        )
        .set(&changes)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let still_exists: bool =
            diesel::select(exists(registrations::table.find(id.as_uuid())))
                .get_result(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        if still_exists {
            Err(RegistrationLedgerError::stale_status(id, expected))
        } else {
            Err(RegistrationLedgerError::not_found(id))
        }
    }

    async fn delete(&self, id: &RegistrationId) -> Result<(), RegistrationLedgerError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(registrations::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(RegistrationLedgerError::not_found(*id));
        }
        Ok(())
    }
}
