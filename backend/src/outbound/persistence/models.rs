//! Internal Diesel row structs.
//!
//! Rows never leave the persistence layer. Conversions into domain types
//! return `Result<_, String>` so each adapter can wrap the message in its own
//! port error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Capacity, Course, CourseAttributes, CourseCode, CourseId, CourseStatus, Grade, PaymentInfo,
    PaymentStatus, Registration, RegistrationId, RegistrationRecord, RegistrationStatus, User,
    UserId, UserRole, Username,
};

use super::schema::{courses, registrations, users};

/// Convert a domain count into the signed column type.
pub(crate) fn to_db_int(value: u32, column: &str) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("{column} {value} exceeds the column range"))
}

fn from_db_int(value: i32, column: &str) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{column} {value} is negative"))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: String,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(&row.username).map_err(|err| err.to_string())?;
        let role = row
            .role
            .parse::<UserRole>()
            .map_err(|err| err.to_string())?;
        User::new(UserId::from_uuid(row.id), username, row.display_name, role)
            .map_err(|err| err.to_string())
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub display_name: &'a str,
    pub role: &'a str,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            username: user.username().as_str(),
            display_name: user.display_name(),
            role: user.role().as_str(),
        }
    }
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub max_students: i32,
    pub min_students: i32,
    pub status: String,
    pub fee_cents: i32,
    pub schedule: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = String;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let capacity = Capacity::new(
            from_db_int(row.max_students, "max_students")?,
            from_db_int(row.min_students, "min_students")?,
        )
        .map_err(|err| err.to_string())?;
        let attributes = CourseAttributes {
            code: CourseCode::new(&row.code).map_err(|err| err.to_string())?,
            title: row.title,
            capacity,
            fee_cents: from_db_int(row.fee_cents, "fee_cents")?,
            schedule: row.schedule,
        };
        let status = row
            .status
            .parse::<CourseStatus>()
            .map_err(|err| err.to_string())?;
        Ok(Course::from_parts(
            CourseId::from_uuid(row.id),
            attributes,
            status,
            row.created_at,
        ))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub id: Uuid,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    #[diesel(embed)]
    pub fields: CourseUpdate<'a>,
}

impl<'a> NewCourseRow<'a> {
    pub(crate) fn new(course: &'a Course) -> Result<Self, String> {
        Ok(Self {
            id: *course.id().as_uuid(),
            status: course.status().as_str(),
            created_at: course.created_at(),
            fields: CourseUpdate::new(course, course.created_at())?,
        })
    }
}

/// Editable course columns.
///
/// `status` is absent: it only changes through a compare-and-set on the
/// previous value.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = courses)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CourseUpdate<'a> {
    pub code: &'a str,
    pub title: &'a str,
    pub max_students: i32,
    pub min_students: i32,
    pub fee_cents: i32,
    pub schedule: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> CourseUpdate<'a> {
    pub(crate) fn new(course: &'a Course, updated_at: DateTime<Utc>) -> Result<Self, String> {
        let capacity = course.capacity();
        Ok(Self {
            code: course.code().as_str(),
            title: course.title(),
            max_students: to_db_int(capacity.max_students(), "max_students")?,
            min_students: to_db_int(capacity.min_students(), "min_students")?,
            fee_cents: to_db_int(course.fee_cents(), "fee_cents")?,
            schedule: course.schedule(),
            updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Registrations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = registrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RegistrationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: String,
    pub grade: Option<String>,
    pub payment_status: String,
    pub amount_paid_cents: i32,
    pub registration_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = String;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        let grade = row
            .grade
            .map(Grade::new)
            .transpose()
            .map_err(|err| err.to_string())?;
        let payment = PaymentInfo {
            status: row
                .payment_status
                .parse::<PaymentStatus>()
                .map_err(|err| err.to_string())?,
            amount_paid_cents: from_db_int(row.amount_paid_cents, "amount_paid_cents")?,
        };
        Ok(Registration::from_record(RegistrationRecord {
            id: RegistrationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            course_id: CourseId::from_uuid(row.course_id),
            status: row
                .status
                .parse::<RegistrationStatus>()
                .map_err(|err| err.to_string())?,
            grade,
            payment,
            registration_date: row.registration_date,
            updated_at: row.updated_at,
        }))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registrations)]
pub(crate) struct NewRegistrationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub status: &'a str,
    pub grade: Option<&'a str>,
    pub payment_status: &'a str,
    pub amount_paid_cents: i32,
    pub registration_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewRegistrationRow<'a> {
    pub(crate) fn new(registration: &'a Registration) -> Result<Self, String> {
        let payment = registration.payment();
        Ok(Self {
            id: *registration.id().as_uuid(),
            user_id: *registration.user_id().as_uuid(),
            course_id: *registration.course_id().as_uuid(),
            status: registration.status().as_str(),
            grade: registration.grade().map(Grade::as_str),
            payment_status: payment.status.as_str(),
            amount_paid_cents: to_db_int(payment.amount_paid_cents, "amount_paid_cents")?,
            registration_date: registration.registration_date(),
            updated_at: registration.updated_at(),
        })
    }
}

/// Mutable registration columns; the user, course and date never change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = registrations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RegistrationUpdate<'a> {
    pub status: &'a str,
    pub grade: Option<&'a str>,
    pub payment_status: &'a str,
    pub amount_paid_cents: i32,
    pub updated_at: DateTime<Utc>,
}

impl<'a> RegistrationUpdate<'a> {
    pub(crate) fn new(registration: &'a Registration) -> Result<Self, String> {
        let payment = registration.payment();
        Ok(Self {
            status: registration.status().as_str(),
            grade: registration.grade().map(Grade::as_str),
            payment_status: payment.status.as_str(),
            amount_paid_cents: to_db_int(payment.amount_paid_cents, "amount_paid_cents")?,
            updated_at: registration.updated_at(),
        })
    }
}
