//! Well-known development accounts.
//!
//! These seed the in-memory directory and, when requested, the PostgreSQL
//! `users` table so a fresh deployment has an administrator to log in with.

use uuid::Uuid;

use crate::domain::{User, UserId, UserRole, Username};

/// Administrator account id.
pub const FIXTURE_ADMIN_ID: Uuid = Uuid::from_u128(0x123e4567_e89b_12d3_a456_426614174000);
/// Instructor account id.
pub const FIXTURE_INSTRUCTOR_ID: Uuid = Uuid::from_u128(0x123e4567_e89b_12d3_a456_426614174001);
/// First student account id.
pub const FIXTURE_STUDENT_ONE_ID: Uuid = Uuid::from_u128(0x123e4567_e89b_12d3_a456_426614174002);
/// Second student account id.
pub const FIXTURE_STUDENT_TWO_ID: Uuid = Uuid::from_u128(0x123e4567_e89b_12d3_a456_426614174003);

const FIXTURES: [(Uuid, &str, &str, UserRole); 4] = [
    (FIXTURE_ADMIN_ID, "admin", "Registrar Admin", UserRole::Admin),
    (
        FIXTURE_INSTRUCTOR_ID,
        "instructor",
        "Course Instructor",
        UserRole::Instructor,
    ),
    (
        FIXTURE_STUDENT_ONE_ID,
        "student1",
        "First Student",
        UserRole::Student,
    ),
    (
        FIXTURE_STUDENT_TWO_ID,
        "student2",
        "Second Student",
        UserRole::Student,
    ),
];

/// Build the fixture accounts.
///
/// # Examples
/// ```
/// use registrar::domain::{fixture_accounts, UserRole};
///
/// let accounts = fixture_accounts();
/// assert!(accounts.iter().any(|user| user.role() == UserRole::Admin));
/// ```
pub fn fixture_accounts() -> Vec<User> {
    FIXTURES
        .iter()
        .filter_map(|(id, username, display_name, role)| {
            let username = Username::new(username).ok()?;
            User::new(UserId::from_uuid(*id), username, *display_name, *role).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn every_fixture_is_valid() {
        assert_eq!(fixture_accounts().len(), FIXTURES.len());
    }

    #[rstest]
    fn fixture_ids_are_distinct() {
        let mut ids: Vec<_> = fixture_accounts().iter().map(|u| *u.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), FIXTURES.len());
    }
}
