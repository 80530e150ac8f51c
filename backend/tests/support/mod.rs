//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates, so each suite pulls this
//! module in with `mod support;` and uses the pieces it needs.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::sync::Arc;

use mockable::DefaultClock;
use registrar::domain::ports::{
    CourseCommand, CourseQuery, EnrollRequest, EnrollmentCommand, NoOpEnrollmentMetrics,
    RegistrationPayload, RegistrationQuery, StudentRef,
};
use registrar::domain::{
    AccountService, CourseDraft, CourseId, CourseLifecycleService, CourseStatus,
    EnrollmentService, Error, User, UserId, UserRole, Username,
};
use registrar::inbound::http::state::{HttpState, HttpStatePorts};
use registrar::outbound::memory::{
    MemoryCourseCatalog, MemoryRegistrationLedger, MemoryStore, MemoryUserDirectory,
};

/// Development password accepted for every account.
pub const PASSWORD: &str = "password";

pub type MemoryEnrollment =
    EnrollmentService<MemoryCourseCatalog, MemoryUserDirectory, MemoryRegistrationLedger>;
pub type MemoryCourses = CourseLifecycleService<MemoryCourseCatalog, MemoryRegistrationLedger>;

/// Services wired over one in-memory store.
#[derive(Clone)]
pub struct Harness {
    pub store: MemoryStore,
    pub enrollment: Arc<MemoryEnrollment>,
    pub courses: Arc<MemoryCourses>,
}

impl Harness {
    pub fn new() -> Self {
        let store = MemoryStore::with_fixture_accounts();
        let catalog = Arc::new(store.course_catalog());
        let ledger = Arc::new(store.registration_ledger());
        let enrollment = Arc::new(EnrollmentService::new(
            catalog.clone(),
            Arc::new(store.user_directory()),
            ledger.clone(),
            Arc::new(NoOpEnrollmentMetrics),
            Arc::new(DefaultClock),
        ));
        let courses = Arc::new(CourseLifecycleService::new(
            catalog,
            ledger,
            Arc::new(DefaultClock),
        ));
        Self {
            store,
            enrollment,
            courses,
        }
    }

    /// Create an active course with `max_students` seats.
    pub async fn active_course(&self, code: &str, max_students: u32) -> CourseId {
        self.courses
            .create_course(CourseDraft {
                code: code.to_owned(),
                title: format!("{code} lectures"),
                max_students,
                min_students: 1,
                fee_cents: 0,
                schedule: None,
                status: Some(CourseStatus::Active),
            })
            .await
            .expect("course created")
            .course
            .id
    }

    /// Add `count` students named `{prefix}{n}` to the directory.
    pub fn students(&self, prefix: &str, count: usize) -> Vec<UserId> {
        (0..count)
            .map(|n| {
                let id = UserId::random();
                let username = Username::new(format!("{prefix}{n}")).expect("valid username");
                let user = User::new(id, username, format!("Student {n}"), UserRole::Student)
                    .expect("valid user");
                self.store.insert_user(user);
                id
            })
            .collect()
    }

    pub async fn enroll(
        &self,
        student: UserId,
        course_id: CourseId,
    ) -> Result<RegistrationPayload, Error> {
        self.enrollment
            .enroll(EnrollRequest {
                student: StudentRef::Id(student),
                course_id,
            })
            .await
    }

    pub async fn enrolled_count(&self, course_id: CourseId) -> u64 {
        self.courses
            .get_course(course_id)
            .await
            .expect("course exists")
            .enrolled_count
    }

    pub async fn registrations_for(&self, course_id: CourseId) -> Vec<RegistrationPayload> {
        self.enrollment
            .list_registrations_for_course(course_id)
            .await
            .expect("registrations listed")
    }

    /// HTTP state backed by this harness's services.
    pub fn http_state(&self) -> HttpState {
        let accounts = Arc::new(AccountService::new(
            Arc::new(self.store.user_directory()),
            PASSWORD,
        ));
        HttpState::new(HttpStatePorts {
            login: accounts.clone(),
            accounts,
            enrollment: self.enrollment.clone(),
            registrations: self.enrollment.clone(),
            courses: self.courses.clone(),
            courses_query: self.courses.clone(),
        })
    }
}
