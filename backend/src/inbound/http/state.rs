//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountQuery, CourseCommand, CourseQuery, EnrollmentCommand, LoginService, RegistrationQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountQuery>,
    pub enrollment: Arc<dyn EnrollmentCommand>,
    pub registrations: Arc<dyn RegistrationQuery>,
    pub courses: Arc<dyn CourseCommand>,
    pub courses_query: Arc<dyn CourseQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountQuery>,
    pub enrollment: Arc<dyn EnrollmentCommand>,
    pub registrations: Arc<dyn RegistrationQuery>,
    pub courses: Arc<dyn CourseCommand>,
    pub courses_query: Arc<dyn CourseQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use registrar::domain::ports::NoOpEnrollmentMetrics;
    /// use registrar::domain::{AccountService, CourseLifecycleService, EnrollmentService};
    /// use registrar::inbound::http::state::{HttpState, HttpStatePorts};
    /// use registrar::outbound::memory::MemoryStore;
    ///
    /// let store = MemoryStore::with_fixture_accounts();
    /// let accounts = Arc::new(AccountService::new(Arc::new(store.user_directory()), "password"));
    /// let enrollment = Arc::new(EnrollmentService::new(
    ///     Arc::new(store.course_catalog()),
    ///     Arc::new(store.user_directory()),
    ///     Arc::new(store.registration_ledger()),
    ///     Arc::new(NoOpEnrollmentMetrics),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let courses = Arc::new(CourseLifecycleService::new(
    ///     Arc::new(store.course_catalog()),
    ///     Arc::new(store.registration_ledger()),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(HttpStatePorts {
    ///     login: accounts.clone(),
    ///     accounts,
    ///     enrollment: enrollment.clone(),
    ///     registrations: enrollment,
    ///     courses: courses.clone(),
    ///     courses_query: courses,
    /// });
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            enrollment,
            registrations,
            courses,
            courses_query,
        } = ports;
        Self {
            login,
            accounts,
            enrollment,
            registrations,
            courses,
            courses_query,
        }
    }
}
