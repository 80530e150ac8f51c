//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{Error, test as actix_test};
use mockable::DefaultClock;
use serde_json::json;

use crate::domain::ports::NoOpEnrollmentMetrics;
use crate::domain::{AccountService, CourseLifecycleService, EnrollmentService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::MemoryStore;

/// Password accepted for every fixture account in handler tests.
pub const TEST_PASSWORD: &str = "password";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Wire the real services over `store`.
pub fn memory_state(store: &MemoryStore) -> HttpState {
    let catalog = Arc::new(store.course_catalog());
    let directory = Arc::new(store.user_directory());
    let ledger = Arc::new(store.registration_ledger());
    let accounts = Arc::new(AccountService::new(directory.clone(), TEST_PASSWORD));
    let enrollment = Arc::new(EnrollmentService::new(
        catalog.clone(),
        directory,
        ledger.clone(),
        Arc::new(NoOpEnrollmentMetrics),
        Arc::new(DefaultClock),
    ));
    let courses = Arc::new(CourseLifecycleService::new(
        catalog,
        ledger,
        Arc::new(DefaultClock),
    ));
    HttpState::new(HttpStatePorts {
        login: accounts.clone(),
        accounts,
        enrollment: enrollment.clone(),
        registrations: enrollment,
        courses: courses.clone(),
        courses_query: courses,
    })
}

/// Log in as `username` and return the session cookie.
///
/// The app must mount the login handler under `/api/v1`.
pub async fn login_cookie<S, B>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
{
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": username, "password": TEST_PASSWORD }))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(
        response.status().is_success(),
        "login as {username} failed with {}",
        response.status()
    );
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set on login")
}
