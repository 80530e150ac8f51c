//! Builders wiring adapters and services into [`HttpState`].
//!
//! With a database URL the Diesel adapters back every port; otherwise the
//! in-memory store is used and seeded with the fixture accounts.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use registrar::domain::ports::{
    CourseCatalogRepository, EnrollmentMetrics, RegistrationLedger, UserDirectory,
};
use registrar::domain::{
    AccountService, CourseLifecycleService, EnrollmentService, fixture_accounts,
};
use registrar::inbound::http::state::{HttpState, HttpStatePorts};
use registrar::outbound::memory::MemoryStore;
use registrar::outbound::persistence::{
    DbPool, DieselCourseCatalogRepository, DieselRegistrationLedger, DieselUserDirectory,
    PoolConfig, apply_migrations,
};
use registrar::settings::RegistrarSettings;
use tracing::info;

/// Wire the domain services over one set of driven adapters.
fn wire_services<C, U, L>(
    catalog: Arc<C>,
    directory: Arc<U>,
    ledger: Arc<L>,
    login_password: &str,
    metrics: Arc<dyn EnrollmentMetrics>,
) -> HttpState
where
    C: CourseCatalogRepository + 'static,
    U: UserDirectory + 'static,
    L: RegistrationLedger + 'static,
{
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let accounts = Arc::new(AccountService::new(directory.clone(), login_password));
    let enrollment = Arc::new(EnrollmentService::new(
        catalog.clone(),
        directory,
        ledger.clone(),
        metrics,
        clock.clone(),
    ));
    let courses = Arc::new(CourseLifecycleService::new(catalog, ledger, clock));
    HttpState::new(HttpStatePorts {
        login: accounts.clone(),
        accounts,
        enrollment: enrollment.clone(),
        registrations: enrollment,
        courses: courses.clone(),
        courses_query: courses,
    })
}

fn memory_state(settings: &RegistrarSettings, metrics: Arc<dyn EnrollmentMetrics>) -> HttpState {
    info!("no database configured; using in-memory adapters");
    let store = MemoryStore::with_fixture_accounts();
    wire_services(
        Arc::new(store.course_catalog()),
        Arc::new(store.user_directory()),
        Arc::new(store.registration_ledger()),
        settings.login_password(),
        metrics,
    )
}

async fn diesel_state(
    settings: &RegistrarSettings,
    database_url: &str,
    metrics: Arc<dyn EnrollmentMetrics>,
) -> std::io::Result<HttpState> {
    if settings.run_migrations() {
        let url = database_url.to_owned();
        let applied = tokio::task::spawn_blocking(move || apply_migrations(&url))
            .await
            .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))?
            .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
        info!(applied, "database migrations applied");
    }

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(|err| std::io::Error::other(format!("database pool setup failed: {err}")))?;

    let directory = DieselUserDirectory::new(pool.clone());
    if settings.seed_accounts() {
        let accounts = fixture_accounts();
        directory
            .upsert_accounts(&accounts)
            .await
            .map_err(|err| std::io::Error::other(format!("account seeding failed: {err}")))?;
        info!(count = accounts.len(), "fixture accounts upserted");
    }

    Ok(wire_services(
        Arc::new(DieselCourseCatalogRepository::new(pool.clone())),
        Arc::new(directory),
        Arc::new(DieselRegistrationLedger::new(pool)),
        settings.login_password(),
        metrics,
    ))
}

/// Build the HTTP state for the configured storage mode.
///
/// # Errors
/// Returns [`std::io::Error`] when migrations, pool setup or seeding fail.
pub(crate) async fn build_http_state(
    settings: &RegistrarSettings,
    metrics: Arc<dyn EnrollmentMetrics>,
) -> std::io::Result<HttpState> {
    match settings.database_url() {
        Some(url) => diesel_state(settings, url, metrics).await,
        None => Ok(memory_state(settings, metrics)),
    }
}
