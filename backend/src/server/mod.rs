//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;

#[cfg(feature = "metrics")]
use metrics::{MetricsLayer, build_prometheus, enrollment_metrics};
use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use registrar::Trace;
#[cfg(debug_assertions)]
use registrar::doc::ApiDoc;
#[cfg(not(feature = "metrics"))]
use registrar::domain::ports::NoOpEnrollmentMetrics;
use registrar::inbound::http::courses::{
    available_courses, change_course_status, course_registrations, create_course, delete_course,
    drop_enrollment, enroll, get_course, list_courses, update_course,
};
use registrar::inbound::http::health::{HealthState, live, ready};
use registrar::inbound::http::registrations::{
    delete_registration, get_registration, my_registrations, update_grade,
    update_registration_status,
};
use registrar::inbound::http::state::HttpState;
use registrar::inbound::http::users::{current_user, login};
use registrar::inbound::http::validation::{json_config, query_config};
use registrar::settings::RegistrarSettings;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const SESSION_TTL_HOURS: i64 = 2;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::hours(SESSION_TTL_HOURS)),
        )
        .build();

    // Literal segments register before the `{id}` routes they would shadow.
    let api = web::scope("/api/v1")
        .wrap(session)
        .service(login)
        .service(current_user)
        .service(list_courses)
        .service(available_courses)
        .service(get_course)
        .service(create_course)
        .service(update_course)
        .service(change_course_status)
        .service(delete_course)
        .service(enroll)
        .service(drop_enrollment)
        .service(course_registrations)
        .service(my_registrations)
        .service(get_registration)
        .service(update_grade)
        .service(update_registration_status)
        .service(delete_registration);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .app_data(query_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the HTTP server for `settings`.
///
/// Readiness flips once the adapters are wired and the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when wiring adapters, binding the socket or
/// registering metrics fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
    settings: &RegistrarSettings,
) -> std::io::Result<Server> {
    #[cfg(feature = "metrics")]
    let enrollment_metrics = enrollment_metrics(config.metrics())?;
    #[cfg(not(feature = "metrics"))]
    let enrollment_metrics = std::sync::Arc::new(NoOpEnrollmentMetrics);

    let http_state = web::Data::new(build_http_state(settings, enrollment_metrics).await?);
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

/// Build the Prometheus middleware when the `metrics` feature is enabled.
#[cfg(feature = "metrics")]
pub fn prometheus() -> std::io::Result<Option<actix_web_prom::PrometheusMetrics>> {
    build_prometheus().map(Some)
}
