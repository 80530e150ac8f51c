//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every course, registration, account and health
//! endpoint together with the schema wrappers from
//! [`crate::inbound::http::schemas`], so domain types stay free of utoipa.
//! The document backs Swagger UI in debug builds and is exported by the
//! `openapi-dump` binary.

use crate::inbound::http::courses::{
    CourseRequestBody, CourseResponse, CourseStatusRequestBody, StudentSelector,
};
use crate::inbound::http::registrations::{
    GradeRequestBody, RegistrationResponse, RegistrationStatusRequestBody,
};
use crate::inbound::http::schemas::{
    CourseStatusSchema, ErrorCodeSchema, ErrorSchema, PaymentStatusSchema,
    RegistrationStatusSchema, UserRoleSchema,
};
use crate::inbound::http::users::{AccountResponse, LoginRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the registrar REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Registrar API",
        description = "Course catalogue, enrollment and registration management."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::available_courses,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::courses::change_course_status,
        crate::inbound::http::courses::delete_course,
        crate::inbound::http::courses::enroll,
        crate::inbound::http::courses::drop_enrollment,
        crate::inbound::http::courses::course_registrations,
        crate::inbound::http::registrations::my_registrations,
        crate::inbound::http::registrations::get_registration,
        crate::inbound::http::registrations::update_grade,
        crate::inbound::http::registrations::update_registration_status,
        crate::inbound::http::registrations::delete_registration,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CourseStatusSchema,
        RegistrationStatusSchema,
        PaymentStatusSchema,
        UserRoleSchema,
        LoginRequest,
        AccountResponse,
        CourseRequestBody,
        CourseStatusRequestBody,
        CourseResponse,
        StudentSelector,
        RegistrationResponse,
        GradeRequestBody,
        RegistrationStatusRequestBody,
    )),
    tags(
        (name = "users", description = "Login and the current account"),
        (name = "courses", description = "Course catalogue and enrollment"),
        (name = "registrations", description = "Registration records"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn has_field(schema: &RefOr<Schema>, field: &str) -> bool {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.contains_key(field),
            _ => false,
        }
    }

    #[rstest]
    fn error_schema_is_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");
        assert!(has_field(error, "code"));
        assert!(has_field(error, "message"));
        assert!(has_field(error, "traceId"));
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/courses")]
    #[case("/api/v1/courses/{course_id}/enrollments")]
    #[case("/api/v1/registrations/{registration_id}/grade")]
    #[case("/health/ready")]
    fn documents_public_paths(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn registers_session_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
