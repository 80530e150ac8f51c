//! Tests for registration HTTP handlers.

use super::*;
use crate::domain::FIXTURE_STUDENT_ONE_ID;
use crate::inbound::http::courses::{create_course, enroll};
use crate::inbound::http::test_utils::{login_cookie, memory_state, test_session_middleware};
use crate::inbound::http::users::login;
use crate::inbound::http::validation::json_config;
use crate::outbound::memory::MemoryStore;
use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = memory_state(&MemoryStore::with_fixture_accounts());
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(create_course)
                .service(enroll)
                .service(my_registrations)
                .service(get_registration)
                .service(update_grade)
                .service(update_registration_status)
                .service(delete_registration),
        )
}

async fn send<S, B>(
    app: &S,
    request: actix_test::TestRequest,
    cookie: &Cookie<'static>,
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(app, request.cookie(cookie.clone()).to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// Create an active course and enroll `student1`, returning the registration.
async fn enrolled_registration<S, B>(app: &S, admin: &Cookie<'static>) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, course) = send(
        app,
        actix_test::TestRequest::post().uri("/api/v1/courses").set_json(json!({
            "code": "CS-201",
            "title": "Data Structures",
            "maxStudents": 10,
            "status": "active",
        })),
        admin,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, registration) = send(
        app,
        actix_test::TestRequest::post()
            .uri(&format!(
                "/api/v1/courses/{}/enrollments",
                course["id"].as_str().expect("course id")
            ))
            .set_json(json!({ "username": "student1" })),
        admin,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    registration
}

fn registration_uri(registration: &Value, suffix: &str) -> String {
    format!(
        "/api/v1/registrations/{}{suffix}",
        registration["id"].as_str().expect("registration id")
    )
}

#[rstest]
#[actix_web::test]
async fn students_list_their_own_registrations() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let registration = enrolled_registration(&app, &admin).await;

    let student = login_cookie(&app, "student1").await;
    let (status, mine) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/registrations/me"),
        &student,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["id"], registration["id"]);
    assert_eq!(
        mine[0]["userId"],
        FIXTURE_STUDENT_ONE_ID.to_string().as_str()
    );

    let other = login_cookie(&app, "student2").await;
    let (_, theirs) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/registrations/me"),
        &other,
    )
    .await;
    assert_eq!(theirs, json!([]));
}

#[rstest]
#[case("student1", StatusCode::OK)]
#[case("student2", StatusCode::FORBIDDEN)]
#[case("instructor", StatusCode::OK)]
#[actix_web::test]
async fn single_registration_is_visible_to_owner_and_staff(
    #[case] username: &str,
    #[case] expected: StatusCode,
) {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let registration = enrolled_registration(&app, &admin).await;
    let cookie = login_cookie(&app, username).await;
    let (status, _) = send(
        &app,
        actix_test::TestRequest::get().uri(&registration_uri(&registration, "")),
        &cookie,
    )
    .await;
    assert_eq!(status, expected);
}

#[rstest]
#[actix_web::test]
async fn grading_completes_the_registration() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let registration = enrolled_registration(&app, &admin).await;
    let instructor = login_cookie(&app, "instructor").await;

    let (status, graded) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&registration_uri(&registration, "/grade"))
            .set_json(json!({ "grade": " A- " })),
        &instructor,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(graded["grade"], "A-");
    assert_eq!(graded["status"], "completed");

    let (status, cleared) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&registration_uri(&registration, "/grade"))
            .set_json(json!({ "grade": "" })),
        &instructor,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["grade"], Value::Null);
    assert_eq!(cleared["status"], "completed");
}

#[rstest]
#[case(json!({ "grade": "A!!" }), "invalid_grade")]
#[case(json!({}), "missing_field")]
#[actix_web::test]
async fn malformed_grades_are_rejected(#[case] body: Value, #[case] code: &str) {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let registration = enrolled_registration(&app, &admin).await;
    let (status, error) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&registration_uri(&registration, "/grade"))
            .set_json(body),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"]["field"], "grade");
    assert_eq!(error["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn students_cannot_grade() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let registration = enrolled_registration(&app, &admin).await;
    let student = login_cookie(&app, "student1").await;
    let (status, error) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&registration_uri(&registration, "/grade"))
            .set_json(json!({ "grade": "A" })),
        &student,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error["details"]["requiredRoles"], json!(["instructor", "admin"]));
}

#[rstest]
#[case("withdrawn", StatusCode::OK)]
#[case("pending", StatusCode::CONFLICT)]
#[case("expelled", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn admin_status_changes_follow_the_lifecycle(
    #[case] target: &str,
    #[case] expected: StatusCode,
) {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let registration = enrolled_registration(&app, &admin).await;
    let (status, body) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&registration_uri(&registration, "/status"))
            .set_json(json!({ "status": target })),
        &admin,
    )
    .await;
    assert_eq!(status, expected, "unexpected response {body}");
    match expected {
        StatusCode::OK => assert_eq!(body["status"], target),
        StatusCode::CONFLICT => {
            assert_eq!(body["details"]["reason"], "invalid_status_transition");
        }
        _ => assert_eq!(body["details"]["code"], "invalid_value"),
    }
}

#[rstest]
#[actix_web::test]
async fn instructors_cannot_change_status() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let registration = enrolled_registration(&app, &admin).await;
    let instructor = login_cookie(&app, "instructor").await;
    let (status, _) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&registration_uri(&registration, "/status"))
            .set_json(json!({ "status": "dropped" })),
        &instructor,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn delete_removes_the_registration() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let registration = enrolled_registration(&app, &admin).await;
    let uri = registration_uri(&registration, "");

    let (status, body) = send(&app, actix_test::TestRequest::delete().uri(&uri), &admin).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, error) = send(&app, actix_test::TestRequest::delete().uri(&uri), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["details"]["reason"], "registration_not_found");

    let (status, _) = send(&app, actix_test::TestRequest::get().uri(&uri), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn malformed_registration_id_is_bad_request() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let (status, error) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/registrations/12345"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"]["field"], "registrationId");
}
