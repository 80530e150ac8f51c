//! Tests for course and enrollment HTTP handlers.

use super::*;
use crate::domain::FIXTURE_STUDENT_TWO_ID;
use crate::inbound::http::test_utils::{login_cookie, memory_state, test_session_middleware};
use crate::inbound::http::users::login;
use crate::inbound::http::validation::{json_config, query_config};
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
        .app_data(query_config())
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(login)
                .service(list_courses)
                .service(available_courses)
                .service(get_course)
                .service(create_course)
                .service(update_course)
                .service(change_course_status)
                .service(delete_course)
                .service(enroll)
                .service(drop_enrollment)
                .service(course_registrations),
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

async fn create<S, B>(app: &S, admin: &Cookie<'static>, body: Value) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, course) = send(
        app,
        actix_test::TestRequest::post().uri("/api/v1/courses").set_json(body),
        admin,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "course creation failed: {course}");
    course
}

fn active_course(code: &str, max_students: u32) -> Value {
    json!({
        "code": code,
        "title": "Classical Mechanics",
        "maxStudents": max_students,
        "status": "active",
    })
}

fn course_uri(course: &Value, suffix: &str) -> String {
    format!(
        "/api/v1/courses/{}{suffix}",
        course["id"].as_str().expect("course id")
    )
}

#[rstest]
#[actix_web::test]
async fn admin_creates_course_in_draft_by_default() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(
        &app,
        &admin,
        json!({ "code": "phys-101", "title": "Mechanics", "maxStudents": 30, "feeCents": 12500 }),
    )
    .await;
    assert_eq!(course["code"], "PHYS-101");
    assert_eq!(course["status"], "draft");
    assert_eq!(course["minStudents"], 1);
    assert_eq!(course["enrolledCount"], 0);
    assert_eq!(course["available"], false);
}

#[rstest]
#[case("student1", StatusCode::FORBIDDEN)]
#[case("instructor", StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn only_admins_create_courses(#[case] username: &str, #[case] expected: StatusCode) {
    let app = actix_test::init_service(test_app()).await;
    let cookie = login_cookie(&app, username).await;
    let (status, body) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/courses")
            .set_json(active_course("CHEM-1", 5)),
        &cookie,
    )
    .await;
    assert_eq!(status, expected);
    assert_eq!(body["code"], "forbidden");
}

#[rstest]
#[actix_web::test]
async fn course_routes_require_a_session() {
    let app = actix_test::init_service(test_app()).await;
    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/courses").to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case(json!({ "code": "MATH-1", "maxStudents": 10 }), "title", "missing_field")]
#[case(json!({ "code": "MATH-1", "title": "Algebra" }), "maxStudents", "missing_field")]
#[case(json!({ "code": "MATH-1", "title": "Algebra", "maxStudents": 10, "status": "open" }), "status", "invalid_value")]
#[case(json!({ "code": "M", "title": "Algebra", "maxStudents": 10 }), "code", "invalid_course")]
#[case(json!({ "code": "MATH-1", "title": "Algebra", "maxStudents": 2, "minStudents": 5 }), "maxStudents", "invalid_course")]
#[actix_web::test]
async fn invalid_course_bodies_are_rejected(
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let (status, error) = send(
        &app,
        actix_test::TestRequest::post().uri("/api/v1/courses").set_json(body),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"]["field"], field);
    assert_eq!(error["details"]["code"], code);
}

#[rstest]
#[actix_web::test]
async fn duplicate_codes_conflict_case_insensitively() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    create(&app, &admin, active_course("BIO-200", 10)).await;
    let (status, error) = send(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/courses")
            .set_json(active_course("bio-200", 10)),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["details"]["reason"], "course_code_taken");
}

#[rstest]
#[actix_web::test]
async fn malformed_course_id_is_bad_request() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let (status, error) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/courses/not-a-uuid"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["details"]["field"], "courseId");
    assert_eq!(error["details"]["code"], "invalid_uuid");
}

#[rstest]
#[actix_web::test]
async fn last_seat_goes_to_first_student() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(&app, &admin, active_course("ART-1", 1)).await;
    let enroll_uri = course_uri(&course, "/enrollments");

    let first = login_cookie(&app, "student1").await;
    let (status, registration) = send(
        &app,
        actix_test::TestRequest::post().uri(&enroll_uri).set_json(json!({})),
        &first,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registration["status"], "enrolled");
    assert_eq!(registration["paymentStatus"], "unpaid");
    assert_eq!(registration["courseId"], course["id"]);

    let second = login_cookie(&app, "student2").await;
    let (status, error) = send(
        &app,
        actix_test::TestRequest::post().uri(&enroll_uri).set_json(json!({})),
        &second,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "capacity_exceeded");
    assert_eq!(error["details"]["reason"], "course_full");

    let (status, error) = send(
        &app,
        actix_test::TestRequest::post().uri(&enroll_uri).set_json(json!({})),
        &first,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["details"]["reason"], "duplicate_registration");

    let (_, available) = send(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/courses/available"),
        &first,
    )
    .await;
    assert_eq!(available, json!([]));
}

#[rstest]
#[actix_web::test]
async fn admin_enrolls_by_username() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(&app, &admin, active_course("HIST-9", 3)).await;
    let (status, registration) = send(
        &app,
        actix_test::TestRequest::post()
            .uri(&course_uri(&course, "/enrollments"))
            .set_json(json!({ "username": "Student2" })),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        registration["userId"],
        FIXTURE_STUDENT_TWO_ID.to_string().as_str()
    );
}

#[rstest]
#[case(json!({}), StatusCode::BAD_REQUEST)]
#[case(json!({ "userId": "x", "username": "student1" }), StatusCode::BAD_REQUEST)]
#[case(json!({ "username": "nobody" }), StatusCode::NOT_FOUND)]
#[actix_web::test]
async fn admin_enrollment_requires_one_student(#[case] body: Value, #[case] expected: StatusCode) {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(&app, &admin, active_course("GEO-3", 3)).await;
    let (status, _) = send(
        &app,
        actix_test::TestRequest::post()
            .uri(&course_uri(&course, "/enrollments"))
            .set_json(body),
        &admin,
    )
    .await;
    assert_eq!(status, expected);
}

#[rstest]
#[case("student1", json!({ "username": "student2" }), StatusCode::FORBIDDEN)]
#[case("student1", json!({ "username": "student1" }), StatusCode::CREATED)]
#[case("instructor", json!({}), StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn students_enroll_only_themselves(
    #[case] username: &str,
    #[case] body: Value,
    #[case] expected: StatusCode,
) {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(&app, &admin, active_course("LAT-1", 3)).await;
    let cookie = login_cookie(&app, username).await;
    let (status, _) = send(
        &app,
        actix_test::TestRequest::post()
            .uri(&course_uri(&course, "/enrollments"))
            .set_json(body),
        &cookie,
    )
    .await;
    assert_eq!(status, expected);
}

#[rstest]
#[actix_web::test]
async fn draft_courses_reject_enrollment() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(
        &app,
        &admin,
        json!({ "code": "PHIL-1", "title": "Logic", "maxStudents": 5 }),
    )
    .await;
    let student = login_cookie(&app, "student1").await;
    let (status, error) = send(
        &app,
        actix_test::TestRequest::post()
            .uri(&course_uri(&course, "/enrollments"))
            .set_json(json!({})),
        &student,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["details"]["reason"], "course_not_open");
}

#[rstest]
#[actix_web::test]
async fn drop_frees_the_seat_and_allows_delete() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(&app, &admin, active_course("ECON-5", 2)).await;
    let student = login_cookie(&app, "student1").await;
    send(
        &app,
        actix_test::TestRequest::post()
            .uri(&course_uri(&course, "/enrollments"))
            .set_json(json!({})),
        &student,
    )
    .await;

    let (status, error) = send(
        &app,
        actix_test::TestRequest::delete().uri(&course_uri(&course, "")),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["details"]["reason"], "course_has_active_registrations");

    let (status, _) = send(
        &app,
        actix_test::TestRequest::delete().uri(&course_uri(&course, "/enrollments")),
        &student,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, error) = send(
        &app,
        actix_test::TestRequest::delete().uri(&course_uri(&course, "/enrollments")),
        &student,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["details"]["reason"], "registration_not_found");

    let (_, summary) = send(
        &app,
        actix_test::TestRequest::get().uri(&course_uri(&course, "")),
        &student,
    )
    .await;
    assert_eq!(summary["enrolledCount"], 0);

    let (status, _) = send(
        &app,
        actix_test::TestRequest::delete().uri(&course_uri(&course, "")),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        actix_test::TestRequest::get().uri(&course_uri(&course, "")),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn admin_drops_by_query_parameter() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(&app, &admin, active_course("MUS-4", 2)).await;
    send(
        &app,
        actix_test::TestRequest::post()
            .uri(&course_uri(&course, "/enrollments"))
            .set_json(json!({ "username": "student1" })),
        &admin,
    )
    .await;
    let (status, _) = send(
        &app,
        actix_test::TestRequest::delete()
            .uri(&course_uri(&course, "/enrollments?username=student1")),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[rstest]
#[actix_web::test]
async fn capacity_cannot_drop_below_enrollment() {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(&app, &admin, active_course("CS-101", 5)).await;
    for student in ["student1", "student2"] {
        send(
            &app,
            actix_test::TestRequest::post()
                .uri(&course_uri(&course, "/enrollments"))
                .set_json(json!({ "username": student })),
            &admin,
        )
        .await;
    }

    let (status, error) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&course_uri(&course, ""))
            .set_json(json!({ "code": "CS-101", "title": "Programming", "maxStudents": 1 })),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["details"]["reason"], "capacity_below_enrollment");

    let (status, updated) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&course_uri(&course, ""))
            .set_json(json!({ "code": "CS-101", "title": "Programming", "maxStudents": 2 })),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Programming");
    assert_eq!(updated["enrolledCount"], 2);
    assert_eq!(updated["available"], false);
}

#[rstest]
#[case("active", StatusCode::OK)]
#[case("completed", StatusCode::CONFLICT)]
#[case("archived", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn course_status_changes_follow_lifecycle(
    #[case] status: &str,
    #[case] expected: StatusCode,
) {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(
        &app,
        &admin,
        json!({ "code": "DRAFT-1", "title": "Drafted", "maxStudents": 5 }),
    )
    .await;
    let (actual, body) = send(
        &app,
        actix_test::TestRequest::put()
            .uri(&course_uri(&course, "/status"))
            .set_json(json!({ "status": status })),
        &admin,
    )
    .await;
    assert_eq!(actual, expected, "unexpected response {body}");
    if expected == StatusCode::OK {
        assert_eq!(body["status"], "active");
        assert_eq!(body["available"], true);
    }
}

#[rstest]
#[case("instructor", StatusCode::OK)]
#[case("admin", StatusCode::OK)]
#[case("student1", StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn rosters_are_for_teaching_staff(#[case] username: &str, #[case] expected: StatusCode) {
    let app = actix_test::init_service(test_app()).await;
    let admin = login_cookie(&app, "admin").await;
    let course = create(&app, &admin, active_course("SOC-2", 4)).await;
    send(
        &app,
        actix_test::TestRequest::post()
            .uri(&course_uri(&course, "/enrollments"))
            .set_json(json!({ "username": "student2" })),
        &admin,
    )
    .await;
    let cookie = login_cookie(&app, username).await;
    let (status, roster) = send(
        &app,
        actix_test::TestRequest::get().uri(&course_uri(&course, "/registrations")),
        &cookie,
    )
    .await;
    assert_eq!(status, expected);
    if expected == StatusCode::OK {
        assert_eq!(roster.as_array().map(Vec::len), Some(1));
    }
}

#[rstest]
fn student_selector_rejects_bad_usernames() {
    let selector = StudentSelector {
        user_id: None,
        username: Some("no spaces allowed".to_owned()),
    };
    let err = selector.parse().expect_err("invalid username");
    assert_eq!(err.details().expect("details")["field"], "username");
}
