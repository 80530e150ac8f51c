//! Course catalogue and enrollment HTTP handlers.
//!
//! ```text
//! GET /api/v1/courses
//! GET /api/v1/courses/available
//! GET /api/v1/courses/{course_id}
//! POST /api/v1/courses {"code":"PHYS-101","title":"Mechanics","maxStudents":30}
//! PUT /api/v1/courses/{course_id}
//! PUT /api/v1/courses/{course_id}/status {"status":"active"}
//! DELETE /api/v1/courses/{course_id}
//! POST /api/v1/courses/{course_id}/enrollments {"username":"student1"}
//! DELETE /api/v1/courses/{course_id}/enrollments?username=student1
//! GET /api/v1/courses/{course_id}/registrations
//! ```
//!
//! Students enroll and drop themselves; administrators name the student by
//! `userId` or `username`.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    AccountPayload, ChangeCourseStatusRequest, CourseSummaryPayload, DropRequest, EnrollRequest,
    StudentRef, UpdateCourseRequest,
};
use crate::domain::{CourseDraft, CourseId, CourseStatus, Error, UserId, UserRole, Username};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{ADMIN_ONLY, TEACHING_STAFF, current_account, require_role};
use crate::inbound::http::registrations::{RegistrationResponse, to_responses};
use crate::inbound::http::schemas::{CourseStatusSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, conflicting_fields_error, invalid_value_error, missing_field_error, parse_uuid,
    parse_value, require,
};

const COURSE_ID: FieldName = FieldName::new("courseId");
const CODE: FieldName = FieldName::new("code");
const TITLE: FieldName = FieldName::new("title");
const MAX_STUDENTS: FieldName = FieldName::new("maxStudents");
const STATUS: FieldName = FieldName::new("status");
const USER_ID: FieldName = FieldName::new("userId");
const USERNAME: FieldName = FieldName::new("username");

const DEFAULT_MIN_STUDENTS: u32 = 1;

/// Path parameters for course routes.
#[derive(Debug, Deserialize)]
pub struct CoursePath {
    course_id: String,
}

impl CoursePath {
    fn parse(self) -> ApiResult<CourseId> {
        parse_uuid(&self.course_id, COURSE_ID).map(CourseId::from_uuid)
    }
}

/// A course with its live enrollment count.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    #[schema(example = "PHYS-101")]
    pub code: String,
    #[schema(example = "Classical Mechanics")]
    pub title: String,
    pub max_students: u32,
    pub min_students: u32,
    #[schema(value_type = CourseStatusSchema)]
    pub status: CourseStatus,
    pub fee_cents: u32,
    #[schema(example = "Mon/Wed 09:00-10:30")]
    pub schedule: Option<String>,
    pub created_at: String,
    /// Registrations currently holding a seat.
    pub enrolled_count: u64,
    /// Whether the course is active and has a free seat.
    pub available: bool,
}

impl From<CourseSummaryPayload> for CourseResponse {
    fn from(value: CourseSummaryPayload) -> Self {
        let CourseSummaryPayload {
            course,
            enrolled_count,
            available,
        } = value;
        Self {
            id: course.id.to_string(),
            code: course.code,
            title: course.title,
            max_students: course.max_students,
            min_students: course.min_students,
            status: course.status,
            fee_cents: course.fee_cents,
            schedule: course.schedule,
            created_at: course.created_at.to_rfc3339(),
            enrolled_count,
            available,
        }
    }
}

fn to_course_responses(summaries: Vec<CourseSummaryPayload>) -> Vec<CourseResponse> {
    summaries.into_iter().map(CourseResponse::from).collect()
}

/// Course attributes for creation and full update.
///
/// `status` is honoured on creation only (`draft` or `active`).
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequestBody {
    pub code: Option<String>,
    pub title: Option<String>,
    pub max_students: Option<u32>,
    /// Defaults to 1.
    pub min_students: Option<u32>,
    pub fee_cents: Option<u32>,
    pub schedule: Option<String>,
    pub status: Option<String>,
}

fn parse_course_body(body: CourseRequestBody) -> ApiResult<CourseDraft> {
    let status = body
        .status
        .as_deref()
        .map(|raw| parse_value::<CourseStatus>(raw, STATUS))
        .transpose()?;
    Ok(CourseDraft {
        code: require(body.code, CODE)?,
        title: require(body.title, TITLE)?,
        max_students: require(body.max_students, MAX_STUDENTS)?,
        min_students: body.min_students.unwrap_or(DEFAULT_MIN_STUDENTS),
        fee_cents: body.fee_cents.unwrap_or_default(),
        schedule: body.schedule,
        status,
    })
}

/// Request body for a course status change.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseStatusRequestBody {
    #[schema(example = "active")]
    pub status: Option<String>,
}

/// Names the student an enrollment or drop acts on.
///
/// Students leave both fields empty (or name themselves). Administrators
/// must set exactly one.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentSelector {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

impl StudentSelector {
    fn parse(self) -> ApiResult<Option<StudentRef>> {
        match (self.user_id, self.username) {
            (Some(_), Some(_)) => Err(conflicting_fields_error(USER_ID, USERNAME)),
            (Some(raw), None) => parse_uuid(&raw, USER_ID)
                .map(|uuid| Some(StudentRef::Id(UserId::from_uuid(uuid)))),
            (None, Some(raw)) => Username::new(&raw)
                .map(|name| Some(StudentRef::Username(name)))
                .map_err(|err| invalid_value_error(USERNAME, &raw, &err.to_string())),
            (None, None) => Ok(None),
        }
    }
}

/// Decide which student the caller may act on.
fn resolve_student(account: &AccountPayload, selector: StudentSelector) -> ApiResult<StudentRef> {
    let requested = selector.parse()?;
    match account.role {
        UserRole::Admin => requested.ok_or_else(|| missing_field_error(USER_ID)),
        UserRole::Student => match requested {
            None => Ok(StudentRef::Id(account.id)),
            Some(StudentRef::Id(id)) if id == account.id => Ok(StudentRef::Id(id)),
            Some(StudentRef::Username(name)) if name.as_str() == account.username => {
                Ok(StudentRef::Id(account.id))
            }
            Some(_) => Err(Error::forbidden(
                "students may only manage their own enrollments",
            )),
        },
        UserRole::Instructor => Err(Error::forbidden(
            "only students and administrators manage enrollments",
        )),
    }
}

/// List every course with its enrollment count.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    responses(
        (status = 200, description = "Courses ordered by code", body = [CourseResponse]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listCourses",
    security(("SessionCookie" = []))
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    current_account(state.accounts.as_ref(), &session).await?;
    let courses = state.courses_query.list_courses().await?;
    Ok(web::Json(to_course_responses(courses)))
}

/// List active courses with a free seat.
#[utoipa::path(
    get,
    path = "/api/v1/courses/available",
    responses(
        (status = 200, description = "Available courses", body = [CourseResponse]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "listAvailableCourses",
    security(("SessionCookie" = []))
)]
#[get("/courses/available")]
pub async fn available_courses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CourseResponse>>> {
    current_account(state.accounts.as_ref(), &session).await?;
    let courses = state.courses_query.available_courses().await?;
    Ok(web::Json(to_course_responses(courses)))
}

/// Fetch one course with its enrollment count.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}",
    params(("course_id" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course", body = CourseResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "getCourse",
    security(("SessionCookie" = []))
)]
#[get("/courses/{course_id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
) -> ApiResult<web::Json<CourseResponse>> {
    let course_id = path.into_inner().parse()?;
    current_account(state.accounts.as_ref(), &session).await?;
    let course = state.courses_query.get_course(course_id).await?;
    Ok(web::Json(CourseResponse::from(course)))
}

/// Create a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CourseRequestBody,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid course", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 409, description = "Course code taken", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "createCourse",
    security(("SessionCookie" = []))
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CourseRequestBody>,
) -> ApiResult<HttpResponse> {
    require_role(state.accounts.as_ref(), &session, ADMIN_ONLY).await?;
    let draft = parse_course_body(payload.into_inner())?;
    let created = state.courses.create_course(draft).await?;
    Ok(HttpResponse::Created().json(CourseResponse::from(created)))
}

/// Replace a course's attributes.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{course_id}",
    params(("course_id" = String, Path, description = "Course identifier")),
    request_body = CourseRequestBody,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Invalid course", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 409, description = "Code taken or capacity below enrollment", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "updateCourse",
    security(("SessionCookie" = []))
)]
#[put("/courses/{course_id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
    payload: web::Json<CourseRequestBody>,
) -> ApiResult<web::Json<CourseResponse>> {
    require_role(state.accounts.as_ref(), &session, ADMIN_ONLY).await?;
    let course_id = path.into_inner().parse()?;
    let draft = parse_course_body(payload.into_inner())?;
    let updated = state
        .courses
        .update_course(UpdateCourseRequest { course_id, draft })
        .await?;
    Ok(web::Json(CourseResponse::from(updated)))
}

/// Change a course's administrative status.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{course_id}/status",
    params(("course_id" = String, Path, description = "Course identifier")),
    request_body = CourseStatusRequestBody,
    responses(
        (status = 200, description = "Status changed", body = CourseResponse),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 409, description = "Transition not allowed", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "changeCourseStatus",
    security(("SessionCookie" = []))
)]
#[put("/courses/{course_id}/status")]
pub async fn change_course_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
    payload: web::Json<CourseStatusRequestBody>,
) -> ApiResult<web::Json<CourseResponse>> {
    require_role(state.accounts.as_ref(), &session, ADMIN_ONLY).await?;
    let course_id = path.into_inner().parse()?;
    let raw = require(payload.into_inner().status, STATUS)?;
    let status = parse_value::<CourseStatus>(&raw, STATUS)?;
    let updated = state
        .courses
        .change_status(ChangeCourseStatusRequest { course_id, status })
        .await?;
    Ok(web::Json(CourseResponse::from(updated)))
}

/// Delete a course without active registrations.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_id}",
    params(("course_id" = String, Path, description = "Course identifier")),
    responses(
        (status = 204, description = "Course and its history deleted"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Admin role required", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema),
        (status = 409, description = "Course has active registrations", body = ErrorSchema)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse",
    security(("SessionCookie" = []))
)]
#[delete("/courses/{course_id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
) -> ApiResult<HttpResponse> {
    require_role(state.accounts.as_ref(), &session, ADMIN_ONLY).await?;
    let course_id = path.into_inner().parse()?;
    state.courses.delete_course(course_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Enroll a student in a course.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/enrollments",
    params(("course_id" = String, Path, description = "Course identifier")),
    request_body = StudentSelector,
    responses(
        (status = 201, description = "Student enrolled", body = RegistrationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not allowed to enroll this student", body = ErrorSchema),
        (status = 404, description = "Course or student not found", body = ErrorSchema),
        (status = 409, description = "Duplicate registration, course not open, or course full (capacity_exceeded)", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["enrollments"],
    operation_id = "enroll",
    security(("SessionCookie" = []))
)]
#[post("/courses/{course_id}/enrollments")]
pub async fn enroll(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
    payload: web::Json<StudentSelector>,
) -> ApiResult<HttpResponse> {
    let course_id = path.into_inner().parse()?;
    let account = current_account(state.accounts.as_ref(), &session).await?;
    let student = resolve_student(&account, payload.into_inner())?;
    let registration = state
        .enrollment
        .enroll(EnrollRequest { student, course_id })
        .await?;
    Ok(HttpResponse::Created().json(RegistrationResponse::from(registration)))
}

/// Drop a student's active registration in a course.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_id}/enrollments",
    params(
        ("course_id" = String, Path, description = "Course identifier"),
        StudentSelector
    ),
    responses(
        (status = 204, description = "Registration dropped"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not allowed to drop this student", body = ErrorSchema),
        (status = 404, description = "No active registration", body = ErrorSchema),
        (status = 409, description = "Modified concurrently", body = ErrorSchema)
    ),
    tags = ["enrollments"],
    operation_id = "dropEnrollment",
    security(("SessionCookie" = []))
)]
#[delete("/courses/{course_id}/enrollments")]
pub async fn drop_enrollment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
    query: web::Query<StudentSelector>,
) -> ApiResult<HttpResponse> {
    let course_id = path.into_inner().parse()?;
    let account = current_account(state.accounts.as_ref(), &session).await?;
    let student = resolve_student(&account, query.into_inner())?;
    state
        .enrollment
        .drop_enrollment(DropRequest { student, course_id })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List a course's registrations in enrollment order.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}/registrations",
    params(("course_id" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course roster", body = [RegistrationResponse]),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Instructor or admin role required", body = ErrorSchema),
        (status = 404, description = "Course not found", body = ErrorSchema)
    ),
    tags = ["registrations"],
    operation_id = "listCourseRegistrations",
    security(("SessionCookie" = []))
)]
#[get("/courses/{course_id}/registrations")]
pub async fn course_registrations(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<CoursePath>,
) -> ApiResult<web::Json<Vec<RegistrationResponse>>> {
    require_role(state.accounts.as_ref(), &session, TEACHING_STAFF).await?;
    let course_id = path.into_inner().parse()?;
    let registrations = state
        .registrations
        .list_registrations_for_course(course_id)
        .await?;
    Ok(web::Json(to_responses(registrations)))
}

#[cfg(test)]
#[path = "courses_tests.rs"]
mod tests;
