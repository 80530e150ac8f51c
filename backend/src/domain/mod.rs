//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed course, user and registration entities,
//! the registration state machine, and the services that enforce capacity and
//! uniqueness. Nothing here depends on HTTP or a particular store.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload and stable codes.
//! - Course, Registration, User and their value objects.
//! - EnrollmentService and CourseLifecycleService, the driving port
//!   implementations.

mod accounts;
mod account_service;
mod auth;
mod course;
mod course_lifecycle_service;
mod enrollment_service;
pub mod error;
pub mod ports;
mod registration;
mod rejection;
mod store_error_mapping;
mod trace_id;
mod user;

pub use self::account_service::AccountService;
pub use self::accounts::{
    FIXTURE_ADMIN_ID, FIXTURE_INSTRUCTOR_ID, FIXTURE_STUDENT_ONE_ID, FIXTURE_STUDENT_TWO_ID,
    fixture_accounts,
};
pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::course::{
    COURSE_CODE_MAX, COURSE_CODE_MIN, COURSE_SCHEDULE_MAX, COURSE_TITLE_MAX, Capacity, Course,
    CourseAttributes, CourseCode, CourseDraft, CourseId, CourseStatus, CourseValidationError,
};
pub use self::course_lifecycle_service::CourseLifecycleService;
pub use self::enrollment_service::EnrollmentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::registration::{
    GRADE_MAX, Grade, PaymentInfo, PaymentStatus, Registration, RegistrationId,
    RegistrationRecord, RegistrationStatus, RegistrationTransitionError,
    RegistrationValidationError,
};
pub use self::rejection::{CourseLifecycleError, EnrollmentError};
pub use self::trace_id::TraceId;
pub use self::user::{
    USERNAME_MAX, USERNAME_MIN, User, UserId, UserRole, UserValidationError, Username,
};
