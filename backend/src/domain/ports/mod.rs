//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`, [`LoginService`]) are called by
//! inbound adapters. Driven ports ([`CourseCatalogRepository`],
//! [`UserDirectory`], [`RegistrationLedger`], [`EnrollmentMetrics`]) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_query;
mod course_catalog_repository;
mod course_command;
mod course_query;
mod enrollment_command;
mod enrollment_metrics;
mod login_service;
mod registration_ledger;
mod registration_query;
mod user_directory;

#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::{AccountPayload, AccountQuery};
#[cfg(test)]
pub use course_catalog_repository::MockCourseCatalogRepository;
pub use course_catalog_repository::{CourseCatalogError, CourseCatalogRepository};
#[cfg(test)]
pub use course_command::MockCourseCommand;
pub use course_command::{
    ChangeCourseStatusRequest, CourseCommand, CoursePayload, CourseSummaryPayload,
    UpdateCourseRequest,
};
#[cfg(test)]
pub use course_query::MockCourseQuery;
pub use course_query::CourseQuery;
#[cfg(test)]
pub use enrollment_command::MockEnrollmentCommand;
pub use enrollment_command::{
    DropRequest, EnrollRequest, EnrollmentCommand, RegistrationPayload, StudentRef,
    UpdateGradeRequest, UpdateStatusRequest,
};
#[cfg(test)]
pub use enrollment_metrics::MockEnrollmentMetrics;
pub use enrollment_metrics::{
    EnrollmentMetrics, EnrollmentMetricsError, EnrollmentOutcome, NoOpEnrollmentMetrics,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use registration_ledger::MockRegistrationLedger;
pub use registration_ledger::{InsertOutcome, RegistrationLedger, RegistrationLedgerError};
#[cfg(test)]
pub use registration_query::MockRegistrationQuery;
pub use registration_query::RegistrationQuery;
#[cfg(test)]
pub use user_directory::{FixtureUserDirectory, MockUserDirectory};
pub use user_directory::{UserDirectory, UserDirectoryError};
