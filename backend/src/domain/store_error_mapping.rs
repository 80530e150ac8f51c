//! Shared translation of driven-port failures into domain errors.
//!
//! Connection failures become `service_unavailable` so callers may retry;
//! anything else the caller did not anticipate becomes `internal`.

use tracing::error;

use crate::domain::ports::{CourseCatalogError, RegistrationLedgerError, UserDirectoryError};
use crate::domain::{EnrollmentError, Error};

pub(crate) fn map_catalog_error(err: CourseCatalogError) -> Error {
    error!(error = %err, "course catalogue failure");
    match err {
        CourseCatalogError::Connection { message } => {
            Error::service_unavailable(format!("course catalogue unavailable: {message}"))
        }
        other => Error::internal(format!("course catalogue error: {other}")),
    }
}

pub(crate) fn map_directory_error(err: UserDirectoryError) -> Error {
    error!(error = %err, "user directory failure");
    match err {
        UserDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("user directory unavailable: {message}"))
        }
        UserDirectoryError::Query { message } => {
            Error::internal(format!("user directory error: {message}"))
        }
    }
}

/// Map ledger failures, keeping the domain meaning of `NotFound` and
/// `StaleStatus`.
pub(crate) fn map_ledger_error(err: RegistrationLedgerError) -> Error {
    match err {
        RegistrationLedgerError::NotFound { registration_id } => {
            EnrollmentError::registration_not_found(registration_id).into()
        }
        RegistrationLedgerError::StaleStatus {
            registration_id, ..
        } => EnrollmentError::StaleRegistration { registration_id }.into(),
        RegistrationLedgerError::Connection { message } => {
            error!(%message, "registration ledger connection failure");
            Error::service_unavailable(format!("registration ledger unavailable: {message}"))
        }
        RegistrationLedgerError::Query { message } => {
            error!(%message, "registration ledger query failure");
            Error::internal(format!("registration ledger error: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, RegistrationId, RegistrationStatus};
    use rstest::rstest;

    #[rstest]
    #[case(RegistrationLedgerError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(RegistrationLedgerError::query("syntax"), ErrorCode::InternalError)]
    #[case(
        RegistrationLedgerError::not_found(RegistrationId::random()),
        ErrorCode::NotFound
    )]
    #[case(
        RegistrationLedgerError::stale_status(
            RegistrationId::random(),
            RegistrationStatus::Enrolled,
        ),
        ErrorCode::Conflict
    )]
    fn ledger_errors_map_to_codes(#[case] err: RegistrationLedgerError, #[case] code: ErrorCode) {
        assert_eq!(map_ledger_error(err).code(), code);
    }

    #[rstest]
    fn catalog_connection_is_retryable() {
        let mapped = map_catalog_error(CourseCatalogError::connection("pool closed"));
        assert_eq!(mapped.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    fn directory_query_is_internal() {
        let mapped = map_directory_error(UserDirectoryError::query("bad sql"));
        assert_eq!(mapped.code(), ErrorCode::InternalError);
    }
}
