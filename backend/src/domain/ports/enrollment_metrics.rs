//! Port for recording enrollment outcomes.
//!
//! Recording is best effort: services log export failures and carry on.

use std::fmt;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording enrollment metrics.
    pub enum EnrollmentMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "enrollment metrics exporter failed: {message}",
    }
}

/// Outcome label attached to every enroll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrollmentOutcome {
    Enrolled,
    Duplicate,
    CourseFull,
    CourseNotFound,
    UserNotFound,
    CourseNotOpen,
    Unavailable,
}

impl EnrollmentOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
            Self::Duplicate => "duplicate",
            Self::CourseFull => "course_full",
            Self::CourseNotFound => "course_not_found",
            Self::UserNotFound => "user_not_found",
            Self::CourseNotOpen => "course_not_open",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for EnrollmentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics sink for enroll attempts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentMetrics: Send + Sync {
    async fn record_enrollment(
        &self,
        outcome: EnrollmentOutcome,
    ) -> Result<(), EnrollmentMetricsError>;
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpEnrollmentMetrics;

#[async_trait]
impl EnrollmentMetrics for NoOpEnrollmentMetrics {
    async fn record_enrollment(
        &self,
        _outcome: EnrollmentOutcome,
    ) -> Result<(), EnrollmentMetricsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_accepts_every_outcome() {
        for outcome in [
            EnrollmentOutcome::Enrolled,
            EnrollmentOutcome::CourseFull,
            EnrollmentOutcome::Unavailable,
        ] {
            assert!(NoOpEnrollmentMetrics.record_enrollment(outcome).await.is_ok());
        }
    }

    #[test]
    fn outcome_labels_are_snake_case() {
        assert_eq!(EnrollmentOutcome::CourseNotOpen.to_string(), "course_not_open");
    }
}
