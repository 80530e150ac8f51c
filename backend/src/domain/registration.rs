//! Registrations link a user to a course and carry the enrollment lifecycle.
//!
//! Every status change goes through [`RegistrationStatus::can_transition_to`],
//! including the implicit completion triggered by grading.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CourseId, UserId};

/// Maximum grade length in characters.
pub const GRADE_MAX: usize = 8;

/// Validation errors raised by registration value objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error("grade must be between 1 and {max} characters")]
    GradeLength { max: usize },
    #[error("grade may only contain letters, digits, '+', '-' or '.'")]
    GradeCharacters,
    #[error("unknown registration status: {0}")]
    UnknownStatus(String),
    #[error("unknown payment status: {0}")]
    UnknownPaymentStatus(String),
}

/// Raised when a status change is not in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("registration cannot move from {from} to {to}")]
pub struct RegistrationTransitionError {
    pub from: RegistrationStatus,
    pub to: RegistrationStatus,
}

/// Identifier of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a registration.
///
/// `Pending` and `Enrolled` are the active states; only they count toward
/// course capacity and the one-active-registration-per-pair rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Enrolled,
    Completed,
    Dropped,
    Withdrawn,
    Failed,
    Transferred,
}

impl RegistrationStatus {
    /// Status assigned by every enroll path.
    pub const INITIAL: Self = Self::Enrolled;

    /// Statuses that count toward capacity.
    pub const ACTIVE: [Self; 2] = [Self::Pending, Self::Enrolled];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Enrolled => "enrolled",
            Self::Completed => "completed",
            Self::Dropped => "dropped",
            Self::Withdrawn => "withdrawn",
            Self::Failed => "failed",
            Self::Transferred => "transferred",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Enrolled)
    }

    /// Whether a registration may move from `self` to `next`.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::RegistrationStatus;
    ///
    /// assert!(RegistrationStatus::Enrolled.can_transition_to(RegistrationStatus::Dropped));
    /// assert!(!RegistrationStatus::Completed.can_transition_to(RegistrationStatus::Enrolled));
    /// assert!(RegistrationStatus::Dropped.can_transition_to(RegistrationStatus::Dropped));
    /// ```
    pub fn can_transition_to(self, next: Self) -> bool {
        use RegistrationStatus::{
            Completed, Dropped, Enrolled, Failed, Pending, Transferred, Withdrawn,
        };
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, Enrolled | Dropped | Withdrawn)
                | (
                    Enrolled,
                    Completed | Dropped | Withdrawn | Failed | Transferred
                )
                | (Completed, Failed)
                | (Failed, Completed)
        )
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = RegistrationValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "enrolled" => Ok(Self::Enrolled),
            "completed" => Ok(Self::Completed),
            "dropped" => Ok(Self::Dropped),
            "withdrawn" => Ok(Self::Withdrawn),
            "failed" => Ok(Self::Failed),
            "transferred" => Ok(Self::Transferred),
            other => Err(RegistrationValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

static GRADE_RE: OnceLock<Regex> = OnceLock::new();

fn grade_regex() -> &'static Regex {
    GRADE_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9+\-.]+$")
            .unwrap_or_else(|error| panic!("grade regex failed to compile: {error}"))
    })
}

/// A recorded grade such as `B+` or `4.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Grade(String);

impl Grade {
    /// Validate a grade string.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::Grade;
    ///
    /// assert_eq!(Grade::new(" B+ ").expect("valid grade").as_str(), "B+");
    /// assert!(Grade::new("").is_err());
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RegistrationValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if !(1..=GRADE_MAX).contains(&length) {
            return Err(RegistrationValidationError::GradeLength { max: GRADE_MAX });
        }
        if !grade_regex().is_match(trimmed) {
            return Err(RegistrationValidationError::GradeCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Grade> for String {
    fn from(value: Grade) -> Self {
        value.0
    }
}

impl TryFrom<String> for Grade {
    type Error = RegistrationValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Settlement state of the registration fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Waived,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
            Self::Waived => "waived",
            Self::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = RegistrationValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unpaid" => Ok(Self::Unpaid),
            "paid" => Ok(Self::Paid),
            "waived" => Ok(Self::Waived),
            "refunded" => Ok(Self::Refunded),
            other => Err(RegistrationValidationError::UnknownPaymentStatus(
                other.to_owned(),
            )),
        }
    }
}

/// Payment fields carried by a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub status: PaymentStatus,
    pub amount_paid_cents: u32,
}

/// Trusted field set used to rehydrate a stored registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub id: RegistrationId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub status: RegistrationStatus,
    pub grade: Option<Grade>,
    pub payment: PaymentInfo,
    pub registration_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's registration in a course.
///
/// ## Invariants
/// - `registration_date` never changes after creation.
/// - `status` only changes along [`RegistrationStatus::can_transition_to`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    id: RegistrationId,
    user_id: UserId,
    course_id: CourseId,
    status: RegistrationStatus,
    grade: Option<Grade>,
    payment: PaymentInfo,
    registration_date: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Registration {
    /// Create a fresh registration in the initial status.
    pub fn enroll(
        id: RegistrationId,
        user_id: UserId,
        course_id: CourseId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            course_id,
            status: RegistrationStatus::INITIAL,
            grade: None,
            payment: PaymentInfo::default(),
            registration_date: now,
            updated_at: now,
        }
    }

    pub fn from_record(record: RegistrationRecord) -> Self {
        let RegistrationRecord {
            id,
            user_id,
            course_id,
            status,
            grade,
            payment,
            registration_date,
            updated_at,
        } = record;
        Self {
            id,
            user_id,
            course_id,
            status,
            grade,
            payment,
            registration_date,
            updated_at,
        }
    }

    /// Move to `next`, validating against the transition table.
    pub fn transition_to(
        &self,
        next: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> Result<Self, RegistrationTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(RegistrationTransitionError {
                from: self.status,
                to: next,
            });
        }
        let mut updated = self.clone();
        updated.status = next;
        updated.updated_at = now;
        Ok(updated)
    }

    /// Record or clear a grade.
    ///
    /// A grade completes the registration; clearing leaves the status alone.
    pub fn apply_grade(
        &self,
        grade: Option<Grade>,
        now: DateTime<Utc>,
    ) -> Result<Self, RegistrationTransitionError> {
        let mut updated = match grade {
            Some(_) => self.transition_to(RegistrationStatus::Completed, now)?,
            None => self.clone(),
        };
        updated.grade = grade;
        updated.updated_at = now;
        Ok(updated)
    }

    pub fn id(&self) -> RegistrationId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    pub fn grade(&self) -> Option<&Grade> {
        self.grade.as_ref()
    }

    pub fn payment(&self) -> PaymentInfo {
        self.payment
    }

    pub fn registration_date(&self) -> DateTime<Utc> {
        self.registration_date
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
#[path = "registration_tests.rs"]
mod tests;
