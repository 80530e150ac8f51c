//! Course catalogue entities.
//!
//! A course owns its capacity and administrative status. Enrollment counts
//! are never stored on the course; they are aggregated from the registration
//! ledger at query time.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum title length in characters.
pub const COURSE_TITLE_MAX: usize = 128;
/// Maximum schedule description length in characters.
pub const COURSE_SCHEDULE_MAX: usize = 128;
/// Minimum course code length.
pub const COURSE_CODE_MIN: usize = 2;
/// Maximum course code length.
pub const COURSE_CODE_MAX: usize = 16;

/// Validation errors raised while building course values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseValidationError {
    #[error("course code must be between {min} and {max} characters")]
    CodeLength { min: usize, max: usize },
    #[error("course code may only contain letters, digits or '-'")]
    CodeCharacters,
    #[error("course title must not be empty")]
    EmptyTitle,
    #[error("course title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("course schedule must be at most {max} characters")]
    ScheduleTooLong { max: usize },
    #[error(
        "capacity must satisfy max_students >= min_students >= 1 \
         (got max {max_students}, min {min_students})"
    )]
    InvalidCapacity { max_students: u32, min_students: u32 },
    #[error("unknown course status: {0}")]
    UnknownStatus(String),
}

/// Identifier of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(Uuid);

impl CourseId {
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

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

static COURSE_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn course_code_regex() -> &'static Regex {
    COURSE_CODE_RE.get_or_init(|| {
        Regex::new("^[A-Z0-9-]+$")
            .unwrap_or_else(|error| panic!("course code regex failed to compile: {error}"))
    })
}

/// Catalogue code such as `CS-101`, unique across courses.
///
/// Codes are trimmed and upper-cased, so `cs-101` and `CS-101` collide.
///
/// # Examples
/// ```
/// use registrar::domain::CourseCode;
///
/// let code = CourseCode::new(" cs-101 ").expect("valid code");
/// assert_eq!(code.as_str(), "CS-101");
/// assert!(CourseCode::new("CS 101").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CourseValidationError> {
        let normalised = raw.as_ref().trim().to_uppercase();
        let length = normalised.chars().count();
        if !(COURSE_CODE_MIN..=COURSE_CODE_MAX).contains(&length) {
            return Err(CourseValidationError::CodeLength {
                min: COURSE_CODE_MIN,
                max: COURSE_CODE_MAX,
            });
        }
        if !course_code_regex().is_match(&normalised) {
            return Err(CourseValidationError::CodeCharacters);
        }
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CourseCode> for String {
    fn from(value: CourseCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CourseCode {
    type Error = CourseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Seat limits for a course.
///
/// ## Invariants
/// - `max_students >= min_students >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capacity {
    max_students: u32,
    min_students: u32,
}

impl Capacity {
    /// Validate a seat range.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::Capacity;
    ///
    /// assert!(Capacity::new(30, 5).is_ok());
    /// assert!(Capacity::new(5, 30).is_err());
    /// assert!(Capacity::new(0, 0).is_err());
    /// ```
    pub fn new(max_students: u32, min_students: u32) -> Result<Self, CourseValidationError> {
        if min_students < 1 || max_students < min_students {
            return Err(CourseValidationError::InvalidCapacity {
                max_students,
                min_students,
            });
        }
        Ok(Self {
            max_students,
            min_students,
        })
    }

    pub fn max_students(&self) -> u32 {
        self.max_students
    }

    pub fn min_students(&self) -> u32 {
        self.min_students
    }

    /// Whether `active_count` leaves at least one free seat.
    pub fn has_seat_for(&self, active_count: u64) -> bool {
        active_count < u64::from(self.max_students)
    }
}

/// Administrative course status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    Draft,
    Active,
    Closed,
    Cancelled,
    Completed,
}

impl CourseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Whether the course accepts new enrollments.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether an administrator may move a course from `self` to `next`.
    ///
    /// Staying in the same status is always allowed.
    ///
    /// # Examples
    /// ```
    /// use registrar::domain::CourseStatus;
    ///
    /// assert!(CourseStatus::Draft.can_transition_to(CourseStatus::Active));
    /// assert!(CourseStatus::Closed.can_transition_to(CourseStatus::Active));
    /// assert!(!CourseStatus::Cancelled.can_transition_to(CourseStatus::Active));
    /// ```
    pub fn can_transition_to(self, next: Self) -> bool {
        use CourseStatus::{Active, Cancelled, Closed, Completed, Draft};
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Draft, Active | Cancelled)
                | (Active, Closed | Cancelled | Completed)
                | (Closed, Active | Cancelled | Completed)
        )
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseStatus {
    type Err = CourseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "closed" => Ok(Self::Closed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(CourseValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Unvalidated course attributes supplied by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub code: String,
    pub title: String,
    pub max_students: u32,
    pub min_students: u32,
    #[serde(default)]
    pub fee_cents: u32,
    #[serde(default)]
    pub schedule: Option<String>,
    /// Initial status for new courses; ignored on update.
    #[serde(default)]
    pub status: Option<CourseStatus>,
}

/// Validated attributes shared by creation and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseAttributes {
    pub code: CourseCode,
    pub title: String,
    pub capacity: Capacity,
    pub fee_cents: u32,
    pub schedule: Option<String>,
}

impl TryFrom<&CourseDraft> for CourseAttributes {
    type Error = CourseValidationError;

    fn try_from(draft: &CourseDraft) -> Result<Self, Self::Error> {
        let code = CourseCode::new(&draft.code)?;
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(CourseValidationError::EmptyTitle);
        }
        if title.chars().count() > COURSE_TITLE_MAX {
            return Err(CourseValidationError::TitleTooLong {
                max: COURSE_TITLE_MAX,
            });
        }
        let schedule = draft
            .schedule
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        if schedule.is_some_and(|value| value.chars().count() > COURSE_SCHEDULE_MAX) {
            return Err(CourseValidationError::ScheduleTooLong {
                max: COURSE_SCHEDULE_MAX,
            });
        }
        Ok(Self {
            code,
            title: title.to_owned(),
            capacity: Capacity::new(draft.max_students, draft.min_students)?,
            fee_cents: draft.fee_cents,
            schedule: schedule.map(str::to_owned),
        })
    }
}

/// A catalogue course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    id: CourseId,
    code: CourseCode,
    title: String,
    #[serde(flatten)]
    capacity: Capacity,
    status: CourseStatus,
    fee_cents: u32,
    schedule: Option<String>,
    created_at: DateTime<Utc>,
}

impl Course {
    /// Build a new course from a draft.
    ///
    /// Courses start as `draft` unless the draft asks for another status.
    pub fn create(
        id: CourseId,
        draft: &CourseDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, CourseValidationError> {
        let attributes = CourseAttributes::try_from(draft)?;
        Ok(Self::from_parts(
            id,
            attributes,
            draft.status.unwrap_or(CourseStatus::Draft),
            now,
        ))
    }

    /// Rehydrate a course from trusted parts.
    pub fn from_parts(
        id: CourseId,
        attributes: CourseAttributes,
        status: CourseStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        let CourseAttributes {
            code,
            title,
            capacity,
            fee_cents,
            schedule,
        } = attributes;
        Self {
            id,
            code,
            title,
            capacity,
            status,
            fee_cents,
            schedule,
            created_at,
        }
    }

    /// Replace the editable attributes, keeping identity and status.
    #[must_use]
    pub fn with_attributes(self, attributes: CourseAttributes) -> Self {
        Self::from_parts(self.id, attributes, self.status, self.created_at)
    }

    /// Return a copy carrying `status`.
    #[must_use]
    pub fn with_status(mut self, status: CourseStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> CourseId {
        self.id
    }

    pub fn code(&self) -> &CourseCode {
        &self.code
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn status(&self) -> CourseStatus {
        self.status
    }

    pub fn fee_cents(&self) -> u32 {
        self.fee_cents
    }

    pub fn schedule(&self) -> Option<&str> {
        self.schedule.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// A course is available when it is open and has a free seat.
    pub fn is_available(&self, active_count: u64) -> bool {
        self.status.is_open() && self.capacity.has_seat_for(active_count)
    }
}
