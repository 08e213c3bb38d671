//! Task domain model.
//!
//! The task is the only persisted entity. Values in this module are plain data
//! with pure, builder-style updates. Identifiers and creation timestamps are
//! produced by the service at creation time and never change afterwards.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
///
/// Serialized as the canonical hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a new random `TaskId` (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a `TaskId` from its string form, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns the UUID parse error when the value is not a valid UUID.
    pub fn parse(value: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
///
/// Serialized as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

// =============================================================================
// Priority
// =============================================================================

/// The priority level of a task.
///
/// Ordered from `Low` to `Urgent`. The wire form is the upper-case name
/// (`LOW`, `MEDIUM`, `HIGH`, `URGENT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Low priority (value: 0).
    Low,
    /// Medium priority (value: 1). Assigned when a task is created without one.
    #[default]
    Medium,
    /// High priority (value: 2).
    High,
    /// Urgent priority (value: 3).
    Urgent,
}

impl Priority {
    /// All priorities in ascending order.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    /// Returns the numeric value of the priority.
    ///
    /// Higher values indicate higher priority.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Urgent => 3,
        }
    }

    /// Returns the wire/storage representation (`LOW`, `MEDIUM`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(formatter, "Low"),
            Self::Medium => write!(formatter, "Medium"),
            Self::High => write!(formatter, "High"),
            Self::Urgent => write!(formatter, "Urgent"),
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value().cmp(&other.value())
    }
}

/// Error returned when a string is not one of the four priority names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown priority: '{0}'. Expected one of LOW, MEDIUM, HIGH, URGENT")]
pub struct UnknownPriority(pub String);

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownPriority(value.to_string()))
    }
}

// =============================================================================
// FieldUpdate
// =============================================================================

/// Tri-state update marker for nullable fields.
///
/// Distinguishes "field omitted" from "field explicitly cleared":
///
/// - field absent from the payload → `Unchanged`
/// - JSON `null` → `Clear`
/// - any value → `Set(value)`
///
/// Struct fields of this type must carry `#[serde(default)]` so that an absent
/// field deserializes to `Unchanged`, and
/// `#[serde(skip_serializing_if = "FieldUpdate::is_unchanged")]` so that
/// `Unchanged` is omitted on the way out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Leave the current value as it is.
    Unchanged,
    /// Replace the current value.
    Set(T),
    /// Remove the current value.
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::Unchanged
    }
}

impl<T> FieldUpdate<T> {
    /// Returns `true` if the field was not supplied.
    #[must_use]
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Maps the value of a `Set` update, keeping `Unchanged` and `Clear` as is.
    #[must_use]
    pub fn map<U>(self, function: impl FnOnce(T) -> U) -> FieldUpdate<U> {
        match self {
            Self::Unchanged => FieldUpdate::Unchanged,
            Self::Set(value) => FieldUpdate::Set(function(value)),
            Self::Clear => FieldUpdate::Clear,
        }
    }

    /// Converts from `&FieldUpdate<T>` to `FieldUpdate<&T>`.
    #[must_use]
    pub const fn as_ref(&self) -> FieldUpdate<&T> {
        match self {
            Self::Unchanged => FieldUpdate::Unchanged,
            Self::Set(value) => FieldUpdate::Set(value),
            Self::Clear => FieldUpdate::Clear,
        }
    }

    /// Applies the update to the current value of the field.
    #[must_use]
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Unchanged => current,
            Self::Set(value) => Some(value),
            Self::Clear => None,
        }
    }
}

impl<T: Serialize> Serialize for FieldUpdate<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => value.serialize(serializer),
            Self::Unchanged | Self::Clear => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldUpdate<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| value.map_or(Self::Clear, Self::Set))
    }
}

// =============================================================================
// TaskPatch
// =============================================================================

/// A validated partial update of a task.
///
/// Every field is an explicit "absent" marker, so a field that is not part of
/// the patch is never reset to a default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskPatch {
    /// New (already trimmed and validated) title.
    pub title: Option<String>,
    /// New description, or an explicit clear.
    pub description: FieldUpdate<String>,
    /// New completion flag.
    pub completed: Option<bool>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New due date, or an explicit clear.
    pub due_date: FieldUpdate<NaiveDate>,
}

impl TaskPatch {
    /// Creates a patch that only sets the completion flag.
    #[must_use]
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_unchanged()
            && self.completed.is_none()
            && self.priority.is_none()
            && self.due_date.is_unchanged()
    }
}

// =============================================================================
// Task
// =============================================================================

/// The task entity.
///
/// Serialized with camelCase field names; absent optionals are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier, immutable after creation.
    pub id: TaskId,
    /// Non-empty title (at most 255 characters).
    pub title: String,
    /// Optional description (at most 10,000 characters).
    pub description: Option<String>,
    /// Completion flag.
    pub completed: bool,
    /// Priority level.
    pub priority: Priority,
    /// Optional calendar due date.
    pub due_date: Option<NaiveDate>,
    /// Creation time, immutable after creation.
    pub created_at: Timestamp,
}

impl Task {
    /// Creates a new open task with medium priority and no description or due date.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            completed: false,
            priority: Priority::Medium,
            due_date: None,
            created_at,
        }
    }

    /// Returns a new task with the given description.
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    /// Returns a new task with the given priority.
    #[must_use]
    pub fn with_priority(self, priority: Priority) -> Self {
        Self { priority, ..self }
    }

    /// Returns a new task with the given due date.
    #[must_use]
    pub fn with_due_date(self, due_date: NaiveDate) -> Self {
        Self {
            due_date: Some(due_date),
            ..self
        }
    }

    /// Returns a new task with the completion flag set to the given value.
    #[must_use]
    pub fn with_completed(self, completed: bool) -> Self {
        Self { completed, ..self }
    }

    /// Applies a partial update.
    ///
    /// Only fields present in the patch change; `id` and `created_at` are
    /// never touched.
    #[must_use]
    pub fn apply(self, patch: &TaskPatch) -> Self {
        Self {
            title: patch.title.clone().unwrap_or(self.title),
            description: patch.description.clone().apply(self.description),
            completed: patch.completed.unwrap_or(self.completed),
            priority: patch.priority.unwrap_or(self.priority),
            due_date: patch.due_date.clone().apply(self.due_date),
            ..self
        }
    }

    /// Returns `true` if the task is still open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.completed
    }
}

// =============================================================================
// Tests
// =============================================================================
