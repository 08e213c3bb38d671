//! Request contract types and their validation.
//!
//! `CreateTaskRequest` and `UpdateTaskRequest` are the wire payloads of the
//! create and update operations. They are shared by the HTTP handlers and the
//! HTTP gateway. Validation turns them into a [`NewTask`] or a [`TaskPatch`],
//! collecting every field error of the request rather than stopping at the
//! first one.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{FieldUpdate, Priority, TaskId, TaskPatch};

use super::error::ValidationError;

/// Maximum title length, counted in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Maximum description length, counted in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

// =============================================================================
// Request Types
// =============================================================================

/// Payload of the create operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Required title. A missing field is reported like an empty one.
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Defaults to `MEDIUM` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Calendar date as text; an empty string counts as omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(self, priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..self
        }
    }

    /// Sets the due date text.
    #[must_use]
    pub fn with_due_date(self, due_date: impl Into<String>) -> Self {
        Self {
            due_date: Some(due_date.into()),
            ..self
        }
    }
}

/// Payload of the update operation.
///
/// Every field is optional. `description` and `dueDate` additionally accept
/// an explicit `null`, which clears the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub description: FieldUpdate<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "FieldUpdate::is_unchanged")]
    pub due_date: FieldUpdate<String>,
}

impl UpdateTaskRequest {
    /// Creates a request that only sets the completion flag.
    #[must_use]
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..self
        }
    }

    /// Sets, clears or keeps the description.
    #[must_use]
    pub fn with_description(self, description: FieldUpdate<String>) -> Self {
        Self {
            description,
            ..self
        }
    }

    /// Sets a new priority.
    #[must_use]
    pub fn with_priority(self, priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..self
        }
    }

    /// Sets, clears or keeps the due date.
    #[must_use]
    pub fn with_due_date(self, due_date: FieldUpdate<String>) -> Self {
        Self { due_date, ..self }
    }
}

// =============================================================================
// Validated Types
// =============================================================================

/// Validated data for a task that is about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a task title.
///
/// The title is trimmed; it must be non-empty and at most
/// [`MAX_TITLE_LENGTH`] characters long.
///
/// # Errors
///
/// Returns a `ValidationError` on field `title`.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::single("title", "Title is required"));
    }

    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::single(
            "title",
            format!("Title must not exceed {MAX_TITLE_LENGTH} characters"),
        ));
    }

    Ok(title.to_string())
}

/// Validates a task description.
///
/// The length limit applies to the text as sent. Text that is blank after
/// trimming means "no description"; any other text is kept unchanged.
///
/// # Errors
///
/// Returns a `ValidationError` on field `description` when the text is longer
/// than [`MAX_DESCRIPTION_LENGTH`] characters.
pub fn validate_description(description: &str) -> Result<Option<String>, ValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        Err(ValidationError::single(
            "description",
            format!("Description must not exceed {MAX_DESCRIPTION_LENGTH} characters"),
        ))
    } else if description.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(description.to_string()))
    }
}

/// Parses a due date.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 date-time (the date part is kept).
/// Returns `Ok(None)` for an empty string, which counts as "not provided".
///
/// # Errors
///
/// Returns a `ValidationError` on field `dueDate` for any other input.
pub fn parse_due_date(value: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|datetime| datetime.date_naive()))
        .map(Some)
        .map_err(|_| ValidationError::single("dueDate", "Invalid date"))
}

/// Parses a task id taken from a request path.
///
/// # Errors
///
/// Returns a `ValidationError` on field `id` when the value is not a UUID.
pub fn parse_task_id(value: &str) -> Result<TaskId, ValidationError> {
    TaskId::parse(value).map_err(|_| ValidationError::single("id", "Invalid task id"))
}

/// Runs a validator and moves its field errors into `errors`.
fn collect<T>(errors: &mut ValidationError, result: Result<T, ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            errors.errors.extend(error.errors);
            None
        }
    }
}

// =============================================================================
// Request Validation
// =============================================================================

/// Validates a create request.
///
/// # Errors
///
/// Returns a `ValidationError` listing every invalid field.
pub fn validate_create_request(request: &CreateTaskRequest) -> Result<NewTask, ValidationError> {
    let mut errors = ValidationError::default();

    let title = collect(&mut errors, validate_title(&request.title));
    let description = collect(
        &mut errors,
        request
            .description
            .as_deref()
            .map_or(Ok(None), validate_description),
    );
    let due_date = collect(
        &mut errors,
        request.due_date.as_deref().map_or(Ok(None), parse_due_date),
    );

    match (title, description, due_date) {
        (Some(title), Some(description), Some(due_date)) if errors.is_empty() => Ok(NewTask {
            title,
            description,
            priority: request.priority.unwrap_or_default(),
            due_date,
        }),
        _ => Err(errors),
    }
}

/// Validates an update request into a [`TaskPatch`].
///
/// Only supplied fields end up in the patch. A blank description becomes an
/// explicit clear and an empty due date string counts as omitted.
///
/// # Errors
///
/// Returns a `ValidationError` listing every invalid field.
pub fn validate_update_request(request: &UpdateTaskRequest) -> Result<TaskPatch, ValidationError> {
    let mut errors = ValidationError::default();

    let title = request
        .title
        .as_deref()
        .and_then(|title| collect(&mut errors, validate_title(title)));

    let description = match &request.description {
        FieldUpdate::Unchanged => FieldUpdate::Unchanged,
        FieldUpdate::Clear => FieldUpdate::Clear,
        FieldUpdate::Set(text) => match collect(&mut errors, validate_description(text)) {
            Some(Some(text)) => FieldUpdate::Set(text),
            Some(None) => FieldUpdate::Clear,
            None => FieldUpdate::Unchanged,
        },
    };

    let due_date = match &request.due_date {
        FieldUpdate::Unchanged => FieldUpdate::Unchanged,
        FieldUpdate::Clear => FieldUpdate::Clear,
        FieldUpdate::Set(text) => match collect(&mut errors, parse_due_date(text)) {
            Some(Some(date)) => FieldUpdate::Set(date),
            Some(None) | None => FieldUpdate::Unchanged,
        },
    };

    errors.into_result(TaskPatch {
        title,
        description,
        completed: request.completed,
        priority: request.priority,
        due_date,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    // -------------------------------------------------------------------------
    // Title
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("Buy milk", "Buy milk")]
    #[case("  Buy milk \n", "Buy milk")]
    fn test_validate_title_trims(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_title(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn test_validate_title_rejects_blank(#[case] input: &str) {
        let error = validate_title(input).unwrap_err();
        assert_eq!(error.message_for("title"), Some("Title is required"));
    }

    #[rstest]
    fn test_validate_title_counts_characters_not_bytes() {
        let title = "é".repeat(MAX_TITLE_LENGTH);
        assert!(title.len() > MAX_TITLE_LENGTH);
        assert!(validate_title(&title).is_ok());
    }

    #[rstest]
    fn test_validate_title_rejects_too_long() {
        let title = "a".repeat(MAX_TITLE_LENGTH + 1);
        let error = validate_title(&title).unwrap_err();
        assert_eq!(
            error.message_for("title"),
            Some("Title must not exceed 255 characters")
        );
    }

    // -------------------------------------------------------------------------
    // Description
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_validate_description_blank_is_none() {
        assert_eq!(validate_description("   ").unwrap(), None);
    }

    #[rstest]
    fn test_validate_description_at_limit() {
        let description = "d".repeat(MAX_DESCRIPTION_LENGTH);
        assert_eq!(validate_description(&description).unwrap(), Some(description));
    }

    #[rstest]
    fn test_validate_description_rejects_too_long() {
        let description = "d".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(validate_description(&description).is_err());
    }

    #[rstest]
    #[case(format!("{} ", "d".repeat(MAX_DESCRIPTION_LENGTH)))]
    #[case(format!(" {}", "d".repeat(MAX_DESCRIPTION_LENGTH)))]
    fn test_validate_description_counts_surrounding_whitespace(#[case] description: String) {
        assert!(validate_description(&description).is_err());
    }

    #[rstest]
    fn test_validate_description_keeps_text_as_sent() {
        assert_eq!(
            validate_description("  two litres \n").unwrap(),
            Some("  two litres \n".to_string())
        );
    }

    // -------------------------------------------------------------------------
    // Due Date
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("2025-10-02", Some(date(2025, 10, 2)))]
    #[case("2025-10-02T23:30:00Z", Some(date(2025, 10, 2)))]
    #[case("2025-10-02T08:00:00+09:00", Some(date(2025, 10, 2)))]
    #[case("", None)]
    #[case("  ", None)]
    fn test_parse_due_date_accepts(#[case] input: &str, #[case] expected: Option<NaiveDate>) {
        assert_eq!(parse_due_date(input).unwrap(), expected);
    }

    #[rstest]
    #[case("tomorrow")]
    #[case("2025-13-01")]
    #[case("2025-02-30")]
    #[case("02/10/2025")]
    fn test_parse_due_date_rejects(#[case] input: &str) {
        let error = parse_due_date(input).unwrap_err();
        assert_eq!(error.message_for("dueDate"), Some("Invalid date"));
    }

    // -------------------------------------------------------------------------
    // Task Id
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_parse_task_id_rejects_malformed() {
        let error = parse_task_id("42").unwrap_err();
        assert_eq!(error.message_for("id"), Some("Invalid task id"));
    }

    // -------------------------------------------------------------------------
    // Create Request
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_validate_create_request_defaults() {
        let validated = validate_create_request(&CreateTaskRequest::new("Buy milk")).unwrap();
        assert_eq!(validated.title, "Buy milk");
        assert_eq!(validated.priority, Priority::Medium);
        assert_eq!(validated.description, None);
        assert_eq!(validated.due_date, None);
    }

    #[rstest]
    fn test_validate_create_request_empty_due_date_is_omitted() {
        let request = CreateTaskRequest::new("Buy milk").with_due_date("");
        assert_eq!(validate_create_request(&request).unwrap().due_date, None);
    }

    #[rstest]
    fn test_validate_create_request_collects_all_errors() {
        let request = CreateTaskRequest::new(" ")
            .with_description("d".repeat(MAX_DESCRIPTION_LENGTH + 1))
            .with_due_date("someday");

        let error = validate_create_request(&request).unwrap_err();

        let fields: Vec<&str> = error.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "description", "dueDate"]);
    }

    #[rstest]
    fn test_create_request_deserializes_missing_title_as_empty() {
        let request: CreateTaskRequest = serde_json::from_str(r#"{"priority":"HIGH"}"#).unwrap();
        assert_eq!(request.title, "");
        assert_eq!(request.priority, Some(Priority::High));
        assert!(validate_create_request(&request).is_err());
    }

    // -------------------------------------------------------------------------
    // Update Request
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_validate_update_request_empty_is_empty_patch() {
        let patch = validate_update_request(&UpdateTaskRequest::default()).unwrap();
        assert!(patch.is_empty());
    }

    #[rstest]
    fn test_update_request_distinguishes_null_and_absent() {
        let absent: UpdateTaskRequest = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        let cleared: UpdateTaskRequest =
            serde_json::from_str(r#"{"description":null,"dueDate":null}"#).unwrap();

        let absent = validate_update_request(&absent).unwrap();
        let cleared = validate_update_request(&cleared).unwrap();

        assert_eq!(absent.completed, Some(true));
        assert!(absent.description.is_unchanged());
        assert!(absent.due_date.is_unchanged());
        assert_eq!(cleared.description, FieldUpdate::Clear);
        assert_eq!(cleared.due_date, FieldUpdate::Clear);
        assert_eq!(cleared.completed, None);
    }

    #[rstest]
    fn test_validate_update_request_blank_description_clears() {
        let request =
            UpdateTaskRequest::default().with_description(FieldUpdate::Set("  ".to_string()));
        let patch = validate_update_request(&request).unwrap();
        assert_eq!(patch.description, FieldUpdate::Clear);
    }

    #[rstest]
    fn test_validate_update_request_empty_due_date_is_unchanged() {
        let request = UpdateTaskRequest::default().with_due_date(FieldUpdate::Set(String::new()));
        let patch = validate_update_request(&request).unwrap();
        assert!(patch.due_date.is_unchanged());
    }

    #[rstest]
    fn test_validate_update_request_sets_fields() {
        let request = UpdateTaskRequest::completion(false)
            .with_title("  Write report ")
            .with_priority(Priority::Urgent)
            .with_due_date(FieldUpdate::Set("2025-10-02".to_string()));

        let patch = validate_update_request(&request).unwrap();

        assert_eq!(patch.title.as_deref(), Some("Write report"));
        assert_eq!(patch.priority, Some(Priority::Urgent));
        assert_eq!(patch.completed, Some(false));
        assert_eq!(patch.due_date, FieldUpdate::Set(date(2025, 10, 2)));
    }

    #[rstest]
    fn test_validate_update_request_rejects_supplied_invalid_fields() {
        let request = UpdateTaskRequest::default()
            .with_title("")
            .with_due_date(FieldUpdate::Set("never".to_string()));

        let error = validate_update_request(&request).unwrap_err();

        assert_eq!(error.message_for("title"), Some("Title is required"));
        assert_eq!(error.message_for("dueDate"), Some("Invalid date"));
    }

    #[rstest]
    fn test_update_request_serializes_only_supplied_fields() {
        let request = UpdateTaskRequest::completion(true).with_due_date(FieldUpdate::Clear);
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"completed":true,"dueDate":null}"#);
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    proptest! {
        /// Any non-blank title of at most 255 characters is accepted trimmed.
        #[test]
        fn valid_titles_are_accepted(title in "[a-zA-Z0-9]{1,255}", padding in " {0,3}") {
            let input = format!("{padding}{title}{padding}");
            prop_assert_eq!(validate_title(&input).unwrap(), title);
        }

        /// Titles longer than 255 characters are always rejected.
        #[test]
        fn long_titles_are_rejected(length in 256usize..600) {
            let title = "x".repeat(length);
            prop_assert!(validate_title(&title).is_err());
        }

        /// Descriptions are accepted exactly up to the limit.
        #[test]
        fn description_limit_is_exact(length in 1usize..=(MAX_DESCRIPTION_LENGTH + 50)) {
            let description = "y".repeat(length);
            prop_assert_eq!(
                validate_description(&description).is_ok(),
                length <= MAX_DESCRIPTION_LENGTH
            );
        }
    }
}
