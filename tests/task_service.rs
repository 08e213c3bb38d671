//! Integration tests for `TaskService` over the in-memory repository.
//!
//! Property tests drive the async service from a current-thread runtime.

mod common;

use std::collections::HashSet;

use proptest::prelude::*;
use rstest::rstest;

use common::{create_task, create_test_service};
use taskdeck::domain::{FieldUpdate, Priority, Task};
use taskdeck::service::{CreateTaskRequest, ServiceError, UpdateTaskRequest};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

fn title_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 ]{0,40}"
}

// =============================================================================
// Create
// =============================================================================

proptest! {
    #[test]
    fn prop_created_tasks_start_open_with_unique_ids(
        titles in prop::collection::vec(title_strategy(), 1..8),
        priority in prop::option::of(priority_strategy()),
    ) {
        let runtime = runtime();
        let (service, _) = create_test_service();

        let created: Vec<Task> = runtime.block_on(async {
            let mut created = Vec::new();
            for title in &titles {
                let mut request = CreateTaskRequest::new(title.clone());
                if let Some(priority) = priority {
                    request = request.with_priority(priority);
                }
                created.push(service.create(request).await.unwrap());
            }
            created
        });

        for (task, title) in created.iter().zip(&titles) {
            prop_assert!(!task.completed);
            prop_assert_eq!(task.priority, priority.unwrap_or(Priority::Medium));
            prop_assert_eq!(task.title.as_str(), title.trim());
        }
        let ids: HashSet<_> = created.iter().map(|task| task.id).collect();
        prop_assert_eq!(ids.len(), created.len());
    }
}

#[rstest]
#[case(CreateTaskRequest::new(""), "title")]
#[case(CreateTaskRequest::new("x".repeat(256)), "title")]
#[case(CreateTaskRequest::new("ok").with_description("d".repeat(10_001)), "description")]
#[case(CreateTaskRequest::new("ok").with_due_date("2025-13-40"), "dueDate")]
#[tokio::test]
async fn test_invalid_create_stores_nothing(
    #[case] request: CreateTaskRequest,
    #[case] field: &str,
) {
    let (service, _) = create_test_service();

    let result = service.create(request).await;

    match result {
        Err(ServiceError::Validation(errors)) => assert!(errors.message_for(field).is_some()),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(service.list().await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_title_of_exactly_max_length_is_accepted() {
    let (service, _) = create_test_service();
    let title = "é".repeat(255);

    let task = service.create(CreateTaskRequest::new(title.clone())).await.unwrap();

    assert_eq!(task.title, title);
}

// =============================================================================
// List
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_list_returns_newest_first() {
    let (service, _) = create_test_service();
    let first = create_task(&service, "T1").await;
    let second = create_task(&service, "T2").await;

    let tasks = service.list().await.unwrap();

    assert_eq!(tasks, vec![second, first]);
}

#[rstest]
#[tokio::test]
async fn test_list_with_store_down_is_internal_error() {
    let (service, repository) = create_test_service();
    repository.set_available(false);

    let result = service.list().await;

    assert_eq!(
        result,
        Err(ServiceError::Internal("Failed to fetch tasks".to_string()))
    );
}

// =============================================================================
// Update
// =============================================================================

#[derive(Debug, Clone)]
struct PatchFields {
    title: Option<String>,
    completed: Option<bool>,
    priority: Option<Priority>,
    clear_description: bool,
}

fn patch_strategy() -> impl Strategy<Value = PatchFields> {
    (
        prop::option::of(title_strategy()),
        prop::option::of(any::<bool>()),
        prop::option::of(priority_strategy()),
        any::<bool>(),
    )
        .prop_map(|(title, completed, priority, clear_description)| PatchFields {
            title,
            completed,
            priority,
            clear_description,
        })
}

proptest! {
    #[test]
    fn prop_update_changes_only_supplied_fields(fields in patch_strategy()) {
        let runtime = runtime();
        let (service, _) = create_test_service();

        let (original, updated) = runtime.block_on(async {
            let original = service
                .create(
                    CreateTaskRequest::new("Original")
                        .with_description("Keep me")
                        .with_priority(Priority::Low)
                        .with_due_date("2030-01-15"),
                )
                .await
                .unwrap();

            let request = UpdateTaskRequest {
                title: fields.title.clone(),
                description: if fields.clear_description {
                    FieldUpdate::Clear
                } else {
                    FieldUpdate::Unchanged
                },
                completed: fields.completed,
                priority: fields.priority,
                due_date: FieldUpdate::Unchanged,
            };
            let updated = service
                .update(&original.id.to_string(), request)
                .await
                .unwrap();
            (original, updated)
        });

        prop_assert_eq!(updated.id, original.id);
        prop_assert_eq!(updated.created_at, original.created_at);
        prop_assert_eq!(updated.due_date, original.due_date);
        prop_assert_eq!(
            updated.title,
            fields.title.map_or(original.title, |title| title.trim().to_string())
        );
        prop_assert_eq!(updated.completed, fields.completed.unwrap_or(original.completed));
        prop_assert_eq!(updated.priority, fields.priority.unwrap_or(original.priority));
        prop_assert_eq!(
            updated.description,
            if fields.clear_description { None } else { original.description }
        );
    }
}

#[rstest]
#[tokio::test]
async fn test_update_nonexistent_task_mutates_nothing() {
    let (service, _) = create_test_service();
    let existing = create_task(&service, "Existing").await;
    let missing = uuid::Uuid::new_v4().to_string();

    let result = service
        .update(&missing, UpdateTaskRequest::completion(true))
        .await;

    assert_eq!(
        result,
        Err(ServiceError::NotFound(format!("Task {missing} not found")))
    );
    assert_eq!(service.list().await.unwrap(), vec![existing]);
}

#[rstest]
#[tokio::test]
async fn test_empty_update_returns_task_unchanged() {
    let (service, _) = create_test_service();
    let task = create_task(&service, "Untouched").await;

    let updated = service
        .update(&task.id.to_string(), UpdateTaskRequest::default())
        .await
        .unwrap();

    assert_eq!(updated, task);
}

#[rstest]
#[tokio::test]
async fn test_concurrent_edits_last_write_wins() {
    let (service, _) = create_test_service();
    let task = create_task(&service, "Shared").await;
    let id = task.id.to_string();

    service
        .update(&id, UpdateTaskRequest::default().with_title("From session A"))
        .await
        .unwrap();
    service
        .update(&id, UpdateTaskRequest::default().with_title("From session B"))
        .await
        .unwrap();

    let tasks = service.list().await.unwrap();
    assert_eq!(tasks[0].title, "From session B");
}

// =============================================================================
// Delete
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_delete_twice_is_not_found() {
    let (service, _) = create_test_service();
    let task = create_task(&service, "Short lived").await;
    let id = task.id.to_string();

    assert_eq!(service.delete(&id).await.unwrap(), task);
    assert!(matches!(
        service.delete(&id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[rstest]
#[case("")]
#[case("not-a-uuid")]
#[tokio::test]
async fn test_delete_malformed_id_is_validation_error(#[case] id: &str) {
    let (service, _) = create_test_service();

    let result = service.delete(id).await;

    match result {
        Err(ServiceError::Validation(errors)) => {
            assert_eq!(errors.message_for("id"), Some("Invalid task id"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

// =============================================================================
// End-to-end scenario
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_buy_milk_lifecycle() {
    let (service, _) = create_test_service();

    let created = service
        .create(
            CreateTaskRequest::new("Buy milk")
                .with_priority(Priority::Low)
                .with_due_date("2025-10-02"),
        )
        .await
        .unwrap();
    assert!(!created.completed);
    assert_eq!(created.priority, Priority::Low);
    assert_eq!(created.due_date.map(|date| date.to_string()).as_deref(), Some("2025-10-02"));

    let id = created.id.to_string();
    let completed = service
        .update(&id, UpdateTaskRequest::completion(true))
        .await
        .unwrap();
    assert!(completed.completed);
    assert_eq!(completed.title, "Buy milk");

    let listed = service.list().await.unwrap();
    assert_eq!(listed, vec![completed.clone()]);

    let deleted = service.delete(&id).await.unwrap();
    assert_eq!(deleted, completed);
    assert!(service.list().await.unwrap().is_empty());
}
