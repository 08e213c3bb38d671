//! Common test helpers for integration tests.
//!
//! # Note
//!
//! `#![allow(dead_code)]` is needed because every integration test file is
//! compiled as its own crate and uses a different subset of these helpers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use futures::FutureExt;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use tokio::sync::Notify;
use tower::ServiceExt;

use taskdeck::api::{AppState, create_router};
use taskdeck::client::TaskGateway;
use taskdeck::domain::{Task, TaskId};
use taskdeck::infrastructure::InMemoryTaskRepository;
use taskdeck::service::{CreateTaskRequest, ServiceError, TaskService, UpdateTaskRequest};

// =============================================================================
// Service and Router Helpers
// =============================================================================

/// Creates a service over a fresh in-memory repository.
///
/// The repository handle shares state with the service, so tests can take
/// the store offline with `set_available(false)`.
pub fn create_test_service() -> (TaskService, InMemoryTaskRepository) {
    let repository = InMemoryTaskRepository::new();
    let service = TaskService::new(Arc::new(repository.clone()));
    (service, repository)
}

/// Creates the full router over a fresh in-memory repository.
pub fn create_test_router() -> (Router, InMemoryTaskRepository) {
    let (service, repository) = create_test_service();
    (create_router(AppState::new(service)), repository)
}

/// Creates a task through the service and returns it.
pub async fn create_task(service: &TaskService, title: &str) -> Task {
    service
        .create(CreateTaskRequest::new(title))
        .await
        .expect("task creation should succeed")
}

/// Sends a request with an optional JSON body and returns status and body.
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    send_request(router, request).await
}

/// Sends a prepared request and returns status and parsed JSON body.
pub async fn send_request(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// =============================================================================
// Scripted Gateway
// =============================================================================

/// A gateway over a real in-memory service that can hold or fail requests.
///
/// - `hold_next_list` makes the next `list` call read the store, then wait
///   until the returned `Notify` fires before answering (a slow, stale
///   response).
/// - `hold_updates` / `hold_creates` make matching requests wait on a gate
///   before reaching the service.
/// - `fail_*` flags make matching requests fail with an internal error.
pub struct ScriptedGateway {
    pub service: TaskService,
    pub repository: InMemoryTaskRepository,
    list_gate: Mutex<Option<Arc<Notify>>>,
    update_gate: Mutex<Option<Arc<Notify>>>,
    delete_gate: Mutex<Option<Arc<Notify>>>,
    create_gate: Mutex<Option<Arc<Notify>>>,
    pub fail_updates: AtomicBool,
    pub fail_deletes: AtomicBool,
    pub list_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        let (service, repository) = create_test_service();
        Self {
            service,
            repository,
            list_gate: Mutex::new(None),
            update_gate: Mutex::new(None),
            delete_gate: Mutex::new(None),
            create_gate: Mutex::new(None),
            fail_updates: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
        }
    }

    /// Seeds the store with tasks created in the given order.
    pub async fn seed(&self, titles: &[&str]) -> Vec<Task> {
        let mut created = Vec::new();
        for title in titles {
            created.push(create_task(&self.service, title).await);
        }
        created
    }

    pub fn hold_next_list(&self) -> Arc<Notify> {
        install(&self.list_gate)
    }

    pub fn hold_updates(&self) -> Arc<Notify> {
        install(&self.update_gate)
    }

    pub fn hold_deletes(&self) -> Arc<Notify> {
        install(&self.delete_gate)
    }

    pub fn hold_creates(&self) -> Arc<Notify> {
        install(&self.create_gate)
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn install(slot: &Mutex<Option<Arc<Notify>>>) -> Arc<Notify> {
    let gate = Arc::new(Notify::new());
    *slot.lock().unwrap() = Some(Arc::clone(&gate));
    gate
}

fn current(slot: &Mutex<Option<Arc<Notify>>>) -> Option<Arc<Notify>> {
    slot.lock().unwrap().clone()
}

async fn pass(gate: Option<Arc<Notify>>) {
    if let Some(gate) = gate {
        gate.notified().await;
    }
}

impl TaskGateway for ScriptedGateway {
    fn list(&self) -> BoxFuture<'_, Result<Vec<Task>, ServiceError>> {
        async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.list_gate.lock().unwrap().take();
            let result = self.service.list().await;
            pass(gate).await;
            result
        }
        .boxed()
    }

    fn create(&self, request: CreateTaskRequest) -> BoxFuture<'_, Result<Task, ServiceError>> {
        async move {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            pass(current(&self.create_gate)).await;
            self.service.create(request).await
        }
        .boxed()
    }

    fn update(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> BoxFuture<'_, Result<Task, ServiceError>> {
        async move {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            pass(current(&self.update_gate)).await;
            if self.fail_updates.load(Ordering::SeqCst) {
                return Err(ServiceError::Internal("Failed to update task".to_string()));
            }
            self.service.update(&id.to_string(), request).await
        }
        .boxed()
    }

    fn delete(&self, id: TaskId) -> BoxFuture<'_, Result<Task, ServiceError>> {
        async move {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            pass(current(&self.delete_gate)).await;
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(ServiceError::Internal("Failed to delete task".to_string()));
            }
            self.service.delete(&id.to_string()).await
        }
        .boxed()
    }
}
