//! The contract the client cache depends on.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::domain::{Task, TaskId};
use crate::service::{CreateTaskRequest, ServiceError, TaskService, UpdateTaskRequest};

/// The four task operations as seen from the client side.
///
/// Implemented in-process by [`TaskService`] and over HTTP by
/// [`HttpTaskGateway`](super::HttpTaskGateway).
pub trait TaskGateway: Send + Sync {
    fn list(&self) -> BoxFuture<'_, Result<Vec<Task>, ServiceError>>;

    fn create(&self, request: CreateTaskRequest) -> BoxFuture<'_, Result<Task, ServiceError>>;

    fn update(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> BoxFuture<'_, Result<Task, ServiceError>>;

    fn delete(&self, id: TaskId) -> BoxFuture<'_, Result<Task, ServiceError>>;
}

impl TaskGateway for TaskService {
    fn list(&self) -> BoxFuture<'_, Result<Vec<Task>, ServiceError>> {
        Self::list(self).boxed()
    }

    fn create(&self, request: CreateTaskRequest) -> BoxFuture<'_, Result<Task, ServiceError>> {
        Self::create(self, request).boxed()
    }

    fn update(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> BoxFuture<'_, Result<Task, ServiceError>> {
        async move { Self::update(self, &id.to_string(), request).await }.boxed()
    }

    fn delete(&self, id: TaskId) -> BoxFuture<'_, Result<Task, ServiceError>> {
        async move { Self::delete(self, &id.to_string()).await }.boxed()
    }
}

impl<G: TaskGateway + ?Sized> TaskGateway for Arc<G> {
    fn list(&self) -> BoxFuture<'_, Result<Vec<Task>, ServiceError>> {
        (**self).list()
    }

    fn create(&self, request: CreateTaskRequest) -> BoxFuture<'_, Result<Task, ServiceError>> {
        (**self).create(request)
    }

    fn update(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> BoxFuture<'_, Result<Task, ServiceError>> {
        (**self).update(id, request)
    }

    fn delete(&self, id: TaskId) -> BoxFuture<'_, Result<Task, ServiceError>> {
        (**self).delete(id)
    }
}
