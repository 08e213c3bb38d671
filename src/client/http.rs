//! Task gateway over the HTTP API.
//!
//! Error bodies are mapped back to the three service error kinds by their
//! `code`. Transport failures and unreadable bodies become
//! [`ServiceError::Internal`] with a generic message; the details are logged.

use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::api::ApiError;
use crate::domain::{Task, TaskId};
use crate::service::{CreateTaskRequest, ServiceError, UpdateTaskRequest};

use super::gateway::TaskGateway;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP implementation of [`TaskGateway`].
#[derive(Debug, Clone)]
pub struct HttpTaskGateway {
    client: Client,
    base_url: String,
}

impl HttpTaskGateway {
    /// Creates a gateway for the API rooted at `base_url`
    /// (e.g. `http://127.0.0.1:3000`).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|error| {
                warn!(%error, "Failed to build HTTP client");
                ServiceError::Internal("Failed to initialize HTTP client".to_string())
            })?;
        Ok(Self::with_client(client, base_url))
    }

    /// Creates a gateway that reuses an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Returns the API root this gateway talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
    }

    async fn send<T: DeserializeOwned>(
        request: RequestBuilder,
        failure: &'static str,
    ) -> Result<T, ServiceError> {
        let response = request.send().await.map_err(|error| {
            if error.is_timeout() {
                warn!(%error, "Task API request timed out");
            } else if error.is_connect() {
                warn!(%error, "Task API unreachable");
            } else {
                warn!(%error, "Task API request failed");
            }
            ServiceError::Internal(failure.to_string())
        })?;

        parse_response(response, failure).await
    }
}

async fn parse_response<T: DeserializeOwned>(
    response: Response,
    failure: &'static str,
) -> Result<T, ServiceError> {
    let status = response.status();

    if status.is_success() {
        return response.json().await.map_err(|error| {
            warn!(%error, %status, "Unreadable task API response");
            ServiceError::Internal(failure.to_string())
        });
    }

    match response.json::<ApiError>().await {
        Ok(body) => Err(ServiceError::from(body)),
        Err(error) => {
            warn!(%error, %status, "Task API returned an unreadable error body");
            Err(ServiceError::Internal(failure.to_string()))
        }
    }
}

impl TaskGateway for HttpTaskGateway {
    fn list(&self) -> BoxFuture<'_, Result<Vec<Task>, ServiceError>> {
        let request = self.request(Method::GET, "/tasks");
        Self::send(request, "Failed to fetch tasks").boxed()
    }

    fn create(&self, request: CreateTaskRequest) -> BoxFuture<'_, Result<Task, ServiceError>> {
        let request = self.request(Method::POST, "/tasks").json(&request);
        Self::send(request, "Failed to create task").boxed()
    }

    fn update(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> BoxFuture<'_, Result<Task, ServiceError>> {
        let request = self
            .request(Method::PATCH, &format!("/tasks/{id}"))
            .json(&request);
        Self::send(request, "Failed to update task").boxed()
    }

    fn delete(&self, id: TaskId) -> BoxFuture<'_, Result<Task, ServiceError>> {
        let request = self.request(Method::DELETE, &format!("/tasks/{id}"));
        Self::send(request, "Failed to delete task").boxed()
    }
}
