//! Optimistic client-side task cache.
//!
//! Mutations follow a three-phase protocol:
//!
//! 1. **Begin**: snapshot the current list, publish the speculative list and
//!    invalidate any refresh that is already in flight.
//! 2. **Success**: fetch the list again from the service.
//! 3. **Failure**: restore the snapshot taken in step 1 and return the error.
//!    Once no other optimistic mutation is in flight, the list is fetched
//!    again so that anything the restore wrote over (a confirmed create, a
//!    change made by another session) comes back.
//!
//! Refresh suppression uses a generation counter. Beginning or finishing an
//! optimistic mutation bumps the generation, and a refresh result is only
//! published if the generation is the one it started with and no optimistic
//! mutation is in flight.
//!
//! Dropping a mutation future before it completes rolls it back like a
//! failure. A request that never resolves leaves its busy flag set. There is
//! no timeout at this level.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::domain::{Task, TaskId, TaskPatch};
use crate::service::{
    CreateTaskRequest, ServiceError, UpdateTaskRequest, validate_update_request,
};

use super::gateway::TaskGateway;
use super::store::{TaskBoard, TaskSnapshot, TaskStore};

// =============================================================================
// Busy Flags
// =============================================================================

/// Mutation categories with independent busy indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    const fn index(self) -> usize {
        match self {
            Self::Create => 0,
            Self::Update => 1,
            Self::Delete => 2,
        }
    }
}

/// In-flight request counters, one per [`MutationKind`].
#[derive(Debug, Default)]
pub struct BusyFlags {
    counters: [AtomicUsize; 3],
}

impl BusyFlags {
    /// Returns `true` while at least one request of `kind` is outstanding.
    #[must_use]
    pub fn is_busy(&self, kind: MutationKind) -> bool {
        self.counters[kind.index()].load(Ordering::SeqCst) > 0
    }

    /// Marks a request of `kind` as started until the guard is dropped.
    #[must_use]
    pub fn begin(&self, kind: MutationKind) -> BusyGuard<'_> {
        self.counters[kind.index()].fetch_add(1, Ordering::SeqCst);
        BusyGuard { flags: self, kind }
    }
}

/// Clears one busy mark of its kind on drop.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    flags: &'a BusyFlags,
    kind: MutationKind,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flags.counters[self.kind.index()].fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Cache State
// =============================================================================

/// What the presentation layer should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheView {
    /// No list has been fetched yet.
    Loading,
    /// The last list fetch failed; no tasks are shown.
    Failed(String),
    /// The current list, split into active and completed groups.
    Ready(TaskBoard),
}

/// Result of a refresh that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetched list is now the cached list.
    Applied,
    /// The fetched list was stale and has been dropped.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadStatus {
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug)]
struct SyncState {
    generation: u64,
    optimistic_in_flight: usize,
    status: LoadStatus,
}

fn lock(sync: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    sync.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An open optimistic mutation.
///
/// Holds the snapshot to roll back to. Dropping the window without calling
/// [`OptimisticWindow::close`] rolls back.
struct OptimisticWindow<'a> {
    sync: &'a Mutex<SyncState>,
    store: &'a TaskStore,
    previous: Arc<TaskSnapshot>,
    kind: MutationKind,
    open: bool,
}

impl<'a> OptimisticWindow<'a> {
    fn open(
        sync: &'a Mutex<SyncState>,
        store: &'a TaskStore,
        kind: MutationKind,
        speculate: impl FnOnce(&TaskSnapshot) -> TaskSnapshot,
    ) -> Self {
        let mut state = lock(sync);
        state.generation += 1;
        state.optimistic_in_flight += 1;

        let previous = store.snapshot();
        store.restore(Arc::new(speculate(previous.as_ref())));
        drop(state);

        Self {
            sync,
            store,
            previous,
            kind,
            open: true,
        }
    }

    /// Ends the window, rolling back if `failed`.
    ///
    /// Returns `true` when this was the last optimistic mutation in flight.
    fn close(mut self, failed: bool) -> bool {
        self.settle(failed)
    }

    fn settle(&mut self, failed: bool) -> bool {
        self.open = false;
        let mut state = lock(self.sync);
        state.generation += 1;
        state.optimistic_in_flight = state.optimistic_in_flight.saturating_sub(1);

        if failed {
            warn!(kind = ?self.kind, version = self.previous.version(), "Rolling back mutation");
            self.store.restore(Arc::clone(&self.previous));
        }

        state.optimistic_in_flight == 0
    }
}

impl Drop for OptimisticWindow<'_> {
    fn drop(&mut self) {
        if self.open {
            warn!(kind = ?self.kind, "Mutation abandoned before completion");
            self.settle(true);
        }
    }
}

// =============================================================================
// Task Cache
// =============================================================================

/// Client-side mirror of the task list with optimistic mutations.
#[derive(Debug)]
pub struct TaskCache<G> {
    gateway: G,
    store: TaskStore,
    sync: Mutex<SyncState>,
    busy: BusyFlags,
}

impl<G: TaskGateway> TaskCache<G> {
    /// Creates an empty cache in the loading state.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            store: TaskStore::new(),
            sync: Mutex::new(SyncState {
                generation: 0,
                optimistic_in_flight: 0,
                status: LoadStatus::Loading,
            }),
            busy: BusyFlags::default(),
        }
    }

    /// Returns the gateway the cache talks to.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Returns the current list snapshot.
    pub fn snapshot(&self) -> Arc<TaskSnapshot> {
        self.store.snapshot()
    }

    /// Returns the state to render.
    pub fn view(&self) -> CacheView {
        let sync = self.lock_sync();
        match &sync.status {
            LoadStatus::Loading => CacheView::Loading,
            LoadStatus::Failed(message) => CacheView::Failed(message.clone()),
            LoadStatus::Loaded => CacheView::Ready(self.store.snapshot().partition()),
        }
    }

    /// Returns `true` while a request of `kind` is outstanding.
    pub fn is_busy(&self, kind: MutationKind) -> bool {
        self.busy.is_busy(kind)
    }

    fn lock_sync(&self) -> MutexGuard<'_, SyncState> {
        lock(&self.sync)
    }

    // -------------------------------------------------------------------------
    // Refresh
    // -------------------------------------------------------------------------

    /// Puts the cache back into the loading state and fetches the list.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the list cannot be fetched.
    pub async fn load(&self) -> Result<RefreshOutcome, ServiceError> {
        self.lock_sync().status = LoadStatus::Loading;
        self.refresh().await
    }

    /// Fetches the list and publishes it unless an optimistic mutation began
    /// or finished in the meantime.
    ///
    /// On failure the cache enters the failed state and [`Self::view`]
    /// returns [`CacheView::Failed`].
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the list cannot be fetched and the result
    /// was not discarded.
    pub async fn refresh(&self) -> Result<RefreshOutcome, ServiceError> {
        let started_at = self.lock_sync().generation;

        let result = self.gateway.list().await;

        let mut sync = self.lock_sync();
        if sync.generation != started_at || sync.optimistic_in_flight > 0 {
            debug!(
                started_at,
                current = sync.generation,
                in_flight = sync.optimistic_in_flight,
                "Discarding stale task list"
            );
            return Ok(RefreshOutcome::Discarded);
        }

        match result {
            Ok(tasks) => {
                let snapshot = self.store.set(tasks);
                sync.status = LoadStatus::Loaded;
                debug!(
                    version = snapshot.version(),
                    tasks = snapshot.len(),
                    "Task list refreshed"
                );
                Ok(RefreshOutcome::Applied)
            }
            Err(error) => {
                warn!(%error, "Failed to refresh task list");
                sync.status = LoadStatus::Failed(error.message());
                Err(error)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Flips the completion flag of a cached task.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` without issuing a request if `id` is
    /// not cached, or the gateway error after rolling back.
    pub async fn toggle_complete(&self, id: TaskId) -> Result<Task, ServiceError> {
        let completed = self
            .store
            .snapshot()
            .get(id)
            .map(|task| !task.completed)
            .ok_or_else(|| ServiceError::task_not_found(id))?;

        let patch = TaskPatch::completion(completed);
        self.run_optimistic(
            MutationKind::Update,
            |snapshot| snapshot.update(id, &patch),
            || self.gateway.update(id, UpdateTaskRequest::completion(completed)),
        )
        .await
    }

    /// Edits a task.
    ///
    /// The edit is applied speculatively when the request passes local
    /// validation; otherwise the list is left as it is while the request
    /// runs.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after rolling back.
    pub async fn edit(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> Result<Task, ServiceError> {
        let patch = validate_update_request(&request).ok();
        self.run_optimistic(
            MutationKind::Update,
            |snapshot| match &patch {
                Some(patch) => snapshot.update(id, patch),
                None => snapshot.clone(),
            },
            || self.gateway.update(id, request),
        )
        .await
    }

    /// Deletes a task, removing it from the list right away.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after rolling back.
    pub async fn delete(&self, id: TaskId) -> Result<Task, ServiceError> {
        self.run_optimistic(
            MutationKind::Delete,
            |snapshot| snapshot.remove(id),
            || self.gateway.delete(id),
        )
        .await
    }

    /// Creates a task. Not speculative: the canonical record is prepended
    /// once the service returns it.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the list is not touched then.
    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task, ServiceError> {
        let result = {
            let _busy = self.busy.begin(MutationKind::Create);
            self.gateway.create(request).await
        };

        match result {
            Ok(task) => {
                let mut sync = self.lock_sync();
                sync.generation += 1;
                let snapshot = self.store.add(&task);
                info!(task_id = %task.id, version = snapshot.version(), "Task created");
                Ok(task)
            }
            Err(error) => {
                warn!(%error, "Task creation failed");
                Err(error)
            }
        }
    }

    async fn run_optimistic<T, F, Fut>(
        &self,
        kind: MutationKind,
        speculate: impl FnOnce(&TaskSnapshot) -> TaskSnapshot,
        request: F,
    ) -> Result<T, ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let (result, last_in_flight) = {
            let _busy = self.busy.begin(kind);
            let window = OptimisticWindow::open(&self.sync, &self.store, kind, speculate);
            let result = request().await;
            let last_in_flight = window.close(result.is_err());
            (result, last_in_flight)
        };

        if result.is_err() && !last_in_flight {
            debug!(?kind, "Mutation failed, refresh left to the mutation still in flight");
            return result;
        }

        match &result {
            Ok(_) => info!(?kind, "Mutation confirmed, refreshing task list"),
            Err(error) => info!(?kind, %error, "Mutation failed, refreshing task list"),
        }

        if let Err(error) = self.refresh().await {
            warn!(%error, "Refresh after mutation failed");
        }

        result
    }
}

// =============================================================================
// Tests
// =============================================================================
