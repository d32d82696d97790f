//! Structured cancellation for fetch cycles
//!
//! Every cycle triggered by a reactive input (query text, category, token)
//! runs inside its own [`CancelScope`]. A [`ScopeSlot`] holds the live scope
//! of one input and cancels it before handing out the next, so a stale
//! cycle can never write to view state after a newer one has started.

use std::future::Future;
use std::sync::Mutex;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

/// A cancellable scope; cancelling it cancels every child scope
#[derive(Debug, Clone)]
pub struct CancelScope {
    id: Uuid,
    token: CancellationToken,
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::root()
    }
}

impl CancelScope {
    pub fn root() -> Self {
        Self {
            id: Uuid::new_v4(),
            token: CancellationToken::new(),
        }
    }

    pub fn child(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            token: self.token.child_token(),
        }
    }

    /// Correlation id for logs
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Runs `fut` until it resolves or the scope is cancelled.
    ///
    /// On cancellation the future is dropped, which aborts any in-flight
    /// request it owns. A result that lands after cancellation is discarded.
    pub async fn run<F, T>(&self, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ClientError::Cancelled),
            result = fut => {
                if self.token.is_cancelled() {
                    Err(ClientError::Cancelled)
                } else {
                    result
                }
            }
        }
    }

    /// Replaces the view state unless this scope has been cancelled.
    ///
    /// The check runs under the channel's write lock, so once a newer cycle
    /// has published anything, this scope can no longer overwrite it.
    pub fn publish<T>(&self, view: &watch::Sender<T>, value: T) -> bool {
        view.send_if_modified(|current| {
            if self.token.is_cancelled() {
                false
            } else {
                *current = value;
                true
            }
        })
    }
}

/// Holds the single live scope for one reactive input
#[derive(Debug)]
pub struct ScopeSlot {
    parent: CancelScope,
    live: Mutex<Option<CancelScope>>,
}

impl ScopeSlot {
    pub fn new(parent: &CancelScope) -> Self {
        Self {
            parent: parent.clone(),
            live: Mutex::new(None),
        }
    }

    /// Cancels the live scope, then returns a fresh one in its place
    pub fn renew(&self) -> CancelScope {
        let next = self.parent.child();
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = live.replace(next.clone()) {
            previous.cancel();
            tracing::debug!(previous = %previous.id(), next = %next.id(), "Superseded cycle scope");
        }
        next
    }

    /// Cancels the live scope without starting another
    pub fn cancel(&self) {
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = live.take() {
            previous.cancel();
        }
    }
}

/// A spawned cycle and the scope that cancels it
#[derive(Debug)]
pub struct TaskHandle {
    scope: CancelScope,
    join: Option<JoinHandle<()>>,
}

impl TaskHandle {
    pub fn spawn<F>(scope: CancelScope, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            scope,
            join: Some(tokio::spawn(fut)),
        }
    }

    /// A cycle that finished synchronously and never spawned
    pub fn completed(scope: CancelScope) -> Self {
        Self { scope, join: None }
    }

    pub fn scope(&self) -> &CancelScope {
        &self.scope
    }

    pub fn cancel(&self) {
        self.scope.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().map(|j| j.is_finished()).unwrap_or(true)
    }

    /// Waits for the cycle to finish or observe its cancellation
    pub async fn finished(self) {
        if let Some(join) = self.join {
            if let Err(e) = join.await {
                tracing::error!(error = %e, scope = %self.scope.id(), "Cycle task failed");
            }
        }
    }
}
