//! Issue queries ahead of the code that consumes them.
//!
//! Two ways of loading are supported:
//!
//! - [`preload`] starts the query straight away and hands back a [`PreloadHandle`] that readers
//!   poll. Readers decide what to do while the handle is still pending.
//! - [`fetch_on_mount`] starts the query for a single consumer and delivers the result to it unless
//!   the consumer was torn down first.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::query::{self, Query};
use crate::{Error, Transport, Variables};

/// The state of a query that may not have finished yet.
#[derive(Debug)]
pub enum LoadState<T> {
    /// The query is still in flight.
    Pending,
    /// The query finished and this is its payload.
    Ready(Arc<T>),
    /// The query failed.
    Failed(Arc<Error>),
}

// Derive would require `T: Clone`.
impl<T> Clone for LoadState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Ready(value) => Self::Ready(Arc::clone(value)),
            Self::Failed(error) => Self::Failed(Arc::clone(error)),
        }
    }
}

impl<T> LoadState<T> {
    /// Whether the query is still in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// A handle to a query issued by [`preload`].
///
/// Clones share the same underlying query. The handle moves from pending to either ready or failed
/// exactly once and never changes afterwards.
#[derive(Debug)]
pub struct PreloadHandle<T> {
    state: watch::Receiver<LoadState<T>>,
}

impl<T> Clone for PreloadHandle<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> PreloadHandle<T> {
    /// Read the current state without waiting.
    #[must_use]
    pub fn poll(&self) -> LoadState<T> {
        self.state.borrow().clone()
    }

    /// Whether the query is still in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Wait for the query to finish.
    pub async fn wait(&self) -> Result<Arc<T>, Arc<Error>> {
        let mut state = self.state.clone();
        let Ok(finished) = state.wait_for(|state| !state.is_pending()).await else {
            // The task went away without reporting a result.
            return Err(Arc::new(Error::Cancelled));
        };
        match &*finished {
            LoadState::Ready(value) => Ok(Arc::clone(value)),
            LoadState::Failed(error) => Err(Arc::clone(error)),
            LoadState::Pending => unreachable!("wait_for only returns finished states"),
        }
    }
}

/// Issue a query right away.
///
/// Exactly one request is sent per call, use [`crate::QueryCache`] to share handles between
/// identical queries.
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
pub fn preload<Q, T>(transport: Arc<T>, variables: Variables) -> PreloadHandle<Q::Response>
where
    Q: Query,
    T: Transport + Send + Sync + 'static,
{
    let (sender, receiver) = watch::channel(LoadState::Pending);
    tokio::spawn(async move {
        let state = match query::execute::<Q, T>(transport.as_ref(), &variables).await {
            Ok(response) => LoadState::Ready(Arc::new(response)),
            Err(e) => {
                tracing::warn!("Preloading {} failed: {e}", Q::OPERATION_NAME);
                LoadState::Failed(Arc::new(e))
            }
        };
        sender.send_replace(state);
    });
    PreloadHandle { state: receiver }
}

/// Issue a query on behalf of a consumer that has just become active.
///
/// `on_loaded` is called with the response unless the returned token was cancelled before the
/// response arrived. Cancelling does not abort the request. Failures are logged and `on_loaded` is
/// never called, either way it is dropped once the request has finished.
///
/// On a multi-threaded runtime the token can still be cancelled while `on_loaded` runs. `on_loaded`
/// is handed the token so a consumer can re-check it under the same lock its teardown takes.
///
/// # Panics
///
/// Panics if called outside of a Tokio runtime.
pub fn fetch_on_mount<Q, T, F>(
    transport: Arc<T>,
    variables: Variables,
    on_loaded: F,
) -> CancellationToken
where
    Q: Query,
    T: Transport + Send + Sync + 'static,
    F: FnOnce(Q::Response, &CancellationToken) + Send + 'static,
{
    let token = CancellationToken::new();
    let teardown = token.clone();
    tokio::spawn(async move {
        match query::execute::<Q, T>(transport.as_ref(), &variables).await {
            Ok(response) => {
                if teardown.is_cancelled() {
                    tracing::debug!("Discarding {} response after teardown", Q::OPERATION_NAME);
                    return;
                }
                on_loaded(response, &teardown);
            }
            Err(e) => {
                tracing::error!("Fetching {} failed: {e}", Q::OPERATION_NAME);
            }
        }
    });
    token
}
