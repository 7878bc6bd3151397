//! Deferred response handles
//!
//! A [`ResponseHandle`] wraps one HTTP exchange that has already been
//! started on the tokio runtime. Cloning the handle is cheap and every clone
//! resolves to the same [`Exchange`], so a setup hook can issue a request and
//! any number of expectations can await it later.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::Arc;

use super::todo::{ClientError, ClientResult};
use super::types::TodoResponse;

/// Outcome of a single exchange. The error is shared between all clones.
pub type Exchange = Result<TodoResponse, Arc<ClientError>>;

/// Handle to an in-flight or finished HTTP exchange
#[derive(Clone)]
pub struct ResponseHandle {
    inner: Shared<BoxFuture<'static, Exchange>>,
}

impl ResponseHandle {
    /// Start `exchange` in the background and return a handle to its result
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(exchange: F) -> Self
    where
        F: Future<Output = ClientResult<TodoResponse>> + Send + 'static,
    {
        Self::from_task(async move { exchange.await.map_err(Arc::new) })
    }

    /// A handle that is already resolved
    pub fn ready(result: ClientResult<TodoResponse>) -> Self {
        let inner = futures::future::ready(result.map_err(Arc::new))
            .boxed()
            .shared();
        // `Shared::peek` only sees the value once some clone has polled it
        let _ = inner.clone().now_or_never();
        Self { inner }
    }

    /// Chain a dependent exchange: once this one resolves successfully, `next`
    /// builds the follow-up request from its response. A rejection here
    /// short-circuits and is passed through unchanged.
    pub fn and_then<F>(&self, next: F) -> Self
    where
        F: FnOnce(TodoResponse) -> ResponseHandle + Send + 'static,
    {
        let first = self.inner.clone();
        Self::from_task(async move {
            let response = first.await?;
            next(response).resolve().await
        })
    }

    /// Wait for the exchange to finish
    pub async fn resolve(&self) -> Exchange {
        self.inner.clone().await
    }

    /// Whether the exchange has already finished
    pub fn is_resolved(&self) -> bool {
        self.inner.peek().is_some()
    }

    fn from_task<F>(task: F) -> Self
    where
        F: Future<Output = Exchange> + Send + 'static,
    {
        let join = tokio::spawn(task);
        let inner = async move {
            join.await
                .unwrap_or_else(|e| Err(Arc::new(ClientError::Aborted(e.to_string()))))
        }
        .boxed()
        .shared();

        Self { inner }
    }
}

impl std::fmt::Debug for ResponseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseHandle")
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
