use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;

/// Per-call cancellation and deadline
///
/// Cancelling the token aborts an in-flight call, including a stream that
/// is still being produced.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub cancellation: CancellationToken,
    pub timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Cancellation and absolute deadline for one call
#[derive(Debug, Clone)]
pub(crate) struct CallScope {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl CallScope {
    /// Start a scope now; `fallback_timeout` applies when the context sets none
    pub(crate) fn start(context: &RequestContext, fallback_timeout: Option<Duration>) -> Self {
        Self {
            cancellation: context.cancellation.clone(),
            deadline: context.timeout.or(fallback_timeout).map(|timeout| Instant::now() + timeout),
        }
    }

    /// Resolves once the call is cancelled or its deadline passes
    pub(crate) async fn interrupted(&self) -> LlmError {
        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => LlmError::Cancelled,
            () = expiry => LlmError::DeadlineExceeded,
        }
    }

    /// Run a future unless the scope is interrupted first
    pub(crate) async fn run<T, F>(&self, future: F) -> Result<T, LlmError>
    where
        F: Future<Output = Result<T, LlmError>>,
    {
        tokio::select! {
            biased;
            error = self.interrupted() => Err(error),
            result = future => result,
        }
    }
}
