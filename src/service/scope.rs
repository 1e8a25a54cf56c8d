use crate::error::app_error::AppError;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Lifetime of one screen. Calls started through [`ScreenScope::run`] are
/// abandoned when the scope is cancelled or dropped, and their results are
/// discarded.
#[derive(Debug)]
pub struct ScreenScope {
    name: &'static str,
    token: CancellationToken,
}

impl ScreenScope {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            token: CancellationToken::new(),
        }
    }

    /// Handle that can tear the screen down from elsewhere, e.g. a signal handler.
    pub fn handle(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub async fn run<F, T>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        if self.token.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!(screen = self.name, "in-flight call abandoned");
                Err(AppError::Cancelled)
            }
            result = fut => result,
        }
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
