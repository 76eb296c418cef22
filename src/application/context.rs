use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::application::ports::document_store::StoreError;

/// Cancellation scope and optional deadline carried by every repository call.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tighten the deadline to `timeout` from now. An earlier deadline wins.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, at: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < at => existing,
            _ => at,
        });
        self
    }

    /// Scope cancelled together with `self`, but cancellable on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn check(&self) -> Result<(), StoreError> {
        if self.token.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        match self.deadline {
            Some(at) if Instant::now() >= at => Err(StoreError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `fut` until it finishes or this context is done, whichever
    /// comes first. `fut` is dropped unfinished on cancellation.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        self.check()?;
        let expired = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(StoreError::Cancelled),
            _ = expired => Err(StoreError::DeadlineExceeded),
            res = fut => res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancelled_context_skips_work() {
        let ctx = RequestContext::new();
        ctx.cancel();
        let res = ctx.run(async { Ok::<_, StoreError>(1) }).await;
        assert_eq!(res, Err(StoreError::Cancelled));
    }

    #[tokio::test]
    async fn child_follows_parent_cancellation() {
        let parent = RequestContext::new();
        let child = parent.child();
        parent.cancel();
        assert_eq!(child.check(), Err(StoreError::Cancelled));

        let other = RequestContext::new();
        let other_child = other.child();
        other_child.cancel();
        assert!(other.check().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_interrupts_pending_future() {
        let ctx = RequestContext::new().with_timeout(Duration::from_millis(50));
        let res = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, StoreError>(())
            })
            .await;
        assert_eq!(res, Err(StoreError::DeadlineExceeded));
    }

    #[test]
    fn earlier_deadline_is_kept() {
        let now = Instant::now();
        let ctx = RequestContext::new()
            .with_deadline(now + Duration::from_secs(1))
            .with_deadline(now + Duration::from_secs(5));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(1)));
    }
}
