//! Retry decorator for unary calls.
//!
//! The stack is `MapRequest -> Retry -> Timeout -> inner`: every attempt gets
//! its own timeout, and the retry policy sees the timeout as just another
//! failure. A caller-side deadline wraps the whole stack, so the two bounds
//! compose without knowing about each other.

use std::{future::Future, pin::Pin, time::Duration};

use rand::Rng;
use tonic::{Code, Status};
use tower::{
    retry::Policy, timeout::error::Elapsed, util::BoxCloneService, BoxError, Service,
    ServiceBuilder,
};
use tracing::debug;

/// A request together with its zero-based attempt number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attempted<T> {
    pub attempt: u32,
    pub message: T,
}

impl<T> Attempted<T> {
    pub fn first(message: T) -> Self {
        Self { attempt: 0, message }
    }
}

impl<T: Clone> Attempted<T> {
    fn next(&self) -> Self {
        Self {
            attempt: self.attempt.saturating_add(1),
            message: self.message.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryOptions {
    /// total attempts, including the first one
    pub max_attempts: u32,
    pub per_attempt_timeout: Duration,
    pub backoff: Duration,
    /// fraction of `backoff` added or removed at random
    pub jitter: f64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            per_attempt_timeout: Duration::from_secs(5),
            backoff: Duration::from_millis(50),
            jitter: 0.10,
        }
    }
}

impl RetryOptions {
    fn backoff_with_jitter(&self) -> Duration {
        if self.jitter <= 0.0 {
            return self.backoff;
        }
        let factor = 1.0 + rand::thread_rng().gen_range(-self.jitter..=self.jitter);
        self.backoff.mul_f64(factor.max(0.0))
    }
}

/// Per-attempt timeouts, `Unavailable` and `ResourceExhausted` are worth
/// another try. Everything else is final.
pub fn is_retryable(err: &BoxError) -> bool {
    if err.is::<Elapsed>() {
        return true;
    }
    match err.downcast_ref::<Status>() {
        Some(status) => matches!(status.code(), Code::Unavailable | Code::ResourceExhausted),
        None => false,
    }
}

/// Turn whatever came out of the stack into a gRPC status.
pub fn into_status(err: BoxError) -> Status {
    if err.is::<Elapsed>() {
        return Status::deadline_exceeded("attempt timed out");
    }
    match err.downcast::<Status>() {
        Ok(status) => *status,
        Err(err) => Status::unknown(err.to_string()),
    }
}

#[derive(Clone, Debug)]
pub struct AttemptPolicy {
    options: RetryOptions,
    // attempts already made
    attempts: u32,
}

impl AttemptPolicy {
    pub fn new(options: RetryOptions) -> Self {
        Self {
            options,
            attempts: 1,
        }
    }
}

impl<Req: Clone, Res> Policy<Attempted<Req>, Res, BoxError> for AttemptPolicy {
    type Future = Pin<Box<dyn Future<Output = Self> + Send>>;

    fn retry(
        &self,
        req: &Attempted<Req>,
        result: Result<&Res, &BoxError>,
    ) -> Option<Self::Future> {
        let err = result.err()?;
        if self.attempts >= self.options.max_attempts || !is_retryable(err) {
            return None;
        }

        let wait = self.options.backoff_with_jitter();
        debug!(attempt = req.attempt, ?wait, "retrying after: {}", err);
        let next = Self {
            options: self.options,
            attempts: self.attempts + 1,
        };
        Some(Box::pin(async move {
            tokio::time::sleep(wait).await;
            next
        }))
    }

    fn clone_request(&self, req: &Attempted<Req>) -> Option<Attempted<Req>> {
        Some(req.next())
    }
}

/// Wrap `inner` so each call is tried up to `max_attempts` times, every
/// attempt bounded by `per_attempt_timeout`.
pub fn with_retry<S, Req, Res>(
    inner: S,
    options: RetryOptions,
) -> BoxCloneService<Req, Res, BoxError>
where
    S: Service<Attempted<Req>, Response = Res> + Clone + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    Req: Clone + Send + 'static,
    Res: Send + 'static,
{
    let service = ServiceBuilder::new()
        .map_request(Attempted::<Req>::first)
        .retry(AttemptPolicy::new(options))
        .timeout(options.per_attempt_timeout)
        .service(inner);
    BoxCloneService::new(service)
}
