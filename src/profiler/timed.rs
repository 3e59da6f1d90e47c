use crate::clock::Clock;
use crate::crawler::{PageParser, ParsedPage};
use crate::profiler::ledger::ProfilingState;
use crate::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;

/// Declares which operations of a capability type the profiler times
///
/// Names are matched against the `operation` passed to [`Timed::time`] and
/// [`Timed::time_async`]. A type with an empty list cannot be wrapped.
pub trait TimedOperations {
    const TIMED_OPERATIONS: &'static [&'static str];

    fn is_timed(operation: &str) -> bool {
        Self::TIMED_OPERATIONS.iter().any(|op| *op == operation)
    }
}

/// A capability wrapped by a [`Profiler`](crate::profiler::Profiler)
///
/// Calls routed through [`time`](Self::time) or [`time_async`](Self::time_async)
/// add their wall time to the profiler's ledger, whether they succeed, fail,
/// or unwind.
pub struct Timed<T> {
    inner: T,
    clock: Arc<dyn Clock>,
    state: Arc<ProfilingState>,
}

impl<T: TimedOperations> Timed<T> {
    pub(crate) fn new(inner: T, clock: Arc<dyn Clock>, state: Arc<ProfilingState>) -> Self {
        Self {
            inner,
            clock,
            state,
        }
    }

    /// The wrapped value
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Unwraps the value, leaving the ledger untouched
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Runs `f` against the wrapped value, timing it if `operation` is declared
    pub fn time<R>(&self, operation: &'static str, f: impl FnOnce(&T) -> R) -> R {
        let _stopwatch = self.stopwatch(operation);
        f(&self.inner)
    }

    /// Awaits `future`, timing it if `operation` is declared
    pub async fn time_async<F: Future>(&self, operation: &'static str, future: F) -> F::Output {
        let _stopwatch = self.stopwatch(operation);
        future.await
    }

    fn stopwatch(&self, operation: &'static str) -> Option<Stopwatch<'_>> {
        T::is_timed(operation).then(|| Stopwatch {
            key: format!("{}#{}", std::any::type_name::<T>(), operation),
            started: self.clock.now(),
            clock: self.clock.as_ref(),
            state: &self.state,
        })
    }
}

/// Records the time between its creation and its drop
struct Stopwatch<'a> {
    key: String,
    started: DateTime<Utc>,
    clock: &'a dyn Clock,
    state: &'a ProfilingState,
}

impl Drop for Stopwatch<'_> {
    fn drop(&mut self) {
        let elapsed = (self.clock.now() - self.started)
            .to_std()
            .unwrap_or_default();
        self.state.record(std::mem::take(&mut self.key), elapsed);
    }
}

#[async_trait]
impl<P> PageParser for Timed<P>
where
    P: PageParser + TimedOperations,
{
    async fn parse(&self, url: &str) -> Result<ParsedPage, FetchError> {
        self.time_async("parse", self.inner.parse(url)).await
    }
}
