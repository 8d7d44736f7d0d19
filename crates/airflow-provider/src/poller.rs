//! Asynchronous state poller.
//!
//! [`StatePoller`] repeatedly fetches the status of a remote operation until
//! it reaches a target status, the deadline passes, the operation
//! disappears, a fetch fails, or the caller cancels. It never retries a
//! failed fetch.

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, Result};
use crate::handle::RunHandle;

/// Default spacing between status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// A status label reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunStatus(String);

impl RunStatus {
    /// Create a status from any label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The raw label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunStatus {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for RunStatus {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// An ordered set of status labels.
pub type StatusSet = BTreeSet<RunStatus>;

/// Build a [`StatusSet`] from string labels.
pub fn status_set<I, S>(labels: I) -> StatusSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    labels.into_iter().map(|s| RunStatus(s.into())).collect()
}

/// Outcome of a single status fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusProbe {
    /// The operation exists and reports this status.
    Found(RunStatus),
    /// The operation no longer exists.
    NotFound,
}

/// How to treat a status that is in neither the pending nor the target set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownStatus {
    /// Stop immediately with [`ProviderError::UnexpectedStatus`].
    #[default]
    Fail,
    /// Keep polling as if the status were pending.
    Pending,
}

/// Classification of one observed status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Target,
    Pending,
    Unknown,
}

/// Polls a status source until a terminal condition.
#[derive(Debug, Clone)]
pub struct StatePoller {
    pending: StatusSet,
    target: StatusSet,
    interval: Duration,
    unknown: UnknownStatus,
}

impl StatePoller {
    /// Create a poller. Fails with `InvalidArgument` if `target` is empty,
    /// since such a poller could only ever time out.
    pub fn new(pending: StatusSet, target: StatusSet) -> Result<Self> {
        if target.is_empty() {
            return Err(ProviderError::InvalidArgument(
                "target status set must not be empty".to_string(),
            ));
        }
        Ok(Self {
            pending,
            target,
            interval: DEFAULT_POLL_INTERVAL,
            unknown: UnknownStatus::default(),
        })
    }

    /// Set the spacing between fetches.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the policy for statuses outside both sets.
    pub fn with_unknown_status(mut self, policy: UnknownStatus) -> Self {
        self.unknown = policy;
        self
    }

    /// Pending statuses.
    pub fn pending(&self) -> &StatusSet {
        &self.pending
    }

    /// Target statuses.
    pub fn target(&self) -> &StatusSet {
        &self.target
    }

    /// Spacing between fetches.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    // Target is checked first so a status listed in both sets succeeds.
    fn classify(&self, status: &RunStatus) -> Class {
        if self.target.contains(status) {
            Class::Target
        } else if self.pending.contains(status) {
            Class::Pending
        } else {
            Class::Unknown
        }
    }

    fn expected(&self) -> String {
        let labels: Vec<&str> = self.target.iter().map(RunStatus::as_str).collect();
        format!("[{}]", labels.join(", "))
    }

    /// Poll `fetch` until a target status is observed.
    ///
    /// The first fetch happens immediately; later fetches are spaced by the
    /// configured interval. Returns the target status on success. Every
    /// failure carries `handle` and the last status observed.
    pub async fn poll<F, Fut>(
        &self,
        handle: &RunHandle,
        deadline: Instant,
        cancel: &CancellationToken,
        mut fetch: F,
    ) -> Result<RunStatus>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<StatusProbe>>,
    {
        let started = Instant::now();
        let mut last_status: Option<RunStatus> = None;
        let mut tick: u32 = 0;

        loop {
            tick += 1;
            let probe = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.cancelled(handle, last_status));
                }
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(self.timed_out(handle, last_status, started));
                }
                probe = fetch() => probe,
            };

            let status = match probe {
                Ok(StatusProbe::Found(status)) => status,
                Ok(StatusProbe::NotFound) => {
                    warn!(%handle, tick, "run disappeared while waiting");
                    return Err(ProviderError::NotFound {
                        handle: handle.to_string(),
                        last_status,
                    });
                }
                Err(source) => {
                    return Err(ProviderError::Fetch {
                        handle: handle.to_string(),
                        last_status,
                        source: Box::new(source),
                    });
                }
            };

            match self.classify(&status) {
                Class::Target => {
                    info!(%handle, %status, tick, "run reached target state");
                    return Ok(status);
                }
                Class::Pending => {
                    debug!(%handle, %status, tick, "run pending");
                }
                Class::Unknown => match self.unknown {
                    UnknownStatus::Fail => {
                        warn!(%handle, %status, tick, "run reached unexpected state");
                        return Err(ProviderError::UnexpectedStatus {
                            handle: handle.to_string(),
                            status,
                            expected: self.expected(),
                        });
                    }
                    UnknownStatus::Pending => {
                        debug!(%handle, %status, tick, "unclassified state treated as pending");
                    }
                },
            }
            last_status = Some(status);

            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out(handle, last_status, started));
            }

            let wake = (now + self.interval).min(deadline);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.cancelled(handle, last_status));
                }
                _ = tokio::time::sleep_until(wake) => {}
            }

            if Instant::now() >= deadline {
                return Err(self.timed_out(handle, last_status, started));
            }
        }
    }

    fn cancelled(&self, handle: &RunHandle, last_status: Option<RunStatus>) -> ProviderError {
        info!(%handle, "wait cancelled");
        ProviderError::Cancelled {
            handle: handle.to_string(),
            last_status,
        }
    }

    fn timed_out(
        &self,
        handle: &RunHandle,
        last_status: Option<RunStatus>,
        started: Instant,
    ) -> ProviderError {
        let elapsed = started.elapsed();
        warn!(%handle, status = ?last_status, ?elapsed, "timed out waiting for run");
        ProviderError::Timeout {
            handle: handle.to_string(),
            last_status,
            elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    fn handle() -> RunHandle {
        RunHandle::encode("sales_etl", "run-1").unwrap()
    }

    fn poller() -> StatePoller {
        StatePoller::new(status_set(["queued", "running"]), status_set(["success"]))
            .unwrap()
            .with_interval(Duration::from_secs(1))
    }

    /// Fetcher replaying a fixed script; the last entry repeats forever.
    struct Script {
        steps: Mutex<VecDeque<Result<StatusProbe>>>,
        calls: AtomicUsize,
    }

    impl Script {
        fn new(steps: Vec<Result<StatusProbe>>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn statuses(labels: &[&str]) -> Arc<Self> {
            Self::new(
                labels
                    .iter()
                    .map(|l| Ok(StatusProbe::Found(RunStatus::from(*l))))
                    .collect(),
            )
        }

        fn next(&self) -> Result<StatusProbe> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut steps = self.steps.lock();
            if steps.len() > 1 {
                steps.pop_front().unwrap()
            } else {
                match steps.front().unwrap() {
                    Ok(probe) => Ok(probe.clone()),
                    Err(_) => steps.pop_front().unwrap(),
                }
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    async fn run(
        poller: &StatePoller,
        script: &Arc<Script>,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<RunStatus> {
        let deadline = Instant::now() + timeout;
        let script = script.clone();
        poller
            .poll(&handle(), deadline, cancel, move || {
                let script = script.clone();
                async move { script.next() }
            })
            .await
    }

    #[test]
    fn test_empty_target_rejected() {
        let err = StatePoller::new(status_set(["queued"]), StatusSet::new()).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidArgument(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaches_target() {
        let script = Script::statuses(&["queued", "running", "success"]);
        let status = run(
            &poller(),
            &script,
            Duration::from_secs(30),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(status.as_str(), "success");
        assert_eq!(script.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_target_stops_immediately() {
        let script = Script::statuses(&["success", "running"]);
        let started = Instant::now();
        let status = run(
            &poller(),
            &script,
            Duration::from_secs(30),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(status.as_str(), "success");
        assert_eq!(script.calls(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_target_wins_over_pending() {
        let poller = StatePoller::new(
            status_set(["queued", "running", "success"]),
            status_set(["success"]),
        )
        .unwrap();
        let script = Script::statuses(&["success"]);
        let status = run(&poller, &script, Duration::from_secs(30), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(status.as_str(), "success");
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_stops_without_further_fetches() {
        let script = Script::new(vec![
            Ok(StatusProbe::Found(RunStatus::from("queued"))),
            Ok(StatusProbe::NotFound),
            Ok(StatusProbe::Found(RunStatus::from("success"))),
        ]);
        let err = run(
            &poller(),
            &script,
            Duration::from_secs(30),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.last_status().map(RunStatus::as_str), Some("queued"));
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_while_pending() {
        let script = Script::statuses(&["queued", "running", "running"]);
        let err = run(
            &poller(),
            &script,
            Duration::from_millis(2500),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        match err {
            ProviderError::Timeout {
                handle,
                last_status,
                elapsed,
            } => {
                assert_eq!(handle, "sales_etl:run-1");
                assert_eq!(last_status, Some(RunStatus::from("running")));
                assert_eq!(elapsed, Duration::from_millis(2500));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(script.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_a_hanging_fetch() {
        let started = Instant::now();
        let err = poller()
            .poll(
                &handle(),
                started + Duration::from_secs(5),
                &CancellationToken::new(),
                || async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(StatusProbe::Found(RunStatus::from("success")))
                },
            )
            .await
            .unwrap_err();
        match err {
            ProviderError::Timeout {
                last_status,
                elapsed,
                ..
            } => {
                assert_eq!(last_status, None);
                assert_eq!(elapsed, Duration::from_secs(5));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert_eq!(started.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_keeps_last_status_when_later_fetch_hangs() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let counter = fetches.clone();
        let err = poller()
            .poll(
                &handle(),
                Instant::now() + Duration::from_secs(5),
                &CancellationToken::new(),
                move || {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n > 0 {
                            tokio::time::sleep(Duration::from_secs(60)).await;
                        }
                        Ok(StatusProbe::Found(RunStatus::from("running")))
                    }
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.last_status().map(RunStatus::as_str), Some("running"));
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_error_is_fatal() {
        let script = Script::new(vec![
            Ok(StatusProbe::Found(RunStatus::from("running"))),
            Err(ProviderError::InvalidArgument("boom".to_string())),
        ]);
        let err = run(
            &poller(),
            &script,
            Duration::from_secs(30),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        match &err {
            ProviderError::Fetch {
                last_status,
                source,
                ..
            } => {
                assert_eq!(last_status.as_ref().map(RunStatus::as_str), Some("running"));
                assert!(matches!(**source, ProviderError::InvalidArgument(_)));
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_fails_fast_by_default() {
        let script = Script::statuses(&["queued", "failed", "success"]);
        let err = run(
            &poller(),
            &script,
            Duration::from_secs(30),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProviderError::UnexpectedStatus { ref status, .. } if status.as_str() == "failed"));
        assert!(err.to_string().contains("[success]"));
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_status_as_pending() {
        let poller = poller().with_unknown_status(UnknownStatus::Pending);
        let script = Script::statuses(&["queued", "up_for_retry", "success"]);
        let status = run(&poller, &script, Duration::from_secs(30), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(status.as_str(), "success");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_deadline() {
        let script = Script::statuses(&["running"]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            trigger.cancel();
        });

        let err = run(&poller(), &script, Duration::from_secs(60), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled(), "expected cancellation, got {err:?}");
        assert!(!err.is_timeout());
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_skips_fetch() {
        let script = Script::statuses(&["running"]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = run(&poller(), &script, Duration::from_secs(60), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(script.calls(), 0);
    }
}
