//! Readiness gate: poll collection status until everything is indexed.
//!
//! The wait is always bounded; exhausting the budget is a first-class
//! timeout error, never a hang.

use std::time::Duration;

use tracing::{debug, info};

use crate::errors::IngestError;
use crate::store::{IndexHealth, VectorIndex};

/// Poll the collection at `poll_interval` until it reports ready, for at
/// most `timeout` of cumulative waiting. Returns the number of polls made.
///
/// # Errors
/// - `IngestError::ReadinessTimeout` when the budget is exhausted
/// - any store error from the status read, unchanged
pub async fn await_ready(
    index: &dyn VectorIndex,
    poll_interval: Duration,
    timeout: Duration,
) -> Result<u32, IngestError> {
    let started = tokio::time::Instant::now();
    let mut polls: u32 = 0;

    loop {
        polls += 1;
        if index.health().await? == IndexHealth::Ready {
            info!(polls, "collection ready");
            return Ok(polls);
        }

        let waited = started.elapsed();
        if waited >= timeout {
            return Err(IngestError::ReadinessTimeout {
                waited_secs: waited.as_secs(),
            });
        }

        debug!(polls, waited_ms = waited.as_millis(), "collection not ready yet");
        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fakes::FakeIndex;
    use std::sync::atomic::Ordering;

    #[tokio::test(start_paused = true)]
    async fn returns_once_status_goes_green() {
        // Ready on the fourth status read: three poll intervals elapse.
        let index = FakeIndex::ready_after(3);

        let polls = await_ready(&index, Duration::from_secs(1), Duration::from_secs(5))
            .await
            .unwrap();

        assert!((3..=5).contains(&polls), "polled {polls} times");
        assert_eq!(index.health_calls.load(Ordering::SeqCst), polls);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_green_needs_one_poll() {
        let index = FakeIndex::ready_after(0);
        let polls = await_ready(&index, Duration::from_secs(1), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(polls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_is_a_timeout_error() {
        let index = FakeIndex::ready_after(u32::MAX);

        let err = await_ready(&index, Duration::from_secs(1), Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            IngestError::ReadinessTimeout { waited_secs } => assert_eq!(waited_secs, 5),
            other => panic!("expected ReadinessTimeout, got {other:?}"),
        }
    }
}
