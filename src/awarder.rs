//! Coin-to-currency awarding
//!
//! Bridges the simulation's lifetime coin counter to the backend's cash
//! endpoint, which only supports increment-by-one calls. Rapid pickups are
//! debounced into batches, but each batch still issues one unit call per
//! coin. A checkpoint of the last observed total guarantees nothing is
//! awarded twice, and only one batch is ever in flight at a time.
//!
//! Deadlines are plain host-clock timestamps checked from `poll`, not hidden
//! timers, so dropping the awarder is a complete teardown - no award can
//! fire after the owner is gone.

use std::fmt;

use crate::consts::AWARD_DEBOUNCE_SECS;

/// Destination for unit currency increments. The browser host forwards each
/// call to the backend; the native demo and tests just record them.
pub trait CashSink {
    /// Issue a single increment-by-one request
    fn award_one(&mut self);
}

/// Advisory failure from the external award call
///
/// Gameplay never blocks on this; the host surfaces it out-of-band and the
/// next batch proceeds normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardError(String);

impl AwardError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for AwardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cash award failed: {}", self.0)
    }
}

impl std::error::Error for AwardError {}

/// Debounced, checkpointed bridge from coin pickups to award calls
#[derive(Debug)]
pub struct CoinAwarder<S> {
    sink: S,
    /// Last lifetime total already taken on board (the checkpoint)
    seen: u32,
    /// Coins waiting for the next batch
    pending: u32,
    /// Host-clock second the current debounce window closes
    deadline: Option<f64>,
    /// A batch has been issued and not yet settled
    in_flight: bool,
    last_error: Option<AwardError>,
}

impl<S: CashSink> CoinAwarder<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            seen: 0,
            pending: 0,
            deadline: None,
            in_flight: false,
            last_error: None,
        }
    }

    /// Note the latest lifetime coin total
    ///
    /// New coins extend the debounce window; totals at or below the
    /// checkpoint are ignored, so re-observing the same value is free.
    pub fn observe(&mut self, coins_lifetime: u32, now: f64) {
        let fresh = coins_lifetime.saturating_sub(self.seen);
        if fresh == 0 {
            return;
        }
        self.seen = coins_lifetime;
        self.pending += fresh;
        self.deadline = Some(now + AWARD_DEBOUNCE_SECS);
    }

    /// Fire the pending batch if the debounce window has closed
    ///
    /// One unit call per pending coin. A second batch never starts while one
    /// is in flight; the host reports completion via
    /// [`CoinAwarder::on_batch_settled`].
    pub fn poll(&mut self, now: f64) {
        if self.in_flight {
            return;
        }
        let Some(deadline) = self.deadline else {
            return;
        };
        if now < deadline {
            return;
        }
        self.deadline = None;

        let batch = std::mem::take(&mut self.pending);
        if batch == 0 {
            return;
        }
        self.in_flight = true;
        log::info!("awarding {} coin(s)", batch);
        for _ in 0..batch {
            self.sink.award_one();
        }
    }

    /// Report the outcome of the batch issued by the last `poll`
    ///
    /// Failure is recorded as an advisory only. Coins picked up while the
    /// batch was in flight re-arm the debounce window.
    pub fn on_batch_settled(&mut self, result: Result<(), AwardError>, now: f64) {
        self.in_flight = false;
        if let Err(err) = result {
            log::warn!("{err}");
            self.last_error = Some(err);
        }
        if self.pending > 0 && self.deadline.is_none() {
            self.deadline = Some(now + AWARD_DEBOUNCE_SECS);
        }
    }

    /// Take the most recent award failure for display
    pub fn take_error(&mut self) -> Option<AwardError> {
        self.last_error.take()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Coins observed but not yet turned into calls
    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        calls: u32,
    }

    impl CashSink for RecordingSink {
        fn award_one(&mut self) {
            self.calls += 1;
        }
    }

    #[test]
    fn test_three_pickups_become_three_unit_calls() {
        let mut awarder = CoinAwarder::new(RecordingSink::default());

        awarder.observe(1, 0.00);
        awarder.observe(2, 0.05);
        awarder.observe(3, 0.10);

        // Still inside the debounce window
        awarder.poll(0.10 + AWARD_DEBOUNCE_SECS - 0.01);
        assert_eq!(awarder.sink_mut().calls, 0);

        awarder.poll(0.10 + AWARD_DEBOUNCE_SECS);
        assert_eq!(awarder.sink_mut().calls, 3);
        assert!(awarder.is_in_flight());
    }

    #[test]
    fn test_checkpoint_prevents_double_award() {
        let mut awarder = CoinAwarder::new(RecordingSink::default());

        awarder.observe(2, 0.0);
        awarder.poll(1.0);
        awarder.on_batch_settled(Ok(()), 1.0);

        // The same total observed again must not re-arm anything
        awarder.observe(2, 2.0);
        awarder.poll(3.0);
        assert_eq!(awarder.sink_mut().calls, 2);

        // A later increase awards exactly the delta
        awarder.observe(5, 4.0);
        awarder.poll(5.0);
        assert_eq!(awarder.sink_mut().calls, 5);
    }

    #[test]
    fn test_coins_during_flight_queue_for_next_batch() {
        let mut awarder = CoinAwarder::new(RecordingSink::default());

        awarder.observe(1, 0.0);
        awarder.poll(1.0);
        assert_eq!(awarder.sink_mut().calls, 1);

        // Batch still in flight; new coins must wait
        awarder.observe(3, 1.1);
        awarder.poll(10.0);
        assert_eq!(awarder.sink_mut().calls, 1);

        awarder.on_batch_settled(Ok(()), 10.0);
        awarder.poll(10.0 + AWARD_DEBOUNCE_SECS);
        assert_eq!(awarder.sink_mut().calls, 3);
    }

    #[test]
    fn test_failure_is_advisory_and_does_not_block() {
        let mut awarder = CoinAwarder::new(RecordingSink::default());

        awarder.observe(1, 0.0);
        awarder.poll(1.0);
        awarder.on_batch_settled(Err(AwardError::new("offline")), 1.0);

        assert!(awarder.take_error().is_some());
        assert!(awarder.take_error().is_none());

        // The next batch goes out normally
        awarder.observe(2, 2.0);
        awarder.poll(3.0);
        assert_eq!(awarder.sink_mut().calls, 2);
    }

    #[test]
    fn test_no_calls_without_new_coins() {
        let mut awarder = CoinAwarder::new(RecordingSink::default());
        awarder.observe(0, 0.0);
        awarder.poll(10.0);
        assert_eq!(awarder.sink_mut().calls, 0);
        assert!(!awarder.is_in_flight());
    }
}
