//! Request pacing policies.
//!
//! The crawler brackets every battle-log request with [`Pacer::acquire`] and
//! [`Pacer::release`]. Swapping the policy (e.g. for a token bucket) does not
//! touch orchestration.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Scheduling policy for upstream requests.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Waits until the next request may start.
    async fn acquire(&self);

    /// Records that a request attempt finished (successfully or not).
    fn release(&self);
}

/// Global minimum-interval gate.
///
/// Consecutive request starts are at least `interval` apart, and no request
/// starts until `interval` has passed since the most recent completion. The
/// gate is shared by every in-flight request, so concurrent workers still
/// respect one budget.
#[derive(Debug)]
pub struct MinIntervalGate {
    interval: Duration,
    next_start: Mutex<Option<Instant>>,
}

impl MinIntervalGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_start: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl Pacer for MinIntervalGate {
    async fn acquire(&self) {
        // A release landing while we sleep moves the slot, so re-check on wake.
        loop {
            let slot = {
                let mut next = self.next_start.lock().unwrap_or_else(PoisonError::into_inner);
                let now = Instant::now();
                let slot = next.map_or(now, |n| n.max(now));
                if slot <= now {
                    *next = Some(now + self.interval);
                    return;
                }
                slot
            };
            tokio::time::sleep_until(slot).await;
        }
    }

    fn release(&self) {
        let mut next = self.next_start.lock().unwrap_or_else(PoisonError::into_inner);
        let earliest = Instant::now() + self.interval;
        *next = Some(next.map_or(earliest, |n| n.max(earliest)));
    }
}

/// No pacing at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    async fn acquire(&self) {}

    fn release(&self) {}
}
