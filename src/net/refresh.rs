//! Single-flight refresh gate.
//!
//! DESIGN
//! ======
//! Two states, `Idle` and `Refreshing`, plus a FIFO queue of parked
//! continuations. The first caller to observe `Idle` becomes the leader and
//! owns the refresh; everyone arriving while `Refreshing` parks a oneshot
//! and waits. Settling flips back to `Idle` and drains the queue under the
//! same lock, so a new cycle always starts with an empty queue.
//!
//! The gate knows nothing about HTTP. `HttpClient` decides what a refresh
//! is; the gate only decides who performs it and who waits.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

/// Outcome delivered to parked followers. The error is the leader's
/// failure message.
pub type RefreshOutcome = Result<(), String>;

const ABANDONED: &str = "refresh abandoned before completion";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

struct GateInner {
    state: RefreshState,
    pending: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

pub struct RefreshGate {
    inner: Mutex<GateInner>,
}

/// Result of asking the gate for admission.
pub enum Admission<'a> {
    /// Caller must perform the refresh and settle the guard.
    Leader(LeaderGuard<'a>),
    /// A refresh is already running; await the outcome.
    Follower(Follower),
}

impl Default for RefreshGate {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshGate {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Mutex::new(GateInner { state: RefreshState::Idle, pending: VecDeque::new() }) }
    }

    fn lock(&self) -> MutexGuard<'_, GateInner> {
        // The critical sections never panic mid-update, so a poisoned lock
        // still holds a consistent state.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> RefreshState {
        self.lock().state
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Enter the gate as leader (state was `Idle`) or follower.
    pub fn admit(&self) -> Admission<'_> {
        let mut inner = self.lock();
        match inner.state {
            RefreshState::Idle => {
                inner.state = RefreshState::Refreshing;
                Admission::Leader(LeaderGuard { gate: self, settled: false })
            }
            RefreshState::Refreshing => {
                let (tx, rx) = oneshot::channel();
                inner.pending.push_back(tx);
                Admission::Follower(Follower { rx })
            }
        }
    }

    /// Return to `Idle` and resolve every parked follower. Returns how many
    /// followers were resolved.
    fn settle(&self, outcome: &RefreshOutcome) -> usize {
        let drained: Vec<_> = {
            let mut inner = self.lock();
            inner.state = RefreshState::Idle;
            inner.pending.drain(..).collect()
        };
        let count = drained.len();
        for tx in drained {
            // A follower that stopped waiting has nothing left to resolve.
            let _ = tx.send(outcome.clone());
        }
        count
    }
}

/// Held by the refresh leader. Dropping it unsettled fails all followers.
pub struct LeaderGuard<'a> {
    gate: &'a RefreshGate,
    settled: bool,
}

impl LeaderGuard<'_> {
    /// Publish the refresh outcome. Returns how many followers were resolved.
    pub fn settle(mut self, outcome: RefreshOutcome) -> usize {
        self.settled = true;
        self.gate.settle(&outcome)
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("refresh leader dropped without settling; failing parked requests");
            self.gate.settle(&Err(ABANDONED.to_owned()));
        }
    }
}

/// A parked continuation waiting on the leader's outcome.
pub struct Follower {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl Follower {
    /// Wait for the in-flight refresh to settle.
    ///
    /// # Errors
    ///
    /// Returns the leader's failure message, or an abandonment message if
    /// the gate was dropped.
    pub async fn wait(self) -> RefreshOutcome {
        self.rx.await.unwrap_or_else(|_| Err(ABANDONED.to_owned()))
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
