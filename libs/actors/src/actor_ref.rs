//! Actor Reference Boundary
//!
//! The directory never runs actors. It records handles implementing
//! [`ActorRef`] and forwards `tell` and `stop` calls to them. Anything that
//! can deliver a message and honour a stop request can be tracked.
//!
//! Stop completion is observed through [`StopFuture`], a single-value
//! completion slot fed by a [`StopPromise`] held by whoever performs the
//! actual shutdown.

use crate::class::ActorClass;
use crate::error::{ActorError, Result};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a stop request
///
/// `Ok(true)` if this request stopped the actor, `Ok(false)` if the actor was
/// already dead, `Err` if waiting for the outcome failed.
pub type StopOutcome = Result<bool>;

/// Handle to a running actor
pub trait ActorRef<M>: Send + Sync + fmt::Display {
    /// Process-unique identifier, fixed for the lifetime of the reference
    fn urn(&self) -> &str;

    /// Type tag of the actor behind this reference
    fn actor_class(&self) -> &'static ActorClass;

    /// Best-effort liveness check
    fn is_alive(&self) -> bool;

    /// Fire-and-forget delivery. Must not block the caller.
    fn tell(&self, message: M) -> Result<()>;

    /// Request termination.
    ///
    /// With `block` set, waits up to `timeout` and returns
    /// [`StopSignal::Completed`]. Otherwise returns [`StopSignal::Pending`]
    /// right after the request has been issued.
    fn stop(&self, block: bool, timeout: Option<Duration>) -> StopSignal;
}

/// What a stop request hands back to its caller
#[derive(Debug)]
pub enum StopSignal {
    /// The stop was waited for
    Completed(StopOutcome),
    /// The stop was issued; completion is observed later
    Pending(StopFuture),
}

impl StopSignal {
    pub fn is_pending(&self) -> bool {
        matches!(self, StopSignal::Pending(_))
    }

    /// Resolve to an outcome, waiting on pending futures for up to `timeout`
    pub fn wait(self, timeout: Option<Duration>) -> StopOutcome {
        match self {
            StopSignal::Completed(outcome) => outcome,
            StopSignal::Pending(future) => future.get(timeout),
        }
    }
}

/// Create a connected promise/future pair for one stop request
pub fn stop_channel() -> (StopPromise, StopFuture) {
    let slot = Arc::new(StopSlot::new(SlotState::Pending));
    (
        StopPromise {
            slot: Arc::clone(&slot),
        },
        StopFuture { slot },
    )
}

#[derive(Debug)]
enum SlotState {
    Pending,
    Resolved(StopOutcome),
    Abandoned,
}

#[derive(Debug)]
struct StopSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl StopSlot {
    fn new(state: SlotState) -> Self {
        Self {
            state: Mutex::new(state),
            ready: Condvar::new(),
        }
    }

    /// Move out of `Pending`; later transitions are ignored
    fn settle(&self, next: SlotState) {
        let mut state = self.state.lock();
        if matches!(*state, SlotState::Pending) {
            *state = next;
            self.ready.notify_all();
        }
    }
}

/// Producer side of a stop completion
#[derive(Debug)]
pub struct StopPromise {
    slot: Arc<StopSlot>,
}

impl StopPromise {
    /// Deliver the outcome. A future nobody waits on is not an error.
    pub fn resolve(self, outcome: StopOutcome) {
        self.slot.settle(SlotState::Resolved(outcome));
    }
}

impl Drop for StopPromise {
    fn drop(&mut self) {
        self.slot.settle(SlotState::Abandoned);
    }
}

/// Consumer side of a stop completion
///
/// Dropping the promise without resolving it means the actor went away on
/// its own, which reads as `Ok(false)`. Any number of threads may wait on
/// the same future; each honours its own timeout.
#[derive(Debug)]
pub struct StopFuture {
    slot: Arc<StopSlot>,
}

impl StopFuture {
    /// Future that is already resolved
    pub fn ready(outcome: StopOutcome) -> Self {
        Self {
            slot: Arc::new(StopSlot::new(SlotState::Resolved(outcome))),
        }
    }

    /// Non-blocking check for a value
    pub fn is_ready(&self) -> bool {
        !matches!(*self.slot.state.lock(), SlotState::Pending)
    }

    /// Wait for the outcome, at most `timeout` if given.
    ///
    /// A timeout leaves the future unresolved, so `get` may be called again.
    pub fn get(&self, timeout: Option<Duration>) -> StopOutcome {
        let deadline = timeout.map(|limit| Instant::now() + limit);
        let mut state = self.slot.state.lock();
        loop {
            match &*state {
                SlotState::Resolved(outcome) => return outcome.clone(),
                SlotState::Abandoned => return Ok(false),
                SlotState::Pending => {}
            }

            match deadline {
                None => self.slot.ready.wait(&mut state),
                Some(deadline) => {
                    if self.slot.ready.wait_until(&mut state, deadline).timed_out()
                        && matches!(*state, SlotState::Pending)
                    {
                        let timeout_ms = timeout.map_or(0, duration_ms);
                        return Err(ActorError::timeout("stop", timeout_ms));
                    }
                }
            }
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
