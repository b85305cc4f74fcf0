//! Actor Directory
//!
//! Tracks every live actor reference in registration order and lets any
//! thread look actors up, message them, or tear them down.
//!
//! # Locking
//!
//! A single mutex guards the entry list. It is held only while the list is
//! read, copied, or mutated, and is always released before `tell` or `stop`
//! runs on a reference. A stop handler may therefore call back into the
//! directory, typically to unregister itself.
//!
//! # Shutdown order
//!
//! [`ActorDirectory::stop_all`] stops actors last-registered first. In
//! blocking mode each stop completes before the next one is issued, which is
//! enough for simple start-order dependency chains. Actors with dependencies
//! that registration order does not capture must be stopped explicitly, for
//! example by stopping dependents from an actor's own `on_stop`. The timeout
//! applies to each actor separately, so a sweep over N actors may take up to
//! N times the timeout.

use crate::actor_ref::{ActorRef, StopOutcome, StopSignal};
use crate::class::ActorClass;
use crate::config::DirectoryConfig;
use crate::error::Result;
use crate::messages::Message;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Shared handle to a tracked actor
pub type SharedRef<M> = Arc<dyn ActorRef<M>>;

/// True if both handles point at the same reference object
pub fn same_ref<M>(a: &SharedRef<M>, b: &SharedRef<M>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Which actors a broadcast goes to
#[derive(Debug, Clone, Copy, Default)]
pub enum Target<'a> {
    /// Every tracked actor
    #[default]
    All,
    /// Actors of this class or any subclass
    ByClass(&'static ActorClass),
    /// Actors whose class name is exactly this
    ByName(&'a str),
}

impl From<&'static ActorClass> for Target<'_> {
    fn from(class: &'static ActorClass) -> Self {
        Target::ByClass(class)
    }
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(name: &'a str) -> Self {
        Target::ByName(name)
    }
}

/// Registry of running actors
pub struct ActorDirectory<M = Message> {
    /// Tracked references, oldest registration first
    entries: Mutex<Vec<SharedRef<M>>>,
}

impl<M> ActorDirectory<M> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Start tracking `actor_ref`.
    ///
    /// Normally called once when the actor starts. Registering the same
    /// reference twice is not checked.
    pub fn register(&self, actor_ref: SharedRef<M>) {
        let description = actor_ref.to_string();
        self.entries.lock().push(actor_ref);
        trace!("Registered {}", description);
    }

    /// Stop tracking `actor_ref`.
    ///
    /// Returns whether it was tracked. Removing an unknown reference is a
    /// no-op.
    pub fn unregister(&self, actor_ref: &SharedRef<M>) -> bool {
        let removed = {
            let mut entries = self.entries.lock();
            match entries.iter().position(|entry| same_ref(entry, actor_ref)) {
                Some(index) => {
                    entries.remove(index);
                    true
                }
                None => false,
            }
        };

        if removed {
            trace!("Unregistered {}", actor_ref);
        } else {
            trace!("Unregistered {} (not found in registry)", actor_ref);
        }
        removed
    }

    /// Snapshot of every tracked reference in registration order
    pub fn get_all(&self) -> Vec<SharedRef<M>> {
        self.entries.lock().clone()
    }

    /// References whose class is `actor_class` or inherits from it
    pub fn get_by_class(&self, actor_class: &ActorClass) -> Vec<SharedRef<M>> {
        self.filtered(|entry| entry.actor_class().is_subclass_of(actor_class))
    }

    /// References whose class name equals `name`. Subclasses do not match.
    pub fn get_by_class_name(&self, name: &str) -> Vec<SharedRef<M>> {
        self.filtered(|entry| entry.actor_class().name() == name)
    }

    /// Reference with the given URN. The earliest registration wins if
    /// several share it.
    pub fn get_by_urn(&self, urn: &str) -> Option<SharedRef<M>> {
        self.entries
            .lock()
            .iter()
            .find(|entry| entry.urn() == urn)
            .cloned()
    }

    /// Snapshot of the references a [`Target`] selects
    pub fn resolve(&self, target: &Target<'_>) -> Vec<SharedRef<M>> {
        match *target {
            Target::All => self.get_all(),
            Target::ByClass(class) => self.get_by_class(class),
            Target::ByName(name) => self.get_by_class_name(name),
        }
    }

    /// Request every tracked actor to stop, last registered first.
    ///
    /// With `block` set, each stop is waited for before the next is issued
    /// and every signal is [`StopSignal::Completed`]. Otherwise all requests
    /// are issued back to back and the signals are pending futures.
    pub fn stop_all(&self, block: bool, timeout: Option<Duration>) -> Vec<StopSignal> {
        let targets = self.get_all();
        debug!(
            actors = targets.len(),
            block,
            timeout = ?timeout,
            "Stopping all actors"
        );

        targets
            .iter()
            .rev()
            .map(|actor_ref| actor_ref.stop(block, timeout))
            .collect()
    }

    /// Stop everything using the configured shutdown policy.
    ///
    /// Every signal is resolved before returning. In non-blocking mode all
    /// requests go out first and the futures are waited on afterwards.
    pub fn shutdown(&self, config: &DirectoryConfig) -> Vec<StopOutcome> {
        let timeout = config.shutdown.stop_timeout();
        let outcomes: Vec<StopOutcome> = self
            .stop_all(config.shutdown.block_on_stop, timeout)
            .into_iter()
            .map(|signal| signal.wait(timeout))
            .collect();

        let failures = outcomes.iter().filter(|outcome| outcome.is_err()).count();
        if failures > 0 {
            warn!(failures, total = outcomes.len(), "Shutdown finished with failures");
        } else {
            debug!(total = outcomes.len(), "Shutdown finished");
        }
        outcomes
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn filtered<F>(&self, predicate: F) -> Vec<SharedRef<M>>
    where
        F: Fn(&SharedRef<M>) -> bool,
    {
        self.entries
            .lock()
            .iter()
            .filter(|entry| predicate(*entry))
            .cloned()
            .collect()
    }
}

impl<M: Clone> ActorDirectory<M> {
    /// Send a copy of `message` to every actor `target` selects.
    ///
    /// Delivery order follows the resolved snapshot. Each reference's result
    /// is returned as-is, in the same order, and a failed delivery does not
    /// stop the remaining ones.
    pub fn broadcast<'a>(&self, message: M, target: impl Into<Target<'a>>) -> Vec<Result<()>> {
        let target = target.into();
        let targets = self.resolve(&target);
        debug!(targets = targets.len(), selection = ?target, "Broadcasting message");

        targets
            .iter()
            .map(|actor_ref| {
                let result = actor_ref.tell(message.clone());
                if let Err(ref e) = result {
                    warn!(urn = actor_ref.urn(), error = %e, "Broadcast delivery failed");
                }
                result
            })
            .collect()
    }
}

impl<M> Default for ActorDirectory<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for ActorDirectory<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorDirectory")
            .field("entries", &self.len())
            .finish()
    }
}
