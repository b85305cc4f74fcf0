//! Actor Message Types
//!
//! Default message payload and the mailbox envelope used by the threaded
//! runtime in [`crate::system`].

use crate::actor_ref::StopPromise;

/// Default message payload: a free-form JSON document
pub type Message = serde_json::Value;

/// Item placed in an actor's mailbox
#[derive(Debug)]
pub enum Envelope<M> {
    /// Deliver a message to `on_receive`
    Tell(M),
    /// Stop the actor and report back through the promise
    Stop(StopPromise),
}
