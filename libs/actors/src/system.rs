//! Threaded Actor Runtime
//!
//! Minimal runtime that gives the directory something real to track. Each
//! actor owns one OS thread and an unbounded mailbox. Starting an actor
//! registers its reference in an [`ActorDirectory`]; stopping it (or a panic
//! in a handler) unregisters it again from the actor's own thread.
//!
//! # Lifecycle
//!
//! ```text
//! spawn ──▶ register ──▶ on_start ──▶ on_receive* ──▶ Stop envelope
//!                                                      │
//!              reply Ok(true) ◀── mark dead ◀── on_stop ◀── unregister
//! ```
//!
//! Blocking on `stop` from inside the actor's own handler would wait on the
//! thread that has to answer it; use a non-blocking stop there.

use crate::actor_ref::{duration_ms, stop_channel, ActorRef, StopFuture, StopSignal};
use crate::class::ActorClass;
use crate::directory::{ActorDirectory, SharedRef};
use crate::error::{ActorError, Result};
use crate::messages::Envelope;
use crossbeam_channel::{Receiver, Sender};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Behaviour run inside an actor thread
pub trait Actor<M>: Send + 'static {
    /// Type tag the actor is registered under
    fn class(&self) -> &'static ActorClass;

    /// Called on the actor thread before the first message
    fn on_start(&mut self) {}

    /// Handle one message
    fn on_receive(&mut self, message: M);

    /// Called on the actor thread after it has left the directory
    fn on_stop(&mut self) {}
}

/// Reference to an actor running on its own thread
pub struct ThreadActorRef<M> {
    urn: String,
    class: &'static ActorClass,
    inbox: Sender<Envelope<M>>,
    alive: Arc<AtomicBool>,
}

impl<M> fmt::Display for ThreadActorRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorRef({}, {})", self.class, self.urn)
    }
}

impl<M> fmt::Debug for ThreadActorRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadActorRef")
            .field("urn", &self.urn)
            .field("class", &self.class.name())
            .field("alive", &self.alive.load(Ordering::SeqCst))
            .finish()
    }
}

impl<M: Send + 'static> ActorRef<M> for ThreadActorRef<M> {
    fn urn(&self) -> &str {
        &self.urn
    }

    fn actor_class(&self) -> &'static ActorClass {
        self.class
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn tell(&self, message: M) -> Result<()> {
        if !self.is_alive() {
            return Err(ActorError::actor_dead(&self.urn));
        }
        self.inbox
            .send(Envelope::Tell(message))
            .map_err(|_| ActorError::actor_dead(&self.urn))
    }

    fn stop(&self, block: bool, timeout: Option<Duration>) -> StopSignal {
        let future = self.request_stop();
        if block {
            StopSignal::Completed(future.get(timeout))
        } else {
            StopSignal::Pending(future)
        }
    }
}

impl<M> ThreadActorRef<M> {
    fn request_stop(&self) -> StopFuture {
        if !self.alive.load(Ordering::SeqCst) {
            return StopFuture::ready(Ok(false));
        }

        let (promise, future) = stop_channel();
        match self.inbox.send(Envelope::Stop(promise)) {
            Ok(()) => future,
            Err(_) => StopFuture::ready(Ok(false)),
        }
    }
}

/// Start `actor` on a new thread and register it in `directory`.
///
/// The reference is registered before the thread starts, so it is visible
/// to lookups as soon as this returns.
pub fn spawn<M, A>(actor: A, directory: &Arc<ActorDirectory<M>>) -> Result<Arc<ThreadActorRef<M>>>
where
    M: Send + 'static,
    A: Actor<M>,
{
    let class = actor.class();
    let urn = format!("urn:uuid:{}", Uuid::new_v4());
    let (inbox, mailbox) = crossbeam_channel::unbounded();
    let alive = Arc::new(AtomicBool::new(true));

    let actor_ref = Arc::new(ThreadActorRef {
        urn: urn.clone(),
        class,
        inbox,
        alive: Arc::clone(&alive),
    });
    let shared: SharedRef<M> = actor_ref.clone();
    directory.register(Arc::clone(&shared));

    let task = ActorTask {
        behavior: actor,
        mailbox,
        this: Arc::clone(&shared),
        alive,
        directory: Arc::downgrade(directory),
    };

    let spawned = thread::Builder::new()
        .name(format!("actor-{}", class.name()))
        .spawn(move || task.run());

    if let Err(e) = spawned {
        error!(actor_urn = %urn, error = %e, "Failed to start actor thread");
        actor_ref.alive.store(false, Ordering::SeqCst);
        directory.unregister(&shared);
        return Err(ActorError::spawn(urn, e.to_string()));
    }

    info!(actor_urn = %urn, actor_class = class.name(), "Actor started");
    Ok(actor_ref)
}

/// State owned by an actor thread
struct ActorTask<M, A> {
    behavior: A,
    mailbox: Receiver<Envelope<M>>,
    this: SharedRef<M>,
    alive: Arc<AtomicBool>,
    directory: Weak<ActorDirectory<M>>,
}

impl<M, A> ActorTask<M, A>
where
    M: Send + 'static,
    A: Actor<M>,
{
    fn run(mut self) {
        let started = Instant::now();
        let urn = self.this.urn().to_string();

        if panic::catch_unwind(AssertUnwindSafe(|| self.behavior.on_start())).is_err() {
            error!(actor_urn = %urn, "Actor panicked in on_start");
            self.terminate();
            return;
        }

        debug!(
            actor_urn = %urn,
            startup_duration_ms = duration_ms(started.elapsed()),
            "Actor entering message loop"
        );

        while let Ok(envelope) = self.mailbox.recv() {
            match envelope {
                Envelope::Tell(message) => {
                    let handled = panic::catch_unwind(AssertUnwindSafe(|| {
                        self.behavior.on_receive(message)
                    }));
                    if handled.is_err() {
                        error!(actor_urn = %urn, "Actor panicked in on_receive, stopping");
                        self.terminate();
                        return;
                    }
                }
                Envelope::Stop(promise) => {
                    self.terminate();
                    promise.resolve(Ok(true));
                    info!(
                        actor_urn = %urn,
                        uptime_ms = duration_ms(started.elapsed()),
                        "Actor stopped"
                    );
                    return;
                }
            }
        }
    }

    /// Leave the directory, run `on_stop`, and fail whatever is still queued
    fn terminate(&mut self) {
        if let Some(directory) = self.directory.upgrade() {
            directory.unregister(&self.this);
        }

        if panic::catch_unwind(AssertUnwindSafe(|| self.behavior.on_stop())).is_err() {
            warn!(actor_urn = self.this.urn(), "Actor panicked in on_stop");
        }
        self.alive.store(false, Ordering::SeqCst);

        let mut dropped = 0usize;
        for envelope in self.mailbox.try_iter() {
            match envelope {
                Envelope::Stop(promise) => promise.resolve(Ok(false)),
                Envelope::Tell(_) => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(actor_urn = self.this.urn(), dropped, "Dropped queued messages");
        }
    }
}
