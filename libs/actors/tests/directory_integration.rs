//! Integration tests for the actor directory under concurrent use
//!
//! Covers:
//! - register/unregister from many threads without lost updates
//! - registration order against a sequential model (proptest)
//! - broadcast racing with unregister
//! - the threaded runtime wired to the shared default directory

use actor_directory::{
    global, same_ref, spawn, Actor, ActorClass, ActorDirectory, ActorError, ActorRef,
    DirectoryConfig, Message, SharedRef, StopFuture, StopSignal, Target,
};
use parking_lot::Mutex;
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

static PROBE: ActorClass = ActorClass::root("Probe");

/// Reference that only counts deliveries
struct Probe {
    urn: String,
    delivered: AtomicUsize,
    alive: AtomicBool,
}

impl Probe {
    fn new(urn: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            urn: urn.into(),
            delivered: AtomicUsize::new(0),
            alive: AtomicBool::new(true),
        })
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Probe({})", self.urn)
    }
}

impl ActorRef<u64> for Probe {
    fn urn(&self) -> &str {
        &self.urn
    }

    fn actor_class(&self) -> &'static ActorClass {
        &PROBE
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn tell(&self, _message: u64) -> actor_directory::Result<()> {
        if !self.is_alive() {
            return Err(ActorError::actor_dead(&self.urn));
        }
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self, _block: bool, _timeout: Option<Duration>) -> StopSignal {
        let was_alive = self.alive.swap(false, Ordering::SeqCst);
        StopSignal::Pending(StopFuture::ready(Ok(was_alive)))
    }
}

fn urns<M>(refs: &[SharedRef<M>]) -> Vec<String> {
    refs.iter().map(|r| r.urn().to_string()).collect()
}

#[test_log::test]
fn concurrent_register_unregister_loses_nothing() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 200;

    let directory: Arc<ActorDirectory<u64>> = Arc::new(ActorDirectory::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let directory = Arc::clone(&directory);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut kept = Vec::new();
                for i in 0..PER_THREAD {
                    let probe: SharedRef<u64> = Probe::new(format!("t{}-{}", t, i));
                    directory.register(Arc::clone(&probe));
                    if i % 2 == 0 {
                        assert!(directory.unregister(&probe));
                    } else {
                        kept.push(probe.urn().to_string());
                    }
                }
                kept
            })
        })
        .collect();

    let expected: HashSet<String> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    let remaining = urns(&directory.get_all());
    let unique: HashSet<String> = remaining.iter().cloned().collect();
    assert_eq!(remaining.len(), unique.len(), "no duplicates");
    assert_eq!(unique, expected);
}

#[test_log::test]
fn per_thread_registration_order_is_preserved() {
    let directory: Arc<ActorDirectory<u64>> = Arc::new(ActorDirectory::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let directory = Arc::clone(&directory);
            thread::spawn(move || {
                for i in 0..50 {
                    directory.register(Probe::new(format!("t{}-{:02}", t, i)));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let all = urns(&directory.get_all());
    for t in 0..4 {
        let prefix = format!("t{}-", t);
        let mine: Vec<_> = all.iter().filter(|u| u.starts_with(&prefix)).cloned().collect();
        let mut sorted = mine.clone();
        sorted.sort();
        assert_eq!(mine, sorted);
    }
}

#[test_log::test]
fn broadcast_survives_concurrent_unregister() {
    let directory: Arc<ActorDirectory<u64>> = Arc::new(ActorDirectory::new());
    let probes: Vec<Arc<Probe>> = (0..64).map(|i| Probe::new(format!("p{}", i))).collect();
    let shared: Vec<SharedRef<u64>> = probes
        .iter()
        .map(|p| Arc::clone(p) as SharedRef<u64>)
        .collect();
    for probe in &shared {
        directory.register(Arc::clone(probe));
    }

    let rounds = 100;
    let broadcaster = {
        let directory = Arc::clone(&directory);
        thread::spawn(move || {
            for round in 0..rounds {
                let results = directory.broadcast(round, Target::All);
                assert!(results.iter().all(|r| r.is_ok()));
            }
        })
    };
    let remover = {
        let directory = Arc::clone(&directory);
        thread::spawn(move || {
            for probe in &shared {
                directory.unregister(probe);
                thread::yield_now();
            }
        })
    };

    broadcaster.join().unwrap();
    remover.join().unwrap();

    assert!(directory.is_empty());
    for probe in &probes {
        assert!(probe.delivered.load(Ordering::SeqCst) <= rounds as usize);
    }
}

#[test_log::test]
fn broadcast_to_all_delivers_exactly_once_each() {
    let directory: ActorDirectory<u64> = ActorDirectory::new();
    let probes: Vec<Arc<Probe>> = (0..5).map(|i| Probe::new(format!("p{}", i))).collect();
    for probe in &probes {
        directory.register(Arc::clone(probe) as SharedRef<u64>);
    }

    let results = directory.broadcast(42, Target::default());

    assert_eq!(results.len(), 5);
    for probe in &probes {
        assert_eq!(probe.delivered.load(Ordering::SeqCst), 1);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Register(usize),
    Unregister(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..8usize).prop_map(Op::Register),
        (0..8usize).prop_map(Op::Unregister),
    ]
}

proptest! {
    #[test]
    fn directory_matches_sequential_model(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let directory: ActorDirectory<u64> = ActorDirectory::new();
        let pool: Vec<SharedRef<u64>> = (0..8)
            .map(|i| Probe::new(format!("p{}", i)) as SharedRef<u64>)
            .collect();
        let mut model: Vec<usize> = Vec::new();

        for op in ops {
            match op {
                Op::Register(i) => {
                    if !model.contains(&i) {
                        directory.register(Arc::clone(&pool[i]));
                        model.push(i);
                    }
                }
                Op::Unregister(i) => {
                    let expected = model.iter().position(|&m| m == i);
                    let removed = directory.unregister(&pool[i]);
                    prop_assert_eq!(removed, expected.is_some());
                    if let Some(index) = expected {
                        model.remove(index);
                    }
                }
            }
        }

        let all = directory.get_all();
        prop_assert_eq!(all.len(), model.len());
        for (entry, &i) in all.iter().zip(model.iter()) {
            prop_assert!(same_ref(entry, &pool[i]));
        }
    }
}

static RECORDER: ActorClass = ActorClass::root("Recorder");

/// Collects JSON messages on its own thread
struct Recorder {
    received: Arc<Mutex<Vec<Message>>>,
}

impl Actor<Message> for Recorder {
    fn class(&self) -> &'static ActorClass {
        &RECORDER
    }

    fn on_receive(&mut self, message: Message) {
        self.received.lock().push(message);
    }
}

#[test_log::test]
fn default_directory_runs_threaded_actors() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let actor_ref = spawn(
        Recorder {
            received: Arc::clone(&received),
        },
        global::directory(),
    )
    .unwrap();

    let found = global::directory().get_by_urn(actor_ref.urn()).unwrap();
    assert_eq!(found.actor_class(), &RECORDER);

    global::directory().broadcast(json!({"command": "ping"}), "Recorder");

    let outcomes = global::shutdown(&DirectoryConfig::default());
    assert_eq!(outcomes, vec![Ok(true)]);
    assert_eq!(*received.lock(), vec![json!({"command": "ping"})]);
    assert!(global::directory().is_empty());
}
