//! Actor Directory
//!
//! Process-wide directory of running actors. Any thread can register actor
//! references, look them up by class, class name, or URN, broadcast a
//! message to a selection of them, and stop them all in reverse start order.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ register/unregister ┌──────────────────────────┐
//! │ Actor thread │────────────────────▶│      ActorDirectory      │
//! │ (system.rs)  │                     │  Mutex<Vec<SharedRef>>   │
//! └──────▲───────┘                     └────────────┬─────────────┘
//!        │ tell / stop                              │ snapshot
//!        │ (lock released)                          ▼
//!        └────────────────────────────────── get_* / broadcast / stop_all
//! ```
//!
//! The directory only records handles. Running actors, delivering messages
//! and reporting stop completion belong to the [`ActorRef`] implementation;
//! [`system`] provides a thread-per-actor one.
//!
//! # Examples
//!
//! ```rust
//! use actor_directory::{spawn, Actor, ActorClass, ActorDirectory, Target};
//! use std::sync::Arc;
//!
//! static GREETER: ActorClass = ActorClass::root("Greeter");
//!
//! struct Greeter;
//!
//! impl Actor<String> for Greeter {
//!     fn class(&self) -> &'static ActorClass {
//!         &GREETER
//!     }
//!
//!     fn on_receive(&mut self, name: String) {
//!         println!("Hello, {}!", name);
//!     }
//! }
//!
//! let directory: Arc<ActorDirectory<String>> = Arc::new(ActorDirectory::new());
//! spawn(Greeter, &directory).unwrap();
//!
//! directory.broadcast("world".to_string(), Target::ByName("Greeter"));
//! directory.stop_all(true, None);
//! assert!(directory.is_empty());
//! ```

pub mod actor_ref;
pub mod class;
pub mod config;
pub mod directory;
pub mod error;
pub mod global;
pub mod logging;
pub mod messages;
pub mod system;

pub use actor_ref::{stop_channel, ActorRef, StopFuture, StopOutcome, StopPromise, StopSignal};
pub use class::ActorClass;
pub use config::{DirectoryConfig, ShutdownConfig};
pub use directory::{same_ref, ActorDirectory, SharedRef, Target};
pub use error::{ActorError, Result};
pub use messages::{Envelope, Message};
pub use system::{spawn, Actor, ThreadActorRef};
