//! Process-wide default directory
//!
//! Application wiring that wants a single shared directory can use this one.
//! Library code and tests should construct their own [`ActorDirectory`].

use crate::actor_ref::StopOutcome;
use crate::config::DirectoryConfig;
use crate::directory::ActorDirectory;
use crate::messages::Message;
use once_cell::sync::Lazy;
use std::sync::Arc;

static DEFAULT_DIRECTORY: Lazy<Arc<ActorDirectory<Message>>> =
    Lazy::new(|| Arc::new(ActorDirectory::new()));

/// The shared directory, created on first use
pub fn directory() -> &'static Arc<ActorDirectory<Message>> {
    &DEFAULT_DIRECTORY
}

/// Stop every actor in the shared directory using `config`
pub fn shutdown(config: &DirectoryConfig) -> Vec<StopOutcome> {
    directory().shutdown(config)
}
