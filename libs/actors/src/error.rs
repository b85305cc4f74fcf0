//! Actor Error Types
//!
//! Errors raised by actor references when delivering messages or waiting on
//! stop requests. The directory itself never produces these; it hands them
//! back to callers exactly as the reference reported them.

use thiserror::Error;

/// Failure reported by an actor reference
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActorError {
    /// The actor is no longer accepting messages
    #[error("Actor {urn} is dead")]
    ActorDead { urn: String },

    /// The actor thread could not be started
    #[error("Failed to start actor {urn}: {reason}")]
    Spawn { urn: String, reason: String },

    /// A blocking wait ran out of time
    #[error("Timeout error: {operation} exceeded {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },
}

/// Result type alias for actor reference operations
pub type Result<T> = std::result::Result<T, ActorError>;

impl ActorError {
    /// Create an actor-dead error
    pub fn actor_dead(urn: impl Into<String>) -> Self {
        Self::ActorDead { urn: urn.into() }
    }

    /// Create a spawn error
    pub fn spawn(urn: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Spawn {
            urn: urn.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Check if this error means the target actor is gone
    pub fn is_dead(&self) -> bool {
        matches!(self, Self::ActorDead { .. })
    }

    /// Check if this error is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
