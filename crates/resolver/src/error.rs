//! Resolution error types

use crate::types::IdentityMapping;
use shared::Identity;
use std::collections::HashMap;
use thiserror::Error;

/// Typed outcome of a failed resolution
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    /// The key is neither cached, remotely resolvable, nor an identity literal
    #[error("No identity found for '{key}'")]
    IdentityNotFound { key: String },

    /// The batch budget ran out. `partial` holds an entry for every requested
    /// identity: resolved ones carry a name, the `pending` others are unresolved.
    #[error("Name resolution timed out with {pending} identities still pending")]
    TimedOut {
        partial: HashMap<Identity, IdentityMapping>,
        pending: usize,
    },

    /// Waiting was cancelled from outside, or the lookup worker went away
    #[error("Name resolution was interrupted")]
    Interrupted,
}

impl ResolutionError {
    /// The usable partial result of a timed out batch
    pub fn partial(&self) -> Option<&HashMap<Identity, IdentityMapping>> {
        match self {
            ResolutionError::TimedOut { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Consume the error, keeping the partial result of a timed out batch
    pub fn into_partial(self) -> Option<HashMap<Identity, IdentityMapping>> {
        match self {
            ResolutionError::TimedOut { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Whether retrying the same call can reasonably succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolutionError::TimedOut { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ResolutionError::IdentityNotFound { key: "ghost".into() };
        assert_eq!(err.to_string(), "No identity found for 'ghost'");
        assert!(!err.is_retryable());
        assert!(err.partial().is_none());
    }

    #[test]
    fn test_timed_out_keeps_partial() {
        let err = ResolutionError::TimedOut {
            partial: HashMap::new(),
            pending: 2,
        };
        assert!(err.to_string().contains("2 identities"));
        assert!(err.is_retryable());
        assert!(err.partial().is_some());
        assert!(err.into_partial().unwrap().is_empty());
    }

    #[test]
    fn test_interrupted_is_not_retryable() {
        assert!(!ResolutionError::Interrupted.is_retryable());
    }
}
