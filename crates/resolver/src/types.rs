//! Resolver types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::Identity;
use std::collections::HashMap;
use thiserror::Error;

/// Result of resolving one identity.
///
/// Either carries a display name or is explicitly unresolved; only the
/// pipeline creates these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityMapping {
    identity: Identity,
    name: Option<String>,
    resolved_at: DateTime<Utc>,
}

impl IdentityMapping {
    pub(crate) fn resolved(identity: Identity, name: impl Into<String>, resolved_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            name: Some(name.into()),
            resolved_at,
        }
    }

    pub(crate) fn unresolved(identity: Identity, resolved_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            name: None,
            resolved_at,
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// When the remote request that produced this mapping was issued
    pub fn resolved_at(&self) -> DateTime<Utc> {
        self.resolved_at
    }

    pub fn is_resolved(&self) -> bool {
        self.name.is_some()
    }

    /// The name if known, the identity literal otherwise
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.identity.to_string(),
        }
    }
}

/// Failure reported by a remote name source
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("Name service unavailable: {0}")]
    Unavailable(String),

    #[error("Name service rate limited the request")]
    RateLimited,

    #[error("Name service error: {0}")]
    Other(String),
}

/// External naming service
///
/// Latency and availability are outside the pipeline's control; both calls
/// are bounded by the pipeline's remote timeout.
#[async_trait]
pub trait RemoteNameSource: Send + Sync {
    /// Resolve a batch of identities. Unknown identities are simply absent
    /// from the returned map.
    async fn lookup_batch(&self, identities: &[Identity]) -> Result<HashMap<Identity, String>, RemoteError>;

    /// Reverse lookup of a display name
    async fn lookup_by_name(&self, name: &str) -> Result<Option<Identity>, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resolved_mapping() {
        let at = Utc.timestamp_opt(100, 0).unwrap();
        let mapping = IdentityMapping::resolved(Identity::from_u128(1), "alice", at);

        assert!(mapping.is_resolved());
        assert_eq!(mapping.name(), Some("alice"));
        assert_eq!(mapping.display_name(), "alice");
        assert_eq!(mapping.resolved_at(), at);
    }

    #[test]
    fn test_unresolved_mapping_displays_identity() {
        let mapping = IdentityMapping::unresolved(Identity::from_u128(1), Utc::now());

        assert!(!mapping.is_resolved());
        assert!(mapping.name().is_none());
        assert_eq!(mapping.display_name(), "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn test_mapping_serialization() {
        let at = Utc.timestamp_opt(0, 0).unwrap();
        let json = serde_json::to_string(&IdentityMapping::resolved(Identity::from_u128(1), "bob", at)).unwrap();

        assert!(json.contains("\"name\":\"bob\""));
        assert!(json.contains("\"resolvedAt\""));
    }

    #[test]
    fn test_remote_error_display() {
        assert!(RemoteError::Unavailable("down".into()).to_string().contains("down"));
        assert!(RemoteError::RateLimited.to_string().contains("rate limited"));
    }
}
