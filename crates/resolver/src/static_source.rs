//! StaticNameSource - name source backed by a fixed identity → name table

use crate::types::{RemoteError, RemoteNameSource};
use async_trait::async_trait;
use shared::Identity;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Name source that answers from an in-memory table.
///
/// Used by the CLI (loaded from a JSON file) and by tests. An optional
/// latency makes it behave like a slow remote service.
#[derive(Debug, Clone, Default)]
pub struct StaticNameSource {
    names: HashMap<Identity, String>,
    latency: Option<Duration>,
}

impl StaticNameSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, identity: Identity, name: impl Into<String>) -> Self {
        self.names.insert(identity, name.into());
        self
    }

    /// Delay every answer by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Load a JSON object of `{"<uuid>": "<name>"}` pairs
    pub fn from_file(path: &Path) -> shared::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let names: HashMap<Identity, String> = serde_json::from_str(&content)?;
        Ok(Self { names, latency: None })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RemoteNameSource for StaticNameSource {
    async fn lookup_batch(&self, identities: &[Identity]) -> Result<HashMap<Identity, String>, RemoteError> {
        self.wait().await;
        Ok(identities
            .iter()
            .filter_map(|identity| self.names.get(identity).map(|name| (*identity, name.clone())))
            .collect())
    }

    async fn lookup_by_name(&self, name: &str) -> Result<Option<Identity>, RemoteError> {
        self.wait().await;
        Ok(self
            .names
            .iter()
            .find(|(_, known)| known.eq_ignore_ascii_case(name))
            .map(|(identity, _)| *identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_lookup_batch_skips_unknown() {
        let source = StaticNameSource::new().with_name(Identity::from_u128(1), "alice");

        let names = source
            .lookup_batch(&[Identity::from_u128(1), Identity::from_u128(2)])
            .await
            .unwrap();

        assert_eq!(names.len(), 1);
        assert_eq!(names[&Identity::from_u128(1)], "alice");
    }

    #[tokio::test]
    async fn test_lookup_by_name_ignores_case() {
        let source = StaticNameSource::new().with_name(Identity::from_u128(1), "Alice");

        assert_eq!(source.lookup_by_name("aLiCe").await.unwrap(), Some(Identity::from_u128(1)));
        assert_eq!(source.lookup_by_name("bob").await.unwrap(), None);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{ "00000000-0000-0000-0000-000000000001": "alice", "00000000-0000-0000-0000-000000000002": "bob" }}"#
        )
        .unwrap();

        let source = StaticNameSource::from_file(file.path()).unwrap();
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_from_file_rejects_bad_identity() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "not-a-uuid": "alice" }}"#).unwrap();

        assert!(StaticNameSource::from_file(file.path()).is_err());
    }
}
