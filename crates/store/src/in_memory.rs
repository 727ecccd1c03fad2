//! In-Memory Resource Store
//!
//! Thread-safe `ResourceStore` used by the CLI and in tests.

use crate::fixture::ResourceFile;
use shared::{AreaScope, Identity, Resource, ResourceId, ResourceStore};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory resource store
///
/// Enumeration order is always ascending resource id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResourceStore {
    resources: Arc<RwLock<BTreeMap<ResourceId, Resource>>>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_resources(resources: impl IntoIterator<Item = Resource>) -> Self {
        let store = Self::new();
        store.extend(resources);
        store
    }

    /// Load every fixture file matching a glob pattern
    pub fn load_glob(pattern: &str) -> shared::Result<Self> {
        let paths = glob::glob(pattern).map_err(|e| shared::Error::Pattern(e.to_string()))?;
        let store = Self::new();

        for entry in paths {
            let path = entry.map_err(|e| shared::Error::Io(e.into_error()))?;
            let file = ResourceFile::from_file(&path)?;
            tracing::debug!(path = %path.display(), count = file.resources.len(), "Loaded resource file");
            store.extend(file.resources);
        }
        Ok(store)
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<ResourceId, Resource>> {
        self.resources.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<ResourceId, Resource>> {
        self.resources.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace a resource, returning the previous one
    pub fn insert(&self, resource: Resource) -> Option<Resource> {
        self.write().insert(resource.id.clone(), resource)
    }

    pub fn extend(&self, resources: impl IntoIterator<Item = Resource>) {
        let mut map = self.write();
        for resource in resources {
            map.insert(resource.id.clone(), resource);
        }
    }

    pub fn remove(&self, id: &ResourceId) -> Option<Resource> {
        self.write().remove(id)
    }

    pub fn get(&self, id: &ResourceId) -> Option<Resource> {
        self.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Distinct world names, sorted
    pub fn worlds(&self) -> Vec<String> {
        let worlds: BTreeSet<String> = self.read().values().map(|r| r.world.clone()).collect();
        worlds.into_iter().collect()
    }

    fn filtered(&self, keep: impl Fn(&Resource) -> bool) -> Vec<Resource> {
        self.read().values().filter(|r| keep(r)).cloned().collect()
    }
}

impl ResourceStore for InMemoryResourceStore {
    fn all(&self) -> Vec<Resource> {
        self.read().values().cloned().collect()
    }

    fn owned_by(&self, owner: &Identity) -> Vec<Resource> {
        self.filtered(|r| r.is_owner(owner))
    }

    fn with_member(&self, member: &Identity) -> Vec<Resource> {
        self.filtered(|r| r.is_added(member))
    }

    fn in_area(&self, scope: &AreaScope) -> Vec<Resource> {
        self.filtered(|r| scope.contains(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::Path;

    fn plot(area: &str, x: i32, world: &str) -> Resource {
        Resource::new(ResourceId::new(area, x, 0), world, Utc::now())
    }

    fn write_fixture(path: &Path, resources: Vec<Resource>) {
        ResourceFile { resources }.to_file(path).unwrap();
    }

    // ============== Basic Tests ==============

    #[test]
    fn test_insert_get_remove() {
        let store = InMemoryResourceStore::new();
        assert!(store.is_empty());

        assert!(store.insert(plot("town", 0, "survival")).is_none());
        assert!(store.insert(plot("town", 0, "survival")).is_some());
        assert_eq!(store.len(), 1);

        let id = ResourceId::new("town", 0, 0);
        assert!(store.get(&id).is_some());
        assert!(store.remove(&id).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn test_enumeration_is_ordered_by_id() {
        let store = InMemoryResourceStore::from_resources(vec![
            plot("town", 2, "survival"),
            plot("arena", 0, "creative"),
            plot("town", 1, "survival"),
        ]);

        let ids: Vec<String> = store.all().iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["arena;0;0", "town;1;0", "town;2;0"]);
    }

    #[test]
    fn test_clones_share_state() {
        let store = InMemoryResourceStore::new();
        let other = store.clone();
        store.insert(plot("town", 0, "survival"));
        assert_eq!(other.len(), 1);
    }

    // ============== Query Tests ==============

    #[test]
    fn test_owned_by_and_with_member() {
        let alice = Identity::from_u128(1);
        let bob = Identity::from_u128(2);
        let store = InMemoryResourceStore::from_resources(vec![
            plot("town", 0, "survival").with_owner(alice),
            plot("town", 1, "survival").with_owner(bob).with_trusted(alice),
            plot("town", 2, "survival").with_owner(bob).with_denied(alice),
        ]);

        assert_eq!(store.owned_by(&alice).len(), 1);
        assert_eq!(store.owned_by(&bob).len(), 2);
        assert_eq!(store.with_member(&alice).len(), 1);
    }

    #[test]
    fn test_in_area_and_worlds() {
        let store = InMemoryResourceStore::from_resources(vec![
            plot("town", 0, "survival"),
            plot("arena", 0, "creative"),
            plot("arena", 1, "creative"),
        ]);

        assert_eq!(store.in_area(&AreaScope::World("creative".into())).len(), 2);
        assert_eq!(store.in_area(&AreaScope::Area("town".into())).len(), 1);
        assert_eq!(store.worlds(), vec!["creative", "survival"]);
    }

    // ============== Loading Tests ==============

    #[test]
    fn test_load_glob_merges_files() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(&dir.path().join("a.json"), vec![plot("town", 0, "survival")]);
        write_fixture(&dir.path().join("b.json"), vec![plot("arena", 0, "creative")]);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let pattern = format!("{}/*.json", dir.path().display());
        let store = InMemoryResourceStore::load_glob(&pattern).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_glob_no_matches_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        assert!(InMemoryResourceStore::load_glob(&pattern).unwrap().is_empty());
    }

    #[test]
    fn test_load_glob_invalid_pattern() {
        let err = InMemoryResourceStore::load_glob("[").unwrap_err();
        assert!(matches!(err, shared::Error::Pattern(_)));
    }
}
