//! Query - declarative description of a resource listing

use crate::sorting::SortStrategy;
use shared::{AreaScope, Identity, Resource};
use std::fmt;

/// Boxed resource filter
pub type Predicate = Box<dyn Fn(&Resource) -> bool + Send + Sync>;

/// Where the candidate resources come from
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySource {
    /// A caller-supplied collection
    Explicit(Vec<Resource>),
    All,
    OwnedBy(Identity),
    WithMember(Identity),
    InArea(AreaScope),
    /// Every resource matching all words of the term
    Search(String),
    /// Always empty
    None,
}

/// A resource query.
///
/// Built by chaining; evaluating it never touches the store's contents.
pub struct Query {
    source: QuerySource,
    predicates: Vec<Predicate>,
    sorting: SortStrategy,
    relative_area: Option<String>,
}

impl Query {
    fn from_source(source: QuerySource) -> Self {
        Self {
            source,
            predicates: Vec::new(),
            sorting: SortStrategy::default(),
            relative_area: None,
        }
    }

    pub fn all() -> Self {
        Self::from_source(QuerySource::All)
    }

    pub fn none() -> Self {
        Self::from_source(QuerySource::None)
    }

    pub fn explicit(resources: impl IntoIterator<Item = Resource>) -> Self {
        Self::from_source(QuerySource::Explicit(resources.into_iter().collect()))
    }

    pub fn owned_by(owner: Identity) -> Self {
        Self::from_source(QuerySource::OwnedBy(owner))
    }

    /// Resources where the identity is trusted or a member
    pub fn with_member(member: Identity) -> Self {
        Self::from_source(QuerySource::WithMember(member))
    }

    pub fn in_area(area: impl Into<String>) -> Self {
        Self::from_source(QuerySource::InArea(AreaScope::Area(area.into())))
    }

    pub fn in_world(world: impl Into<String>) -> Self {
        Self::from_source(QuerySource::InArea(AreaScope::World(world.into())))
    }

    /// Case-insensitive search over alias, id, world and area
    pub fn search(term: impl Into<String>) -> Self {
        Self::from_source(QuerySource::Search(term.into()))
    }

    /// Add a filter; filters are ANDed in the order they were added
    pub fn that_passes<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Resource) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Drop the non-base parts of merged resources
    pub fn where_base(self) -> Self {
        self.that_passes(|resource| resource.base)
    }

    /// Move resources of `area` ahead of the others
    pub fn relative_to_area(mut self, area: impl Into<String>) -> Self {
        self.relative_area = Some(area.into());
        self
    }

    pub fn with_sorting_strategy(mut self, strategy: SortStrategy) -> Self {
        self.sorting = strategy;
        self
    }

    pub fn source(&self) -> &QuerySource {
        &self.source
    }

    pub fn sorting(&self) -> SortStrategy {
        self.sorting
    }

    pub fn relative_area(&self) -> Option<&str> {
        self.relative_area.as_deref()
    }

    /// Check a resource against every predicate, stopping at the first miss
    pub fn passes(&self, resource: &Resource) -> bool {
        self.predicates.iter().all(|predicate| predicate(resource))
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("source", &self.source)
            .field("predicates", &self.predicates.len())
            .field("sorting", &self.sorting)
            .field("relative_area", &self.relative_area)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::ResourceId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn plot(x: i32) -> Resource {
        Resource::new(ResourceId::new("plotworld", x, 0), "plotworld", Utc::now())
    }

    #[test]
    fn test_builder_defaults() {
        let query = Query::all();
        assert_eq!(query.source(), &QuerySource::All);
        assert_eq!(query.sorting(), SortStrategy::Unsorted);
        assert!(query.relative_area().is_none());
        assert!(query.passes(&plot(0)));
    }

    #[test]
    fn test_in_world_and_area_scopes() {
        assert_eq!(
            Query::in_world("survival").source(),
            &QuerySource::InArea(AreaScope::World("survival".into()))
        );
        assert_eq!(
            Query::in_area("arena").source(),
            &QuerySource::InArea(AreaScope::Area("arena".into()))
        );
    }

    #[test]
    fn test_where_base() {
        let query = Query::all().where_base();
        assert!(query.passes(&plot(0)));
        assert!(!query.passes(&plot(0).merged_part()));
    }

    #[test]
    fn test_predicates_short_circuit_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let query = Query::all().that_passes(|r| r.id.x > 0).that_passes(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        assert!(!query.passes(&plot(0)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(query.passes(&plot(1)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_hides_closures() {
        let query = Query::none().that_passes(|_| true).relative_to_area("arena");
        let debug = format!("{:?}", query);
        assert!(debug.contains("predicates: 1"));
        assert!(debug.contains("arena"));
    }
}
