//! QueryEngine - evaluates queries against a resource store

use crate::query::{Query, QuerySource};
use regex::{Regex, RegexBuilder};
use shared::{Resource, ResourceStore};

/// Compiled search term: every word must match somewhere in a resource
struct SearchMatcher {
    words: Vec<Regex>,
}

impl SearchMatcher {
    fn new(term: &str) -> Self {
        let words = term
            .split_whitespace()
            .filter_map(|word| {
                RegexBuilder::new(&regex::escape(word))
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .collect();
        Self { words }
    }

    fn matches(&self, resource: &Resource) -> bool {
        if self.words.is_empty() {
            return false;
        }
        let id = resource.id.to_string();
        let alias = resource.alias.as_deref().unwrap_or("");
        let fields = [alias, id.as_str(), resource.world.as_str(), resource.id.area.as_str()];

        self.words
            .iter()
            .all(|word| fields.iter().any(|field| word.is_match(field)))
    }
}

/// Stateless query evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine;

impl QueryEngine {
    /// Materialize the query's source, filter, sort and apply the relative area.
    ///
    /// Same query and store contents always give the same result.
    pub fn evaluate(query: &Query, store: &dyn ResourceStore) -> Vec<Resource> {
        let candidates = match query.source() {
            QuerySource::Explicit(resources) => resources.clone(),
            QuerySource::All => store.all(),
            QuerySource::OwnedBy(owner) => store.owned_by(owner),
            QuerySource::WithMember(member) => store.with_member(member),
            QuerySource::InArea(scope) => store.in_area(scope),
            QuerySource::Search(term) => {
                let matcher = SearchMatcher::new(term);
                store.all().into_iter().filter(|r| matcher.matches(r)).collect()
            }
            QuerySource::None => Vec::new(),
        };

        let mut result: Vec<Resource> = candidates.into_iter().filter(|r| query.passes(r)).collect();
        query.sorting().sort(&mut result);

        if let Some(area) = query.relative_area() {
            // stable: keeps the sorted order within both groups
            result.sort_by_key(|r| !r.id.area.eq_ignore_ascii_case(area));
        }
        result
    }
}
