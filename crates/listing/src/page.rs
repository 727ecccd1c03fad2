//! Rendered listing pages

use resolver::IdentityMapping;
use serde::Serialize;
use shared::{Identity, Resource, ResourceId};
use std::collections::HashMap;

/// How the viewer relates to a listed resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Unowned,
    Owner,
    Added,
    Denied,
    Other,
}

impl Relation {
    pub fn of(resource: &Resource, viewer: &Identity) -> Self {
        if resource.owner.is_none() {
            Relation::Unowned
        } else if resource.is_owner(viewer) {
            Relation::Owner
        } else if resource.is_added(viewer) {
            Relation::Added
        } else if resource.is_denied(viewer) {
            Relation::Denied
        } else {
            Relation::Other
        }
    }
}

/// An identity with its display name, if one was resolved in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameEntry {
    pub identity: Identity,
    pub name: Option<String>,
}

impl NameEntry {
    pub(crate) fn lookup(identity: Identity, names: &HashMap<Identity, IdentityMapping>) -> Self {
        let name = names
            .get(&identity)
            .and_then(|mapping| mapping.name())
            .map(str::to_string);
        Self { identity, name }
    }

    /// The name, or the raw identity when unresolved
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.identity.to_string(),
        }
    }
}

/// Whether every name on the page was resolved before the deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum NameStatus {
    Complete,
    /// Some names did not arrive in time and show as raw identities
    TimedOut { pending: usize },
    /// Name resolution was abandoned; every identity shows raw
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRow {
    /// 1-based position in the full listing
    pub number: usize,
    pub id: ResourceId,
    pub world: String,
    pub alias: Option<String>,
    pub relation: Relation,
    pub owner: Option<NameEntry>,
    pub trusted: Vec<NameEntry>,
    pub members: Vec<NameEntry>,
}

impl ListingRow {
    pub(crate) fn build(
        number: usize,
        resource: &Resource,
        viewer: &Identity,
        names: &HashMap<Identity, IdentityMapping>,
    ) -> Self {
        Self {
            number,
            id: resource.id.clone(),
            world: resource.world.clone(),
            alias: resource.alias.clone(),
            relation: Relation::of(resource, viewer),
            owner: resource.owner.map(|owner| NameEntry::lookup(owner, names)),
            trusted: resource.trusted.iter().map(|id| NameEntry::lookup(*id, names)).collect(),
            members: resource.members.iter().map(|id| NameEntry::lookup(*id, names)).collect(),
        }
    }

    /// Alias if set, otherwise the resource id
    pub fn label(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => self.id.to_string(),
        }
    }
}

/// One page of a listing, ready to render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub title: String,
    pub page_number: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub rows: Vec<ListingRow>,
    pub name_status: NameStatus,
}

impl ListingPage {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn id(n: u128) -> Identity {
        Identity::from_u128(n)
    }

    fn plot() -> Resource {
        Resource::new(ResourceId::new("town", 0, 0), "survival", Utc::now())
    }

    #[test]
    fn test_relation_precedence() {
        let viewer = id(1);
        assert_eq!(Relation::of(&plot(), &viewer), Relation::Unowned);
        assert_eq!(Relation::of(&plot().with_owner(viewer), &viewer), Relation::Owner);
        assert_eq!(Relation::of(&plot().with_owner(id(2)).with_member(viewer), &viewer), Relation::Added);
        assert_eq!(Relation::of(&plot().with_owner(id(2)).with_denied(viewer), &viewer), Relation::Denied);
        assert_eq!(Relation::of(&plot().with_owner(id(2)), &viewer), Relation::Other);
    }

    #[test]
    fn test_name_entry_display_falls_back_to_identity() {
        let entry = NameEntry::lookup(id(3), &HashMap::new());
        assert!(entry.name.is_none());
        assert_eq!(entry.display(), "00000000-0000-0000-0000-000000000003");
    }

    #[test]
    fn test_row_label_and_json() {
        let row = ListingRow::build(4, &plot().with_alias("Castle"), &id(1), &HashMap::new());
        assert_eq!(row.label(), "Castle");

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["number"], 4);
        assert_eq!(json["relation"], "unowned");
    }

    #[test]
    fn test_name_status_serialization() {
        let json = serde_json::to_value(NameStatus::TimedOut { pending: 2 }).unwrap();
        assert_eq!(json["status"], "timed_out");
        assert_eq!(json["pending"], 2);
    }
}
