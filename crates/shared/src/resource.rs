//! Resource (plot) types and the read-only store interface

use crate::identity::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Flag key holding the sale price of a resource
pub const PRICE_FLAG: &str = "price";

/// Flag key holding the unix timestamp (seconds) at which a resource was marked done
pub const DONE_FLAG: &str = "done";

/// Identifier of a resource: the area it lives in plus its grid coordinates
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub area: String,
    pub x: i32,
    pub y: i32,
}

impl ResourceId {
    pub fn new(area: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            area: area.into(),
            x,
            y,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.area, self.x, self.y)
    }
}

/// A region that contains resources
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum AreaScope {
    /// Every resource in a world
    World(String),
    /// Every resource in a single named area
    Area(String),
}

impl AreaScope {
    /// Check whether a resource lies inside this scope
    pub fn contains(&self, resource: &Resource) -> bool {
        match self {
            AreaScope::World(world) => resource.world.eq_ignore_ascii_case(world),
            AreaScope::Area(area) => resource.id.area.eq_ignore_ascii_case(area),
        }
    }
}

/// Typed flag value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FlagValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FlagValue::Number(n) => Some(*n),
            FlagValue::Text(s) => s.trim().parse().ok(),
            FlagValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

fn default_base() -> bool {
    true
}

/// A plot: an owned region with auxiliary identity relations and flags.
///
/// `trusted`, `members` and `denied` are kept disjoint by the builder methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: ResourceId,

    /// World the resource lives in
    pub world: String,

    /// Optional human-friendly alias
    #[serde(default)]
    pub alias: Option<String>,

    /// Owner identity (None = unowned)
    #[serde(default)]
    pub owner: Option<Identity>,

    #[serde(default)]
    pub trusted: BTreeSet<Identity>,

    #[serde(default)]
    pub members: BTreeSet<Identity>,

    #[serde(default)]
    pub denied: BTreeSet<Identity>,

    #[serde(default)]
    pub flags: BTreeMap<String, FlagValue>,

    /// Rating per rater (0-10)
    #[serde(default)]
    pub ratings: BTreeMap<Identity, u8>,

    pub created_at: DateTime<Utc>,

    /// Last modification; falls back to `created_at`
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,

    /// False for the non-base parts of a merged resource
    #[serde(default = "default_base")]
    pub base: bool,
}

impl Resource {
    /// Create an unowned base resource
    pub fn new(id: ResourceId, world: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            world: world.into(),
            alias: None,
            owner: None,
            trusted: BTreeSet::new(),
            members: BTreeSet::new(),
            denied: BTreeSet::new(),
            flags: BTreeMap::new(),
            ratings: BTreeMap::new(),
            created_at,
            modified_at: None,
            base: true,
        }
    }

    pub fn with_owner(mut self, owner: Identity) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_trusted(mut self, identity: Identity) -> Self {
        self.members.remove(&identity);
        self.denied.remove(&identity);
        self.trusted.insert(identity);
        self
    }

    pub fn with_member(mut self, identity: Identity) -> Self {
        self.trusted.remove(&identity);
        self.denied.remove(&identity);
        self.members.insert(identity);
        self
    }

    pub fn with_denied(mut self, identity: Identity) -> Self {
        self.trusted.remove(&identity);
        self.members.remove(&identity);
        self.denied.insert(identity);
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: FlagValue) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    pub fn with_rating(mut self, rater: Identity, rating: u8) -> Self {
        self.ratings.insert(rater, rating.min(10));
        self
    }

    pub fn modified(mut self, at: DateTime<Utc>) -> Self {
        self.modified_at = Some(at);
        self
    }

    /// Mark as a non-base part of a merged resource
    pub fn merged_part(mut self) -> Self {
        self.base = false;
        self
    }

    /// Check if the identity is the owner
    pub fn is_owner(&self, identity: &Identity) -> bool {
        self.owner.as_ref() == Some(identity)
    }

    /// Check if the identity is trusted or a member
    pub fn is_added(&self, identity: &Identity) -> bool {
        self.trusted.contains(identity) || self.members.contains(identity)
    }

    pub fn is_denied(&self, identity: &Identity) -> bool {
        self.denied.contains(identity)
    }

    pub fn flag(&self, key: &str) -> Option<&FlagValue> {
        self.flags.get(key)
    }

    /// Sale price, 0 when not for sale
    pub fn price(&self) -> f64 {
        self.flag(PRICE_FLAG)
            .and_then(FlagValue::as_number)
            .unwrap_or(0.0)
    }

    /// Completion timestamp (unix seconds) when the resource is done
    pub fn done_at(&self) -> Option<i64> {
        match self.flag(DONE_FLAG)? {
            FlagValue::Bool(true) => Some(0),
            FlagValue::Bool(false) => None,
            other => other.as_number().map(|n| n as i64),
        }
    }

    pub fn is_done(&self) -> bool {
        self.done_at().is_some()
    }

    /// Average rating, 0 when unrated
    pub fn average_rating(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        let sum: u32 = self.ratings.values().map(|r| u32::from(*r)).sum();
        f64::from(sum) / self.ratings.len() as f64
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.modified_at.unwrap_or(self.created_at)
    }

    /// Every identity referenced by this resource, owner first
    pub fn identities(&self) -> Vec<Identity> {
        self.owner
            .iter()
            .chain(self.trusted.iter())
            .chain(self.members.iter())
            .copied()
            .collect()
    }
}

/// Read-only resource enumeration
///
/// This is a PORT: the listing core only reads through it, the store that
/// implements it owns and mutates the resources.
pub trait ResourceStore: Send + Sync {
    /// Every known resource
    fn all(&self) -> Vec<Resource>;

    /// Resources owned by an identity
    fn owned_by(&self, owner: &Identity) -> Vec<Resource>;

    /// Resources where the identity is trusted or a member
    fn with_member(&self, member: &Identity) -> Vec<Resource>;

    /// Resources inside a world or area
    fn in_area(&self, scope: &AreaScope) -> Vec<Resource>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn plot(x: i32, y: i32) -> Resource {
        Resource::new(ResourceId::new("plotworld", x, y), "plotworld", at(1_000))
    }

    // ============== ResourceId Tests ==============

    #[test]
    fn test_resource_id_display() {
        assert_eq!(ResourceId::new("plotworld", 3, -2).to_string(), "plotworld;3;-2");
    }

    #[test]
    fn test_resource_id_ordering() {
        let a = ResourceId::new("a", 0, 5);
        let b = ResourceId::new("a", 1, 0);
        let c = ResourceId::new("b", 0, 0);
        assert!(a < b);
        assert!(b < c);
    }

    // ============== Relation Tests ==============

    #[test]
    fn test_relations_stay_disjoint() {
        let alice = Identity::from_u128(1);
        let r = plot(0, 0).with_trusted(alice).with_member(alice).with_denied(alice);

        assert!(r.denied.contains(&alice));
        assert!(!r.trusted.contains(&alice));
        assert!(!r.members.contains(&alice));
        assert!(!r.is_added(&alice));
    }

    #[test]
    fn test_is_owner_and_added() {
        let alice = Identity::from_u128(1);
        let bob = Identity::from_u128(2);
        let r = plot(0, 0).with_owner(alice).with_member(bob);

        assert!(r.is_owner(&alice));
        assert!(!r.is_owner(&bob));
        assert!(r.is_added(&bob));
        assert_eq!(r.identities(), vec![alice, bob]);
    }

    // ============== Flag Tests ==============

    #[test]
    fn test_price_defaults_to_zero() {
        assert_eq!(plot(0, 0).price(), 0.0);
        assert_eq!(plot(0, 0).with_flag(PRICE_FLAG, FlagValue::Number(25.0)).price(), 25.0);
        assert_eq!(plot(0, 0).with_flag(PRICE_FLAG, FlagValue::Text("7.5".into())).price(), 7.5);
    }

    #[test]
    fn test_done_flag() {
        assert!(!plot(0, 0).is_done());
        assert_eq!(plot(0, 0).with_flag(DONE_FLAG, FlagValue::Number(1_700_000_000.0)).done_at(), Some(1_700_000_000));
        assert!(!plot(0, 0).with_flag(DONE_FLAG, FlagValue::Bool(false)).is_done());
    }

    #[test]
    fn test_average_rating() {
        let r = plot(0, 0)
            .with_rating(Identity::from_u128(1), 4)
            .with_rating(Identity::from_u128(2), 8);
        assert_eq!(r.average_rating(), 6.0);
        assert_eq!(plot(0, 0).average_rating(), 0.0);
    }

    #[test]
    fn test_last_activity_falls_back_to_creation() {
        assert_eq!(plot(0, 0).last_activity(), at(1_000));
        assert_eq!(plot(0, 0).modified(at(2_000)).last_activity(), at(2_000));
    }

    // ============== AreaScope Tests ==============

    #[test]
    fn test_area_scope_contains() {
        let r = Resource::new(ResourceId::new("arena", 0, 0), "Survival", at(0));
        assert!(AreaScope::World("survival".into()).contains(&r));
        assert!(AreaScope::Area("ARENA".into()).contains(&r));
        assert!(!AreaScope::Area("survival".into()).contains(&r));
    }

    // ============== Serde Tests ==============

    #[test]
    fn test_resource_deserialization_minimal() {
        let json = r#"{
            "id": {"area": "plotworld", "x": 1, "y": 2},
            "world": "plotworld",
            "createdAt": "2024-01-01T00:00:00Z"
        }"#;
        let r: Resource = serde_json::from_str(json).unwrap();

        assert!(r.base);
        assert!(r.owner.is_none());
        assert!(r.flags.is_empty());
    }

    #[test]
    fn test_resource_deserialization_full() {
        let json = r#"{
            "id": {"area": "plotworld", "x": 1, "y": 2},
            "world": "plotworld",
            "owner": "00000000-0000-0000-0000-000000000001",
            "members": ["00000000-0000-0000-0000-000000000002"],
            "flags": {"price": 100, "done": 1700000000, "music": "cat"},
            "ratings": {"00000000-0000-0000-0000-000000000002": 7},
            "createdAt": "2024-01-01T00:00:00Z",
            "base": false
        }"#;
        let r: Resource = serde_json::from_str(json).unwrap();

        assert_eq!(r.owner, Some(Identity::from_u128(1)));
        assert!(r.is_added(&Identity::from_u128(2)));
        assert_eq!(r.price(), 100.0);
        assert!(r.is_done());
        assert_eq!(r.flag("music"), Some(&FlagValue::Text("cat".into())));
        assert_eq!(r.average_rating(), 7.0);
        assert!(!r.base);
    }
}
