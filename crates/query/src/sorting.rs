//! Sort strategies over resources

use serde::{Deserialize, Serialize};
use shared::Resource;
use std::cmp::Ordering;

/// How a query orders its result.
///
/// Every strategy except `Unsorted` is a strict total order: ties fall back
/// to the resource id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// Keep the store's enumeration order
    #[default]
    Unsorted,
    /// Oldest first
    ByCreationOrder,
    /// Most recently modified first
    ByTemporalRecency,
    /// Done resources first, most recently completed first
    ByDoneStatus,
    /// Highest average rating first; unrated counts as 0
    ByRating,
}

impl SortStrategy {
    /// Compare two resources under this strategy
    pub fn compare(&self, a: &Resource, b: &Resource) -> Ordering {
        let primary = match self {
            SortStrategy::Unsorted => return Ordering::Equal,
            SortStrategy::ByCreationOrder => a.created_at.cmp(&b.created_at),
            SortStrategy::ByTemporalRecency => b.last_activity().cmp(&a.last_activity()),
            SortStrategy::ByDoneStatus => match (a.done_at(), b.done_at()) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortStrategy::ByRating => b.average_rating().total_cmp(&a.average_rating()),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    /// Sort in place; `Unsorted` leaves the order untouched
    pub fn sort(&self, resources: &mut [Resource]) {
        if *self != SortStrategy::Unsorted {
            resources.sort_by(|a, b| self.compare(a, b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use shared::{FlagValue, Identity, ResourceId, DONE_FLAG};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn plot(x: i32, created: i64) -> Resource {
        Resource::new(ResourceId::new("plotworld", x, 0), "plotworld", at(created))
    }

    fn xs(resources: &[Resource]) -> Vec<i32> {
        resources.iter().map(|r| r.id.x).collect()
    }

    #[test]
    fn test_unsorted_keeps_order() {
        let mut resources = vec![plot(3, 1), plot(1, 2), plot(2, 3)];
        SortStrategy::Unsorted.sort(&mut resources);
        assert_eq!(xs(&resources), vec![3, 1, 2]);
    }

    #[test]
    fn test_creation_order() {
        let mut resources = vec![plot(1, 30), plot(2, 10), plot(3, 20)];
        SortStrategy::ByCreationOrder.sort(&mut resources);
        assert_eq!(xs(&resources), vec![2, 3, 1]);
    }

    #[test]
    fn test_equal_timestamps_fall_back_to_id() {
        // same input in two different orders must give the same output
        let mut forward = vec![plot(5, 10), plot(2, 10), plot(9, 10), plot(1, 5)];
        let mut backward: Vec<Resource> = forward.iter().rev().cloned().collect();

        SortStrategy::ByCreationOrder.sort(&mut forward);
        SortStrategy::ByCreationOrder.sort(&mut backward);

        assert_eq!(xs(&forward), vec![1, 2, 5, 9]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_temporal_recency() {
        let mut resources = vec![plot(1, 10), plot(2, 10).modified(at(50)), plot(3, 30)];
        SortStrategy::ByTemporalRecency.sort(&mut resources);
        assert_eq!(xs(&resources), vec![2, 3, 1]);
    }

    #[test]
    fn test_done_status() {
        let mut resources = vec![
            plot(1, 0),
            plot(2, 0).with_flag(DONE_FLAG, FlagValue::Number(100.0)),
            plot(3, 0).with_flag(DONE_FLAG, FlagValue::Number(200.0)),
            plot(4, 0),
        ];
        SortStrategy::ByDoneStatus.sort(&mut resources);
        assert_eq!(xs(&resources), vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_rating_treats_unrated_as_zero() {
        let rater = Identity::from_u128(1);
        let mut resources = vec![
            plot(1, 0),
            plot(2, 0).with_rating(rater, 3),
            plot(3, 0).with_rating(rater, 9),
        ];
        SortStrategy::ByRating.sort(&mut resources);
        assert_eq!(xs(&resources), vec![3, 2, 1]);
    }

    #[test]
    fn test_strategy_serialization() {
        let json = serde_json::to_string(&SortStrategy::ByTemporalRecency).unwrap();
        assert_eq!(json, "\"by_temporal_recency\"");
    }
}
