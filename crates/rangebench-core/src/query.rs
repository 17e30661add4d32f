//! Query parameters and the shared matching predicate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::Coordinate;

/// An interval record as stored in the datastore: `{chr, start, end}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRecord {
    /// Partition (chromosome) identifier.
    pub chr: String,
    /// First covered coordinate.
    pub start: Coordinate,
    /// Last covered coordinate.
    pub end: Coordinate,
}

impl IntervalRecord {
    #[must_use]
    pub fn new(chr: impl Into<String>, start: Coordinate, end: Coordinate) -> Self {
        Self {
            chr: chr.into(),
            start,
            end,
        }
    }
}

/// One generated query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Partition identifier.
    pub partition: String,
    /// Interval start.
    pub start: Coordinate,
    /// Interval end (`start + length`).
    pub end: Coordinate,
    /// Tolerance applied around the interval.
    pub margin: Coordinate,
}

impl Query {
    #[must_use]
    pub fn new(
        partition: impl Into<String>,
        start: Coordinate,
        end: Coordinate,
        margin: Coordinate,
    ) -> Self {
        Self {
            partition: partition.into(),
            start,
            end,
            margin,
        }
    }

    /// Interval length.
    #[must_use]
    pub fn length(&self) -> Coordinate {
        self.end - self.start
    }

    /// Build the matching predicate every strategy evaluates.
    ///
    /// Margin bounds saturate at the coordinate limits.
    #[must_use]
    pub fn predicate(&self) -> Predicate {
        Predicate {
            partition: self.partition.clone(),
            start_after: self.start.saturating_sub(self.margin),
            start_until: self.end,
            end_from: self.start,
            end_until: self.end.saturating_add(self.margin),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{} (margin {})",
            self.partition, self.start, self.end, self.margin
        )
    }
}

/// Resolved bounds of the overlap predicate.
///
/// A record matches when
/// `start_after < record.start <= start_until` and
/// `end_from <= record.end <= end_until`, on the same partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub partition: String,
    /// Exclusive lower bound on `record.start`.
    pub start_after: Coordinate,
    /// Inclusive upper bound on `record.start`.
    pub start_until: Coordinate,
    /// Inclusive lower bound on `record.end`.
    pub end_from: Coordinate,
    /// Inclusive upper bound on `record.end`.
    pub end_until: Coordinate,
}

impl Predicate {
    /// Evaluate against one record.
    #[inline]
    #[must_use]
    pub fn matches(&self, record: &IntervalRecord) -> bool {
        record.chr == self.partition && self.matches_coordinates(record.start, record.end)
    }

    /// Evaluate the coordinate part only (partition already selected).
    #[inline]
    #[must_use]
    pub fn matches_coordinates(&self, start: Coordinate, end: Coordinate) -> bool {
        start > self.start_after
            && start <= self.start_until
            && end >= self.end_from
            && end <= self.end_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> Query {
        Query::new("1", 1_000, 2_000, 100)
    }

    #[test]
    fn query_serializes_with_field_names() {
        let json = serde_json::to_value(query()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"partition": "1", "start": 1000, "end": 2000, "margin": 100})
        );
    }

    #[test]
    fn predicate_bounds() {
        let p = query().predicate();
        assert_eq!(p.start_after, 900);
        assert_eq!(p.start_until, 2_000);
        assert_eq!(p.end_from, 1_000);
        assert_eq!(p.end_until, 2_100);
    }

    #[test]
    fn start_lower_bound_is_exclusive() {
        let p = query().predicate();
        assert!(!p.matches(&IntervalRecord::new("1", 900, 1_500)));
        assert!(p.matches(&IntervalRecord::new("1", 901, 1_500)));
    }

    #[test]
    fn start_upper_bound_is_inclusive() {
        let p = query().predicate();
        assert!(p.matches(&IntervalRecord::new("1", 2_000, 2_000)));
        assert!(!p.matches(&IntervalRecord::new("1", 2_001, 2_050)));
    }

    #[test]
    fn end_bounds_are_inclusive() {
        let p = query().predicate();
        assert!(p.matches(&IntervalRecord::new("1", 950, 1_000)));
        assert!(!p.matches(&IntervalRecord::new("1", 950, 999)));
        assert!(p.matches(&IntervalRecord::new("1", 1_500, 2_100)));
        assert!(!p.matches(&IntervalRecord::new("1", 1_500, 2_101)));
    }

    #[test]
    fn huge_margin_saturates() {
        let p = Query::new("1", 1_000, 2_000, Coordinate::MAX).predicate();
        assert_eq!(p.start_after, 1_000 - Coordinate::MAX);
        assert_eq!(p.end_until, Coordinate::MAX);
        assert!(p.matches(&IntervalRecord::new("1", 0, 1_000)));
        assert!(p.matches(&IntervalRecord::new("1", 1_500, Coordinate::MAX)));

        let p = Query::new("1", -10, 0, Coordinate::MAX).predicate();
        assert_eq!(p.start_after, Coordinate::MIN);
    }

    #[test]
    fn other_partition_never_matches() {
        let p = query().predicate();
        assert!(!p.matches(&IntervalRecord::new("2", 1_500, 1_600)));
    }

    #[test]
    fn display_format() {
        assert_eq!(query().to_string(), "1:1000-2000 (margin 100)");
    }

    #[test]
    fn length() {
        assert_eq!(query().length(), 1_000);
    }
}
