//! The competing count strategies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, StoreError};
use crate::query::Predicate;
use crate::store::RangeStore;

/// A query formulation under comparison.
///
/// Both variants count records matching the same [`Predicate`]; they differ
/// only in how the datastore is asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strategy {
    /// Filtered `count` on the collection.
    FindCount,
    /// `$match` + `$group` aggregation pipeline.
    AggregateCount,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Strategy; 2] = [Strategy::FindCount, Strategy::AggregateCount];

    /// Short code used in logs and on the command line.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::FindCount => "fc",
            Self::AggregateCount => "ac",
        }
    }

    /// Datastore method the strategy issues.
    #[must_use]
    pub fn method(self) -> &'static str {
        match self {
            Self::FindCount => "find_count",
            Self::AggregateCount => "agg_count",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FindCount => "find().count()",
            Self::AggregateCount => "aggregate count",
        }
    }

    /// Issue one count against the store.
    pub fn count(self, store: &dyn RangeStore, predicate: &Predicate) -> Result<u64, StoreError> {
        match self {
            Self::FindCount => store.count_matching(predicate),
            Self::AggregateCount => store.count_matching_grouped(predicate),
        }
    }

    /// Parse a comma-separated list such as `fc,ac`.
    pub fn parse_list(list: &str) -> Result<Vec<Strategy>, BenchError> {
        let mut out = Vec::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let strategy: Strategy = name.parse()?;
            if out.contains(&strategy) {
                return Err(BenchError::Config(format!("strategy {name} listed twice")));
            }
            out.push(strategy);
        }
        if out.is_empty() {
            return Err(BenchError::Config("no strategies selected".into()));
        }
        Ok(out)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Strategy {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fc" | "find_count" | "find-count" => Ok(Self::FindCount),
            "ac" | "agg_count" | "aggregate-count" | "aggregate_count" => Ok(Self::AggregateCount),
            _ => Err(BenchError::UnknownStrategy(s.to_string())),
        }
    }
}
