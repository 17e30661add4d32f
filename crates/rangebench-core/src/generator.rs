//! Randomized, range-valid workload generation.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::catalog::{Coordinate, PartitionCatalog, PartitionRange};
use crate::error::BenchError;
use crate::query::Query;

/// Draws queries whose interval always lies inside its partition.
///
/// The partition is chosen uniformly among those able to host the requested
/// length, so long queries never land on partitions that are too small.
pub struct WorkloadGenerator<R: Rng = StdRng> {
    catalog: Arc<PartitionCatalog>,
    rng: R,
}

impl WorkloadGenerator<StdRng> {
    /// Generator with a fixed seed, for replayable workloads.
    #[must_use]
    pub fn seeded(catalog: Arc<PartitionCatalog>, seed: u64) -> Self {
        Self::with_rng(catalog, StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from OS entropy.
    #[must_use]
    pub fn from_entropy(catalog: Arc<PartitionCatalog>) -> Self {
        Self::with_rng(catalog, StdRng::from_entropy())
    }
}

impl<R: Rng> WorkloadGenerator<R> {
    /// Generator drawing from a caller-supplied RNG.
    #[must_use]
    pub fn with_rng(catalog: Arc<PartitionCatalog>, rng: R) -> Self {
        Self { catalog, rng }
    }

    /// The catalog queries are drawn from.
    #[must_use]
    pub fn catalog(&self) -> &PartitionCatalog {
        &self.catalog
    }

    /// Generate one query of `length` on a random feasible partition.
    pub fn generate(&mut self, length: Coordinate, margin: Coordinate) -> Result<Query, BenchError> {
        if self.catalog.is_empty() {
            return Err(BenchError::Config("partition catalog is empty".into()));
        }
        let candidates: Vec<&PartitionRange> = self.catalog.feasible(length).collect();
        let Some(partition) = candidates.choose(&mut self.rng) else {
            let widest = self
                .catalog
                .partitions()
                .iter()
                .map(PartitionRange::span)
                .max()
                .unwrap_or(0);
            return Err(BenchError::InvalidLength {
                partition: "<any>".into(),
                length,
                span: widest,
            });
        };
        let id = partition.id.clone();
        self.generate_on(&id, length, margin)
    }

    /// Generate one query of `length` on a fixed partition.
    pub fn generate_on(
        &mut self,
        partition: &str,
        length: Coordinate,
        margin: Coordinate,
    ) -> Result<Query, BenchError> {
        let (min, max) = self.catalog.valid_start_bounds(partition, length)?;
        let start = self.rng.gen_range(min..=max);
        let query = Query::new(partition, start, start + length, margin);
        debug!(%query, "generated query");
        Ok(query)
    }

    /// Shuffle a slice with the generator's RNG.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
