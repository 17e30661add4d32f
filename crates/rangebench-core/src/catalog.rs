//! Partition catalog: valid coordinate ranges per chromosome.

use serde::{Deserialize, Serialize};

use crate::error::BenchError;

/// Coordinate type used for interval positions.
pub type Coordinate = i64;

/// Valid coordinate range and record count of one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRange {
    /// Partition identifier (chromosome name).
    pub id: String,
    /// Smallest record start in the partition.
    pub min: Coordinate,
    /// Largest record start in the partition.
    pub max: Coordinate,
    /// Number of records stored for the partition.
    pub elements: u64,
}

impl PartitionRange {
    /// Width of the valid range.
    #[must_use]
    pub fn span(&self) -> Coordinate {
        self.max - self.min
    }
}

/// GRCh37 variant start ranges, autosomes and X (Y is intentionally absent).
const GRCH37: &[(&str, Coordinate, Coordinate, u64)] = &[
    ("1", 10_020, 249_240_605, 12_422_239),
    ("2", 10_133, 243_189_190, 13_217_397),
    ("3", 60_069, 197_962_381, 10_891_260),
    ("4", 10_006, 191_044_268, 10_427_984),
    ("5", 10_043, 180_905_164, 9_742_153),
    ("6", 61_932, 171_054_104, 9_340_928),
    ("7", 10_010, 159_128_653, 8_803_393),
    ("8", 10_059, 146_303_974, 8_458_842),
    ("9", 10_024, 141_153_428, 6_749_462),
    ("10", 60_222, 135_524_743, 7_416_994),
    ("11", 61_248, 134_946_509, 7_690_584),
    ("12", 60_076, 133_841_815, 7_347_630),
    ("13", 19_020_013, 115_109_865, 5_212_835),
    ("14", 19_000_005, 107_289_456, 4_989_875),
    ("15", 20_000_003, 102_521_368, 4_607_392),
    ("16", 60_008, 90_294_709, 5_234_679),
    ("17", 47, 81_195_128, 4_652_428),
    ("18", 10_005, 78_017_157, 4_146_560),
    ("19", 60_360, 59_118_925, 3_821_659),
    ("20", 60_039, 62_965_384, 3_512_381),
    ("21", 9_411_199, 48_119_868, 2_082_680),
    ("22", 16_050_036, 51_244_515, 2_172_028),
    ("X", 60_003, 155_260_479, 5_893_713),
];

/// Read-only table of partitions, in insertion order.
#[derive(Debug, Clone)]
pub struct PartitionCatalog {
    partitions: Vec<PartitionRange>,
}

impl PartitionCatalog {
    /// Build a catalog, rejecting inverted ranges and duplicate identifiers.
    pub fn new(partitions: Vec<PartitionRange>) -> Result<Self, BenchError> {
        for (i, p) in partitions.iter().enumerate() {
            if p.min > p.max {
                return Err(BenchError::Config(format!(
                    "partition {} has min {} > max {}",
                    p.id, p.min, p.max
                )));
            }
            if partitions[..i].iter().any(|q| q.id == p.id) {
                return Err(BenchError::Config(format!("duplicate partition {}", p.id)));
            }
        }
        Ok(Self { partitions })
    }

    /// The built-in human GRCh37 table.
    #[must_use]
    pub fn grch37() -> Self {
        Self {
            partitions: GRCH37
                .iter()
                .map(|&(id, min, max, elements)| PartitionRange {
                    id: id.to_string(),
                    min,
                    max,
                    elements,
                })
                .collect(),
        }
    }

    /// Look up the range for a partition.
    pub fn range_for(&self, partition: &str) -> Result<&PartitionRange, BenchError> {
        self.partitions
            .iter()
            .find(|p| p.id == partition)
            .ok_or_else(|| BenchError::UnknownPartition(partition.to_string()))
    }

    /// Inclusive bounds for a query start so that `start + length` stays in range.
    pub fn valid_start_bounds(
        &self,
        partition: &str,
        length: Coordinate,
    ) -> Result<(Coordinate, Coordinate), BenchError> {
        let range = self.range_for(partition)?;
        if length < 0 || length > range.span() {
            return Err(BenchError::InvalidLength {
                partition: partition.to_string(),
                length,
                span: range.span(),
            });
        }
        Ok((range.min, range.max - length))
    }

    /// Partitions able to host a query of `length`.
    pub fn feasible(&self, length: Coordinate) -> impl Iterator<Item = &PartitionRange> {
        self.partitions
            .iter()
            .filter(move |p| length >= 0 && length <= p.span())
    }

    /// All partitions.
    #[must_use]
    pub fn partitions(&self) -> &[PartitionRange] {
        &self.partitions
    }

    /// Partition identifiers in catalog order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.partitions.iter().map(|p| p.id.as_str())
    }

    /// Number of partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

impl Default for PartitionCatalog {
    fn default() -> Self {
        Self::grch37()
    }
}
