//! In-process reference datastore.
//!
//! The direct count walks a per-partition index sorted by start coordinate;
//! the grouped count scans every record, filters, then groups. The two paths
//! share nothing but the predicate, which is what makes them a useful
//! cross-check of each other.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::Rng;

use crate::catalog::{Coordinate, PartitionCatalog};
use crate::error::{BenchError, StoreError};
use crate::query::{IntervalRecord, Predicate};
use crate::store::RangeStore;

/// Interval records held in memory.
pub struct MemoryStore {
    records: Vec<IntervalRecord>,
    by_partition: HashMap<String, Vec<(Coordinate, Coordinate)>>,
    connections: u64,
}

impl MemoryStore {
    /// Build a store from records in any order.
    #[must_use]
    pub fn from_records(records: Vec<IntervalRecord>) -> Self {
        let mut by_partition: HashMap<String, Vec<(Coordinate, Coordinate)>> = HashMap::new();
        for r in &records {
            by_partition
                .entry(r.chr.clone())
                .or_default()
                .push((r.start, r.end));
        }
        for index in by_partition.values_mut() {
            index.sort_unstable();
        }
        Self {
            records,
            by_partition,
            connections: 1,
        }
    }

    /// Load tab-separated `chr start end` lines (BED-like; extra columns ignored).
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, BenchError> {
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line =
                line.map_err(|e| BenchError::Config(format!("records line {line_no}: {e}")))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let (Some(chr), Some(start), Some(end)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(BenchError::Config(format!(
                    "records line {line_no}: expected chr, start, end"
                )));
            };
            let parse = |v: &str| {
                v.parse::<Coordinate>().map_err(|e| {
                    BenchError::Config(format!("records line {line_no}: bad coordinate {v:?}: {e}"))
                })
            };
            let (start, end) = (parse(start)?, parse(end)?);
            if end < start {
                return Err(BenchError::Config(format!(
                    "records line {line_no}: end {end} before start {start}"
                )));
            }
            records.push(IntervalRecord::new(chr, start, end));
        }
        Ok(Self::from_records(records))
    }

    /// Load a records file; see [`from_reader`](Self::from_reader).
    pub fn from_path(path: &Path) -> Result<Self, BenchError> {
        let file = File::open(path)
            .map_err(|e| BenchError::Config(format!("cannot open {}: {e}", path.display())))?;
        let store = Self::from_reader(BufReader::new(file))?;
        tracing::info!(path = %path.display(), records = store.len(), "loaded records");
        Ok(store)
    }

    /// Random records spread over every catalog partition.
    ///
    /// Record lengths are drawn from `1..=max_record_length`; starts are
    /// uniform over the partition's valid range.
    pub fn synthetic(
        catalog: &PartitionCatalog,
        per_partition: usize,
        max_record_length: Coordinate,
        rng: &mut impl Rng,
    ) -> Self {
        let max_record_length = max_record_length.max(1);
        let mut records = Vec::with_capacity(per_partition * catalog.len());
        for p in catalog.partitions() {
            for _ in 0..per_partition {
                let start = rng.gen_range(p.min..=p.max);
                let end = start + rng.gen_range(1..=max_record_length);
                records.push(IntervalRecord::new(p.id.clone(), start, end));
            }
        }
        Self::from_records(records)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of times a connection was (re)established.
    #[must_use]
    pub fn connections(&self) -> u64 {
        self.connections
    }
}

impl RangeStore for MemoryStore {
    fn count_matching(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let Some(index) = self.by_partition.get(&predicate.partition) else {
            return Ok(0);
        };
        let lo = index.partition_point(|&(start, _)| start <= predicate.start_after);
        let hi = index.partition_point(|&(start, _)| start <= predicate.start_until);
        if lo >= hi {
            return Ok(0);
        }
        let count = index[lo..hi]
            .iter()
            .filter(|&&(start, end)| predicate.matches_coordinates(start, end))
            .count();
        Ok(count as u64)
    }

    fn count_matching_grouped(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        // $group over an empty match emits no document; an in-process scan
        // cannot lose its connection, so that case is simply zero.
        let group: Option<u64> = self
            .records
            .iter()
            .filter(|r| predicate.matches(r))
            .fold(None, |acc, _| Some(acc.unwrap_or(0) + 1));
        Ok(group.unwrap_or(0))
    }

    fn reconnect(&mut self) -> Result<(), StoreError> {
        self.connections += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "memory store ({} records, {} partitions)",
            self.records.len(),
            self.by_partition.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample() -> MemoryStore {
        MemoryStore::from_records(vec![
            IntervalRecord::new("1", 950, 1_000),
            IntervalRecord::new("1", 1_200, 1_300),
            IntervalRecord::new("1", 1_900, 2_100),
            IntervalRecord::new("1", 1_900, 2_101),
            IntervalRecord::new("1", 900, 1_100),
            IntervalRecord::new("2", 1_200, 1_300),
        ])
    }

    #[test]
    fn both_counts_agree_on_sample() {
        let store = sample();
        let p = Query::new("1", 1_000, 2_000, 100).predicate();
        assert_eq!(store.count_matching(&p), Ok(3));
        assert_eq!(store.count_matching_grouped(&p), Ok(3));
    }

    #[test]
    fn unknown_partition_counts_zero() {
        let store = sample();
        let p = Query::new("7", 1_000, 2_000, 100).predicate();
        assert_eq!(store.count_matching(&p), Ok(0));
        assert_eq!(store.count_matching_grouped(&p), Ok(0));
    }

    #[test]
    fn reader_parses_bed_like_lines() {
        let data = "# header\n1\t10\t20\textra\n\n2 30 40\n";
        let store = MemoryStore::from_reader(data.as_bytes()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn reader_reports_line_numbers() {
        let err = MemoryStore::from_reader("1\t10\t20\n1\tx\t20\n".as_bytes())
            .err()
            .unwrap();
        assert!(err.to_string().contains("line 2"));
        let err = MemoryStore::from_reader("1\t10\n".as_bytes()).err().unwrap();
        assert!(err.to_string().contains("line 1"));
        let err = MemoryStore::from_reader("1\t30\t20\n".as_bytes()).err().unwrap();
        assert!(err.to_string().contains("before start"));
    }

    #[test]
    fn path_loader_reads_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "13\t19020100\t19020200").unwrap();
        writeln!(file, "13\t19020150\t19020400").unwrap();
        let store = MemoryStore::from_path(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert!(MemoryStore::from_path(Path::new("/nonexistent/records.tsv")).is_err());
    }

    #[test]
    fn synthetic_records_fit_partitions() {
        let catalog = PartitionCatalog::grch37();
        let mut rng = StdRng::seed_from_u64(11);
        let store = MemoryStore::synthetic(&catalog, 50, 500, &mut rng);
        assert_eq!(store.len(), 50 * catalog.len());
        for r in &store.records {
            let range = catalog.range_for(&r.chr).unwrap();
            assert!(r.start >= range.min && r.start <= range.max);
            assert!(r.end > r.start && r.end <= r.start + 500);
        }
    }

    #[test]
    fn reconnect_counts_connections() {
        let mut store = sample();
        assert_eq!(store.connections(), 1);
        store.reconnect().unwrap();
        assert_eq!(store.connections(), 2);
    }
}
