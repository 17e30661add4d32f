#![no_main]

use libfuzzer_sys::fuzz_target;

use rangebench_cli::History;
use rangebench_core::sample::Metric;
use rangebench_stats::StatsComparator;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must parse or fail cleanly, never panic.
    let Ok(history) = History::from_reader(data) else {
        return;
    };
    for row in history.rows() {
        assert!(row.latency_secs.is_finite() && row.latency_secs >= 0.0);
    }
    let comparator = StatsComparator::new();
    let _ = history.compare(&comparator, Metric::Latency);
    let _ = history.compare(&comparator, Metric::PerRecord);
});
