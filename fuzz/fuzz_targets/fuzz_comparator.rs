#![no_main]

use libfuzzer_sys::fuzz_target;

use rangebench_core::sample::Metric;
use rangebench_core::strategy::Strategy;
use rangebench_stats::StatsComparator;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // First byte splits the remaining bytes into two latency samples.
    let split = 1 + usize::from(data[0]) % (data.len() - 1);
    let to_latencies = |bytes: &[u8]| -> Vec<f64> {
        bytes
            .chunks(2)
            .map(|c| f64::from(u16::from_le_bytes([c[0], *c.get(1).unwrap_or(&0)])) * 1e-6)
            .collect()
    };
    let a = to_latencies(&data[1..split]);
    let b = to_latencies(&data[split..]);

    let report = StatsComparator::new().compare_values(
        (Strategy::FindCount, &a),
        (Strategy::AggregateCount, &b),
        Metric::Latency,
    );
    if let Some(test) = report.test {
        assert!((0.0..=1.0).contains(&test.p_value) || test.p_value.is_nan());
    }
});
